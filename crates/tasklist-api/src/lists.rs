use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use tasklist_db::models::ListRow;
use tasklist_db::{Database, DbError};
use tasklist_types::api::Claims;
use tasklist_types::models::{List, ListsCollection, Todo, TodoCollection};

use crate::acl;
use crate::auth::AppState;
use crate::error::ApiError;
use crate::extractors::{JsonBody, ResourceId};
use crate::run_db;

pub async fn list_lists(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ListsCollection>, ApiError> {
    if !acl::is_valid_owner(claims.sub) {
        return Ok(Json(Vec::new()));
    }

    let user_id = claims.sub;
    let rows = run_db(&state, move |st| Ok(st.db.get_all_lists_for_user(user_id)?)).await?;

    Ok(Json(rows.into_iter().map(List::from).collect()))
}

pub async fn get_list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ResourceId(id): ResourceId,
) -> Result<Json<List>, ApiError> {
    let acting = claims.sub;
    let row = run_db(&state, move |st| {
        owned_list(&st.db, acting, id)?.ok_or(ApiError::NotFound { resource: "list", id })
    })
    .await?;

    Ok(Json(row.into()))
}

/// GET /lists/{id}/todos
pub async fn list_todos_in_list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ResourceId(id): ResourceId,
) -> Result<Json<TodoCollection>, ApiError> {
    let acting = claims.sub;
    let rows = run_db(&state, move |st| {
        if owned_list(&st.db, acting, id)?.is_none() {
            return Err(ApiError::NotFound { resource: "list", id });
        }
        Ok(st.db.get_todos_for_list(id)?)
    })
    .await?;

    Ok(Json(rows.into_iter().map(Todo::from).collect()))
}

pub async fn add_list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(list): JsonBody<List>,
) -> Result<impl IntoResponse, ApiError> {
    acl::check_claimed_owner(claims.sub, list.user_id)?;
    validate_name(&list.name)?;

    let created = run_db(&state, move |st| {
        ensure_user_exists(&st.db, list.user_id)?;
        Ok(st.db.add_list(&list.name, list.user_id)?)
    })
    .await?;

    info!("User {} created list {}", created.user_id, created.id);
    Ok((StatusCode::CREATED, Json(List::from(created))))
}

/// PUT /lists/{id} — replaces name and owner. Responds with rows changed.
pub async fn update_list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ResourceId(id): ResourceId,
    JsonBody(list): JsonBody<List>,
) -> Result<Json<usize>, ApiError> {
    acl::check_claimed_owner(claims.sub, list.user_id)?;
    validate_name(&list.name)?;

    let acting = claims.sub;
    let n = run_db(&state, move |st| {
        if owned_list(&st.db, acting, id)?.is_none() {
            return Ok(0);
        }
        Ok(st.db.update_list(&ListRow {
            id,
            name: list.name,
            user_id: list.user_id,
        })?)
    })
    .await?;

    Ok(Json(n))
}

/// DELETE /lists/{id} — removes the list and all of its todos atomically.
pub async fn delete_list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ResourceId(id): ResourceId,
) -> Result<Json<usize>, ApiError> {
    let acting = claims.sub;
    let n = run_db(&state, move |st| {
        if owned_list(&st.db, acting, id)?.is_none() {
            return Ok(0);
        }
        Ok(st.db.delete_list_by_id(id)?)
    })
    .await?;

    if n > 0 {
        info!("User {} deleted list {}", acting, id);
    }
    Ok(Json(n))
}

fn owned_list(db: &Database, acting: i64, id: i64) -> Result<Option<ListRow>, ApiError> {
    match db.get_list_by_id(id) {
        Ok(row) if acl::can_access(acting, &row) => Ok(Some(row)),
        Ok(_) | Err(DbError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Owners must be registered; a token for a deleted account names nobody.
fn ensure_user_exists(db: &Database, user_id: i64) -> Result<(), ApiError> {
    match db.get_user_by_id(user_id) {
        Ok(_) => Ok(()),
        Err(DbError::NotFound { .. }) => {
            Err(ApiError::Validation(format!("invalid owner id {}", user_id)))
        }
        Err(e) => Err(e.into()),
    }
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    Ok(())
}
