use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, info};

use tasklist_db::models::TodoRow;
use tasklist_db::{Database, DbError};
use tasklist_types::api::Claims;
use tasklist_types::models::{Todo, TodoCollection};

use crate::acl;
use crate::auth::AppState;
use crate::error::ApiError;
use crate::extractors::{JsonBody, ResourceId};
use crate::run_db;

/// GET /todos — the caller's todos. An id that owns nothing (including a
/// negative one) simply gets an empty array.
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<TodoCollection>, ApiError> {
    if !acl::is_valid_owner(claims.sub) {
        return Ok(Json(Vec::new()));
    }

    let user_id = claims.sub;
    let rows = run_db(&state, move |st| Ok(st.db.get_all_todos_for_user(user_id)?)).await?;

    Ok(Json(rows.into_iter().map(Todo::from).collect()))
}

/// GET /todos/{id}. Someone else's todo reads as missing.
pub async fn get_todo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ResourceId(id): ResourceId,
) -> Result<Json<Todo>, ApiError> {
    let row = run_db(&state, move |st| Ok(st.db.get_todo_by_id(id)?)).await?;

    if !acl::can_access(claims.sub, &row) {
        return Err(ApiError::NotFound { resource: "todo", id });
    }
    Ok(Json(row.into()))
}

pub async fn add_todo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(todo): JsonBody<Todo>,
) -> Result<impl IntoResponse, ApiError> {
    acl::check_claimed_owner(claims.sub, todo.user_id)?;
    validate_title(&todo.title)?;

    let acting = claims.sub;
    let created = run_db(&state, move |st| {
        ensure_list_owned(&st.db, acting, todo.list_id)?;
        Ok(st
            .db
            .add_todo(&todo.title, &todo.description, todo.list_id, todo.user_id)?)
    })
    .await?;

    info!("User {} added todo {} to list {}", acting, created.id, created.list_id);
    Ok((StatusCode::CREATED, Json(Todo::from(created))))
}

/// PUT /todos/{id} — full replace. Responds with the number of rows changed;
/// 0 when the todo does not exist or belongs to someone else.
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ResourceId(id): ResourceId,
    JsonBody(todo): JsonBody<Todo>,
) -> Result<Json<usize>, ApiError> {
    acl::check_claimed_owner(claims.sub, todo.user_id)?;
    validate_title(&todo.title)?;

    let acting = claims.sub;
    let n = run_db(&state, move |st| {
        let Some(existing) = owned_todo(&st.db, acting, id)? else {
            return Ok(0);
        };
        if todo.list_id != existing.list_id {
            ensure_list_owned(&st.db, acting, todo.list_id)?;
        }

        Ok(st.db.update_todo(&TodoRow {
            id,
            title: todo.title,
            description: todo.description,
            list_id: todo.list_id,
            user_id: todo.user_id,
        })?)
    })
    .await?;

    Ok(Json(n))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ResourceId(id): ResourceId,
) -> Result<Json<usize>, ApiError> {
    let acting = claims.sub;
    let n = run_db(&state, move |st| {
        if owned_todo(&st.db, acting, id)?.is_none() {
            return Ok(0);
        }
        Ok(st.db.delete_todo_by_id(id)?)
    })
    .await?;

    Ok(Json(n))
}

/// The todo with `id` if `acting` owns it. Missing and foreign todos are
/// both `None`.
fn owned_todo(db: &Database, acting: i64, id: i64) -> Result<Option<TodoRow>, ApiError> {
    match db.get_todo_by_id(id) {
        Ok(row) if acl::can_access(acting, &row) => Ok(Some(row)),
        Ok(row) => {
            debug!("Todo {} is owned by {}, not {}", id, row.user_id, acting);
            Ok(None)
        }
        Err(DbError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// A todo may only be filed in a list its owner owns.
pub(crate) fn ensure_list_owned(db: &Database, acting: i64, list_id: i64) -> Result<(), ApiError> {
    let list = db.get_list_by_id(list_id).map_err(|e| match e {
        DbError::NotFound { .. } => ApiError::Validation(format!("list {} does not exist", list_id)),
        e => e.into(),
    })?;
    acl::authorize(acting, &list)
}

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".into()));
    }
    Ok(())
}
