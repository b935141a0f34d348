use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::{self, AppState};
use crate::lists;
use crate::middleware::require_auth;
use crate::todos;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/auth/verify", get(auth::verify))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/user", delete(auth::delete_account))
        .route("/todos", get(todos::list_todos).post(todos::add_todo))
        .route(
            "/todos/{id}",
            get(todos::get_todo)
                .put(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .route("/lists", get(lists::list_lists).post(lists::add_list))
        .route(
            "/lists/{id}",
            get(lists::get_list)
                .put(lists::update_list)
                .delete(lists::delete_list),
        )
        .route("/lists/{id}/todos", get(lists::list_todos_in_list))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
