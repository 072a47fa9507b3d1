//! Assignment API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::permissions::{ASSIGNMENTS_MANAGE, ASSIGNMENTS_READ, ASSIGNMENTS_SELF};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/assignments", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/mine", get(handler::mine))
        .layer(middleware::from_fn(require_permission(ASSIGNMENTS_READ)));

    let self_routes = Router::new()
        .route("/self", post(handler::self_assign))
        .layer(middleware::from_fn(require_permission(ASSIGNMENTS_SELF)));

    let manage_routes = Router::new()
        .route("/", post(handler::grant))
        .route("/{id}", delete(handler::revoke))
        .layer(middleware::from_fn(require_permission(ASSIGNMENTS_MANAGE)));

    read_routes.merge(self_routes).merge(manage_routes)
}
