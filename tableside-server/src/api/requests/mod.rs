//! Service Request API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::{REQUESTS_ACT, REQUESTS_CREATE, REQUESTS_READ};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/requests", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/history", get(handler::history))
        .layer(middleware::from_fn(require_permission(REQUESTS_READ)));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_permission(REQUESTS_CREATE)));

    let act_routes = Router::new()
        .route("/action", post(handler::action))
        .layer(middleware::from_fn(require_permission(REQUESTS_ACT)));

    read_routes.merge(create_routes).merge(act_routes)
}
