//! Table API 模块

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::ASSIGNMENTS_READ;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{location_id}/{table_id}/owner", get(handler::owner))
        .layer(middleware::from_fn(require_permission(ASSIGNMENTS_READ)))
}
