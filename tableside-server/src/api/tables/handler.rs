//! Table API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::TableOwner;

use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::time::parse_date;

#[derive(Debug, Default, Deserialize)]
pub struct OwnerQuery {
    pub date: Option<String>,
}

/// GET /api/tables/{locationId}/{tableId}/owner - 当前负责该桌的员工
///
/// 无人负责时 `owner` 为 null，从不返回 404。
pub async fn owner(
    State(state): State<ServerState>,
    Path((location_id, table_id)): Path<(i64, i64)>,
    Query(query): Query<OwnerQuery>,
) -> AppResult<Json<TableOwner>> {
    let date = query.date.as_deref().map(parse_date).transpose()?;
    Ok(Json(state.floor.resolve_owner(location_id, table_id, date)))
}
