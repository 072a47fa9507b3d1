//! Assignment API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::models::{Assignment, AssignmentCreate, SelfAssign};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::time::parse_date;
use crate::utils::validation::validate_id;

/// `?locationId=&date=`，date 缺省为当前营业日
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterQuery {
    pub location_id: i64,
    pub date: Option<String>,
}

/// GET /api/assignments - 某门店某班次的全部分配
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<RosterQuery>,
) -> AppResult<Json<Vec<Assignment>>> {
    validate_id(query.location_id, "locationId")?;
    let date = query.date.as_deref().map(parse_date).transpose()?;
    Ok(Json(state.floor.list_assignments(query.location_id, date)))
}

/// GET /api/assignments/mine - 当前员工的分配
pub async fn mine(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Query(query): Query<RosterQuery>,
) -> AppResult<Json<Vec<Assignment>>> {
    validate_id(query.location_id, "locationId")?;
    let date = query.date.as_deref().map(parse_date).transpose()?;
    Ok(Json(state.floor.list_for_staff(
        current_user.id,
        query.location_id,
        date,
    )))
}

/// POST /api/assignments - 经理手动分配
pub async fn grant(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<AssignmentCreate>,
) -> AppResult<(StatusCode, Json<Assignment>)> {
    validate_id(payload.staff_id, "staffId")?;
    validate_id(payload.location_id, "locationId")?;

    let assignment = state.floor.grant(&current_user.staff(), payload)?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// POST /api/assignments/self - 自助认领
pub async fn self_assign(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<SelfAssign>,
) -> AppResult<(StatusCode, Json<Assignment>)> {
    validate_id(payload.location_id, "locationId")?;

    let assignment = state.floor.self_assign(&current_user.staff(), payload)?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// DELETE /api/assignments/{id} - 撤销分配，返回被撤销的记录
pub async fn revoke(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Assignment>> {
    Ok(Json(state.floor.revoke(id, &current_user.staff())?))
}
