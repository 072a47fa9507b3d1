//! Service Request API Handlers

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use shared::models::{AuditEntry, RequestFilter, RequestStatus, ServiceRequest, ServiceRequestCreate};
use shared::{ActionOutcome, ActionPayload, ErrorKind};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::floor::Performed;
use crate::utils::AppResult;
use crate::utils::validation::{MAX_NOTE_LEN, validate_id, validate_optional_text};

/// Query params for listing requests
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<RequestStatus>,
    pub only_staff_id: Option<i64>,
    /// 只看自己: 等价于 `onlyStaffId = 当前员工`
    #[serde(default)]
    pub only_mine: bool,
}

/// GET /api/requests - 按创建时间排序 (最早在前)
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ServiceRequest>>> {
    let filter = RequestFilter {
        status: query.status,
        only_staff_id: if query.only_mine {
            Some(current_user.id)
        } else {
            query.only_staff_id
        },
    };
    Ok(Json(state.floor.list_requests(&filter)))
}

/// GET /api/requests/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ServiceRequest>> {
    Ok(Json(state.floor.get_request(id)?))
}

/// GET /api/requests/{id}/history - 审计记录
pub async fn history(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<AuditEntry>>> {
    Ok(Json(state.floor.request_history(id)?))
}

/// POST /api/requests - 客人端渠道创建请求
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ServiceRequestCreate>,
) -> AppResult<(StatusCode, Json<ServiceRequest>)> {
    validate_id(payload.location_id, "locationId")?;
    validate_id(payload.table_id, "tableId")?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let request = state.floor.create_request(payload)?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// POST /api/requests/action - 接单 / 完成 / 取消
///
/// 业务失败编码为 `{ success: false, error, message }`，接管确认为
/// `{ needsConfirmation: true, ... }` (200，无任何写入)。
/// 请求体无法解析时同样返回失败信封 (`validation`)。
pub async fn action(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    payload: Result<Json<ActionPayload>, JsonRejection>,
) -> (StatusCode, Json<ActionOutcome>) {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Malformed action body");
            let kind = ErrorKind::Validation;
            return (
                kind.http_status(),
                Json(ActionOutcome::failure(kind, rejection.body_text())),
            );
        }
    };
    let actor = current_user.staff();
    match state.floor.perform(&actor, &payload) {
        Ok(Performed::Done(request)) => (StatusCode::OK, Json(ActionOutcome::success(request))),
        Ok(Performed::NeedsConfirmation(prompt)) => {
            (StatusCode::OK, Json(ActionOutcome::NeedsConfirmation(prompt)))
        }
        Err(e) => {
            let kind = e.kind();
            let message = if kind == ErrorKind::Internal {
                tracing::error!(
                    request_id = payload.request_id,
                    action = payload.action.as_str(),
                    error = %e,
                    "Request action failed"
                );
                "Internal server error".to_string()
            } else {
                tracing::debug!(
                    request_id = payload.request_id,
                    staff_id = actor.staff_id,
                    action = payload.action.as_str(),
                    error = %kind,
                    "Request action rejected"
                );
                e.to_string()
            };
            (kind.http_status(), Json(ActionOutcome::failure(kind, message)))
        }
    }
}
