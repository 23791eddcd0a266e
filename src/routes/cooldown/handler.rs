use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState,
    cooldown::is_cooled_down,
    error::CooldownResult,
    utils::{ApiResponse, format_duration, success_to_api_response},
};

use super::model::{
    BackupResponse, CheckCooldownQuery, CheckCooldownResponse, CooldownStatusResponse,
    DelCooldownRequest, GetCooldownQuery, RemovedResponse, SetCooldownRequest,
    SetCooldownResponse,
};

type ApiResult<T> = CooldownResult<Json<ApiResponse<T>>>;

#[axum::debug_handler]
pub async fn set_cooldown(
    State(state): State<AppState>,
    Json(req): Json<SetCooldownRequest>,
) -> ApiResult<SetCooldownResponse> {
    let scope = req.scope()?;
    state.registry.set(&req.token, req.duration, scope);

    Ok(success_to_api_response(SetCooldownResponse {
        token: req.token,
        duration: req.duration,
    }))
}

#[axum::debug_handler]
pub async fn get_cooldown(
    State(state): State<AppState>,
    Query(query): Query<GetCooldownQuery>,
) -> ApiResult<CooldownStatusResponse> {
    let scope = query.scope()?;
    let preset = query.preset()?;
    let status = state.registry.get(&query.token, scope, query.ignore_priority);

    Ok(success_to_api_response(CooldownStatusResponse {
        status: status.status,
        remaining: status.remaining,
        remaining_text: format_duration(status.remaining, preset),
    }))
}

#[axum::debug_handler]
pub async fn del_cooldown(
    State(state): State<AppState>,
    Json(req): Json<DelCooldownRequest>,
) -> ApiResult<RemovedResponse> {
    let scope = req.scope()?;
    let removed = state.registry.del(&req.token, scope);

    Ok(success_to_api_response(RemovedResponse {
        removed: usize::from(removed),
    }))
}

#[axum::debug_handler]
pub async fn check_cooldown(
    State(state): State<AppState>,
    Query(query): Query<CheckCooldownQuery>,
) -> ApiResult<CheckCooldownResponse> {
    let scope = query.scope()?;
    let rule = is_cooled_down(&state.registry, query.token, scope)
        .ignore_priority(query.ignore_priority);

    Ok(success_to_api_response(CheckCooldownResponse {
        cooled_down: rule.check(),
    }))
}

#[axum::debug_handler]
pub async fn sweep_expired(State(state): State<AppState>) -> ApiResult<RemovedResponse> {
    let removed = state.registry.remove_expired();
    Ok(success_to_api_response(RemovedResponse { removed }))
}

#[axum::debug_handler]
pub async fn backup_now(State(state): State<AppState>) -> ApiResult<BackupResponse> {
    state.store.backup(&state.registry).await?;

    Ok(success_to_api_response(BackupResponse {
        path: state.store.path().display().to_string(),
    }))
}
