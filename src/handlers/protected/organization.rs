use axum::extract::{Path, State};
use serde_json::Value;

use crate::api::format::keys_to_camel;
use crate::error::ApiError;
use crate::database::models::entity::ORGANIZATIONS;
use crate::middleware::{check_organization_access, require_admin, ApiJson, ApiResponse, ApiResult, UserContext};
use crate::record::prepare_update;
use crate::state::AppState;

use super::entity::utils::parse_id;

/// GET /api/organizations/:id
pub async fn get(State(state): State<AppState>, ctx: UserContext, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    check_organization_access(&ctx, id)?;

    let row = state.store.select_by_id(&ORGANIZATIONS, None, id).await?;
    Ok(ApiResponse::success(Value::Object(keys_to_camel(row))))
}

/// PATCH /api/organizations/:id - admins of that organization only.
///
/// Every onboarded caller administers their own organization, so the admin
/// bypass of the read path does not extend to writes.
pub async fn patch(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    require_admin(&ctx)?;
    if ctx.organization_id != id {
        tracing::warn!("Admin {} denied update of organization {}", ctx.user_id, id);
        return Err(ApiError::forbidden("Admins may only update their own organization"));
    }

    let changes = prepare_update(&ORGANIZATIONS, body)?;
    let row = state.store.update(&ORGANIZATIONS, None, id, changes.into_row()).await?;
    Ok(ApiResponse::success(Value::Object(keys_to_camel(row))))
}
