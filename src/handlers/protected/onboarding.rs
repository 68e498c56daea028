use axum::extract::State;
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, ContextResolution};
use crate::services::onboarding_service::{onboard, Onboarded};
use crate::state::AppState;

/// POST /api/onboarding - create the caller's organization and make them its admin
///
/// Body: `{ "organization": { "name": ... }, "user": { "firstName": ..., "lastName": ... } }`
pub async fn onboarding(
    State(state): State<AppState>,
    resolution: ContextResolution,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Onboarded> {
    match resolution {
        ContextResolution::Unonboarded { identity } => {
            let onboarded = onboard(state.store.as_ref(), &identity, body).await?;
            Ok(ApiResponse::created(onboarded))
        }
        ContextResolution::Resolved(_) => Err(ApiError::conflict("User is already onboarded")),
        ContextResolution::Unauthenticated => Err(ApiError::unauthorized("Authentication required")),
    }
}
