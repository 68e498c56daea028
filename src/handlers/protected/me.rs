use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ContextResolution};

/// GET /api/me - the caller's resolved context, or `needsOnboarding` when there is none yet
pub async fn me(resolution: ContextResolution) -> ApiResult<Value> {
    match resolution {
        ContextResolution::Resolved(ctx) => {
            let mut data = json!(ctx);
            data["needsOnboarding"] = json!(false);
            Ok(ApiResponse::success(data))
        }
        ContextResolution::Unonboarded { .. } => Ok(ApiResponse::success(json!({ "needsOnboarding": true }))),
        ContextResolution::Unauthenticated => Err(ApiError::unauthorized("Authentication required")),
    }
}
