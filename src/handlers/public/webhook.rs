use axum::{body::Bytes, extract::State, http::HeaderMap};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::webhook_service::{handle_event, verify_signature, IdentityEvent, SIGNATURE_HEADER};
use crate::state::AppState;

/// POST /webhooks/identity - user lifecycle events from the identity provider.
/// The signature covers the raw body, so it is checked before parsing.
pub async fn identity_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult<Value> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    verify_signature(&state.webhook_secret, &body, signature)?;

    let event = IdentityEvent::parse(&body)?;
    let handled = handle_event(state.store.as_ref(), &event).await?;

    Ok(ApiResponse::success(json!({
        "received": true,
        "handled": handled,
        "type": event.kind(),
    })))
}
