use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::entity::{ID, USERS};
use crate::database::store::{Row, Store};
use crate::error::ApiError;
use crate::filter::FilterSpec;
use crate::record::{prepare_create, prepare_update};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";
const SIGNATURE_PREFIX: &str = "sha256=";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Webhook secret not configured")]
    MissingSecret,

    #[error("Missing webhook signature")]
    MissingSignature,

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::MalformedPayload(_) => ApiError::bad_request(err.to_string()),
            WebhookError::MissingSecret => {
                tracing::error!("Identity webhook received but no secret is configured");
                ApiError::unauthorized("Invalid webhook signature")
            }
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                tracing::warn!("Rejected identity webhook: {}", err);
                ApiError::unauthorized(err.to_string())
            }
        }
    }
}

/// `sha256=<hex>` signature of `body`
pub fn sign(secret: &str, body: &[u8]) -> Result<String, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::MissingSecret)?;
    mac.update(body);
    Ok(format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes())))
}

/// Constant-time check of the signature header against the raw body
pub fn verify_signature(secret: &str, body: &[u8], header: Option<&str>) -> Result<(), WebhookError> {
    if secret.is_empty() {
        return Err(WebhookError::MissingSecret);
    }
    let header = header.ok_or(WebhookError::MissingSignature)?;
    let expected = header
        .trim()
        .strip_prefix(SIGNATURE_PREFIX)
        .and_then(|h| hex::decode(h).ok())
        .ok_or(WebhookError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::MissingSecret)?;
    mac.update(body);
    mac.verify_slice(&expected).map_err(|_| WebhookError::InvalidSignature)
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    data: Value,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityUser {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IdentityEvent {
    UserCreated(IdentityUser),
    UserUpdated(IdentityUser),
    UserDeleted { id: String },
    Other(String),
}

impl IdentityEvent {
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        let raw: RawEvent = serde_json::from_slice(body)?;
        Ok(match raw.kind.as_str() {
            "user.created" => IdentityEvent::UserCreated(serde_json::from_value(raw.data)?),
            "user.updated" => IdentityEvent::UserUpdated(serde_json::from_value(raw.data)?),
            "user.deleted" => {
                #[derive(Deserialize)]
                struct Deleted {
                    id: String,
                }
                let deleted: Deleted = serde_json::from_value(raw.data)?;
                IdentityEvent::UserDeleted { id: deleted.id }
            }
            _ => IdentityEvent::Other(raw.kind),
        })
    }

    pub fn kind(&self) -> &str {
        match self {
            IdentityEvent::UserCreated(_) => "user.created",
            IdentityEvent::UserUpdated(_) => "user.updated",
            IdentityEvent::UserDeleted { .. } => "user.deleted",
            IdentityEvent::Other(kind) => kind,
        }
    }
}

async fn find_user(store: &dyn Store, external_id: &str) -> Result<Option<(Uuid, Row)>, ApiError> {
    let row = store.select_one(&USERS, None, &FilterSpec::eq("external_id", external_id)).await?;
    Ok(row.and_then(|row| {
        let id = row.get(ID).and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok())?;
        Some((id, row))
    }))
}

/// Profile fields from the provider; blank values are left out so they never clear stored data
fn profile(user: &IdentityUser) -> Value {
    json!({
        "externalId": user.id,
        "email": user.email,
        "firstName": user.first_name,
        "lastName": user.last_name,
    })
}

async fn upsert_user(store: &dyn Store, user: &IdentityUser) -> Result<Row, ApiError> {
    match find_user(store, &user.id).await? {
        Some((id, _)) => {
            let changes = prepare_update(&USERS, profile(user))?;
            Ok(store.update(&USERS, None, id, changes.into_row()).await?)
        }
        None => {
            let mut body = profile(user);
            body["isActive"] = json!(true);
            let row = prepare_create(&USERS, body, None)?;
            Ok(store.insert(&USERS, row.into_row()).await?)
        }
    }
}

/// Apply one identity-provider event. Returns whether the event type was handled.
pub async fn handle_event(store: &dyn Store, event: &IdentityEvent) -> Result<bool, ApiError> {
    match event {
        IdentityEvent::UserCreated(user) | IdentityEvent::UserUpdated(user) => {
            upsert_user(store, user).await?;
            tracing::info!("Synced user {} from {}", user.id, event.kind());
            Ok(true)
        }
        IdentityEvent::UserDeleted { id: external_id } => {
            if let Some((id, _)) = find_user(store, external_id).await? {
                let changes = prepare_update(&USERS, json!({ "isActive": false }))?;
                store.update(&USERS, None, id, changes.into_row()).await?;
                tracing::info!("Deactivated user {}", external_id);
            }
            Ok(true)
        }
        IdentityEvent::Other(kind) => {
            tracing::debug!("Ignoring identity event {}", kind);
            Ok(false)
        }
    }
}
