use serde::Serialize;
use serde_json::{json, Value};

use crate::api::format::keys_to_camel;
use crate::auth::Identity;
use crate::database::models::entity::{ID, ORGANIZATIONS, USERS};
use crate::database::store::{Row, Store};
use crate::error::ApiError;
use crate::filter::FilterSpec;
use crate::middleware::user_context::OrganizationRole;
use crate::record::{prepare_create, prepare_update};

#[derive(Debug, Serialize)]
pub struct Onboarded {
    pub organization: Value,
    pub user: Value,
}

/// Create an organization and link the caller to it as admin.
///
/// Two single-statement writes with no transaction: if linking the user fails
/// the organization row remains.
pub async fn onboard(store: &dyn Store, identity: &Identity, body: Value) -> Result<Onboarded, ApiError> {
    let organization_body = body
        .get("organization")
        .cloned()
        .ok_or_else(|| ApiError::bad_request("Missing organization"))?;
    let organization = prepare_create(&ORGANIZATIONS, organization_body, None)?;
    let organization_id = organization
        .get(ID)
        .cloned()
        .ok_or_else(|| ApiError::internal_server_error("An error occurred while processing your request"))?;
    let organization = store.insert(&ORGANIZATIONS, organization.into_row()).await?;
    tracing::info!("Created organization {} for {}", organization_id, identity.external_id);

    let mut link = json!({
        "organizationId": organization_id,
        "role": OrganizationRole::Admin.as_str(),
        "isActive": true,
    });
    if let Some(profile) = body.get("user").and_then(Value::as_object) {
        for key in ["firstName", "lastName"] {
            if let Some(value) = profile.get(key) {
                link[key] = value.clone();
            }
        }
    }

    let existing = store
        .select_one(&USERS, None, &FilterSpec::eq("external_id", identity.external_id.as_str()))
        .await?;
    let user: Row = match existing.as_ref().and_then(|row| row.get(ID)).and_then(Value::as_str) {
        Some(id) => {
            let id = uuid::Uuid::parse_str(id)
                .map_err(|_| ApiError::internal_server_error("An error occurred while processing your request"))?;
            store.update(&USERS, None, id, prepare_update(&USERS, link)?.into_row()).await?
        }
        None => {
            link["externalId"] = json!(identity.external_id);
            link["email"] = json!(identity.email);
            store.insert(&USERS, prepare_create(&USERS, link, None)?.into_row()).await?
        }
    };

    Ok(Onboarded {
        organization: Value::Object(keys_to_camel(organization)),
        user: Value::Object(keys_to_camel(user)),
    })
}
