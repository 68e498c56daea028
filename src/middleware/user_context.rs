use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::Identity;
use crate::database::models::entity::{ID, ORGANIZATION_ID, USERS};
use crate::database::store::{Row, Scope, Store};
use crate::error::ApiError;
use crate::filter::FilterSpec;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationRole {
    Admin,
    Employee,
}

impl OrganizationRole {
    /// Unknown role strings get the least privilege
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("admin") => OrganizationRole::Admin,
            _ => OrganizationRole::Employee,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationRole::Admin => "admin",
            OrganizationRole::Employee => "employee",
        }
    }
}

/// Who is calling, on behalf of which organization. Built fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub organization_role: OrganizationRole,
    pub is_active: bool,
}

impl UserContext {
    pub fn is_admin(&self) -> bool {
        self.organization_role == OrganizationRole::Admin
    }

    pub fn scope(&self) -> Scope {
        Scope::new(self.organization_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContextResolution {
    /// No verified identity on the request
    Unauthenticated,
    /// Verified identity without a user record or organization yet
    Unonboarded { identity: Identity },
    Resolved(UserContext),
}

fn uuid_field(row: &Row, column: &str) -> Option<Uuid> {
    row.get(column).and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok())
}

/// Map a verified identity to its persisted user. Inactive users fail with 403.
pub async fn resolve_user_context(store: &dyn Store, identity: Option<&Identity>) -> Result<ContextResolution, ApiError> {
    let Some(identity) = identity else {
        return Ok(ContextResolution::Unauthenticated);
    };

    let lookup = FilterSpec::eq("external_id", identity.external_id.as_str());
    let Some(row) = store.select_one(&USERS, None, &lookup).await? else {
        tracing::debug!("No user record for identity {}", identity.external_id);
        return Ok(ContextResolution::Unonboarded { identity: identity.clone() });
    };

    // Column defaults to true; only an explicit false deactivates
    let is_active = row.get("is_active").and_then(Value::as_bool).unwrap_or(true);
    if !is_active {
        tracing::warn!("Inactive user {} rejected", identity.external_id);
        return Err(ApiError::forbidden("User account is inactive"));
    }

    let Some(organization_id) = uuid_field(&row, ORGANIZATION_ID) else {
        return Ok(ContextResolution::Unonboarded { identity: identity.clone() });
    };
    let user_id = uuid_field(&row, ID).ok_or_else(|| {
        tracing::error!("User record for {} has no valid id", identity.external_id);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    let ctx = UserContext {
        user_id,
        organization_id,
        organization_role: OrganizationRole::parse(row.get("role").and_then(Value::as_str)),
        is_active,
    };
    tracing::debug!("Resolved user {} as {} of {}", ctx.user_id, ctx.organization_role.as_str(), ctx.organization_id);
    Ok(ContextResolution::Resolved(ctx))
}

/// Employees may only touch their own organization; admins are not restricted
pub fn check_organization_access(ctx: &UserContext, organization_id: Uuid) -> Result<(), ApiError> {
    if ctx.organization_id == organization_id || ctx.is_admin() {
        Ok(())
    } else {
        tracing::warn!("User {} denied access to organization {}", ctx.user_id, organization_id);
        Err(ApiError::forbidden("Access denied to this organization"))
    }
}

pub fn require_admin(ctx: &UserContext) -> Result<(), ApiError> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Admin role required"))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ContextResolution {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = parts.extensions.get::<Identity>().cloned();
        resolve_user_context(state.store.as_ref(), identity.as_ref()).await
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match ContextResolution::from_request_parts(parts, state).await? {
            ContextResolution::Resolved(ctx) => Ok(ctx),
            ContextResolution::Unonboarded { .. } => Err(ApiError::forbidden("Onboarding required")),
            ContextResolution::Unauthenticated => Err(ApiError::unauthorized("Authentication required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use axum::http::StatusCode;
    use serde_json::json;

    fn ctx(org: Uuid, role: OrganizationRole) -> UserContext {
        UserContext { user_id: Uuid::new_v4(), organization_id: org, organization_role: role, is_active: true }
    }

    fn identity(sub: &str) -> Identity {
        Identity { external_id: sub.to_string(), email: None }
    }

    async fn store_with_user(fields: Value) -> MemoryStore {
        let store = MemoryStore::new();
        let mut row = fields.as_object().cloned().unwrap();
        row.insert(ID.into(), json!(Uuid::new_v4().to_string()));
        store.insert(&USERS, row).await.unwrap();
        store
    }

    #[test]
    fn employee_of_other_org_is_forbidden() {
        let seven = Uuid::new_v4();
        let forty_two = Uuid::new_v4();

        let err = check_organization_access(&ctx(seven, OrganizationRole::Employee), forty_two).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert!(check_organization_access(&ctx(seven, OrganizationRole::Admin), forty_two).is_ok());
        assert!(check_organization_access(&ctx(seven, OrganizationRole::Employee), seven).is_ok());
    }

    #[test]
    fn admin_gate() {
        let org = Uuid::new_v4();
        assert!(require_admin(&ctx(org, OrganizationRole::Admin)).is_ok());
        assert!(require_admin(&ctx(org, OrganizationRole::Employee)).is_err());
    }

    #[test]
    fn unknown_roles_are_employees() {
        assert_eq!(OrganizationRole::parse(Some("owner")), OrganizationRole::Employee);
        assert_eq!(OrganizationRole::parse(None), OrganizationRole::Employee);
        assert_eq!(OrganizationRole::parse(Some("admin")), OrganizationRole::Admin);
    }

    #[tokio::test]
    async fn missing_identity_is_unauthenticated() {
        let store = MemoryStore::new();
        assert_eq!(resolve_user_context(&store, None).await.unwrap(), ContextResolution::Unauthenticated);
    }

    #[tokio::test]
    async fn unknown_identity_needs_onboarding() {
        let store = MemoryStore::new();
        let id = identity("user_new");
        assert_eq!(
            resolve_user_context(&store, Some(&id)).await.unwrap(),
            ContextResolution::Unonboarded { identity: id.clone() }
        );
    }

    #[tokio::test]
    async fn user_without_organization_needs_onboarding() {
        let store = store_with_user(json!({ "external_id": "user_1" })).await;
        assert!(matches!(
            resolve_user_context(&store, Some(&identity("user_1"))).await.unwrap(),
            ContextResolution::Unonboarded { .. }
        ));
    }

    #[tokio::test]
    async fn active_user_resolves() {
        let org = Uuid::new_v4();
        let store = store_with_user(json!({
            "external_id": "user_1",
            "organization_id": org.to_string(),
            "role": "admin",
            "is_active": true
        }))
        .await;

        match resolve_user_context(&store, Some(&identity("user_1"))).await.unwrap() {
            ContextResolution::Resolved(ctx) => {
                assert_eq!(ctx.organization_id, org);
                assert!(ctx.is_admin());
                assert!(ctx.is_active);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn inactive_user_fails_closed() {
        let store = store_with_user(json!({
            "external_id": "user_1",
            "organization_id": Uuid::new_v4().to_string(),
            "is_active": false
        }))
        .await;
        let err = resolve_user_context(&store, Some(&identity("user_1"))).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
