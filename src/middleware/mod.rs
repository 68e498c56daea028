pub mod auth;
pub mod json;
pub mod response;
pub mod user_context;

pub use auth::identity_middleware;
pub use json::ApiJson;
pub use response::{create_error_response, create_success_response, ApiResponse, ApiResult, Envelope};
pub use user_context::{
    check_organization_access, require_admin, resolve_user_context, ContextResolution, OrganizationRole, UserContext,
};
