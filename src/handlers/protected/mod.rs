// handlers/protected/mod.rs - endpoints behind the identity middleware
//
// Every handler here receives a verified Identity in request extensions and
// resolves the caller's organization and role through the UserContext extractor.
pub mod entity;
pub mod me;
pub mod onboarding;
pub mod organization;

pub use me::me;
pub use onboarding::onboarding;
pub use organization::{get as organization_get, patch as organization_patch};
