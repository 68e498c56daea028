// handlers/public/mod.rs - endpoints that need no bearer token
//
// The identity webhook authenticates by HMAC signature instead.
pub mod root;
pub mod webhook;

pub use root::{health, not_found, root};
pub use webhook::identity_webhook;
