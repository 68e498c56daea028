use std::sync::Arc;

use crate::auth::IdentityVerifier;
use crate::config::{AppConfig, FilterConfig};
use crate::database::store::Store;

/// Shared per-process handles; cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub identity: IdentityVerifier,
    pub webhook_secret: Arc<str>,
    pub filter: FilterConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &AppConfig) -> Self {
        Self {
            store,
            identity: IdentityVerifier::new(config.security.identity_jwt_secret.clone()),
            webhook_secret: Arc::from(config.security.webhook_secret.as_str()),
            filter: config.filter.clone(),
        }
    }
}
