use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bearer token claims issued by the identity provider. `sub` is the provider's user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, email: Option<String>, expiry_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: sub.into(),
            email,
            exp: (now + Duration::hours(expiry_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Verified caller identity; carries no organization or role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub external_id: String,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity secret not configured")]
    MissingSecret,

    #[error("Invalid identity token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Identity token has no subject")]
    MissingSubject,
}

/// Checks HS256 bearer tokens against the shared identity-provider secret
#[derive(Clone)]
pub struct IdentityVerifier {
    secret: String,
}

impl IdentityVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        if self.secret.is_empty() {
            return Err(IdentityError::MissingSecret);
        }
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let data = decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))?;

        if data.claims.sub.trim().is_empty() {
            return Err(IdentityError::MissingSubject);
        }
        Ok(Identity { external_id: data.claims.sub, email: data.claims.email })
    }

    /// Mint a token the way the identity provider would; used by the CLI and tests
    pub fn issue(&self, sub: &str, email: Option<String>, expiry_hours: i64) -> Result<String, IdentityError> {
        if self.secret.is_empty() {
            return Err(IdentityError::MissingSecret);
        }
        let claims = Claims::new(sub, email, expiry_hours);
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &key)?)
    }
}
