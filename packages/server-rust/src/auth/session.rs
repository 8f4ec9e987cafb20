//! HS256 session tokens binding a [`UserIdentity`].

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dts_core::UserIdentity;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::service::config::SessionConfig;

/// Why a presented session token was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session token has expired")]
    Expired,
    #[error("session token is invalid: {0}")]
    Invalid(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: String,
    email: String,
    name: String,
    picture: Option<String>,
    provider: String,
    iat: u64,
    exp: u64,
}

/// Issues and verifies session tokens with a shared HMAC secret.
pub struct SessionSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionSigner {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        let secret = config.secret.expose().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: config.ttl,
        }
    }

    /// Signs a token for `identity`, valid from now for the configured TTL.
    ///
    /// # Errors
    ///
    /// Fails only if the claims cannot be serialized.
    pub fn issue(&self, identity: &UserIdentity) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(identity, unix_now())
    }

    /// Signs a token as if issued at `iat` (seconds since the epoch).
    ///
    /// # Errors
    ///
    /// Fails only if the claims cannot be serialized.
    pub fn issue_at(
        &self,
        identity: &UserIdentity,
        iat: u64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            id: identity.id.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            picture: identity.picture.clone(),
            provider: identity.provider.clone(),
            iat,
            exp: iat + self.ttl.as_secs(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Checks signature and expiry and returns the bound identity.
    ///
    /// # Errors
    ///
    /// [`SessionError::Expired`] past `exp`, [`SessionError::Invalid`] for
    /// anything malformed, tampered with, or signed with another key.
    pub fn verify(&self, token: &str) -> Result<UserIdentity, SessionError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Invalid(e.to_string()),
            }
        })?;
        let c = data.claims;
        Ok(UserIdentity {
            id: c.id,
            email: c.email,
            name: c.name,
            picture: c.picture,
            provider: c.provider,
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
