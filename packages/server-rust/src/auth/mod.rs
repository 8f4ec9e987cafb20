//! Google login and session tokens.
//!
//! The OAuth handshake is delegated to an [`IdentityProvider`]; this module
//! owns the anti-forgery `state`, the redirect back to the frontend and the
//! signed session token handed to it.

pub mod session;

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use dts_core::{UserIdentity, ValidationError};
use rand::RngCore;
use reqwest::Url;
use subtle::ConstantTimeEq;
use tracing::info;

pub use session::{SessionError, SessionSigner};

use crate::adapters::{AdapterError, Backend, GoogleOAuth, IdentityProvider};
use crate::service::error::DispatchError;
use crate::service::ServiceConfig;

/// Fresh OAuth `state`: 32 random bytes, base64url without padding.
#[must_use]
pub fn new_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Constant-time comparison of the returned `state` with the stored one.
#[must_use]
pub fn state_matches(expected: &str, presented: &str) -> bool {
    expected.len() == presented.len() && bool::from(expected.as_bytes().ct_eq(presented.as_bytes()))
}

/// Where to send the browser to start a login, and the state to remember.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub url: String,
    pub state: String,
}

/// Login flow over an identity provider and a session signer.
pub struct Authenticator {
    provider: Arc<dyn IdentityProvider>,
    signer: SessionSigner,
    frontend_url: String,
}

impl Authenticator {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        signer: SessionSigner,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            signer,
            frontend_url: frontend_url.into(),
        }
    }

    /// Google as the provider, sessions signed with the configured secret.
    #[must_use]
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            Arc::new(GoogleOAuth::new(config.oauth.clone())),
            SessionSigner::new(&config.session),
            config.oauth.frontend_url.clone(),
        )
    }

    /// Starts a login.
    ///
    /// # Errors
    ///
    /// Fails when the provider is not configured.
    pub fn begin(&self) -> Result<LoginRedirect, DispatchError> {
        let state = new_state();
        let url = self.provider.authorization_url(&state)?;
        Ok(LoginRedirect { url, state })
    }

    /// Completes a login and returns the frontend URL carrying the session token.
    ///
    /// `expected_state` is the value stored when the login began. The presented
    /// `state` must match it, and a login with no stored state is refused.
    ///
    /// # Errors
    ///
    /// `ValidationError` without a code. An identity-provider error when the
    /// stored state is missing or differs, or when the exchange fails.
    pub async fn complete(
        &self,
        code: Option<&str>,
        state: Option<&str>,
        expected_state: Option<&str>,
    ) -> Result<String, DispatchError> {
        let code = code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ValidationError::missing_field("code"))?;

        let Some(expected) = expected_state else {
            return Err(AdapterError::Unauthorized {
                backend: Backend::IdentityProvider,
                detail: "missing OAuth state cookie".to_string(),
            }
            .into());
        };
        if !state.is_some_and(|s| state_matches(expected, s)) {
            return Err(AdapterError::Unauthorized {
                backend: Backend::IdentityProvider,
                detail: "OAuth state mismatch".to_string(),
            }
            .into());
        }

        let identity = self.provider.exchange_code(code).await?;
        let token = self
            .signer
            .issue(&identity)
            .map_err(|e| anyhow::anyhow!("failed to sign session token: {e}"))?;
        info!(user = %identity.email, provider = %identity.provider, "login completed");
        self.frontend_redirect(&token)
    }

    fn frontend_redirect(&self, token: &str) -> Result<String, DispatchError> {
        let url = Url::parse_with_params(&self.frontend_url, &[("token", token)])
            .map_err(|e| anyhow::anyhow!("invalid frontend URL {}: {e}", self.frontend_url))?;
        Ok(url.into())
    }

    /// Verifies a session token.
    ///
    /// # Errors
    ///
    /// `SessionError::Expired` or `SessionError::Invalid`.
    pub fn verify(&self, token: &str) -> Result<UserIdentity, SessionError> {
        self.signer.verify(token)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use async_trait::async_trait;
    use dts_core::ErrorKind;
    use proptest::prelude::*;

    use super::*;
    use crate::service::config::{Secret, SessionConfig};
    use crate::service::error::classify;

    /// Identity provider that accepts the code `"good"` only.
    pub(crate) struct FakeProvider;

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        fn authorization_url(&self, state: &str) -> Result<String, AdapterError> {
            Ok(format!("https://idp.test/auth?state={state}"))
        }

        async fn exchange_code(&self, code: &str) -> Result<UserIdentity, AdapterError> {
            if code == "good" {
                Ok(UserIdentity {
                    id: "1".into(),
                    email: "u@test".into(),
                    name: "U".into(),
                    picture: None,
                    provider: "google".into(),
                })
            } else {
                Err(AdapterError::Upstream {
                    backend: Backend::IdentityProvider,
                    status: Some(400),
                    detail: "invalid_grant".into(),
                })
            }
        }
    }

    pub(crate) fn authenticator() -> Authenticator {
        let signer = SessionSigner::new(&SessionConfig {
            secret: Secret::new("test-secret"),
            ..SessionConfig::default()
        });
        Authenticator::new(Arc::new(FakeProvider), signer, "http://localhost:3000/")
    }

    #[test]
    fn state_is_43_url_safe_chars() {
        let state = new_state();
        assert_eq!(state.len(), 43);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(state, new_state());
    }

    #[test]
    fn state_comparison() {
        assert!(state_matches("abc", "abc"));
        assert!(!state_matches("abc", "abd"));
        assert!(!state_matches("abc", "abcd"));
    }

    #[tokio::test]
    async fn full_login_round_trip() {
        let auth = authenticator();
        let start = auth.begin().unwrap();
        assert!(start.url.ends_with(&start.state));

        let redirect = auth
            .complete(Some("good"), Some(&start.state), Some(&start.state))
            .await
            .unwrap();
        let url = Url::parse(&redirect).unwrap();
        assert_eq!(url.path(), "/");
        let token = url
            .query_pairs()
            .find(|(k, _)| k == "token")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(auth.verify(&token).unwrap().email, "u@test");
    }

    #[tokio::test]
    async fn missing_code_is_validation_error() {
        let err = authenticator().complete(None, None, None).await.unwrap_err();
        assert_eq!(classify(&err).error_kind, ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn state_mismatch_is_auth_error() {
        let err = authenticator()
            .complete(Some("good"), Some("forged"), Some("expected"))
            .await
            .unwrap_err();
        let resp = classify(&err);
        assert_eq!(resp.error_kind, ErrorKind::AuthError);
        assert_eq!(resp.status_code, 401);
    }

    #[tokio::test]
    async fn missing_stored_state_is_auth_error() {
        let err = authenticator()
            .complete(Some("good"), Some("anything"), None)
            .await
            .unwrap_err();
        let resp = classify(&err);
        assert_eq!(resp.error_kind, ErrorKind::AuthError);
        assert_eq!(resp.status_code, 401);

        let err = authenticator()
            .complete(Some("good"), None, None)
            .await
            .unwrap_err();
        assert_eq!(classify(&err).error_kind, ErrorKind::AuthError);
    }

    #[tokio::test]
    async fn rejected_code_is_auth_error() {
        let err = authenticator()
            .complete(Some("bad"), Some("s"), Some("s"))
            .await
            .unwrap_err();
        assert_eq!(classify(&err).error_kind, ErrorKind::AuthError);
    }

    proptest! {
        #[test]
        fn state_matches_only_identical_strings(a in "[A-Za-z0-9_-]{0,48}", b in "[A-Za-z0-9_-]{0,48}") {
            prop_assert_eq!(state_matches(&a, &b), a == b);
            prop_assert!(state_matches(&a, &a));
        }
    }
}
