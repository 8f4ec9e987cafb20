//! Google OAuth 2.0 authorization-code flow.

use async_trait::async_trait;
use dts_core::UserIdentity;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use super::{AdapterError, Backend, IdentityProvider};
use crate::service::config::{OAuthConfig, Secret};

const BACKEND: Backend = Backend::IdentityProvider;
const PROVIDER: &str = "google";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct GoogleProfile {
    id: String,
    email: String,
    #[serde(default)]
    name: String,
    picture: Option<String>,
}

impl From<GoogleProfile> for UserIdentity {
    fn from(p: GoogleProfile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            name: p.name,
            picture: p.picture,
            provider: PROVIDER.to_string(),
        }
    }
}

pub struct GoogleOAuth {
    http: Client,
    config: OAuthConfig,
}

impl GoogleOAuth {
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn credentials(&self) -> Result<(&str, &Secret), AdapterError> {
        let id = self
            .config
            .client_id
            .as_deref()
            .ok_or(AdapterError::NotConfigured("GOOGLE_CLIENT_ID"))?;
        let secret = self
            .config
            .client_secret
            .as_ref()
            .ok_or(AdapterError::NotConfigured("GOOGLE_CLIENT_SECRET"))?;
        Ok((id, secret))
    }

    async fn access_token(&self, code: &str) -> Result<String, AdapterError> {
        let (client_id, client_secret) = self.credentials()?;
        let form = [
            ("client_id", client_id),
            ("client_secret", client_secret.expose()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        let response = self
            .http
            .post(&self.config.token_url)
            .timeout(self.config.timeout)
            .form(&form)
            .send()
            .await
            .map_err(|e| AdapterError::transport(BACKEND, &e))?;
        let token: TokenResponse = read_json(response, "token exchange").await?;
        token.access_token.ok_or_else(|| AdapterError::MalformedResponse {
            backend: BACKEND,
            detail: "token response has no access_token".to_string(),
        })
    }
}

/// Decodes a 2xx JSON body; any other status is an upstream failure.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    step: &str,
) -> Result<T, AdapterError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(match status {
            StatusCode::TOO_MANY_REQUESTS => AdapterError::RateLimited { backend: BACKEND },
            _ => AdapterError::Upstream {
                backend: BACKEND,
                status: Some(status.as_u16()),
                detail: format!("{step}: {}", body.trim()),
            },
        });
    }
    response.json().await.map_err(|e| AdapterError::MalformedResponse {
        backend: BACKEND,
        detail: format!("{step}: {e}"),
    })
}

#[async_trait]
impl IdentityProvider for GoogleOAuth {
    fn authorization_url(&self, state: &str) -> Result<String, AdapterError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or(AdapterError::NotConfigured("GOOGLE_CLIENT_ID"))?;
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", client_id),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", self.config.scopes.as_str()),
                ("response_type", "code"),
                ("state", state),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| AdapterError::Upstream {
            backend: BACKEND,
            status: None,
            detail: format!("invalid authorization endpoint: {e}"),
        })?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<UserIdentity, AdapterError> {
        let access_token = self.access_token(code).await?;
        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| AdapterError::transport(BACKEND, &e))?;
        let profile: GoogleProfile = read_json(response, "userinfo").await?;
        Ok(profile.into())
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn config(base: &str) -> OAuthConfig {
        OAuthConfig {
            client_id: Some("cid".to_string()),
            client_secret: Some(Secret::new("csecret")),
            redirect_uri: "http://localhost:3000/auth/google/callback".to_string(),
            token_url: format!("{base}/token"),
            userinfo_url: format!("{base}/userinfo"),
            ..OAuthConfig::default()
        }
    }

    #[test]
    fn authorization_url_carries_all_parameters() {
        let oauth = GoogleOAuth::new(config("http://unused"));
        let url = Url::parse(&oauth.authorization_url("st@te").unwrap()).unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "cid");
        assert_eq!(params["scope"], "openid email profile");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["state"], "st@te");
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
        assert_eq!(
            params["redirect_uri"],
            "http://localhost:3000/auth/google/callback"
        );
    }

    #[test]
    fn missing_client_id_is_not_configured() {
        let oauth = GoogleOAuth::new(OAuthConfig::default());
        assert!(matches!(
            oauth.authorization_url("s"),
            Err(AdapterError::NotConfigured("GOOGLE_CLIENT_ID"))
        ));
    }

    #[tokio::test]
    async fn exchange_code_fetches_profile() {
        let mut server = mockito::Server::new_async().await;
        let token = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "abc".into()),
                Matcher::UrlEncoded("client_secret".into(), "csecret".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"at-1","token_type":"Bearer","expires_in":3599}"#)
            .create_async()
            .await;
        let userinfo = server
            .mock("GET", "/userinfo")
            .match_header("authorization", "Bearer at-1")
            .with_status(200)
            .with_body(r#"{"id":"42","email":"a@b.c","name":"Ada","picture":"http://p/1.png"}"#)
            .create_async()
            .await;

        let identity = GoogleOAuth::new(config(&server.url()))
            .exchange_code("abc")
            .await
            .unwrap();
        assert_eq!(identity.id, "42");
        assert_eq!(identity.email, "a@b.c");
        assert_eq!(identity.name, "Ada");
        assert_eq!(identity.picture.as_deref(), Some("http://p/1.png"));
        assert_eq!(identity.provider, "google");
        token.assert_async().await;
        userinfo.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_code_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let err = GoogleOAuth::new(config(&server.url()))
            .exchange_code("bad")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Upstream { backend: Backend::IdentityProvider, status: Some(400), .. }
        ));
    }

    #[tokio::test]
    async fn token_without_access_token_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"id_token":"x"}"#)
            .create_async()
            .await;

        let err = GoogleOAuth::new(config(&server.url()))
            .exchange_code("abc")
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::MalformedResponse { .. }));
    }
}
