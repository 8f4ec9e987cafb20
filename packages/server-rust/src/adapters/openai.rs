//! OpenAI-compatible chat completion client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use super::{AdapterError, Backend, ChatCompletion, ChatRequest};
use crate::service::config::LlmConfig;

const BACKEND: Backend = Backend::LanguageModel;

/// Calls `POST {base_url}/chat/completions` with a bearer API key.
pub struct OpenAiClient {
    http: Client,
    config: LlmConfig,
}

impl OpenAiClient {
    #[must_use]
    pub fn new(config: LlmConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, AdapterError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(AdapterError::NotConfigured("OPENAI_API_KEY"))?;

        let payload = json!({
            "model": self.config.model,
            "messages": request.messages,
            "max_tokens": request.max_tokens,
            "temperature": self.config.temperature,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key.expose())
            .timeout(self.config.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AdapterError::transport(BACKEND, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let body: Value = response.json().await.map_err(|e| AdapterError::MalformedResponse {
            backend: BACKEND,
            detail: e.to_string(),
        })?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|content| content.trim().to_string())
            .ok_or_else(|| AdapterError::MalformedResponse {
                backend: BACKEND,
                detail: "missing choices[0].message.content".to_string(),
            })
    }
}

/// Tags a non-success HTTP status from the completion endpoint.
fn status_error(status: StatusCode, body: &str) -> AdapterError {
    let detail = error_message(body).unwrap_or_else(|| status.to_string());
    match status {
        StatusCode::TOO_MANY_REQUESTS => AdapterError::RateLimited { backend: BACKEND },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AdapterError::Unauthorized {
            backend: BACKEND,
            detail,
        },
        _ => AdapterError::Upstream {
            backend: BACKEND,
            status: Some(status.as_u16()),
            detail,
        },
    }
}

/// Pulls `error.message` out of an OpenAI error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value["error"]["message"].as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ChatMessage;
    use crate::service::config::Secret;

    fn client(base_url: String, api_key: Option<&str>) -> OpenAiClient {
        OpenAiClient::new(LlmConfig {
            api_key: api_key.map(Secret::new),
            base_url,
            ..LlmConfig::default()
        })
    }

    fn request() -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hello")],
            max_tokens: 50,
        }
    }

    #[tokio::test]
    async fn returns_trimmed_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"  안녕하세요 \n"}}]}"#)
            .create_async()
            .await;

        let text = client(server.url(), Some("sk-test"))
            .complete(request())
            .await
            .unwrap();
        assert_eq!(text, "안녕하세요");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":{"message":"Rate limit reached","code":"rate_limit_exceeded"}}"#)
            .create_async()
            .await;

        let err = client(server.url(), Some("k")).complete(request()).await.unwrap_err();
        assert!(matches!(err, AdapterError::RateLimited { backend: Backend::LanguageModel }));
    }

    #[tokio::test]
    async fn unauthorized_carries_provider_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#)
            .create_async()
            .await;

        let err = client(server.url(), Some("k")).complete(request()).await.unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Unauthorized { ref detail, .. } if detail == "Incorrect API key provided"
        ));
    }

    #[tokio::test]
    async fn server_error_is_upstream() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let err = client(server.url(), Some("k")).complete(request()).await.unwrap_err();
        assert!(matches!(err, AdapterError::Upstream { status: Some(503), .. }));
    }

    #[tokio::test]
    async fn missing_content_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = client(server.url(), Some("k")).complete(request()).await.unwrap_err();
        assert!(matches!(err, AdapterError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn missing_api_key_is_not_configured() {
        let err = client("http://127.0.0.1:9".to_string(), None)
            .complete(request())
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::NotConfigured("OPENAI_API_KEY")));
    }

    #[tokio::test]
    async fn stalled_backend_hits_the_call_deadline() {
        // Accepts connections and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        let client = OpenAiClient::new(LlmConfig {
            api_key: Some(Secret::new("k")),
            base_url: format!("http://{addr}"),
            timeout: std::time::Duration::from_millis(100),
            ..LlmConfig::default()
        });
        let err = client.complete(request()).await.unwrap_err();
        assert!(matches!(err, AdapterError::Upstream { status: None, .. }));
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let c = client("https://api.example.com/v1/".to_string(), None);
        assert_eq!(c.endpoint(), "https://api.example.com/v1/chat/completions");
    }
}
