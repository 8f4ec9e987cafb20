//! Service-level configuration: external backends, session signing and
//! upload limits.
//!
//! Built once at startup (see [`crate::cli`]) and shared read-only through
//! `Arc`. Adapters receive the section they need at construction time.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use dts_core::UploadLimits;
use rand::RngCore;

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o";
/// Session tokens are valid for seven days unless configured otherwise.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

// ---------------------------------------------------------------------------
// Secret
// ---------------------------------------------------------------------------

/// A credential that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// A random 256-bit secret, base64url-encoded.
    #[must_use]
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// OpenAI-compatible chat completion backend.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// `None` leaves the backend unconfigured; calls fail as internal errors.
    pub api_key: Option<Secret>,
    /// Base URL up to (not including) `/chat/completions`.
    pub base_url: String,
    pub model: String,
    /// Completion budget for translations.
    pub max_tokens: u32,
    /// Completion budget for summaries.
    pub summary_max_tokens: u32,
    pub temperature: f32,
    /// Per-call deadline; kept below the transport request timeout.
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2000,
            summary_max_tokens: 1000,
            temperature: 0.3,
            timeout: Duration::from_secs(25),
        }
    }
}

/// Google OAuth 2.0 client settings.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<Secret>,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    /// Where the callback redirects with `?token=...`.
    pub frontend_url: String,
    pub scopes: String,
    /// Deadline for each token and userinfo call.
    pub timeout: Duration,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: "http://localhost:3000/auth/google/callback".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
            frontend_url: "http://localhost:3000/".to_string(),
            scopes: "openid email profile".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Session token signing.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: Secret,
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: Secret::random(),
            ttl: DEFAULT_SESSION_TTL,
        }
    }
}

/// OCR engine invocation.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Path or name of the `tesseract` executable.
    pub tesseract_path: PathBuf,
    /// Tesseract language spec.
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: PathBuf::from("tesseract"),
            language: "kor+eng".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

/// Immutable configuration for every adapter and the validator.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub llm: LlmConfig,
    pub oauth: OAuthConfig,
    pub session: SessionConfig,
    pub upload: UploadLimits,
    pub ocr: OcrConfig,
}
