//! Error taxonomy shared by every endpoint.
//!
//! Each [`ErrorKind`] carries a fixed HTTP status code. Failures are mapped to
//! a kind by the server's classifier; this module only defines the vocabulary
//! and the serialized [`ErrorResponse`] shape.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Stable error categories reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    RateLimitError,
    AuthError,
    AiServiceError,
    FileProcessingError,
    InternalError,
    TokenExpired,
    TokenInvalid,
}

impl ErrorKind {
    /// HTTP status code bound to this kind.
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            Self::ValidationError | Self::FileProcessingError => 400,
            Self::AuthError | Self::TokenExpired | Self::TokenInvalid => 401,
            Self::RateLimitError => 429,
            Self::AiServiceError | Self::InternalError => 500,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::RateLimitError => "rate_limit_error",
            Self::AuthError => "auth_error",
            Self::AiServiceError => "ai_service_error",
            Self::FileProcessingError => "file_processing_error",
            Self::InternalError => "internal_error",
            Self::TokenExpired => "token_expired",
            Self::TokenInvalid => "token_invalid",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// A request failed field-presence, type, range, or cross-field checks.
///
/// The message is safe to show to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(format!("missing required field: {field}"))
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ---------------------------------------------------------------------------
// ErrorResponse
// ---------------------------------------------------------------------------

/// Uniform error payload. `success` is always `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_kind: ErrorKind,
    pub status_code: u16,
}

impl ErrorResponse {
    /// Builds a response whose status code is taken from `kind`.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            error_kind: kind,
            status_code: kind.status_code(),
        }
    }
}
