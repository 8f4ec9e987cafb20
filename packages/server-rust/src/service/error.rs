//! Error classification: maps every failure that can reach the controller
//! boundary onto the client-facing [`ErrorResponse`] taxonomy.
//!
//! Decision order:
//!
//! 1. validation failures
//! 2. language-model adapter failures (rate limit, credentials, anything else)
//! 3. document extraction failures
//! 4. identity-provider failures
//! 5. session token failures
//! 6. everything else, reported as a generic internal error

use dts_core::{ErrorKind, ErrorResponse, ValidationError};
use tracing::{error, warn};

use super::operation::OperationError;
use crate::adapters::{AdapterError, Backend};
use crate::auth::SessionError;

/// Client message for failures whose detail stays in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred.";
const RATE_LIMIT_MESSAGE: &str = "API usage limit exceeded. Please try again shortly.";
const AI_AUTH_MESSAGE: &str = "The AI service API key is invalid.";

/// Every failure the controller or auth handlers can produce.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Operation(#[from] OperationError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<AdapterError> for DispatchError {
    fn from(err: AdapterError) -> Self {
        Self::Operation(OperationError::Adapter(err))
    }
}

impl From<anyhow::Error> for DispatchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Operation(OperationError::Internal(err))
    }
}

/// Maps `err` to its client-facing response.
#[must_use]
pub fn classify(err: &DispatchError) -> ErrorResponse {
    match err {
        DispatchError::Validation(e) => {
            ErrorResponse::new(ErrorKind::ValidationError, e.message())
        }
        DispatchError::Operation(OperationError::Adapter(e)) => classify_adapter(e),
        DispatchError::Session(e) => {
            let kind = match e {
                SessionError::Expired => ErrorKind::TokenExpired,
                SessionError::Invalid(_) => ErrorKind::TokenInvalid,
            };
            ErrorResponse::new(kind, e.to_string())
        }
        DispatchError::Operation(e @ (OperationError::UnknownService { .. } | OperationError::Internal(_))) => {
            internal(e)
        }
    }
}

fn classify_adapter(err: &AdapterError) -> ErrorResponse {
    match (err, err.backend()) {
        (AdapterError::RateLimited { .. }, Some(Backend::LanguageModel)) => {
            warn!(error = %err, "language model rate limited");
            ErrorResponse::new(ErrorKind::RateLimitError, RATE_LIMIT_MESSAGE)
        }
        (AdapterError::Unauthorized { .. }, Some(Backend::LanguageModel)) => {
            error!(error = %err, "language model rejected API key");
            ErrorResponse::new(ErrorKind::AuthError, AI_AUTH_MESSAGE)
        }
        (_, Some(Backend::LanguageModel)) => {
            warn!(error = %err, "language model failure");
            ErrorResponse::new(ErrorKind::AiServiceError, format!("AI service error: {err}"))
        }
        (AdapterError::Extraction { detail, .. }, _) => ErrorResponse::new(
            ErrorKind::FileProcessingError,
            format!("File processing error: {detail}"),
        ),
        (_, Some(Backend::IdentityProvider)) => {
            warn!(error = %err, "identity provider failure");
            ErrorResponse::new(ErrorKind::AuthError, format!("Authentication failed: {err}"))
        }
        (AdapterError::NotConfigured(_), _) | (_, None) => internal(err),
    }
}

fn internal(err: &dyn std::error::Error) -> ErrorResponse {
    error!(error = %err, "internal error");
    ErrorResponse::new(ErrorKind::InternalError, INTERNAL_ERROR_MESSAGE)
}
