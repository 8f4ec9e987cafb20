//! HTTP handler definitions.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and the JSON helpers every handler responds through.

pub mod api;
pub mod auth;
pub mod health;

pub use api::{
    languages_handler, summarize_handler, summary_methods_handler, translate_handler,
    upload_handler,
};
pub use auth::{callback_handler, login_handler, logout_handler, verify_handler};
pub use health::{health_handler, liveness_handler, readiness_handler};

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dts_core::{ErrorKind, ErrorResponse};
use serde_json::Value;

use super::{NetworkConfig, ShutdownController};
use crate::auth::Authenticator;
use crate::service::Controller;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references to shared resources so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Validate -> dispatch -> classify boundary for API operations.
    pub controller: Arc<Controller>,
    /// Google login flow and session tokens.
    pub auth: Arc<Authenticator>,
    pub shutdown: Arc<ShutdownController>,
    pub config: Arc<NetworkConfig>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

/// Sends a classified error with the HTTP status equal to its `status_code`.
pub(crate) fn error_response(err: ErrorResponse) -> Response {
    let status =
        StatusCode::from_u16(err.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err)).into_response()
}

/// 200 with the body on success, the classified error otherwise.
pub(crate) fn json_outcome(result: Result<Value, ErrorResponse>) -> Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(err) => error_response(err),
    }
}

/// Parses a request body as JSON regardless of its `Content-Type`.
///
/// An empty body parses as `null`, which the validator rejects as a
/// non-object payload.
pub(crate) fn parse_json_body(body: &Bytes) -> Result<Value, ErrorResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| {
        ErrorResponse::new(ErrorKind::ValidationError, format!("malformed JSON body: {e}"))
    })
}
