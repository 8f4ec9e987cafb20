//! HTTP middleware stack.
//!
//! Middleware ordering follows the outer-to-inner convention: the first
//! layer listed is the outermost (processes the request first on the way
//! in, and the response last on the way out).

use std::any::Any;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{middleware, Json, Router};
use dts_core::{ErrorKind, ErrorResponse};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use super::config::NetworkConfig;
use super::handlers::error_response;
use crate::service::error::INTERNAL_ERROR_MESSAGE;

/// Wraps `router` in the transport middleware stack.
///
/// **Middleware ordering (outermost to innermost):**
/// 1. `SetRequestId` -- assigns a UUID v4 `X-Request-Id` to every incoming request
/// 2. `Tracing` -- logs request/response with structured trace spans
/// 3. `Compression` -- gzip response compression
/// 4. `CORS` -- answers preflights; `GET, POST, OPTIONS` with `Content-Type`
/// 5. `PropagateRequestId` -- copies `X-Request-Id` from the request to the response
/// 6. `json_transport_errors` -- rewrites the bare 408/413 produced below into
///    `ErrorResponse` bodies
/// 7. `Timeout` -- 408 after the configured request timeout
/// 8. `CatchPanic` -- a panicking handler becomes an `internal_error` JSON body
/// 9. `RequestBodyLimit` -- 413 beyond `max_body_bytes` (axum's own limit is disabled)
pub fn apply_http_layers(router: Router, config: &NetworkConfig) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");

    router
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    config.request_timeout,
                ))
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(RequestBodyLimitLayer::new(config.max_body_bytes)),
        )
        .layer(middleware::map_response(json_transport_errors))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(build_cors_layer(&config.cors_origins))
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
}

/// Gives transport-generated timeouts and body-limit rejections the same
/// JSON shape as every other error. JSON responses pass through untouched.
async fn json_transport_errors(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return response;
    }

    match response.status() {
        StatusCode::REQUEST_TIMEOUT => {
            warn!("request timed out");
            error_response(ErrorResponse::new(
                ErrorKind::InternalError,
                "The request timed out. Please try again.",
            ))
        }
        StatusCode::PAYLOAD_TOO_LARGE => error_response(ErrorResponse::new(
            ErrorKind::ValidationError,
            "request body exceeds the maximum allowed size",
        )),
        _ => response,
    }
}

/// A wildcard `"*"` allows any origin; otherwise only the listed ones.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("<non-string panic payload>");
    error!(panic = detail, "handler panicked");

    let body = ErrorResponse::new(ErrorKind::InternalError, INTERNAL_ERROR_MESSAGE);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
