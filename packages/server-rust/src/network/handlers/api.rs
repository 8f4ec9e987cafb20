//! Translation, summarization and document upload endpoints.
//!
//! Thin adapters from HTTP to [`Controller::handle`]; all validation and
//! error classification happens behind it.
//!
//! [`Controller::handle`]: crate::service::Controller::handle

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use serde_json::Value;

use super::{error_response, json_outcome, parse_json_body, AppState};
use crate::service::OperationKind;

async fn run(state: &AppState, kind: OperationKind, body: &Bytes) -> Response {
    match parse_json_body(body) {
        Ok(payload) => json_outcome(state.controller.handle(kind, &payload).await),
        Err(err) => error_response(err),
    }
}

/// `POST /translate`
pub async fn translate_handler(State(state): State<AppState>, body: Bytes) -> Response {
    run(&state, OperationKind::Translate, &body).await
}

/// `GET /translate`: supported target languages.
pub async fn languages_handler(State(state): State<AppState>) -> Response {
    json_outcome(state.controller.handle(OperationKind::Languages, &Value::Null).await)
}

/// `POST /summarize`
pub async fn summarize_handler(State(state): State<AppState>, body: Bytes) -> Response {
    run(&state, OperationKind::Summarize, &body).await
}

/// `GET /summarize`: available summary methods.
pub async fn summary_methods_handler(State(state): State<AppState>) -> Response {
    json_outcome(
        state
            .controller
            .handle(OperationKind::SummaryMethods, &Value::Null)
            .await,
    )
}

/// `POST /upload`
pub async fn upload_handler(State(state): State<AppState>, body: Bytes) -> Response {
    run(&state, OperationKind::Upload, &body).await
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::network::handlers::tests::test_state;

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn translate_success() {
        let body = Bytes::from_static(br#"{"text":"hello","target_lang":"ko"}"#);
        let resp = translate_handler(State(test_state()), body).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["translated_text"], "[ko] hello");
        assert_eq!(json["source_language"], "auto");
    }

    #[tokio::test]
    async fn missing_field_is_400() {
        let body = Bytes::from_static(br#"{"target_lang":"ko"}"#);
        let resp = translate_handler(State(test_state()), body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error_kind"], "validation_error");
        assert_eq!(json["status_code"], 400);
    }

    #[tokio::test]
    async fn sentences_out_of_range_is_400() {
        let body = Bytes::from_static(br#"{"text":"a b c","sentences_count":11}"#);
        let resp = summarize_handler(State(test_state()), body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn listing_endpoints() {
        let resp = languages_handler(State(test_state())).await;
        let json = body_json(resp).await;
        assert_eq!(json["supported_languages"].as_object().unwrap().len(), 8);

        let resp = summary_methods_handler(State(test_state())).await;
        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["methods"].as_object().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_upload_body_is_400() {
        let resp = upload_handler(State(test_state()), Bytes::new()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
