//! Google login, session verification and logout endpoints.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use dts_core::ValidationError;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::{error_response, parse_json_body, AppState};
use crate::service::{classify_error, DispatchError};

/// Cookie carrying the OAuth `state` between login and callback.
pub const STATE_COOKIE: &str = "oauth_state";
const STATE_COOKIE_MAX_AGE_SECS: u32 = 600;

fn dispatch_error(err: &DispatchError) -> Response {
    error_response(classify_error(err))
}

fn redirect(location: &str, cookie: String) -> Response {
    (
        StatusCode::FOUND,
        [(LOCATION, location.to_string()), (SET_COOKIE, cookie)],
    )
        .into_response()
}

fn state_cookie(value: &str) -> String {
    format!(
        "{STATE_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={STATE_COOKIE_MAX_AGE_SECS}"
    )
}

fn clear_state_cookie() -> String {
    format!("{STATE_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Value of cookie `name` from the request's `Cookie` headers.
fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

/// `GET /auth/google`: redirect to the provider's consent screen.
pub async fn login_handler(State(state): State<AppState>) -> Response {
    match state.auth.begin() {
        Ok(login) => redirect(&login.url, state_cookie(&login.state)),
        Err(err) => dispatch_error(&err),
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    /// Set by the provider when the user denied consent.
    error: Option<String>,
}

/// `GET /auth/google/callback`: exchange the code and hand the session
/// token to the frontend.
pub async fn callback_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    if let Some(reason) = params.error.as_deref() {
        warn!(reason, "OAuth consent not granted");
        let err = DispatchError::from(ValidationError::new(format!(
            "authorization was not granted: {reason}"
        )));
        return dispatch_error(&err);
    }

    let expected = read_cookie(&headers, STATE_COOKIE).filter(|s| !s.is_empty());
    match state
        .auth
        .complete(params.code.as_deref(), params.state.as_deref(), expected)
        .await
    {
        Ok(location) => redirect(&location, clear_state_cookie()),
        Err(err) => dispatch_error(&err),
    }
}

/// `POST /auth/verify` with `{token}`.
pub async fn verify_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let payload = match parse_json_body(&body) {
        Ok(payload) => payload,
        Err(err) => return error_response(err),
    };
    let Some(token) = payload
        .get("token")
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
    else {
        return dispatch_error(&ValidationError::missing_field("token").into());
    };

    match state.auth.verify(token) {
        Ok(user) => Json(json!({ "valid": true, "user": user })).into_response(),
        Err(err) => dispatch_error(&err.into()),
    }
}

/// `POST /auth/logout`: sessions are stateless, so this only clears the
/// login-state cookie.
pub async fn logout_handler() -> Response {
    (
        [(SET_COOKIE, clear_state_cookie())],
        Json(json!({ "success": true, "message": "Logged out." })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use dts_core::UserIdentity;

    use super::*;
    use crate::network::handlers::tests::test_state;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn cookie_header(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn reads_named_cookie() {
        let headers = cookie_header("theme=dark; oauth_state=abc123; other=1");
        assert_eq!(read_cookie(&headers, STATE_COOKIE), Some("abc123"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[tokio::test]
    async fn login_redirects_and_sets_state_cookie() {
        let resp = login_handler(State(test_state())).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp.headers()[LOCATION].to_str().unwrap().to_string();
        let cookie = resp.headers()[SET_COOKIE].to_str().unwrap();
        let state = cookie
            .strip_prefix("oauth_state=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        assert!(location.ends_with(state));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn callback_with_matching_state_redirects_with_token() {
        let resp = callback_handler(
            State(test_state()),
            cookie_header("oauth_state=s1"),
            Query(CallbackParams {
                code: Some("good".into()),
                state: Some("s1".into()),
                error: None,
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp.headers()[LOCATION].to_str().unwrap();
        assert!(location.starts_with("http://localhost:3000/?token="));
    }

    #[tokio::test]
    async fn callback_with_forged_state_is_401() {
        let resp = callback_handler(
            State(test_state()),
            cookie_header("oauth_state=s1"),
            Query(CallbackParams {
                code: Some("good".into()),
                state: Some("s2".into()),
                error: None,
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(resp).await["error_kind"], "auth_error");
    }

    #[tokio::test]
    async fn callback_without_state_cookie_is_401() {
        let resp = callback_handler(
            State(test_state()),
            HeaderMap::new(),
            Query(CallbackParams {
                code: Some("good".into()),
                state: Some("s1".into()),
                error: None,
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert_eq!(json["error_kind"], "auth_error");
        assert_eq!(json["status_code"], 401);
    }

    #[tokio::test]
    async fn callback_without_code_is_400() {
        let resp = callback_handler(
            State(test_state()),
            HeaderMap::new(),
            Query(CallbackParams {
                code: None,
                state: None,
                error: None,
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn verify_round_trip_and_tampering() {
        let state = test_state();
        let redirect = state
            .auth
            .complete(Some("good"), Some("s1"), Some("s1"))
            .await
            .unwrap();
        let token = redirect.split("token=").nth(1).unwrap().to_string();

        let body = Bytes::from(json!({ "token": token }).to_string());
        let resp = verify_handler(State(state.clone()), body).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["valid"], true);
        let user: UserIdentity = serde_json::from_value(json["user"].clone()).unwrap();
        assert_eq!(user.provider, "google");

        let body = Bytes::from(json!({ "token": format!("{token}x") }).to_string());
        let resp = verify_handler(State(state), body).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(resp).await["error_kind"], "token_invalid");
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let resp = logout_handler().await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers()[SET_COOKIE].to_str().unwrap().contains("Max-Age=0"));
        assert_eq!(body_json(resp).await["success"], true);
    }
}
