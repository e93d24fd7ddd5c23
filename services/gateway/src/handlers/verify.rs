//! Forward-auth check

use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use url::form_urlencoded;
use warden_auth_core::Verification;

use super::{found, DEFAULT_REDIRECT};
use crate::cookies::session_cookie;
use crate::state::AppState;

/// Original request URI, as forwarded by the proxy
pub const X_FORWARDED_URI: HeaderName = HeaderName::from_static("x-forwarded-uri");

/// Identity of the authenticated caller, for the upstream
pub const X_AUTHENTICATED_USER: HeaderName = HeaderName::from_static("x-authenticated-user");

/// GET /verify
///
/// 200 when the session cookie authenticates, otherwise a redirect to the
/// login form that returns the user to the original URI afterwards.
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = session_cookie(&headers, state.cookie_name());

    match state.sessions.verify(token).await {
        Verification::Authenticated { subject } => authenticated(&subject),
        Verification::Unauthenticated(_) => {
            let original_uri = headers
                .get(&X_FORWARDED_URI)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .unwrap_or(DEFAULT_REDIRECT);
            redirect_to_login(original_uri)
        }
    }
}

fn authenticated(subject: &str) -> Response {
    let mut response = (StatusCode::OK, "Authenticated").into_response();
    if let Ok(user) = HeaderValue::from_str(subject) {
        response.headers_mut().insert(X_AUTHENTICATED_USER, user);
    }
    response
}

/// 302 to `/login?redirect_uri=<original uri>`
fn redirect_to_login(original_uri: &str) -> Response {
    let encoded: String = form_urlencoded::byte_serialize(original_uri.as_bytes()).collect();
    let location = format!("/login?redirect_uri={encoded}");
    tracing::debug!(
        location = %location,
        original_uri = %original_uri,
        "Redirecting unauthenticated user"
    );
    found(&location)
}
