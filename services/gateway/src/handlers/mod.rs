//! HTTP handlers

mod health;
mod login;
mod verify;

pub use health::alive;
pub use login::{login, login_page};
pub use verify::verify;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Where to send the browser when nothing (usable) was asked for
pub(crate) const DEFAULT_REDIRECT: &str = "/";

/// Accept only same-origin paths as redirect targets.
///
/// Anything else (absolute URLs, scheme-relative `//host` paths, empty
/// values) falls back to `/` so the login flow cannot be used as an open
/// redirect.
pub(crate) fn redirect_target(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(uri) if uri.starts_with('/') && !uri.starts_with("//") && !uri.contains('\\') => {
            uri.to_string()
        }
        _ => DEFAULT_REDIRECT.to_string(),
    }
}

/// 302 Found to `location`
pub(crate) fn found(location: &str) -> Response {
    let location = HeaderValue::from_str(location)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_REDIRECT));
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
