//! Session cookie parsing and formatting

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};

/// Extract the value of cookie `name` from the request headers.
///
/// Looks through every `Cookie` header; the first non-empty match wins.
pub fn session_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.trim_matches('"'))
}

/// Build the `Set-Cookie` value for a freshly issued session
pub fn set_session_cookie(name: &str, token: &str, expires_at: DateTime<Utc>) -> String {
    format!(
        "{name}={token}; Path=/; HttpOnly; Secure; SameSite=Lax; Expires={}",
        expires_at.format("%a, %d %b %Y %H:%M:%S GMT")
    )
}
