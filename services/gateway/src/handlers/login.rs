//! Login handlers (form and credential exchange)

use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use warden_auth_core::AuthError;

use super::{found, redirect_target};
use crate::cookies::set_session_cookie;
use crate::state::AppState;
use crate::template;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

#[derive(Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /login
///
/// Render the login form, carrying `redirect_uri` through
pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    let redirect_uri = redirect_target(query.redirect_uri.as_deref());
    Html(template::login_page(&redirect_uri, false))
}

/// POST /login
///
/// Exchange the static credentials for a session cookie
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    Form(form): Form<LoginForm>,
) -> Response {
    // Form field first, then the query string
    let redirect_uri = redirect_target(
        form.redirect_uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .or(query.redirect_uri.as_deref()),
    );

    // Argon2 in credential-hash mode blocks; run it off the async workers
    let sessions = state.sessions.clone();
    let LoginForm {
        username, password, ..
    } = form;
    let issued =
        tokio::task::spawn_blocking(move || sessions.login(&username, &password)).await;

    let session = match issued {
        Ok(Ok(session)) => session,
        Ok(Err(AuthError::InvalidCredentials)) => {
            metrics::counter!("warden_login_total", "outcome" => "rejected").increment(1);
            return Html(template::login_page(&redirect_uri, true)).into_response();
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, code = e.error_code(), "Failed to issue session");
            metrics::counter!("warden_login_total", "outcome" => "error").increment(1);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Login task failed");
            metrics::counter!("warden_login_total", "outcome" => "error").increment(1);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response();
        }
    };

    metrics::counter!("warden_login_total", "outcome" => "success").increment(1);

    let cookie = set_session_cookie(state.cookie_name(), &session.token, session.expires_at);
    let cookie = match HeaderValue::from_str(&cookie) {
        Ok(cookie) => cookie,
        Err(e) => {
            tracing::error!(error = %e, "Session cookie is not a valid header value");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response();
        }
    };

    let mut response = found(&redirect_uri);
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    response
}
