//! Integration tests for the gateway endpoints.
//!
//! Drives the full router (middleware included) with `oneshot`.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::Utc;
use tower::ServiceExt;
use warden_auth_core::{
    cache_config, AuthConfig, ClaimsCodec, SessionClaims, SessionMode, SessionService,
    VerificationCache,
};
use warden_gateway::{build_router, AppState, Config};

const SECRET: &str = "gateway-test-secret-0123456789abcdef";
const COOKIE: &str = "warden_session";

struct TestApp {
    router: Router,
    cache: VerificationCache,
}

fn config(mode: SessionMode, password: &str) -> Config {
    let auth = AuthConfig::new(SECRET, COOKIE, "admin", password)
        .with_lifetime_days(2)
        .with_session_mode(mode);
    Config {
        port: 0,
        auth,
        request_timeout: Duration::from_secs(10),
        metrics_enabled: false,
    }
}

fn app_with(config: Config) -> TestApp {
    let cache = VerificationCache::new(cache_config(&config.auth));
    let sessions = SessionService::new(config.auth.clone(), cache.clone()).unwrap();
    let router = build_router(AppState::new(sessions, config), None);
    TestApp { router, cache }
}

fn app() -> TestApp {
    app_with(config(SessionMode::SharedSecret, "hunter2"))
}

async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn post_login(router: &Router, body: &str) -> Response<Body> {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get_verify(router: &Router, cookie: Option<&str>, forwarded: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().method("GET").uri("/verify");
    if let Some(token) = cookie {
        request = request.header(header::COOKIE, format!("{COOKIE}={token}"));
    }
    if let Some(uri) = forwarded {
        request = request.header("x-forwarded-uri", uri);
    }
    router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Token value from a `Set-Cookie` response header
fn session_from(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(';').next())
        .and_then(|c| c.strip_prefix(&format!("{COOKIE}=")))
        .map(String::from)
        .expect("session cookie should be set")
}

fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = app();
    let response = app
        .router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Hello world");
}

#[tokio::test]
async fn test_login_form_embeds_redirect_uri() {
    let app = app();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/login?redirect_uri=%2Fdashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(r#"name="redirect_uri" value="/dashboard""#));

    let response = app
        .router
        .oneshot(Request::builder().uri("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_string(response).await;
    assert!(body.contains(r#"name="redirect_uri" value="/""#));
}

#[tokio::test]
async fn test_login_success_sets_cookie_and_redirects_home() {
    let app = app();
    let before = Utc::now().timestamp();
    let response = post_login(&app.router, "username=admin&password=hunter2").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    for attribute in ["Path=/", "HttpOnly", "Secure", "SameSite=Lax", "Expires="] {
        assert!(set_cookie.contains(attribute), "missing {attribute} in {set_cookie}");
    }

    // Expiry claim is now + 2 days
    let token = session_from(&response);
    let claims = ClaimsCodec::new(SECRET).unwrap().verify(&token).unwrap();
    assert_eq!(claims.subject, "admin");
    let two_days = 2 * 86_400;
    assert!(claims.expire >= before + two_days && claims.expire <= Utc::now().timestamp() + two_days);
}

#[tokio::test]
async fn test_login_redirects_to_requested_uri() {
    let app = app();
    let response = post_login(
        &app.router,
        "username=admin&password=hunter2&redirect_uri=%2Fdashboard%3Ftab%3D2",
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/dashboard?tab=2");
}

#[tokio::test]
async fn test_login_refuses_offsite_redirect() {
    let app = app();
    let response = post_login(
        &app.router,
        "username=admin&password=hunter2&redirect_uri=https%3A%2F%2Fevil.example",
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_login_failure_rerenders_form() {
    let app = app();
    for body in [
        "username=admin&password=wrong",
        "username=root&password=hunter2",
        "username=&password=",
        "",
    ] {
        let response = post_login(&app.router, body).await;
        assert_eq!(response.status(), StatusCode::OK, "body: {body:?}");
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let page = body_string(response).await;
        assert!(page.contains("Invalid username or password."));
    }
}

#[tokio::test]
async fn test_verify_without_cookie_redirects_to_login() {
    let app = app();
    let response = get_verify(&app.router, None, Some("/dashboard")).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?redirect_uri=%2Fdashboard");
}

#[tokio::test]
async fn test_verify_without_forwarded_uri_defaults_to_root() {
    let app = app();
    let response = get_verify(&app.router, None, None).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?redirect_uri=%2F");
}

#[tokio::test]
async fn test_verify_with_valid_cookie() {
    let app = app();
    let login = post_login(&app.router, "username=admin&password=hunter2").await;
    let token = session_from(&login);

    let response = get_verify(&app.router, Some(&token), Some("/dashboard")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-authenticated-user"], "admin");
    assert_eq!(body_string(response).await, "Authenticated");

    // Second check is served from the cache
    assert!(app.cache.get(&token).await.is_some());
    let response = get_verify(&app.router, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_verify_with_expired_cookie() {
    let app = app();
    let codec = ClaimsCodec::new(SECRET).unwrap();
    let now = Utc::now().timestamp();

    let valid = codec.sign(&SessionClaims::new("admin", now + 3600)).unwrap();
    assert_eq!(get_verify(&app.router, Some(&valid), None).await.status(), StatusCode::OK);

    let expired = codec.sign(&SessionClaims::new("admin", now - 1)).unwrap();
    let response = get_verify(&app.router, Some(&expired), Some("/dashboard")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?redirect_uri=%2Fdashboard");

    // Other tokens' entries are untouched
    let cached = app.cache.get(&valid).await.expect("valid entry survives");
    assert_eq!(cached.subject, "admin");
}

#[tokio::test]
async fn test_verify_with_forged_cookie() {
    let app = app();
    let forged = ClaimsCodec::new("someone-elses-secret-0123456789abcdef")
        .unwrap()
        .sign(&SessionClaims::new("admin", Utc::now().timestamp() + 3600))
        .unwrap();

    let response = get_verify(&app.router, Some(&forged), Some("/admin")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?redirect_uri=%2Fadmin");
    assert!(app.cache.get(&forged).await.is_none());
}

#[tokio::test]
async fn test_credential_hash_mode_end_to_end() {
    let before = app_with(config(SessionMode::CredentialHash, "hunter2"));
    let login = post_login(&before.router, "username=admin&password=hunter2").await;
    assert_eq!(login.status(), StatusCode::FOUND);
    let token = session_from(&login);

    assert_eq!(get_verify(&before.router, Some(&token), None).await.status(), StatusCode::OK);

    // Restart with a rotated password: the old cookie no longer works
    let after = app_with(config(SessionMode::CredentialHash, "correct-horse"));
    let response = get_verify(&after.router, Some(&token), Some("/")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
}
