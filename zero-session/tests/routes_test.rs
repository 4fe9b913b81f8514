//! Integration tests for the session service routes.

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Request,
    http::{header, request::Parts, StatusCode},
    Router,
};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use zero_common::config::Config;
use zero_session::routes::build_router;
use zero_session::{CookieSessionSource, FreshSessionSource, Session, SessionError, SessionSource};

// ─────────────────────────────────────────────────────────────────────────────
// Test Setup Helpers
// ─────────────────────────────────────────────────────────────────────────────

struct DownSource {
    make_error: fn() -> SessionError,
}

#[async_trait]
impl SessionSource for DownSource {
    async fn new_session(&self, _parts: &Parts, _name: &str) -> Result<Session, SessionError> {
        Err((self.make_error)())
    }
}

fn cookie_router() -> Router {
    let config = Config::default();
    let source = Arc::new(CookieSessionSource::new(config.sessions.cookie_name.clone()));
    build_router(&config, source)
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request {
    let mut builder = Request::builder().uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Routes
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_endpoint() {
    let response = cookie_router()
        .oneshot(get_request("/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "zero-session");
}

#[tokio::test]
async fn test_session_route_issues_cookie_for_new_session() {
    let response = cookie_router()
        .oneshot(get_request("/session", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap();
    assert!(cookie.starts_with("zero_session="));
    assert!(cookie.contains("HttpOnly"));
    assert_eq!(body_string(response).await, "Hello, session \"s\"!\n");
}

#[tokio::test]
async fn test_session_route_reuses_known_cookie() {
    let cookie = "zero_session=67e55044-10b1-426f-9247-bb680e5fe0c8";
    let response = cookie_router()
        .oneshot(get_request("/session", Some(cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_sessions_route_lists_configured_names() {
    let response = cookie_router()
        .oneshot(get_request("/sessions", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        "Session registered with name \"s1\" is named \"s1\".\n\
         Session registered with name \"s2\" is named \"s2\".\n"
    );
}

#[tokio::test]
async fn test_sessions_route_with_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(
        &path,
        r#"{ "sessions": { "name": "main", "names": ["a", "b", "a"] } }"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    let router = build_router(&config, Arc::new(FreshSessionSource));

    let response = router
        .clone()
        .oneshot(get_request("/sessions", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        "Session registered with name \"a\" is named \"a\".\n\
         Session registered with name \"b\" is named \"b\".\n\
         Session registered with name \"a\" is named \"a\".\n"
    );

    let response = router
        .oneshot(get_request("/session", None))
        .await
        .unwrap();
    assert_eq!(body_string(response).await, "Hello, session \"main\"!\n");
}

#[tokio::test]
async fn test_routes_report_source_failures() {
    let test_cases: Vec<(&str, fn() -> SessionError, StatusCode, &str)> = vec![
        (
            "/session",
            || SessionError::Source("down".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to allocate a session for this request: session source error: down\n",
        ),
        (
            "/session",
            || SessionError::Unavailable("maintenance".into()),
            StatusCode::SERVICE_UNAVAILABLE,
            "Failed to allocate a session for this request: session source unavailable: maintenance\n",
        ),
        (
            "/sessions",
            || SessionError::Store("locked".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to allocate a session named \"s1\" for this request: session store error: locked\n",
        ),
    ];

    for (uri, make_error, status, expected) in test_cases {
        let router = build_router(&Config::default(), Arc::new(DownSource { make_error }));
        let response = router.oneshot(get_request(uri, None)).await.unwrap();

        assert_eq!(response.status(), status, "{uri}");
        assert_eq!(body_string(response).await, expected, "{uri}");
    }
}

#[tokio::test]
async fn test_health_does_not_touch_sessions() {
    let router = build_router(
        &Config::default(),
        Arc::new(DownSource {
            make_error: || SessionError::Source("down".into()),
        }),
    );

    let response = router.oneshot(get_request("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_path_skips_session_binders() {
    let test_cases = vec!["/no-such-route", "/session/extra", "/sessions/extra"];

    for uri in test_cases {
        let router = build_router(
            &Config::default(),
            Arc::new(DownSource {
                make_error: || SessionError::Source("down".into()),
            }),
        );

        let response = router.oneshot(get_request(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert!(body_string(response).await.is_empty(), "{uri}");
    }
}
