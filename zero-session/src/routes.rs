//! HTTP routes for the session service.
//!
//! `/session` sits behind the single-session binder, `/sessions` behind the
//! multi-session binder. Both report which sessions they were handed.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::Instrument;
use zero_common::config::Config;
use zero_common::logging::trace_id_from_headers;

use crate::bind::SessionBinder;
use crate::error::SessionError;
use crate::extract::{must_extract_session_named, BoundSession};
use crate::named::NamedSessionsBinder;
use crate::source::SessionSource;

/// Shared state for the session routes.
#[derive(Clone)]
pub struct RouteState {
    names: Arc<[String]>,
    cookie_name: Arc<str>,
}

impl RouteState {
    pub fn new(config: &Config) -> Self {
        Self {
            names: config.sessions.names.clone().into(),
            cookie_name: Arc::from(config.sessions.cookie_name.as_str()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the session service router.
pub fn build_router(config: &Config, source: Arc<dyn SessionSource>) -> Router {
    let state = RouteState::new(config);

    let single: Router<RouteState> =
        SessionBinder::new(config.sessions.name.clone(), source.clone())
            .on_error(session_error_response)
            .bind(Router::new().route("/session", get(greet_session)));

    let named: Router<RouteState> =
        NamedSessionsBinder::new(config.sessions.names.clone(), source)
            .on_error(named_session_error_response)
            .bind(Router::new().route("/sessions", get(list_sessions)));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Own fallback so unmatched paths skip the binders wrapped around the
    // merged routers' fallbacks.
    Router::new()
        .fallback(not_found)
        .merge(single)
        .merge(named)
        .route("/health", get(health))
        .with_state(state)
        .layer(middleware::from_fn(trace_requests))
        .layer(cors)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "zero-session",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn greet_session(State(state): State<RouteState>, session: BoundSession) -> Response {
    let body = format!("Hello, session {:?}!\n", session.name());
    let mut response = ([(header::CONTENT_TYPE, "text/plain")], body).into_response();

    // Hand new sessions back so the next request finds them.
    if session.is_new() {
        let cookie = format!("{}={}; Path=/; HttpOnly", state.cookie_name, session.id());
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }

    response
}

async fn list_sessions(State(state): State<RouteState>, request: Request) -> Response {
    let mut body = String::new();
    for name in state.names.iter() {
        let session = must_extract_session_named(name, &request);
        body.push_str(&format!(
            "Session registered with name {:?} is named {:?}.\n",
            name,
            session.name()
        ));
    }

    ([(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

fn error_status(err: &SessionError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn session_error_response(_request: Request, err: SessionError) -> Response {
    (
        error_status(&err),
        [(header::CONTENT_TYPE, "text/plain")],
        format!("Failed to allocate a session for this request: {err}\n"),
    )
        .into_response()
}

fn named_session_error_response(_request: Request, name: &str, err: SessionError) -> Response {
    (
        error_status(&err),
        [(header::CONTENT_TYPE, "text/plain")],
        format!("Failed to allocate a session named {name:?} for this request: {err}\n"),
    )
        .into_response()
}

async fn trace_requests(request: Request, next: Next) -> Response {
    let trace_id = trace_id_from_headers(request.headers());
    let span = zero_common::request_span!(
        "http_request",
        trace_id,
        method = %request.method(),
        path = %request.uri().path()
    );
    next.run(request).instrument(span).await
}
