//! Reading bound sessions back out of a request.
//!
//! The `must_*` variants panic when nothing is bound: reaching them without
//! the matching binder in front is a wiring bug, not a runtime condition.

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, Extensions, Request, StatusCode};
use std::sync::Arc;

use crate::context::SessionContext;
use crate::session::Session;

/// The session most recently bound by [`with_session`](crate::with_session).
pub fn extract_session<B>(request: &Request<B>) -> Option<Arc<Session>> {
    extract_session_from(request.extensions())
}

/// Like [`extract_session`], reading from request extensions directly.
pub fn extract_session_from(extensions: &Extensions) -> Option<Arc<Session>> {
    extensions.get::<SessionContext>()?.anonymous().cloned()
}

/// The session most recently bound by [`with_session`](crate::with_session).
///
/// # Panics
///
/// Panics if no such session is bound to this request.
pub fn must_extract_session<B>(request: &Request<B>) -> Arc<Session> {
    match extract_session(request) {
        Some(session) => session,
        None => panic!("no session available"),
    }
}

/// The session most recently bound under `name` by
/// [`with_sessions_named`](crate::with_sessions_named).
pub fn extract_session_named<B>(name: &str, request: &Request<B>) -> Option<Arc<Session>> {
    extract_session_named_from(name, request.extensions())
}

/// Like [`extract_session_named`], reading from request extensions directly.
pub fn extract_session_named_from(name: &str, extensions: &Extensions) -> Option<Arc<Session>> {
    extensions.get::<SessionContext>()?.named(name).cloned()
}

/// The session most recently bound under `name` by
/// [`with_sessions_named`](crate::with_sessions_named).
///
/// # Panics
///
/// Panics if no session with that name is bound to this request.
pub fn must_extract_session_named<B>(name: &str, request: &Request<B>) -> Arc<Session> {
    match extract_session_named(name, request) {
        Some(session) => session,
        None => panic!("no session available"),
    }
}

/// Extractor for the session bound by [`with_session`](crate::with_session).
///
/// Rejects with `500 Internal Server Error` when the handler is not behind a
/// single-session binder.
#[derive(Debug, Clone)]
pub struct BoundSession(pub Arc<Session>);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for BoundSession
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match extract_session_from(&parts.extensions) {
            Some(session) => Ok(Self(session)),
            None => {
                tracing::error!(path = %parts.uri.path(), "Handler reached without a bound session");
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl std::ops::Deref for BoundSession {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.0
    }
}
