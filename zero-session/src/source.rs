//! Session sources.
//!
//! A [`SessionSource`] hands out sessions by name for a request. Storage,
//! signing, and encryption all live behind it; binders only call
//! [`SessionSource::new_session`].

use async_trait::async_trait;
use axum::http::{header, request::Parts, HeaderMap};

use crate::error::SessionError;
use crate::session::Session;

/// Supplies sessions on demand.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Produce a session with the given name for this request.
    async fn new_session(&self, parts: &Parts, name: &str) -> Result<Session, SessionError>;
}

/// Ask the source for a session, accepting the fresh session carried by a
/// recoverable error.
pub(crate) async fn acquire(
    source: &dyn SessionSource,
    parts: &Parts,
    name: &str,
) -> Result<Session, SessionError> {
    match source.new_session(parts, name).await {
        Ok(session) => Ok(session),
        Err(err) if err.is_recoverable() => {
            tracing::debug!(session_name = %name, reason = %err, "Starting fresh session");
            err.into_fresh_session()
        }
        Err(err) => Err(err),
    }
}

/// Always creates a brand new session.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreshSessionSource;

#[async_trait]
impl SessionSource for FreshSessionSource {
    async fn new_session(&self, _parts: &Parts, name: &str) -> Result<Session, SessionError> {
        Ok(Session::new(name))
    }
}

/// Resolves the session ID from a request cookie.
///
/// A missing cookie yields [`SessionError::NoCookie`] and a malformed one
/// [`SessionError::Decode`], both carrying a fresh session. A well-formed
/// cookie yields a session with that ID and `is_new() == false`.
#[derive(Debug, Clone)]
pub struct CookieSessionSource {
    cookie_name: String,
}

impl CookieSessionSource {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }
}

#[async_trait]
impl SessionSource for CookieSessionSource {
    async fn new_session(&self, parts: &Parts, name: &str) -> Result<Session, SessionError> {
        let Some(raw) = cookie_value(&parts.headers, &self.cookie_name) else {
            return Err(SessionError::NoCookie {
                session: Box::new(Session::new(name)),
            });
        };

        match uuid::Uuid::parse_str(raw) {
            Ok(id) => Ok(Session::existing(id.to_string(), name)),
            Err(e) => Err(SessionError::Decode {
                message: e.to_string(),
                session: Box::new(Session::new(name)),
            }),
        }
    }
}

/// Find a cookie value across all `Cookie` headers.
fn cookie_value<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == cookie_name)
        .map(|(_, value)| value.trim_matches('"'))
}
