//! Single-session binder.
//!
//! Binds one session to each request under the anonymous slot. A later
//! single-session binding on the same request shadows this one.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;

use crate::context::{SessionContext, Slot};
use crate::error::SessionError;
use crate::source::{acquire, SessionSource};

/// Called instead of the inner handler when a session cannot be acquired.
pub type ErrorHandler = Arc<dyn Fn(Request, SessionError) -> Response + Send + Sync>;

/// Response sent when acquisition fails and no error handler was supplied:
/// `500 Internal Server Error` with an empty body.
pub fn default_error_response() -> Response {
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

fn default_error_handler() -> ErrorHandler {
    Arc::new(|_request: Request, _err: SessionError| default_error_response())
}

/// Wrap `inner` so that every request gets a session named `name` from
/// `source`, retrievable downstream with
/// [`extract_session`](crate::extract_session) or
/// [`must_extract_session`](crate::must_extract_session).
///
/// The source is called exactly once per request. If it fails, `on_error`
/// (or [`default_error_response`] when `None`) handles the request and
/// `inner` is never reached.
///
/// Only one session is bound, as an anonymous singleton. To bind several
/// sessions by name use [`with_sessions_named`](crate::with_sessions_named).
pub fn with_session<S>(
    name: impl Into<String>,
    source: Arc<dyn SessionSource>,
    inner: Router<S>,
    on_error: Option<ErrorHandler>,
) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let on_error = on_error.unwrap_or_else(default_error_handler);
    single_key_router(Arc::from(name.into()), Slot::Anonymous, source, inner, on_error)
}

#[derive(Clone)]
struct SingleKeyState {
    name: Arc<str>,
    slot: Slot,
    source: Arc<dyn SessionSource>,
    on_error: ErrorHandler,
}

/// Bind the session named `name` under `slot` in front of `inner`.
pub(crate) fn single_key_router<S>(
    name: Arc<str>,
    slot: Slot,
    source: Arc<dyn SessionSource>,
    inner: Router<S>,
    on_error: ErrorHandler,
) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let state = SingleKeyState {
        name,
        slot,
        source,
        on_error,
    };
    inner.layer(middleware::from_fn_with_state(state, bind_single_key))
}

async fn bind_single_key(
    State(state): State<SingleKeyState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    match acquire(state.source.as_ref(), &parts, &*state.name).await {
        Ok(session) => {
            tracing::debug!(session_name = %state.name, slot = ?state.slot, "Session bound");
            SessionContext::of(&parts.extensions)
                .with_session(state.slot.clone(), Arc::new(session))
                .install(&mut parts.extensions);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(err) => {
            tracing::warn!(session_name = %state.name, error = %err, "Failed to acquire session");
            (state.on_error)(Request::from_parts(parts, body), err)
        }
    }
}

/// Builder form of [`with_session`].
#[derive(Clone)]
pub struct SessionBinder {
    name: String,
    source: Arc<dyn SessionSource>,
    on_error: Option<ErrorHandler>,
}

impl SessionBinder {
    pub fn new(name: impl Into<String>, source: Arc<dyn SessionSource>) -> Self {
        Self {
            name: name.into(),
            source,
            on_error: None,
        }
    }

    /// Handle acquisition failures with `f` instead of the default response.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Request, SessionError) -> Response + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub fn bind<S>(self, inner: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        with_session(self.name, self.source, inner, self.on_error)
    }
}
