//! Multi-session binder.
//!
//! Binds one session per distinct name, each under its own named slot.

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::collections::HashSet;
use std::sync::Arc;

use crate::bind::{default_error_response, single_key_router, ErrorHandler};
use crate::context::{SessionContext, Slot};
use crate::error::SessionError;
use crate::source::{acquire, SessionSource};

/// Called instead of the inner handler when the session for a name cannot be
/// acquired. Receives the failing name.
pub type NamedErrorHandler = Arc<dyn Fn(Request, &str, SessionError) -> Response + Send + Sync>;

fn default_named_error_handler() -> NamedErrorHandler {
    Arc::new(|_request: Request, _name: &str, _err: SessionError| default_error_response())
}

/// Result of collapsing a name list to its distinct members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReducedNames {
    Empty,
    Single(String),
    /// Two or more distinct names. Input order is kept unless duplicates had
    /// to be removed from a list of three or more, in which case the order is
    /// unspecified.
    Many(Vec<String>),
}

/// Collapse `names` to a duplicate-free list without touching the input.
pub fn reduce_names<N: AsRef<str>>(names: &[N]) -> ReducedNames {
    match names {
        [] => ReducedNames::Empty,
        [only] => ReducedNames::Single(only.as_ref().to_owned()),
        [first, second] => {
            if first.as_ref() == second.as_ref() {
                ReducedNames::Single(first.as_ref().to_owned())
            } else {
                ReducedNames::Many(vec![first.as_ref().to_owned(), second.as_ref().to_owned()])
            }
        }
        _ => {
            let distinct: HashSet<&str> = names.iter().map(|n| n.as_ref()).collect();
            match distinct.len() {
                1 => ReducedNames::Single(names[0].as_ref().to_owned()),
                n if n == names.len() => {
                    ReducedNames::Many(names.iter().map(|n| n.as_ref().to_owned()).collect())
                }
                _ => ReducedNames::Many(distinct.into_iter().map(String::from).collect()),
            }
        }
    }
}

/// Wrap `inner` so that every request gets one session per distinct name in
/// `names`, retrievable downstream with
/// [`extract_session_named`](crate::extract_session_named) or
/// [`must_extract_session_named`](crate::must_extract_session_named).
///
/// With no names, `inner` is returned as is. With a single distinct name this
/// behaves like [`with_session`](crate::with_session) bound to that name's
/// slot. Otherwise sessions are acquired one after another; the first failure
/// goes to `on_error` (or the default `500` response) with the failing name,
/// and `inner` is never reached.
pub fn with_sessions_named<S, N>(
    names: &[N],
    source: Arc<dyn SessionSource>,
    inner: Router<S>,
    on_error: Option<NamedErrorHandler>,
) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    N: AsRef<str>,
{
    let on_error = on_error.unwrap_or_else(default_named_error_handler);

    match reduce_names(names) {
        ReducedNames::Empty => inner,
        ReducedNames::Single(name) => {
            let name: Arc<str> = Arc::from(name);
            let failing = name.clone();
            let adapted: ErrorHandler = Arc::new(move |request: Request, err: SessionError| {
                on_error(request, &*failing, err)
            });
            single_key_router(name.clone(), Slot::Named(name), source, inner, adapted)
        }
        ReducedNames::Many(names) => {
            let state = MultiKeyState {
                names: names.into_iter().map(Arc::from).collect(),
                source,
                on_error,
            };
            inner.layer(middleware::from_fn_with_state(state, bind_named_keys))
        }
    }
}

#[derive(Clone)]
struct MultiKeyState {
    names: Arc<[Arc<str>]>,
    source: Arc<dyn SessionSource>,
    on_error: NamedErrorHandler,
}

async fn bind_named_keys(
    State(state): State<MultiKeyState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let mut context = SessionContext::of(&parts.extensions);

    for name in state.names.iter() {
        match acquire(state.source.as_ref(), &parts, &**name).await {
            Ok(session) => {
                context = context.with_session(Slot::Named(name.clone()), Arc::new(session));
            }
            Err(err) => {
                tracing::warn!(session_name = %name, error = %err, "Failed to acquire session");
                return (state.on_error)(Request::from_parts(parts, body), &**name, err);
            }
        }
    }

    tracing::debug!(sessions = state.names.len(), "Sessions bound");
    context.install(&mut parts.extensions);
    next.run(Request::from_parts(parts, body)).await
}

/// Builder form of [`with_sessions_named`].
#[derive(Clone)]
pub struct NamedSessionsBinder {
    names: Vec<String>,
    source: Arc<dyn SessionSource>,
    on_error: Option<NamedErrorHandler>,
}

impl NamedSessionsBinder {
    pub fn new<I, N>(names: I, source: Arc<dyn SessionSource>) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            source,
            on_error: None,
        }
    }

    /// Handle acquisition failures with `f` instead of the default response.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Request, &str, SessionError) -> Response + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub fn bind<S>(self, inner: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        with_sessions_named(&self.names, self.source, inner, self.on_error)
    }
}
