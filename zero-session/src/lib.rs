//! Zero Session - Request-scoped session binding for axum services.
//!
//! This crate provides:
//! - The [`SessionSource`] capability that produces sessions by name
//! - [`with_session`], binding one session per request under an anonymous slot
//! - [`with_sessions_named`], binding one session per distinct name
//! - Extraction helpers for handlers further down the chain
//!
//! ## Architecture
//!
//! ```text
//! Request → binder (source.new_session per name) → inner Router
//!               ↓ on failure
//!           error handler (default: 500, empty body)
//! ```
//!
//! Bound sessions live in a layered [`SessionContext`] stored in the request
//! extensions. Each binding adds a layer and never edits an earlier one.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod bind;
pub mod context;
pub mod error;
pub mod extract;
pub mod named;
pub mod routes;
pub mod session;
pub mod source;

pub use bind::{default_error_response, with_session, ErrorHandler, SessionBinder};
pub use context::{SessionContext, Slot};
pub use error::SessionError;
pub use extract::{
    extract_session, extract_session_from, extract_session_named, extract_session_named_from,
    must_extract_session, must_extract_session_named, BoundSession,
};
pub use named::{
    reduce_names, with_sessions_named, NamedErrorHandler, NamedSessionsBinder, ReducedNames,
};
pub use session::Session;
pub use source::{CookieSessionSource, FreshSessionSource, SessionSource};

use std::sync::Arc;
use zero_common::config::Config;

/// Start the session service.
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let addr = config.server.socket_addr()?;

    let source: Arc<dyn SessionSource> =
        Arc::new(CookieSessionSource::new(config.sessions.cookie_name.clone()));
    let router = routes::build_router(config, source);

    tracing::info!("Starting Zero Session on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
