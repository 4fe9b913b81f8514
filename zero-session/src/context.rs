//! Layered, immutable per-request session context.
//!
//! Each binding pushes a new layer on top of the context it found on the
//! request. Layers are shared through `Arc` and never modified, so a lookup
//! always sees the most recent binding for a slot and earlier bindings stay
//! intact underneath it.

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, Extensions};
use std::convert::Infallible;
use std::sync::Arc;

use crate::session::Session;

/// Key under which a session is bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The single-session slot shared by every single-session binding.
    Anonymous,
    /// One slot per session name.
    Named(Arc<str>),
}

impl Slot {
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::Named(name.into())
    }

    fn is_named(&self, name: &str) -> bool {
        matches!(self, Self::Named(n) if n.as_ref() == name)
    }
}

#[derive(Debug)]
struct Layer {
    slot: Slot,
    session: Arc<Session>,
    parent: Option<Arc<Layer>>,
}

/// Sessions bound to one request.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    head: Option<Arc<Layer>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The context currently stored in `extensions`, or an empty one.
    pub fn of(extensions: &Extensions) -> Self {
        extensions.get::<Self>().cloned().unwrap_or_default()
    }

    /// Derive a new context that binds `session` to `slot` on top of this one.
    #[must_use]
    pub fn with_session(&self, slot: Slot, session: Arc<Session>) -> Self {
        Self {
            head: Some(Arc::new(Layer {
                slot,
                session,
                parent: self.head.clone(),
            })),
        }
    }

    /// The most recent session bound to `slot`.
    pub fn get(&self, slot: &Slot) -> Option<&Arc<Session>> {
        self.find(|s| s == slot)
    }

    /// The most recent session bound by the single-session binder.
    pub fn anonymous(&self) -> Option<&Arc<Session>> {
        self.get(&Slot::Anonymous)
    }

    /// The most recent session bound under `name`.
    pub fn named(&self, name: &str) -> Option<&Arc<Session>> {
        self.find(|s| s.is_named(name))
    }

    /// Number of layers, shadowed ones included.
    pub fn depth(&self) -> usize {
        self.layers().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Store this context in `extensions`, replacing the one it was derived from.
    pub fn install(self, extensions: &mut Extensions) {
        extensions.insert(self);
    }

    fn find(&self, pred: impl Fn(&Slot) -> bool) -> Option<&Arc<Session>> {
        self.layers()
            .find(|layer| pred(&layer.slot))
            .map(|layer| &layer.session)
    }

    fn layers(&self) -> impl Iterator<Item = &Layer> {
        std::iter::successors(self.head.as_deref(), |layer| layer.parent.as_deref())
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::of(&parts.extensions))
    }
}
