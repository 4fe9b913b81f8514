//! The session value handed out by a [`SessionSource`](crate::SessionSource).
//!
//! Binders never look inside a session; they only store and return
//! `Arc<Session>` handles. Handlers read and write the attribute bag.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// A request-scoped session.
#[derive(Debug)]
pub struct Session {
    id: String,
    name: String,
    is_new: bool,
    created_at: DateTime<Utc>,
    values: RwLock<HashMap<String, Value>>,
}

impl Session {
    /// Create a fresh session with a random ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            is_new: true,
            created_at: Utc::now(),
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session for an ID the source already knew about.
    pub fn existing(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_new: false,
            ..Self::new(name)
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the source created this session for the current request.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Read an attribute.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Set an attribute, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into())
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// Copy of all attributes.
    pub fn values(&self) -> HashMap<String, Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
