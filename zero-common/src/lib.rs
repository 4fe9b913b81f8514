//! Zero Common - Shared types and utilities for the Zero session services.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Error types and handling utilities
//! - Logging setup and trace ID helpers

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, ObservabilityConfig, ServerConfig, SessionsConfig};
pub use error::{Error, Result, ResultExt};
