//! AI Solutions Hub core library
//!
//! This crate provides multi-provider text generation with deterministic,
//! priority-ordered fallback. A [`providers::FallbackRouter`] holds an ordered
//! chain of [`providers::Provider`] adapters and tries them one at a time until
//! one produces text, collecting per-provider diagnostics along the way.

pub mod config;
pub mod http;
pub mod protocol;
pub mod providers;

/// Returns the version of the AI Solutions Hub core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
