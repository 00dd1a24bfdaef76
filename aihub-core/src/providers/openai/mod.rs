//! OpenAI-compatible provider implementation
//!
//! DeepSeek, OpenAI and Groq all speak the chat completions format, so a
//! single adapter serves the three of them with different defaults.

mod client;
pub mod types;

pub use client::{OpenAICompatibleProvider, SamplingOptions};
