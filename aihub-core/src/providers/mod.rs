//! Provider abstraction and fallback routing
//!
//! This module implements the uniform adapter contract every text-generation
//! backend is wrapped in, the concrete adapters, and the router that tries
//! them in a fixed order.

pub mod adapter;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod routing;

pub use adapter::{Provider, ProviderType};
pub use error::{
    ConfigurationError, ExhaustionError, GenerationError, GenerationResult, RoutingError,
};
pub use routing::{
    ChainEntry, FallbackRouter, RoutingBuilder, RoutingStrategy, DEFAULT_ATTEMPT_TIMEOUT,
};

// Re-export concrete providers
pub use gemini::GeminiProvider;
pub use mock::{MockProvider, ScriptedProvider};
pub use openai::OpenAICompatibleProvider;
