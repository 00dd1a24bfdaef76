//! Protocol module for prompt and routing outcome structures
//!
//! This module defines the data that flows through a single generation request:
//! - The validated caller [`Prompt`]
//! - One [`AttemptResult`] per provider tried
//! - The final [`RoutingOutcome`] returned to the caller

pub mod types;

pub use types::{
    AttemptOutcome, AttemptResult, Prompt, PromptError, RoutingOutcome, NO_PROVIDER,
};
