//! Composition generation boundary
//!
//! Generation runs outside the playback engine (a remote model, a local
//! heuristic, a fixture). The engine only needs a way to ask for a new
//! composition and a failure type it can report upward.

use thiserror::Error;
use tracing::info;

use octet_core::{Composition, GenerationParameters};

#[derive(Debug, Error)]
pub enum GenerationError {
    /// The backing generator cannot be reached at all.
    #[error("generation backend unavailable: {0}")]
    Unavailable(String),
    /// The generator responded but produced no usable composition.
    #[error("generation failed: {0}")]
    Failed(String),
}

/// Source of new compositions.
///
/// Implementations may block; callers decide whether to move the call
/// off the interactive thread.
pub trait GenerationBridge {
    fn generate(&self, params: &GenerationParameters) -> Result<Composition, GenerationError>;
}

/// Bridge that always returns the built-in sample composition.
///
/// Stands in when no generator is configured, and keeps the rest of the
/// engine exercisable offline.
#[derive(Debug, Default)]
pub struct SampleBridge;

impl GenerationBridge for SampleBridge {
    fn generate(&self, params: &GenerationParameters) -> Result<Composition, GenerationError> {
        info!(style = %params.style, "serving sample composition");
        Ok(Composition::sample())
    }
}
