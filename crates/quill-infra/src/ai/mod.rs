//! Text generation providers for the writing assistant.

mod gemini;

use async_trait::async_trait;

use quill_core::ports::{TextGenError, TextGenerator};

pub use gemini::{GeminiConfig, GeminiTextGenerator};

/// Stand-in used when no provider key is configured. Every call fails with
/// [`TextGenError::NotConfigured`].
pub struct UnconfiguredTextGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredTextGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, TextGenError> {
        Err(TextGenError::NotConfigured)
    }
}
