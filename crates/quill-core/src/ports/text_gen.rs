//! Text generation provider port.

use async_trait::async_trait;

/// A hosted language model turning a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, TextGenError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TextGenError {
    /// No provider credential is configured.
    #[error("AI feature not configured")]
    NotConfigured,

    #[error("Provider request failed: {0}")]
    Provider(String),

    #[error("Provider returned no text")]
    Empty,
}
