//! Client-side ports: how the editor reaches the admin API.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AssistRequest, Post, PostFields};

/// Admin post endpoints as seen by the editor.
#[async_trait]
pub trait PostGateway: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Post, GatewayError>;

    async fn create(&self, fields: &PostFields) -> Result<Post, GatewayError>;

    async fn update(&self, id: Uuid, fields: &PostFields) -> Result<Post, GatewayError>;

    async fn delete(&self, id: Uuid) -> Result<(), GatewayError>;
}

/// The AI completion endpoint as seen by the editor.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, request: &AssistRequest) -> Result<String, GatewayError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("AI feature not configured")]
    NotConfigured,

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::Rejected { status: 404, .. })
    }
}
