//! Local draft persistence port.

/// Client-scoped key-value store holding editor backups.
///
/// Calls are synchronous: every edit mirrors into the store before the edit
/// returns.
pub trait DraftStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), DraftStoreError>;

    fn clear(&self, key: &str) -> Result<(), DraftStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DraftStoreError {
    #[error("Draft store I/O failed: {0}")]
    Io(String),

    #[error("Draft serialization failed: {0}")]
    Serialization(String),
}
