use std::collections::HashMap;
use std::sync::RwLock;

use quill_core::ports::{DraftStore, DraftStoreError};

/// Draft store that lives as long as the editor process.
///
/// Uses a blocking lock: the store is touched on every edit and never held
/// across an await.
#[derive(Default)]
pub struct InMemoryDraftStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> DraftStoreError {
    DraftStoreError::Io("draft store lock poisoned".to_string())
}

impl DraftStore for InMemoryDraftStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DraftStoreError> {
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), DraftStoreError> {
        self.entries.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}
