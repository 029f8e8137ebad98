use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use quill_core::ports::{DraftStore, DraftStoreError};

/// Draft store keeping one JSON file per key under a directory, so backups
/// survive an editor crash or restart.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    /// Open (and create if needed) the backup directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, DraftStoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| DraftStoreError::Io(e.to_string()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl DraftStore for FileDraftStore {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read draft backup");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DraftStoreError> {
        let path = self.path(key);
        // Write-then-rename so a crash mid-write never leaves half a backup.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| DraftStoreError::Io(e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| DraftStoreError::Io(e.to_string()))
    }

    fn clear(&self, key: &str) -> Result<(), DraftStoreError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DraftStoreError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::open(dir.path().join("drafts")).unwrap();
        store.set("post-backup-new-post-draft", r#"{"title":"Hi"}"#).unwrap();

        let reopened = FileDraftStore::open(store.dir()).unwrap();
        assert_eq!(
            reopened.get("post-backup-new-post-draft").as_deref(),
            Some(r#"{"title":"Hi"}"#)
        );
    }

    #[test]
    fn test_clear_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::open(dir.path()).unwrap();
        assert!(store.clear("post-backup-x").is_ok());
        assert!(store.get("post-backup-x").is_none());
    }

    #[test]
    fn test_keys_cannot_escape_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::open(dir.path()).unwrap();
        store.set("../escape", "x").unwrap();

        assert_eq!(store.path("../escape").parent(), Some(dir.path()));
        assert_eq!(store.get("../escape").as_deref(), Some("x"));
    }
}
