//! Local draft backups and reconciliation against the server copy.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::PostFields;

/// Where a draft backup lives in the [`DraftStore`](crate::ports::DraftStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftKey {
    Post(Uuid),
    /// A post that has not been created on the server yet.
    NewPost,
}

impl DraftKey {
    pub fn storage_key(&self) -> String {
        match self {
            DraftKey::Post(id) => format!("post-backup-{id}"),
            DraftKey::NewPost => "new-post-draft".to_string(),
        }
    }

    pub fn post_id(&self) -> Option<Uuid> {
        match self {
            DraftKey::Post(id) => Some(*id),
            DraftKey::NewPost => None,
        }
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

/// Shadow copy of the form plus the moment it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftBackup {
    #[serde(flatten)]
    pub fields: PostFields,
    #[serde(rename = "backupAt")]
    pub saved_at: DateTime<Utc>,
}

impl DraftBackup {
    pub fn new(fields: PostFields, saved_at: DateTime<Utc>) -> Self {
        Self { fields, saved_at }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Decide whether a stored backup should be offered for restore.
///
/// `server_updated_at` is `None` for a post that doesn't exist on the server
/// yet; then any readable backup is offered. Otherwise the backup must be
/// strictly newer. An unreadable backup counts as no backup.
pub fn reconcile(server_updated_at: Option<DateTime<Utc>>, raw: Option<&str>) -> Option<DraftBackup> {
    let backup = match DraftBackup::parse(raw?) {
        Ok(backup) => backup,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unreadable draft backup");
            return None;
        }
    };

    match server_updated_at {
        Some(updated_at) if backup.saved_at <= updated_at => None,
        _ => Some(backup),
    }
}
