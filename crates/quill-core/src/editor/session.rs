//! The editing session: one state machine for local backup, autosave and
//! manual saves.
//!
//! ```text
//!            edit                 tick / save             ok, no edits since
//!   Clean ─────────▶ DirtyLocal ─────────────▶ Saving ─────────────────────▶ Clean
//!                        ▲                       │ ok, edited meanwhile
//!                        └───────────────────────┤
//!                        ▲         edit          │ error
//!                        └──────── SaveFailed ◀──┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::backup::{DraftBackup, DraftKey, reconcile};
use crate::domain::{Post, PostFields, PostStatus, generate_slug};
use crate::ports::{DraftStore, GatewayError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    /// In-memory fields match what the server last acknowledged.
    Clean,
    /// Edited since the last successful save.
    DirtyLocal,
    /// A write is in flight. Doubles as the in-flight flag.
    Saving,
    /// The last write failed; edits are kept in memory and in the backup.
    SaveFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Autosave,
    Manual,
    /// Flip between draft and published, saving immediately.
    PublishToggle,
}

/// Why a save did not start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveRejected {
    #[error("Please enter a title")]
    MissingTitle,

    #[error("A save is already in progress")]
    InFlight,

    #[error("Autosave is paused while the post is published")]
    Published,

    #[error("Nothing to save")]
    NothingToSave,

    #[error("The post has not been created yet")]
    NotCreated,
}

/// Snapshot handed to whoever performs the network write.
#[derive(Debug, Clone)]
pub struct SaveTicket {
    pub kind: SaveKind,
    /// `None` means the write is a create.
    pub post_id: Option<Uuid>,
    pub fields: PostFields,
    revision: u64,
}

pub struct EditorSession {
    key: DraftKey,
    fields: PostFields,
    state: SaveState,
    revision: u64,
    server_updated_at: Option<DateTime<Utc>>,
    last_saved: Option<DateTime<Utc>>,
    last_error: Option<String>,
    store: Arc<dyn DraftStore>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("key", &self.key)
            .field("state", &self.state)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Start editing a post fetched from the server.
    ///
    /// Returns the backup to offer for restore, if a strictly newer one exists.
    pub fn open(post: &Post, store: Arc<dyn DraftStore>) -> (Self, Option<DraftBackup>) {
        let key = DraftKey::Post(post.id);
        let offer = reconcile(Some(post.updated_at), store.get(&key.storage_key()).as_deref());
        let session = Self {
            key,
            fields: post.fields(),
            state: SaveState::Clean,
            revision: 0,
            server_updated_at: Some(post.updated_at),
            last_saved: None,
            last_error: None,
            store,
        };
        (session, offer)
    }

    /// Start a post that doesn't exist on the server yet.
    pub fn new_post(store: Arc<dyn DraftStore>) -> (Self, Option<DraftBackup>) {
        let key = DraftKey::NewPost;
        let offer = reconcile(None, store.get(&key.storage_key()).as_deref());
        let session = Self {
            key,
            fields: PostFields::default(),
            state: SaveState::Clean,
            revision: 0,
            server_updated_at: None,
            last_saved: None,
            last_error: None,
            store,
        };
        (session, offer)
    }

    /// Replace every field with the backup's. No merging.
    pub fn restore(&mut self, backup: DraftBackup) {
        tracing::info!(key = %self.key, "Restoring local draft backup");
        self.fields = backup.fields;
        self.touch();
    }

    /// Apply an edit to the form.
    ///
    /// Read time is recomputed whenever the content changes, overwriting any
    /// manual value. The full form is mirrored into the draft store.
    pub fn edit(&mut self, f: impl FnOnce(&mut PostFields)) {
        let before = self.fields.content.clone();
        f(&mut self.fields);
        if self.fields.content != before {
            self.fields.read_time = self.fields.content.read_time();
        }
        self.touch();
    }

    /// Change the title; new posts also get a slug derived from it.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let is_new = self.key == DraftKey::NewPost;
        let title = title.into();
        self.edit(|fields| {
            if is_new {
                fields.slug = generate_slug(&title);
            }
            fields.title = title;
        });
    }

    pub fn set_status(&mut self, status: PostStatus) {
        self.edit(|fields| fields.status = status);
    }

    fn touch(&mut self) {
        self.revision += 1;
        if self.state != SaveState::Saving {
            self.state = SaveState::DirtyLocal;
        }
        self.mirror();
    }

    fn mirror(&self) {
        if self.key == DraftKey::NewPost && self.fields.is_blank() {
            return;
        }
        let backup = DraftBackup::new(self.fields.clone(), Utc::now());
        let result = backup
            .to_json()
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.store
                    .set(&self.key.storage_key(), &json)
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            tracing::warn!(key = %self.key, error = %e, "Failed to write draft backup");
        }
    }

    /// Whether a timer tick would start a save right now.
    pub fn autosave_due(&self) -> bool {
        self.check_autosave().is_ok()
    }

    fn check_autosave(&self) -> Result<Uuid, SaveRejected> {
        let id = self.key.post_id().ok_or(SaveRejected::NotCreated)?;
        match self.state {
            SaveState::Saving => Err(SaveRejected::InFlight),
            _ if self.fields.status == PostStatus::Published => Err(SaveRejected::Published),
            _ if self.fields.title.trim().is_empty() => Err(SaveRejected::MissingTitle),
            SaveState::Clean => Err(SaveRejected::NothingToSave),
            SaveState::DirtyLocal | SaveState::SaveFailed => Ok(id),
        }
    }

    /// Timer tick: start an autosave if one is due.
    pub fn begin_autosave(&mut self) -> Result<SaveTicket, SaveRejected> {
        let id = self.check_autosave()?;
        Ok(self.start(SaveKind::Autosave, Some(id), self.fields.clone()))
    }

    /// Explicit save (or create, for a new post).
    pub fn begin_save(&mut self) -> Result<SaveTicket, SaveRejected> {
        if self.state == SaveState::Saving {
            return Err(SaveRejected::InFlight);
        }
        if self.fields.title.trim().is_empty() {
            return Err(SaveRejected::MissingTitle);
        }
        Ok(self.start(SaveKind::Manual, self.key.post_id(), self.fields.clone()))
    }

    /// Flip between draft and published and save right away.
    ///
    /// The in-memory status only changes once the server accepts it.
    pub fn begin_publish_toggle(&mut self) -> Result<SaveTicket, SaveRejected> {
        let id = self.key.post_id().ok_or(SaveRejected::NotCreated)?;
        if self.state == SaveState::Saving {
            return Err(SaveRejected::InFlight);
        }
        let mut fields = self.fields.clone();
        fields.status = match fields.status {
            PostStatus::Published => PostStatus::Draft,
            _ => PostStatus::Published,
        };
        Ok(self.start(SaveKind::PublishToggle, Some(id), fields))
    }

    fn start(&mut self, kind: SaveKind, post_id: Option<Uuid>, fields: PostFields) -> SaveTicket {
        tracing::debug!(key = %self.key, ?kind, revision = self.revision, "Save started");
        self.state = SaveState::Saving;
        SaveTicket {
            kind,
            post_id,
            fields,
            revision: self.revision,
        }
    }

    /// Record the outcome of a write started with `ticket`.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<Post, GatewayError>,
    ) -> Result<(), GatewayError> {
        match result {
            Ok(post) => {
                if self.key == DraftKey::NewPost {
                    self.discard_backup();
                    self.key = DraftKey::Post(post.id);
                }
                if ticket.kind == SaveKind::PublishToggle {
                    self.fields.status = post.status;
                    self.mirror();
                }
                self.server_updated_at = Some(post.updated_at);
                self.last_saved = Some(Utc::now());
                self.last_error = None;
                self.state = if self.revision == ticket.revision {
                    SaveState::Clean
                } else {
                    SaveState::DirtyLocal
                };
                tracing::debug!(key = %self.key, kind = ?ticket.kind, "Save finished");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(key = %self.key, kind = ?ticket.kind, error = %e, "Save failed");
                self.last_error = Some(e.to_string());
                self.state = SaveState::SaveFailed;
                Err(e)
            }
        }
    }

    /// The write for `ticket` ended without an outcome (its task died).
    /// Leaves the session retryable with edits intact.
    pub fn abandon_save(&mut self, ticket: &SaveTicket, reason: &str) {
        if self.state != SaveState::Saving {
            return;
        }
        tracing::warn!(key = %self.key, kind = ?ticket.kind, reason, "Save abandoned");
        self.last_error = Some(reason.to_string());
        self.state = SaveState::SaveFailed;
    }

    /// Drop the local backup, after a successful delete or create.
    pub fn discard_backup(&self) {
        if let Err(e) = self.store.clear(&self.key.storage_key()) {
            tracing::warn!(key = %self.key, error = %e, "Failed to clear draft backup");
        }
    }

    pub fn key(&self) -> DraftKey {
        self.key
    }

    pub fn fields(&self) -> &PostFields {
        &self.fields
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    pub fn is_saving(&self) -> bool {
        self.state == SaveState::Saving
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn word_count(&self) -> usize {
        self.fields.content.word_count()
    }

    pub fn server_updated_at(&self) -> Option<DateTime<Utc>> {
        self.server_updated_at
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContentNode;
    use crate::ports::DraftStoreError;
    use chrono::TimeDelta;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore(Mutex<HashMap<String, String>>);

    impl DraftStore for MapStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.lock().unwrap().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) -> Result<(), DraftStoreError> {
            self.0.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn clear(&self, key: &str) -> Result<(), DraftStoreError> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn server_post(status: PostStatus) -> Post {
        Post::new(
            Uuid::new_v4(),
            PostFields {
                title: "Server title".to_string(),
                slug: "server-title".to_string(),
                status,
                ..PostFields::default()
            },
        )
    }

    fn saved(post: &Post, fields: &PostFields) -> Post {
        let mut copy = post.clone();
        copy.apply(fields.clone(), Utc::now());
        copy
    }

    #[test]
    fn test_edit_mirrors_backup_and_marks_dirty() {
        let store = Arc::new(MapStore::default());
        let post = server_post(PostStatus::Draft);
        let (mut session, offer) = EditorSession::open(&post, store.clone());
        assert!(offer.is_none());
        assert_eq!(session.state(), SaveState::Clean);

        session.set_title("Edited");
        assert_eq!(session.state(), SaveState::DirtyLocal);
        // Existing posts keep their slug when retitled.
        assert_eq!(session.fields().slug, "server-title");

        let raw = store.get(&DraftKey::Post(post.id).storage_key()).unwrap();
        assert_eq!(DraftBackup::parse(&raw).unwrap().fields.title, "Edited");
    }

    #[test]
    fn test_open_offers_newer_backup_and_restore_replaces_everything() {
        let store = Arc::new(MapStore::default());
        let post = server_post(PostStatus::Draft);
        let local = PostFields {
            title: "Local".to_string(),
            slug: "local".to_string(),
            excerpt: Some("only in backup".to_string()),
            ..PostFields::default()
        };
        let backup = DraftBackup::new(local.clone(), post.updated_at + TimeDelta::seconds(30));
        store
            .set(&DraftKey::Post(post.id).storage_key(), &backup.to_json().unwrap())
            .unwrap();

        let (mut session, offer) = EditorSession::open(&post, store);
        let offer = offer.expect("newer backup should be offered");
        session.restore(offer);
        assert_eq!(session.fields(), &local);
        assert_eq!(session.state(), SaveState::DirtyLocal);
    }

    #[test]
    fn test_content_edit_recomputes_read_time() {
        let store = Arc::new(MapStore::default());
        let (mut session, _) = EditorSession::open(&server_post(PostStatus::Draft), store);

        session.edit(|f| f.read_time = "9m".to_string());
        assert_eq!(session.fields().read_time, "9m");

        let words = vec!["word"; 201].join(" ");
        session.edit(|f| {
            f.content = ContentNode::doc(vec![ContentNode::paragraph(vec![ContentNode::text(
                words,
            )])])
        });
        assert_eq!(session.fields().read_time, "2m");
        assert_eq!(session.word_count(), 201);
    }

    #[test]
    fn test_manual_save_while_autosave_in_flight_is_rejected() {
        let store = Arc::new(MapStore::default());
        let post = server_post(PostStatus::Draft);
        let (mut session, _) = EditorSession::open(&post, store);
        session.set_title("Dirty");

        let ticket = session.begin_autosave().unwrap();
        assert_eq!(ticket.kind, SaveKind::Autosave);
        assert_eq!(session.begin_save().unwrap_err(), SaveRejected::InFlight);
        assert_eq!(session.begin_autosave().unwrap_err(), SaveRejected::InFlight);

        let result = Ok(saved(&post, &ticket.fields));
        session.finish_save(ticket, result).unwrap();
        assert_eq!(session.state(), SaveState::Clean);
        assert!(session.last_saved().is_some());
    }

    #[test]
    fn test_edit_during_save_leaves_session_dirty() {
        let store = Arc::new(MapStore::default());
        let post = server_post(PostStatus::Draft);
        let (mut session, _) = EditorSession::open(&post, store);
        session.set_title("First");

        let ticket = session.begin_save().unwrap();
        session.set_title("Second");
        assert_eq!(session.state(), SaveState::Saving);

        let result = Ok(saved(&post, &ticket.fields));
        session.finish_save(ticket, result).unwrap();
        assert_eq!(session.state(), SaveState::DirtyLocal);
        assert!(session.autosave_due());
    }

    #[test]
    fn test_failed_save_keeps_edits() {
        let store = Arc::new(MapStore::default());
        let (mut session, _) = EditorSession::open(&server_post(PostStatus::Draft), store);
        session.set_title("Keep me");

        let ticket = session.begin_save().unwrap();
        let err = GatewayError::Rejected {
            status: 409,
            message: "A post with this slug already exists".to_string(),
        };
        assert!(session.finish_save(ticket, Err(err)).is_err());
        assert_eq!(session.state(), SaveState::SaveFailed);
        assert_eq!(session.fields().title, "Keep me");
        assert_eq!(
            session.last_error(),
            Some("A post with this slug already exists")
        );
        assert!(session.autosave_due());
    }

    #[test]
    fn test_autosave_gating() {
        let store = Arc::new(MapStore::default());
        let (mut session, _) = EditorSession::open(&server_post(PostStatus::Draft), store.clone());
        assert_eq!(session.begin_autosave().unwrap_err(), SaveRejected::NothingToSave);

        session.set_title("");
        assert_eq!(session.begin_autosave().unwrap_err(), SaveRejected::MissingTitle);
        assert_eq!(session.begin_save().unwrap_err(), SaveRejected::MissingTitle);

        let (mut published, _) = EditorSession::open(&server_post(PostStatus::Published), store);
        published.set_title("Edited live");
        assert_eq!(published.begin_autosave().unwrap_err(), SaveRejected::Published);
        assert!(!published.autosave_due());
        assert!(published.begin_save().is_ok());
    }

    #[test]
    fn test_blank_title_blocks_autosave_like_manual_save() {
        let store = Arc::new(MapStore::default());
        let (mut session, _) = EditorSession::open(&server_post(PostStatus::Draft), store);
        session.set_title("   ");

        assert_eq!(session.begin_save().unwrap_err(), SaveRejected::MissingTitle);
        assert_eq!(session.begin_autosave().unwrap_err(), SaveRejected::MissingTitle);
        assert!(!session.autosave_due());
    }

    #[test]
    fn test_abandoned_save_can_be_retried() {
        let store = Arc::new(MapStore::default());
        let (mut session, _) = EditorSession::open(&server_post(PostStatus::Draft), store);
        session.set_title("Unsent");

        let ticket = session.begin_save().unwrap();
        session.abandon_save(&ticket, "Save interrupted");
        assert_eq!(session.state(), SaveState::SaveFailed);
        assert_eq!(session.last_error(), Some("Save interrupted"));
        assert_eq!(session.fields().title, "Unsent");
        assert!(session.begin_save().is_ok());
    }

    #[test]
    fn test_publish_toggle_applies_status_after_success() {
        let store = Arc::new(MapStore::default());
        let post = server_post(PostStatus::Draft);
        let (mut session, _) = EditorSession::open(&post, store);

        let ticket = session.begin_publish_toggle().unwrap();
        assert_eq!(ticket.fields.status, PostStatus::Published);
        assert_eq!(session.fields().status, PostStatus::Draft);

        let result = Ok(saved(&post, &ticket.fields));
        session.finish_save(ticket, result).unwrap();
        assert_eq!(session.fields().status, PostStatus::Published);
        assert!(!session.autosave_due());
    }

    #[test]
    fn test_new_post_flow() {
        let store = Arc::new(MapStore::default());
        let (mut session, offer) = EditorSession::new_post(store.clone());
        assert!(offer.is_none());
        assert_eq!(session.begin_autosave().unwrap_err(), SaveRejected::NotCreated);

        // A blank form never lands in the store.
        session.edit(|f| f.category = Some("Sales".to_string()));
        assert!(store.get("new-post-draft").is_none());

        session.set_title("Hello, World!");
        assert_eq!(session.fields().slug, "hello-world");
        assert!(store.get("new-post-draft").is_some());

        let ticket = session.begin_save().unwrap();
        assert!(ticket.post_id.is_none());
        let created = Post::new(Uuid::new_v4(), ticket.fields.clone());
        let id = created.id;
        session.finish_save(ticket, Ok(created)).unwrap();

        assert!(store.get("new-post-draft").is_none());
        assert_eq!(session.key(), DraftKey::Post(id));
    }

    #[test]
    fn test_new_post_offers_existing_draft() {
        let store = Arc::new(MapStore::default());
        let fields = PostFields {
            title: "Half written".to_string(),
            ..PostFields::default()
        };
        let raw = DraftBackup::new(fields, Utc::now()).to_json().unwrap();
        store.set("new-post-draft", &raw).unwrap();

        let (_, offer) = EditorSession::new_post(store);
        assert_eq!(offer.unwrap().fields.title, "Half written");
    }
}
