//! Async driver around [`EditorSession`].
//!
//! The session lives behind a `tokio::sync::Mutex`. Writes are started and
//! finished under the lock but the network call itself runs without it, so
//! edits keep flowing while a save is in flight. The session's `Saving` state
//! is the only in-flight flag.
//!
//! Each write runs on its own task, so a caller that stops waiting (a dropped
//! autosave handle, a timeout) never strands the session in `Saving`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use quill_core::domain::{PostFields, PostStatus};
use quill_core::editor::{DraftBackup, EditorSession, SaveRejected, SaveTicket};
use quill_core::ports::{DraftStore, GatewayError, PostGateway};

/// Default autosave period.
pub const AUTOSAVE_PERIOD: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The post could not be loaded. Not retried.
    #[error("Post not found")]
    NotFound,

    #[error(transparent)]
    Rejected(#[from] SaveRejected),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The write task died before reporting an outcome.
    #[error("Save interrupted")]
    Interrupted,
}

#[derive(Clone)]
pub struct EditorController {
    session: Arc<Mutex<EditorSession>>,
    posts: Arc<dyn PostGateway>,
}

impl EditorController {
    /// Load a post for editing. Also returns the local backup to offer, if
    /// one is newer than the server copy.
    pub async fn open(
        posts: Arc<dyn PostGateway>,
        id: Uuid,
        store: Arc<dyn DraftStore>,
    ) -> Result<(Self, Option<DraftBackup>), EditorError> {
        let post = posts.fetch(id).await.map_err(|e| {
            tracing::warn!(post_id = %id, error = %e, "Failed to load post");
            EditorError::NotFound
        })?;

        let (session, offer) = EditorSession::open(&post, store);
        Ok((Self::wrap(session, posts), offer))
    }

    /// Start an unsaved post.
    pub fn new_post(posts: Arc<dyn PostGateway>, store: Arc<dyn DraftStore>) -> (Self, Option<DraftBackup>) {
        let (session, offer) = EditorSession::new_post(store);
        (Self::wrap(session, posts), offer)
    }

    fn wrap(session: EditorSession, posts: Arc<dyn PostGateway>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            posts,
        }
    }

    pub async fn restore(&self, backup: DraftBackup) {
        self.session.lock().await.restore(backup);
    }

    pub async fn edit(&self, f: impl FnOnce(&mut PostFields)) {
        self.session.lock().await.edit(f);
    }

    pub async fn set_title(&self, title: impl Into<String>) {
        self.session.lock().await.set_title(title);
    }

    pub async fn set_status(&self, status: PostStatus) {
        self.session.lock().await.set_status(status);
    }

    /// Read from the session without holding the lock beyond `f`.
    pub async fn with_session<R>(&self, f: impl FnOnce(&EditorSession) -> R) -> R {
        f(&*self.session.lock().await)
    }

    /// Explicit save; creates the post when it doesn't exist yet.
    pub async fn save(&self) -> Result<(), EditorError> {
        let ticket = self.session.lock().await.begin_save()?;
        self.run(ticket).await
    }

    /// One autosave tick. Rejections mean "nothing to do right now".
    pub async fn autosave(&self) -> Result<(), EditorError> {
        let ticket = self.session.lock().await.begin_autosave()?;
        self.run(ticket).await
    }

    /// Flip between draft and published and save immediately.
    pub async fn toggle_publish(&self) -> Result<PostStatus, EditorError> {
        let ticket = self.session.lock().await.begin_publish_toggle()?;
        self.run(ticket).await?;
        Ok(self.with_session(|s| s.fields().status).await)
    }

    async fn run(&self, ticket: SaveTicket) -> Result<(), EditorError> {
        let session = self.session.clone();
        let posts = self.posts.clone();
        let pending = ticket.clone();

        let write = tokio::spawn(async move {
            let result = match ticket.post_id {
                Some(id) => posts.update(id, &ticket.fields).await,
                None => posts.create(&ticket.fields).await,
            };
            session.lock().await.finish_save(ticket, result)
        });

        match write.await {
            Ok(outcome) => Ok(outcome?),
            Err(e) => {
                tracing::error!(error = %e, "Save task failed");
                self.session
                    .lock()
                    .await
                    .abandon_save(&pending, "Save interrupted");
                Err(EditorError::Interrupted)
            }
        }
    }

    /// Delete the post on the server and drop its local backup.
    pub async fn delete(&self) -> Result<(), EditorError> {
        let id = self
            .with_session(|s| s.key().post_id())
            .await
            .ok_or(SaveRejected::NotCreated)?;
        self.posts.delete(id).await?;
        self.session.lock().await.discard_backup();
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    /// Run autosave every `period` until the returned handle is dropped.
    /// Missed ticks are skipped, never queued.
    pub fn spawn_autosave(&self, period: Duration) -> AutosaveHandle {
        let controller = self.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                match controller.autosave().await {
                    Ok(()) => tracing::debug!("Autosaved"),
                    Err(EditorError::Rejected(reason)) => {
                        tracing::trace!(%reason, "Autosave skipped");
                    }
                    Err(e) => tracing::warn!(error = %e, "Autosave failed"),
                }
            }
        });
        AutosaveHandle { task }
    }
}

/// Owns the autosave task; dropping it stops the timer.
#[must_use = "autosave stops when the handle is dropped"]
pub struct AutosaveHandle {
    task: JoinHandle<()>,
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
