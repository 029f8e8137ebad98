//! Drives a [`SuggestionPipeline`] with real timers and network calls.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use quill_core::domain::Insertion;
use quill_core::editor::{SUGGESTION_DEBOUNCE, SuggestionPipeline, SuggestionState};
use quill_core::ports::CompletionGateway;

#[derive(Clone)]
pub struct SuggestionDriver {
    pipeline: Arc<Mutex<SuggestionPipeline>>,
    completer: Arc<dyn CompletionGateway>,
    debounce: Duration,
}

impl SuggestionDriver {
    pub fn new(completer: Arc<dyn CompletionGateway>) -> Self {
        Self::with_debounce(completer, SUGGESTION_DEBOUNCE)
    }

    pub fn with_debounce(completer: Arc<dyn CompletionGateway>, debounce: Duration) -> Self {
        Self {
            pipeline: Arc::new(Mutex::new(SuggestionPipeline::new())),
            completer,
            debounce,
        }
    }

    /// Record an edit and start its debounce timer.
    ///
    /// Earlier timers are not cancelled; they find their revision superseded
    /// and do nothing.
    pub async fn on_edit(
        &self,
        text: impl Into<String>,
        cursor_at_paragraph_end: bool,
        title: impl Into<String>,
    ) -> JoinHandle<()> {
        let revision = self
            .pipeline
            .lock()
            .await
            .on_edit(text, cursor_at_paragraph_end);
        let driver = self.clone();
        let title = title.into();

        tokio::spawn(async move {
            tokio::time::sleep(driver.debounce).await;

            let Some(request) = driver
                .pipeline
                .lock()
                .await
                .debounce_elapsed(revision, &title)
            else {
                return;
            };

            tracing::debug!(revision, "Requesting suggestion");
            let result = driver.completer.complete(&request).await;
            if driver.pipeline.lock().await.on_completion(revision, result) {
                tracing::debug!(revision, "Suggestion available");
            }
        })
    }

    pub async fn on_keystroke(&self) {
        self.pipeline.lock().await.on_keystroke();
    }

    pub async fn on_cursor_moved(&self, at_paragraph_end: bool) {
        self.pipeline.lock().await.on_cursor_moved(at_paragraph_end);
    }

    /// Tab: take the offered suggestion, if any.
    pub async fn accept(&self) -> Option<Insertion> {
        self.pipeline.lock().await.accept()
    }

    pub async fn dismiss(&self) {
        self.pipeline.lock().await.dismiss();
    }

    pub async fn suggestion(&self) -> Option<String> {
        self.pipeline.lock().await.suggestion().map(str::to_string)
    }

    pub async fn state(&self) -> SuggestionState {
        self.pipeline.lock().await.state().clone()
    }
}
