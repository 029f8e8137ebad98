//! Passive "ghost text" suggestions as an explicit pipeline:
//! edit → debounce → eligibility → fetch → apply if still eligible.
//!
//! Each edit bumps a revision. Debounce timers and responses carry the
//! revision they were started for and are dropped when it is no longer current.

use std::time::Duration;

use crate::domain::{AssistRequest, Insertion};
use crate::ports::GatewayError;

/// Idle time after the last keystroke before a suggestion is requested.
pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(1500);

/// Minimum document length (chars) worth continuing.
pub const MIN_SUGGESTION_CONTEXT: usize = 50;

/// Completions this short (after trimming) are noise and never shown.
const MIN_SUGGESTION_CHARS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionState {
    Idle,
    Debouncing,
    InFlight,
    Available(String),
}

#[derive(Debug)]
pub struct SuggestionPipeline {
    revision: u64,
    text: String,
    cursor_at_paragraph_end: bool,
    state: SuggestionState,
}

impl Default for SuggestionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionPipeline {
    pub fn new() -> Self {
        Self {
            revision: 0,
            text: String::new(),
            cursor_at_paragraph_end: false,
            state: SuggestionState::Idle,
        }
    }

    /// The document changed. Discards any pending suggestion and restarts
    /// the debounce; returns the revision the debounce timer must present.
    pub fn on_edit(&mut self, text: impl Into<String>, cursor_at_paragraph_end: bool) -> u64 {
        self.revision += 1;
        self.text = text.into();
        self.cursor_at_paragraph_end = cursor_at_paragraph_end;
        self.state = SuggestionState::Debouncing;
        self.revision
    }

    /// A printable keystroke arrived. Whatever was pending is now stale.
    pub fn on_keystroke(&mut self) {
        if matches!(
            self.state,
            SuggestionState::InFlight | SuggestionState::Available(_)
        ) {
            self.revision += 1;
            self.state = SuggestionState::Idle;
        }
    }

    /// Leaving the paragraph end withdraws any suggestion on offer.
    pub fn on_cursor_moved(&mut self, at_paragraph_end: bool) {
        self.cursor_at_paragraph_end = at_paragraph_end;
        if !at_paragraph_end {
            self.dismiss();
        }
    }

    /// The debounce for `revision` ran out. Returns the request to send when
    /// the edit is still current and the cursor sits at a paragraph end.
    pub fn debounce_elapsed(&mut self, revision: u64, title: &str) -> Option<AssistRequest> {
        if revision != self.revision || self.state != SuggestionState::Debouncing {
            return None;
        }
        if !self.cursor_at_paragraph_end || self.text.chars().count() < MIN_SUGGESTION_CONTEXT {
            self.state = SuggestionState::Idle;
            return None;
        }
        self.state = SuggestionState::InFlight;
        Some(AssistRequest::suggestion(&self.text, title))
    }

    /// A completion for `revision` came back. Returns whether a suggestion
    /// is now on offer.
    pub fn on_completion(&mut self, revision: u64, result: Result<String, GatewayError>) -> bool {
        if revision != self.revision || self.state != SuggestionState::InFlight {
            tracing::trace!(revision, current = self.revision, "Dropping stale completion");
            return false;
        }

        let completion = match result {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::debug!(error = %e, "Suggestion request failed");
                self.state = SuggestionState::Idle;
                return false;
            }
        };

        if !self.cursor_at_paragraph_end || completion.chars().count() < MIN_SUGGESTION_CHARS {
            self.state = SuggestionState::Idle;
            return false;
        }

        self.state = SuggestionState::Available(completion);
        true
    }

    /// Accept the offered suggestion, if any.
    pub fn accept(&mut self) -> Option<Insertion> {
        match std::mem::replace(&mut self.state, SuggestionState::Idle) {
            SuggestionState::Available(text) => Some(Insertion::InsertAtCursor(format!(" {text}"))),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn dismiss(&mut self) {
        if matches!(self.state, SuggestionState::Available(_)) {
            self.state = SuggestionState::Idle;
        }
    }

    pub fn suggestion(&self) -> Option<&str> {
        match &self.state {
            SuggestionState::Available(text) => Some(text),
            _ => None,
        }
    }

    pub fn state(&self) -> &SuggestionState {
        &self.state
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
