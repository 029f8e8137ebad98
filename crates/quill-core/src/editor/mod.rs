//! Editor-side logic of the admin post form.
//!
//! Everything here is synchronous state; the async drivers that add timers
//! and network calls live in `quill-client`.

mod backup;
mod session;
mod suggest;

pub use backup::{DraftBackup, DraftKey, reconcile};
pub use session::{EditorSession, SaveKind, SaveRejected, SaveState, SaveTicket};
pub use suggest::{
    MIN_SUGGESTION_CONTEXT, SUGGESTION_DEBOUNCE, SuggestionPipeline, SuggestionState,
};
