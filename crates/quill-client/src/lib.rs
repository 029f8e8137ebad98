//! # Quill Client
//!
//! Everything the post editor needs besides rendering: an HTTP client for
//! the admin API, the editor controller that drives saves and autosave, and
//! the passive suggestion driver.

pub mod assist;
pub mod controller;
pub mod http;
pub mod suggest;

pub use assist::assist;
pub use controller::{AutosaveHandle, EditorController, EditorError};
pub use http::ApiClient;
pub use suggest::SuggestionDriver;
