//! # Quill Core
//!
//! The domain layer of the Quill blog CMS.
//! Pure business logic: posts, authors, read-time derivation, the editor
//! draft/autosave/suggestion state machines and the ports infrastructure
//! must implement.

pub mod domain;
pub mod editor;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
