//! # Quill Shared
//!
//! Wire types shared by the API server and the editor client.

pub mod convert;
pub mod dto;
pub mod response;

pub use response::ErrorResponse;
