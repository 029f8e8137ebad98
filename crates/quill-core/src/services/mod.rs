//! Application services - use cases composed from domain types and ports.

mod posts;

pub use posts::{Actor, PostService};
