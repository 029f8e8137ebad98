//! Local draft stores backing editor crash recovery.

mod file;
mod memory;

pub use file::FileDraftStore;
pub use memory::InMemoryDraftStore;
