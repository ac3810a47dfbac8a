//! Retrieval-augmented question answering over the persisted index.

pub mod ask;
pub mod types;

pub use ask::ask;
pub use types::{RagResponse, SourceRef};
