//! Embedding provider implementations.

pub mod trigram;

pub use trigram::TrigramProvider;
