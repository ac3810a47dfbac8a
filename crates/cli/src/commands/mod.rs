//! Command handlers for the artex CLI.

pub mod ask;
pub mod process;
pub mod status;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use process::ProcessCommand;
pub use status::StatusCommand;
