//! Status command handler.
//!
//! Reports whether an index is available and its statistics.

use clap::Args;

use artex_core::{AppConfig, AppError, AppResult};

/// Show index availability and statistics
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match artex_knowledge::stats(config) {
            Ok(stats) => {
                if self.json {
                    let output = serde_json::json!({
                        "indexAvailable": true,
                        "indexPath": config.index_path(),
                        "sourcesCount": stats.sources_count,
                        "chunksCount": stats.chunks_count,
                        "sizeBytes": stats.size_bytes,
                        "embedder": stats.embedder,
                        "dimensions": stats.dimensions,
                        "builtAt": stats.built_at,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                } else {
                    println!("Index available - ready for questions");
                    println!("  path     : {}", config.index_path().display());
                    println!("  sources  : {}", stats.sources_count);
                    println!("  chunks   : {}", stats.chunks_count);
                    println!("  size     : {} bytes", stats.size_bytes);
                    println!("  embedder : {} ({} dims)", stats.embedder, stats.dimensions);
                    println!("  built at : {}", stats.built_at);
                }
                Ok(())
            }
            // Not an error from the user's point of view; status reports state
            Err(AppError::IndexMissing) => {
                if self.json {
                    let output = serde_json::json!({
                        "indexAvailable": false,
                        "indexPath": config.index_path(),
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                } else {
                    println!("No index found - process URLs first");
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
