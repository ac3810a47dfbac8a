//! Process command handler.
//!
//! Fetches article URLs and rebuilds the persisted index over their text.

use clap::Args;

use artex_core::{AppConfig, AppResult};

/// Fetch article URLs and (re)build the semantic index
#[derive(Args, Debug)]
pub struct ProcessCommand {
    /// Article URLs to fetch and index
    #[arg(required = true, num_args = 1..=10, value_name = "URL")]
    pub urls: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProcessCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Processing {} URL(s)", self.urls.len());

        let stats = artex_knowledge::build(config, &self.urls).await?;

        if self.json {
            let output = serde_json::json!({
                "sourcesCount": stats.sources_count,
                "chunksCount": stats.chunks_count,
                "bytesProcessed": stats.bytes_processed,
                "durationSecs": stats.duration_secs,
                "indexPath": config.index_path(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Indexed {} chunks from {} source(s) ({} bytes) in {:.2}s",
                stats.chunks_count, stats.sources_count, stats.bytes_processed, stats.duration_secs
            );
            println!("You can now ask questions with `artex ask \"...\"`.");
        }

        Ok(())
    }
}
