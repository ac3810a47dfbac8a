//! Ask command handler.
//!
//! Answers a question against the persisted index via the Gemini API.

use clap::Args;

use artex_core::{AppConfig, AppError, AppResult};
use artex_llm::{create_client, select_model};

/// Ask a question against the indexed articles
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Question text
    pub question: String,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        // Never contact the API when there is nothing to query
        if !config.index_path().exists() {
            return Err(AppError::IndexMissing);
        }

        let api_key = config.require_api_key()?;

        let mut config = config.clone();
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }

        let client = create_client(api_key);
        let model = select_model(client.as_ref(), &config.models).await?;

        let response =
            artex_knowledge::rag::ask(&config, client.as_ref(), &model, &self.question).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            println!("Answer:");
            println!("{}", response.answer);
            println!();

            if response.sources.is_empty() {
                println!("Sources: (no sources available)");
            } else {
                println!("Sources:");
                for (i, source) in response.sources.iter().enumerate() {
                    println!("{}. {}", i + 1, source.source_url);
                    println!("   {}", source.snippet);
                }
            }
        }

        Ok(())
    }
}
