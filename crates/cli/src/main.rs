//! artex CLI
//!
//! Main entry point for the artex command-line tool: process article URLs
//! into a local semantic index and ask questions against it.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ProcessCommand, StatusCommand};
use artex_core::{config::AppConfig, logging, AppError};
use std::path::PathBuf;
use std::process::ExitCode;

/// artex - ask questions about news articles with a local semantic index
#[derive(Parser, Debug)]
#[command(name = "artex")]
#[command(about = "Article research tool: index article URLs, then ask questions", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the persisted index (default: ./data)
    #[arg(short, long, global = true, env = "ARTEX_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "ARTEX_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Pin a single model instead of the fallback list
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch article URLs and (re)build the semantic index
    Process(ProcessCommand),

    /// Ask a question against the indexed articles
    Ask(AskCommand),

    /// Show index availability and statistics
    Status(StatusCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before anything reads the environment, so GEMINI_API_KEY
    // can live there
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = config.with_overrides(
        cli.data_dir,
        cli.config,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    if let Err(e) = logging::init_logging(config.log_level.as_deref(), config.no_color) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    tracing::debug!("Data directory: {:?}", config.data_dir);
    tracing::debug!("Models: {:?}", config.models);

    let command_name = match &cli.command {
        Commands::Process(_) => "process",
        Commands::Ask(_) => "ask",
        Commands::Status(_) => "status",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Process(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Status(cmd) => cmd.execute(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            eprintln!("{}", render_error(&e));
            ExitCode::FAILURE
        }
    }
}

/// Turn an error into the message shown to the user.
///
/// The classified upstream errors get actionable messages; everything else
/// renders through its Display impl.
fn render_error(error: &AppError) -> String {
    match error {
        AppError::RateLimited { retry_after_secs } => {
            let mut message = String::from(
                "API rate limit exceeded. Limits reset every minute; wait and retry, \
                 or configure a different model list.",
            );
            if let Some(secs) = retry_after_secs {
                message.push_str(&format!("\nSuggested wait: {} seconds.", secs));
            }
            message
        }
        AppError::ModelNotFound(_) => {
            "The selected model is not available. Try another model with --model.".to_string()
        }
        AppError::IndexMissing => {
            "No index found. Run `artex process <url>...` first.".to_string()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_rate_limited_includes_wait() {
        let message = render_error(&AppError::RateLimited {
            retry_after_secs: Some(37),
        });
        assert!(message.contains("rate limit"));
        assert!(message.contains("37 seconds"));
    }

    #[test]
    fn test_render_rate_limited_without_wait() {
        let message = render_error(&AppError::RateLimited {
            retry_after_secs: None,
        });
        assert!(!message.contains("Suggested wait"));
    }

    #[test]
    fn test_render_index_missing_points_at_process() {
        let message = render_error(&AppError::IndexMissing);
        assert!(message.contains("artex process"));
    }
}
