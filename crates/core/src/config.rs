//! Configuration management for the artex CLI.
//!
//! Configuration is merged from three sources, later ones winning:
//! - defaults
//! - an optional YAML config file (`artex.yaml` in the data directory's
//!   parent, or `ARTEX_CONFIG`)
//! - environment variables and command-line flags
//!
//! The Gemini API credential is deliberately *not* given a default: commands
//! that need it fail closed with a configuration error when it is absent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default ordered model fallback list, cheapest first.
pub const DEFAULT_MODELS: [&str; 3] = ["gemini-1.5-flash", "gemini-1.5-pro", "gemini-1.0-pro"];

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 200;

/// Default overlap between adjacent chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 40;

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 4;

/// Main application configuration.
///
/// Built once in `main` and passed down explicitly; nothing in the
/// application reads process-global state after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the persisted index
    pub data_dir: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Gemini API key; `None` means "not configured" and is an error at use
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Ordered model fallback list for completion requests
    pub models: Vec<String>,

    /// Chunk size in characters
    pub chunk_size: usize,

    /// Overlap between adjacent chunks in characters
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per question
    pub top_k: usize,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Config file structure (`artex.yaml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    index: Option<IndexSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    models: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexSection {
    #[serde(rename = "dataDir")]
    data_dir: Option<String>,
    #[serde(rename = "chunkSize")]
    chunk_size: Option<usize>,
    #[serde(rename = "chunkOverlap")]
    chunk_overlap: Option<usize>,
    #[serde(rename = "topK")]
    top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            config_file: None,
            api_key: None,
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the YAML config file (if present) and
    /// environment variables.
    ///
    /// Environment variables:
    /// - `ARTEX_DATA_DIR`: override the data directory
    /// - `ARTEX_CONFIG`: path to the config file
    /// - `ARTEX_MODELS`: comma-separated model fallback list
    /// - `GEMINI_API_KEY`: the LLM API credential
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("ARTEX_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("artex.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
            tracing::debug!("Merged configuration from {:?}", config_path);
        }

        // Environment variables override the YAML config
        if let Ok(data_dir) = std::env::var("ARTEX_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(models) = std::env::var("ARTEX_MODELS") {
            let parsed: Vec<String> = models
                .split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if !parsed.is_empty() {
                config.models = parsed;
            }
        }

        config.api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        tracing::debug!(
            "Loaded configuration (data_dir: {:?}, {} model(s))",
            config.data_dir,
            config.models.len()
        );
        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(index) = config_file.index {
            if let Some(dir) = index.data_dir {
                result.data_dir = PathBuf::from(dir);
            }
            if let Some(size) = index.chunk_size {
                result.chunk_size = size;
            }
            if let Some(overlap) = index.chunk_overlap {
                result.chunk_overlap = overlap;
            }
            if let Some(top_k) = index.top_k {
                result.top_k = top_k;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(models) = llm.models {
                if !models.is_empty() {
                    result.models = models;
                }
            }
        }

        Ok(result)
    }

    /// Apply CLI flag overrides, which take precedence over everything else.
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        config_file: Option<PathBuf>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        // A single --model pins the fallback list to exactly that model
        if let Some(model) = model {
            self.models = vec![model];
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolve the API credential, failing closed when it is not configured.
    pub fn require_api_key(&self) -> AppResult<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(AppError::Config(
                "Missing GEMINI_API_KEY. Set it in the environment or a .env file.".to_string(),
            )),
        }
    }

    /// Path of the persisted index file. Its existence is the sole signal
    /// that an index is available.
    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join("index.sqlite")
    }

    /// Ensure the data directory exists.
    pub fn ensure_data_dir(&self) -> AppResult<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir).map_err(|e| {
                AppError::Config(format!("Failed to create data directory: {}", e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.chunk_size, 200);
        assert_eq!(config.chunk_overlap, 40);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.models.len(), 3);
        assert_eq!(config.models[0], "gemini-1.5-flash");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_index_path() {
        let config = AppConfig::default();
        assert!(config.index_path().ends_with("data/index.sqlite"));
    }

    #[test]
    fn test_require_api_key_fails_closed() {
        let config = AppConfig::default();
        assert!(matches!(
            config.require_api_key(),
            Err(AppError::Config(_))
        ));

        let mut with_blank = AppConfig::default();
        with_blank.api_key = Some(String::new());
        assert!(with_blank.require_api_key().is_err());
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            Some(PathBuf::from("/tmp/artex")),
            None,
            Some("gemini-1.5-pro".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(config.data_dir, PathBuf::from("/tmp/artex"));
        assert_eq!(config.models, vec!["gemini-1.5-pro".to_string()]);
        assert!(config.verbose);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artex.yaml");
        std::fs::write(
            &path,
            "index:\n  chunkSize: 300\n  chunkOverlap: 60\nllm:\n  models:\n    - gemini-1.5-pro\n",
        )
        .unwrap();

        let mut config = AppConfig::default();
        let merged = config.merge_yaml(&path).unwrap();

        assert_eq!(merged.chunk_size, 300);
        assert_eq!(merged.chunk_overlap, 60);
        assert_eq!(merged.models, vec!["gemini-1.5-pro".to_string()]);
        // Untouched fields keep their defaults
        assert_eq!(merged.top_k, 4);
    }
}
