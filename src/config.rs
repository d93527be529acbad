use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub arbgraph: ArbgraphConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Arbgraph-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ArbgraphConfig {
    /// Directory holding cases.json, decisions.json, individuals.json and parties.json.
    pub data_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Query defaults and limits
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Radius used when a request does not give one.
    #[serde(default = "default_k")]
    pub default_k: usize,
    /// Largest radius a request may ask for.
    #[serde(default = "default_max_k")]
    pub max_k: usize,
    /// Minimum token-set score (0-100) for a fuzzy name match.
    #[serde(default)]
    pub fuzzy_cutoff: f64,
    /// Cached query results; 0 disables the cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            max_k: default_max_k(),
            fuzzy_cutoff: 0.0,
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_k() -> usize {
    2
}

fn default_max_k() -> usize {
    6
}

fn default_cache_capacity() -> usize {
    256
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            port: default_http_port(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_http_port() -> u16 {
    8080
}

/// Snapshot watcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in ARBGRAPH_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("ARBGRAPH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::from_file(&config_path)
    }

    /// Load and validate configuration from an explicit path
    pub fn from_file(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if !self.arbgraph.data_dir.exists() {
            anyhow::bail!(
                "data_dir path does not exist: {}. Set data_dir in config.toml to the snapshot directory.",
                self.arbgraph.data_dir.display()
            );
        }

        if !self.arbgraph.data_dir.is_dir() {
            anyhow::bail!(
                "data_dir must be a directory, not a file: {}",
                self.arbgraph.data_dir.display()
            );
        }

        if self.query.default_k > self.query.max_k {
            anyhow::bail!(
                "query.default_k ({}) must not exceed query.max_k ({})",
                self.query.default_k,
                self.query.max_k
            );
        }

        if !(0.0..=100.0).contains(&self.query.fuzzy_cutoff) {
            anyhow::bail!("query.fuzzy_cutoff must be between 0 and 100");
        }

        Ok(())
    }

    /// Get the snapshot directory
    pub fn data_dir(&self) -> &Path {
        &self.arbgraph.data_dir
    }
}
