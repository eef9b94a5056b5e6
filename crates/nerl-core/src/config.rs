//! NERL Configuration Management
//!
//! Handles configuration from environment variables and TOML config files
//! with sensible defaults for development against local service endpoints.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Search service (candidate retrieval)
    pub search: SearchConfig,

    /// Knowledge-base service (fact corroboration)
    pub knowledge_base: KnowledgeBaseConfig,

    /// Pipeline behavior
    pub pipeline: PipelineConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("NERL_SEARCH_URL") {
            config.search.base_url = url;
        }
        if let Ok(n) = std::env::var("NERL_SEARCH_RESULTS") {
            config.search.results_count = n.parse().map_err(|_| ConfigError::InvalidValue {
                key: "NERL_SEARCH_RESULTS".to_string(),
                value: n,
            })?;
        }
        if let Ok(url) = std::env::var("NERL_KB_URL") {
            config.knowledge_base.base_url = url;
        }
        if let Ok(secs) = std::env::var("NERL_HTTP_TIMEOUT_SECS") {
            let parsed = secs.parse().map_err(|_| ConfigError::InvalidValue {
                key: "NERL_HTTP_TIMEOUT_SECS".to_string(),
                value: secs,
            })?;
            config.search.timeout_secs = parsed;
            config.knowledge_base.timeout_secs = parsed;
        }
        if let Ok(workers) = std::env::var("NERL_WORKERS") {
            config.pipeline.workers = workers.parse().map_err(|_| ConfigError::InvalidValue {
                key: "NERL_WORKERS".to_string(),
                value: workers,
            })?;
        }
        if let Ok(flag) = std::env::var("NERL_FILTER_STOPWORDS") {
            config.pipeline.filter_stopwords = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        if env_config.search.base_url != defaults.search.base_url {
            self.search.base_url = env_config.search.base_url;
        }
        if env_config.search.results_count != defaults.search.results_count {
            self.search.results_count = env_config.search.results_count;
        }
        if env_config.knowledge_base.base_url != defaults.knowledge_base.base_url {
            self.knowledge_base.base_url = env_config.knowledge_base.base_url;
        }
        if env_config.search.timeout_secs != defaults.search.timeout_secs {
            self.search.timeout_secs = env_config.search.timeout_secs;
            self.knowledge_base.timeout_secs = env_config.knowledge_base.timeout_secs;
        }
        if env_config.pipeline.workers != defaults.pipeline.workers {
            self.pipeline.workers = env_config.pipeline.workers;
        }
        // Boolean flags cannot use the default-comparison trick: "env set
        // to the default value" and "env unset" would look identical
        if std::env::var("NERL_FILTER_STOPWORDS").is_ok() {
            self.pipeline.filter_stopwords = env_config.pipeline.filter_stopwords;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }

        Ok(self)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}

/// Search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the full-text search endpoint
    pub base_url: String,

    /// Maximum hits requested per mention query
    pub results_count: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200/freebase/label/_search".to_string(),
            results_count: 20,
            timeout_secs: 30,
        }
    }
}

/// Knowledge-base service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// Base URL of the SPARQL endpoint
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9090/sparql".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Pipeline behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of documents processed concurrently (1 = sequential)
    pub workers: usize,

    /// Drop common English stop words from the token stream
    pub filter_stopwords: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            filter_stopwords: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Failed to serialize config: {0}")]
    SerializeError(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.search.results_count, 20);
        assert_eq!(config.pipeline.workers, 1);
        assert!(config.pipeline.filter_stopwords);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = AppConfig::default();
        let rendered = config.to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.search.base_url, config.search.base_url);
        assert_eq!(parsed.knowledge_base.timeout_secs, 30);
    }

    // Serializes tests that touch process-wide environment variables
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn test_env_overrides_file_for_stopword_filter() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = std::env::temp_dir().join(format!("nerl-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("nerl.toml");

        let mut file_config = AppConfig::default();
        file_config.pipeline.filter_stopwords = true;
        std::fs::write(&path, file_config.to_toml().unwrap()).unwrap();

        std::env::set_var("NERL_FILTER_STOPWORDS", "false");
        let merged = AppConfig::from_file(&path)
            .unwrap()
            .with_env_override()
            .unwrap();
        std::env::remove_var("NERL_FILTER_STOPWORDS");
        std::fs::remove_file(&path).unwrap();

        assert!(!merged.pipeline.filter_stopwords);
    }

    #[test]
    fn test_file_value_survives_without_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = std::env::temp_dir().join(format!("nerl-config-noenv-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("nerl.toml");

        let mut file_config = AppConfig::default();
        file_config.pipeline.filter_stopwords = false;
        file_config.search.results_count = 7;
        std::fs::write(&path, file_config.to_toml().unwrap()).unwrap();

        std::env::remove_var("NERL_FILTER_STOPWORDS");
        let merged = AppConfig::from_file(&path)
            .unwrap()
            .with_env_override()
            .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(!merged.pipeline.filter_stopwords);
        assert_eq!(merged.search.results_count, 7);
    }
}
