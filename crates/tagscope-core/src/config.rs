//! tagscope Configuration Management
//!
//! Handles configuration from environment variables, TOML config files,
//! and command-line overrides with defaults matching the tagging service.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default endpoint of the Open Calais enrichment service
pub const DEFAULT_CALAIS_URL: &str = "http://api.opencalais.com/tag/rs/enrich";

/// Default number of lines sent to the service per request
pub const DEFAULT_BATCH_SIZE: usize = 1125;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Remote tagging service configuration
    pub calais: CalaisConfig,

    /// Local entity summary configuration
    pub ner: NerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
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
        self.apply_env(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    /// Apply every recognised variable returned by `lookup`
    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Calais
        if let Some(key) = lookup("CALAIS_API_KEY") {
            self.calais.api_key = key;
        }
        if let Some(url) = lookup("CALAIS_API_URL") {
            self.calais.api_url = url;
        }
        if let Some(size) = lookup("CALAIS_BATCH_SIZE") {
            self.calais.batch_size = parse_number("CALAIS_BATCH_SIZE", &size)?;
        }
        if let Some(size) = lookup("CALAIS_ALLOWED_SIZE") {
            self.calais.max_payload_chars = Some(parse_number("CALAIS_ALLOWED_SIZE", &size)?);
        }
        if let Some(secs) = lookup("CALAIS_TIMEOUT_SECS") {
            self.calais.timeout_secs = parse_number("CALAIS_TIMEOUT_SECS", &secs)?;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Check values that would make a run meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.calais.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "calais.batch_size".to_string(),
                value: "0".to_string(),
            });
        }
        if self.calais.max_payload_chars == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "calais.max_payload_chars".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Open Calais client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalaisConfig {
    /// License key sent as `x-calais-licenseID`
    pub api_key: String,

    /// Enrichment endpoint
    pub api_url: String,

    /// Content type of the submitted text
    pub content_type: String,

    /// Ask the service for social tags
    pub social_tags: bool,

    /// Lines per request
    pub batch_size: usize,

    /// Optional cap on characters per request (no cap when unset)
    pub max_payload_chars: Option<usize>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Directory for result files (defaults to the input file's directory)
    pub output_dir: Option<PathBuf>,
}

impl Default for CalaisConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_CALAIS_URL.to_string(),
            content_type: "text/txt".to_string(),
            social_tags: true,
            batch_size: DEFAULT_BATCH_SIZE,
            max_payload_chars: None,
            timeout_secs: 60,
            output_dir: None,
        }
    }
}

/// Local entity summary configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NerConfig {
    /// Additional gazetteer entries tagged as LOCATION
    pub extra_locations: Vec<String>,

    /// Additional gazetteer entries tagged as PERSON
    pub extra_people: Vec<String>,

    /// Additional gazetteer entries tagged as ORGANIZATION
    pub extra_organizations: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,

    /// Prefix single-line warnings and errors with their level name
    pub include_level_prefix: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            include_level_prefix: true,
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

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
