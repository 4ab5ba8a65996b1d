//! tagscope Core - Shared error types and configuration
//!
//! This crate defines the pieces every tagscope pipeline depends on:
//! - The common error type and `Result` alias
//! - Configuration management (environment, TOML file, defaults)

pub mod config;

pub use config::{AppConfig, CalaisConfig, ConfigError, LoggingConfig, NerConfig};

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for tagscope operations
#[derive(Error, Debug)]
pub enum TagscopeError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote tagging service error: {0}")]
    Remote(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Tagger error: {0}")]
    Tagger(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TagscopeError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ConfigError> for TagscopeError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TagscopeError>;
