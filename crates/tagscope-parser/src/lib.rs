//! tagscope Parser - Reading text files for the tagging pipelines
//!
//! Provides:
//! - `TextLoader`: whole-file loading for the local entity summary
//! - `BatchReader`: fixed-size line batches for the remote tagging service
//! - `fulltext`: conversion of JSON `fulltext` documents into wrapped text
//!
//! Files are decoded as UTF-8; invalid byte sequences are replaced rather
//! than rejected so a single bad byte does not lose a whole document.

pub mod batch;
pub mod fulltext;

pub use batch::{BatchReader, TextBatch};
pub use fulltext::{convert_directory, convert_file, wrap_text, ConversionReport};

use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while reading or converting documents
#[derive(Error, Debug)]
pub enum ParserError {
    /// IO error while reading or writing a file
    #[error("IO error on file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Document content is not what was expected
    #[error("Invalid document {path}: {reason}")]
    InvalidDocument { path: String, reason: String },

    /// Batch size must be at least one line
    #[error("Batch size must be greater than zero")]
    ZeroBatchSize,
}

impl ParserError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.display().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;

impl From<ParserError> for tagscope_core::TagscopeError {
    fn from(err: ParserError) -> Self {
        match err {
            ParserError::IoError { path, source } => Self::io(path, source),
            ParserError::ZeroBatchSize => Self::Config(ParserError::ZeroBatchSize.to_string()),
            other => Self::Parse(other.to_string()),
        }
    }
}

// ============================================================================
// Loaded text
// ============================================================================

/// A text file loaded into memory
#[derive(Debug, Clone)]
pub struct LoadedText {
    /// Original file path
    pub file_path: String,

    /// Decoded content
    pub content: String,

    /// Whether invalid UTF-8 had to be replaced while decoding
    pub lossy: bool,
}

impl LoadedText {
    /// Create from already decoded content
    pub fn new(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            content: content.into(),
            lossy: false,
        }
    }

    /// Get total word count (approximate)
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Get the content's lines without terminators
    pub fn lines(&self) -> Vec<String> {
        self.content.lines().map(str::to_string).collect()
    }
}

// ============================================================================
// Loader
// ============================================================================

/// Reads whole text files
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader;

impl TextLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a file into memory as raw text
    pub fn load(&self, path: &Path) -> Result<LoadedText> {
        let bytes = std::fs::read(path).map_err(|e| ParserError::io(path, e))?;

        let (content, lossy) = match String::from_utf8(bytes) {
            Ok(content) => (content, false),
            Err(e) => {
                tracing::debug!("{} is not valid UTF-8, replacing bad bytes", path.display());
                (String::from_utf8_lossy(e.as_bytes()).into_owned(), true)
            }
        };

        Ok(LoadedText {
            file_path: path.display().to_string(),
            content,
            lossy,
        })
    }

    /// Open a file as a line batch reader
    pub fn batches(&self, path: &Path, batch_size: usize) -> Result<BatchReader> {
        let loaded = self.load(path)?;
        BatchReader::new(loaded.lines(), batch_size)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_plain_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Paris is beautiful.\nParis is the capital of France.").unwrap();

        let loaded = TextLoader::new().load(file.path()).unwrap();
        assert!(!loaded.lossy);
        assert_eq!(loaded.lines().len(), 2);
        assert_eq!(loaded.word_count(), 9);
    }

    #[test]
    fn test_load_invalid_utf8_is_lossy() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"caf\xe9 society").unwrap();

        let loaded = TextLoader::new().load(file.path()).unwrap();
        assert!(loaded.lossy);
        assert!(loaded.content.ends_with(" society"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = TextLoader::new()
            .load(Path::new("/nonexistent/input.txt"))
            .unwrap_err();
        match err {
            ParserError::IoError { path, .. } => assert!(path.contains("input.txt")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_batches_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a\nb\nc\n").unwrap();

        let batches: Vec<TextBatch> = TextLoader::new()
            .batches(file.path(), 2)
            .unwrap()
            .collect();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].content, "a\nb");
        assert_eq!(batches[1].content, "c");
    }
}
