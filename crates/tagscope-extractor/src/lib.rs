//! tagscope Extractor - Local named entity summary
//!
//! Splits text into sentences, tags each sentence with an entity tagger
//! and tallies LOCATION, PERSON and ORGANIZATION chunks by surface string.
//!
//! The tagger and segmenter are capabilities behind traits so a
//! statistical model can replace the bundled rule-based one.

use tagscope_core::Result;

/// A chunk of tokens the tagger grouped under one label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedChunk {
    /// Chunk label as produced by the tagger (e.g. "PERSON", "GPE")
    pub label: String,
    /// Ordered (token, part-of-speech) pairs
    pub leaves: Vec<(String, String)>,
}

impl TaggedChunk {
    pub fn new(label: impl Into<String>, leaves: Vec<(String, String)>) -> Self {
        Self {
            label: label.into(),
            leaves,
        }
    }

    /// Tokens joined with single spaces
    pub fn surface(&self) -> String {
        self.leaves
            .iter()
            .map(|(token, _)| token.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Trait for entity taggers
pub trait EntityTagger: Send + Sync {
    /// Tokenize, tag and chunk one sentence
    fn tag(&self, sentence: &str) -> Result<Vec<TaggedChunk>>;
}

/// Trait for sentence segmenters
pub trait SentenceSegmenter: Send + Sync {
    fn split(&self, text: &str) -> Vec<String>;
}

pub mod ner;
pub mod segment;
pub mod summary;

pub use ner::{EntityCategory, RuleBasedTagger};
pub use segment::UnicodeSentenceSegmenter;
pub use summary::{write_summary, EntityAggregator, EntityRecord, EntitySummary};
