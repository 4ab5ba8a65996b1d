//! Tagscope Calais - remote semantic tagging pipeline
//!
//! Splits a text file into line batches, submits each batch to the Open
//! Calais enrichment service, and merges the returned social tags,
//! entities and topics into one per-file report:
//! - `model`: response decoding
//! - `aggregate`: cross-batch dedup and merge
//! - `client`: HTTP transport
//! - `writer`: report rendering
//! - `pipeline`: per-file driver
//!
//! Author: hephaex@gmail.com

use async_trait::async_trait;
use tagscope_core::Result;

pub mod aggregate;
pub mod client;
pub mod model;
pub mod pipeline;
pub mod writer;

pub use aggregate::{entity_key, tag_key, topic_key, AbsorbStats, TagAggregator};
pub use client::CalaisClient;
pub use model::{parse_response, RemoteEntity, RemoteTag, RemoteTopic, TaggedItem};
pub use pipeline::{BatchCounts, CalaisPipeline, RunReport};
pub use writer::ResultWriter;

// ============================================================================
// Remote tagging
// ============================================================================

/// Result of submitting one batch
#[derive(Debug, Clone, PartialEq)]
pub enum TagOutcome {
    /// The service answered with decodable items
    Tagged(Vec<TaggedItem>),
    /// Nothing was submitted because the batch had no text
    Skipped,
    /// The service answered but returned nothing usable
    NoData { reason: String },
}

impl TagOutcome {
    /// Items carried by this outcome, empty unless tagged
    pub fn items(&self) -> &[TaggedItem] {
        match self {
            Self::Tagged(items) => items,
            Self::Skipped | Self::NoData { .. } => &[],
        }
    }

    pub fn is_soft_failure(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

/// Remote semantic tagging service
///
/// A transport failure is an `Err`; a reply that carries no data is an
/// `Ok(TagOutcome::NoData)` so the caller can move on to the next batch.
#[async_trait]
pub trait RemoteTagger: Send + Sync {
    async fn tag(&self, text: &str) -> Result<TagOutcome>;
}
