//! Entity aggregation and summary reporting

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::path::Path;

use tagscope_core::Result;
use tagscope_parser::TextLoader;

use crate::ner::{EntityCategory, RuleBasedTagger};
use crate::segment::UnicodeSentenceSegmenter;
use crate::{EntityTagger, SentenceSegmenter, TaggedChunk};

// ============================================================================
// Summary
// ============================================================================

/// One entity and how often it was seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    pub category: EntityCategory,
    pub text: String,
    pub count: usize,
}

/// Occurrence counts per category and surface string for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySummary {
    counts: BTreeMap<EntityCategory, HashMap<String, usize>>,
}

impl EntitySummary {
    /// Fresh summary with every tracked category present and empty
    pub fn new() -> Self {
        Self {
            counts: EntityCategory::ALL
                .iter()
                .map(|category| (*category, HashMap::new()))
                .collect(),
        }
    }

    /// Count one sighting
    pub fn record(&mut self, category: EntityCategory, text: impl Into<String>) {
        *self
            .counts
            .entry(category)
            .or_default()
            .entry(text.into())
            .or_insert(0) += 1;
    }

    /// Count a tagger chunk if its label is tracked, returning the category
    pub fn record_chunk(&mut self, chunk: &TaggedChunk) -> Option<EntityCategory> {
        let category = EntityCategory::from_label(&chunk.label)?;
        self.record(category, chunk.surface());
        Some(category)
    }

    /// Occurrences of `text` in `category`
    pub fn count(&self, category: EntityCategory, text: &str) -> usize {
        self.counts
            .get(&category)
            .and_then(|entities| entities.get(text))
            .copied()
            .unwrap_or(0)
    }

    /// Entities of one category, most frequent first, ties by text
    pub fn entities(&self, category: EntityCategory) -> Vec<EntityRecord> {
        let mut records: Vec<EntityRecord> = self
            .counts
            .get(&category)
            .map(|entities| {
                entities
                    .iter()
                    .map(|(text, count)| EntityRecord {
                        category,
                        text: text.clone(),
                        count: *count,
                    })
                    .collect()
            })
            .unwrap_or_default();

        records.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.text.cmp(&b.text)));
        records
    }

    /// Categories with at least one entity, in report order
    pub fn categories(&self) -> impl Iterator<Item = EntityCategory> + '_ {
        self.counts
            .iter()
            .filter(|(_, entities)| !entities.is_empty())
            .map(|(category, _)| *category)
    }

    /// Number of distinct entities across categories
    pub fn distinct(&self) -> usize {
        self.counts.values().map(HashMap::len).sum()
    }

    /// Total sightings across categories
    pub fn total(&self) -> usize {
        self.counts.values().flat_map(|e| e.values()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.distinct() == 0
    }
}

impl Default for EntitySummary {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<TaggedChunk> for EntitySummary {
    fn from_iter<I: IntoIterator<Item = TaggedChunk>>(chunks: I) -> Self {
        let mut summary = Self::new();
        for chunk in chunks {
            summary.record_chunk(&chunk);
        }
        summary
    }
}

// ============================================================================
// Aggregator
// ============================================================================

/// Runs segmentation and tagging over a document and tallies entities
pub struct EntityAggregator {
    segmenter: Box<dyn SentenceSegmenter>,
    tagger: Box<dyn EntityTagger>,
    loader: TextLoader,
}

impl EntityAggregator {
    /// Create with explicit segmenter and tagger
    pub fn new(segmenter: Box<dyn SentenceSegmenter>, tagger: Box<dyn EntityTagger>) -> Self {
        Self {
            segmenter,
            tagger,
            loader: TextLoader::new(),
        }
    }

    /// Create with the bundled Unicode segmenter and a given tagger
    pub fn with_tagger(tagger: Box<dyn EntityTagger>) -> Self {
        Self::new(Box::new(UnicodeSentenceSegmenter::new()), tagger)
    }

    /// Summarize raw text
    pub fn summarize_text(&self, text: &str) -> Result<EntitySummary> {
        let mut summary = EntitySummary::new();

        for sentence in self.segmenter.split(text) {
            tracing::debug!("sentence:\n{}", sentence);

            for chunk in self.tagger.tag(&sentence)? {
                match summary.record_chunk(&chunk) {
                    Some(category) => tracing::debug!("{}: {}", category, chunk.surface()),
                    None => tracing::trace!("ignoring {} chunk: {}", chunk.label, chunk.surface()),
                }
            }
        }

        Ok(summary)
    }

    /// Load a file and summarize its text
    pub fn summarize_file(&self, path: &Path) -> Result<EntitySummary> {
        let loaded = self.loader.load(path)?;
        tracing::info!(
            "loaded {} ({} words)",
            loaded.file_path,
            loaded.word_count()
        );
        self.summarize_text(&loaded.content)
    }
}

impl Default for EntityAggregator {
    fn default() -> Self {
        Self::with_tagger(Box::new(RuleBasedTagger::new()))
    }
}

// ============================================================================
// Reporting
// ============================================================================

/// Write each non-empty category as a header followed by `count<TAB>text`
pub fn write_summary<W: Write>(summary: &EntitySummary, out: &mut W) -> io::Result<()> {
    for category in summary.categories() {
        writeln!(out, "\n{}:", category)?;
        for record in summary.entities(category) {
            writeln!(out, "{}\t{}", record.count, record.text)?;
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tagscope_core::TagscopeError;

    /// Tags every token found in its list, one chunk per token
    struct FakeTagger {
        known: Vec<(&'static str, &'static str)>,
    }

    impl EntityTagger for FakeTagger {
        fn tag(&self, sentence: &str) -> Result<Vec<TaggedChunk>> {
            Ok(sentence
                .split(|c: char| !c.is_alphanumeric())
                .filter_map(|word| {
                    self.known
                        .iter()
                        .find(|(token, _)| *token == word)
                        .map(|(token, label)| {
                            TaggedChunk::new(*label, vec![(token.to_string(), "NNP".to_string())])
                        })
                })
                .collect())
        }
    }

    struct FailingTagger;

    impl EntityTagger for FailingTagger {
        fn tag(&self, _sentence: &str) -> Result<Vec<TaggedChunk>> {
            Err(TagscopeError::Tagger("model not loaded".to_string()))
        }
    }

    fn chunk(label: &str, text: &str) -> TaggedChunk {
        TaggedChunk::new(
            label,
            text.split(' ')
                .map(|t| (t.to_string(), "NNP".to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_new_summary_is_empty_per_call() {
        let mut first = EntitySummary::new();
        first.record(EntityCategory::Person, "Ada Lovelace");

        let second = EntitySummary::new();
        assert!(second.is_empty());
        assert_eq!(second.count(EntityCategory::Person, "Ada Lovelace"), 0);
    }

    #[test]
    fn test_untracked_labels_ignored() {
        let summary: EntitySummary = vec![
            chunk("GPE", "France"),
            chunk("LOCATION", "Paris"),
            chunk("FACILITY", "Eiffel Tower"),
        ]
        .into_iter()
        .collect();

        assert_eq!(summary.distinct(), 1);
        assert_eq!(summary.count(EntityCategory::Location, "Paris"), 1);
    }

    #[test]
    fn test_ties_break_on_text() {
        let mut summary = EntitySummary::new();
        for (text, times) in [("Zurich", 5), ("Athens", 5), ("Oslo", 2)] {
            for _ in 0..times {
                summary.record(EntityCategory::Location, text);
            }
        }

        let order: Vec<(usize, String)> = summary
            .entities(EntityCategory::Location)
            .into_iter()
            .map(|r| (r.count, r.text))
            .collect();
        assert_eq!(
            order,
            vec![
                (5, "Athens".to_string()),
                (5, "Zurich".to_string()),
                (2, "Oslo".to_string()),
            ]
        );
    }

    #[test]
    fn test_paris_france_report() {
        let aggregator = EntityAggregator::with_tagger(Box::new(FakeTagger {
            known: vec![("Paris", "LOCATION"), ("France", "LOCATION")],
        }));

        let summary = aggregator
            .summarize_text("Paris is beautiful. Paris is the capital of France.")
            .unwrap();

        let mut out = Vec::new();
        write_summary(&summary, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nLOCATION:\n2\tParis\n1\tFrance\n"
        );
    }

    #[test]
    fn test_report_skips_empty_categories_in_fixed_order() {
        let mut summary = EntitySummary::new();
        summary.record(EntityCategory::Organization, "Reuters");
        summary.record(EntityCategory::Location, "Lagos");

        let mut out = Vec::new();
        write_summary(&summary, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nLOCATION:\n1\tLagos\n\nORGANIZATION:\n1\tReuters\n"
        );
    }

    #[test]
    fn test_default_tagger_end_to_end() {
        let summary = EntityAggregator::default()
            .summarize_text("Paris is beautiful. Paris is the capital of France.")
            .unwrap();

        assert_eq!(summary.count(EntityCategory::Location, "Paris"), 2);
        assert_eq!(summary.count(EntityCategory::Location, "France"), 1);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_tagger_error_propagates() {
        let aggregator = EntityAggregator::with_tagger(Box::new(FailingTagger));
        assert!(matches!(
            aggregator.summarize_text("Anything at all."),
            Err(TagscopeError::Tagger(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EntityAggregator::default()
            .summarize_file(Path::new("/nonexistent/story.txt"))
            .unwrap_err();
        assert!(matches!(err, TagscopeError::Io { .. }));
    }

    #[test]
    fn test_summarize_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.txt");
        std::fs::write(&path, "Dr. Jane Hopper flew to London.\nJane Hopper liked London.").unwrap();

        let summary = EntityAggregator::default().summarize_file(&path).unwrap();
        assert_eq!(summary.count(EntityCategory::Location, "London"), 2);
        assert_eq!(summary.count(EntityCategory::Person, "Jane Hopper"), 2);
    }

    proptest! {
        #[test]
        fn prop_counts_match_chunk_occurrences(
            picks in proptest::collection::vec((0usize..4, 0usize..3), 0..80)
        ) {
            let labels = ["LOCATION", "PERSON", "ORGANIZATION", "GPE"];
            let texts = ["Alpha", "Beta Gamma", "Delta"];
            let chunks: Vec<TaggedChunk> = picks
                .iter()
                .map(|(l, t)| chunk(labels[*l], texts[*t]))
                .collect();

            let summary: EntitySummary = chunks.clone().into_iter().collect();

            for category in EntityCategory::ALL {
                for text in texts {
                    let expected = chunks
                        .iter()
                        .filter(|c| c.label == category.as_str() && c.surface() == text)
                        .count();
                    prop_assert_eq!(summary.count(category, text), expected);
                }
            }
        }
    }
}
