//! Per-file driver: batch, tag, aggregate, write

use std::path::{Path, PathBuf};

use tagscope_core::{CalaisConfig, Result};
use tagscope_parser::TextLoader;

use crate::aggregate::TagAggregator;
use crate::client::CalaisClient;
use crate::writer::ResultWriter;
use crate::{RemoteTagger, TagOutcome};

/// What a run over one file did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub output: PathBuf,
    pub batches: usize,
    pub skipped: usize,
    pub soft_failures: usize,
    pub tags: usize,
    pub entities: usize,
    pub topics: usize,
}

/// Tags one file at a time against a remote service
pub struct CalaisPipeline {
    tagger: Box<dyn RemoteTagger>,
    loader: TextLoader,
    batch_size: usize,
    writer: ResultWriter,
}

impl CalaisPipeline {
    pub fn new(tagger: Box<dyn RemoteTagger>, batch_size: usize, writer: ResultWriter) -> Self {
        Self {
            tagger,
            loader: TextLoader::new(),
            batch_size,
            writer,
        }
    }

    /// Build the HTTP client and writer from config
    pub fn from_config(config: &CalaisConfig) -> Result<Self> {
        let client = CalaisClient::from_config(config)?;
        let writer = match &config.output_dir {
            Some(dir) => ResultWriter::with_output_dir(dir),
            None => ResultWriter::new(),
        };
        Ok(Self::new(Box::new(client), config.batch_size, writer))
    }

    /// Submit every batch of `path` in order and merge the responses
    pub async fn analyze(&self, path: &Path) -> Result<(TagAggregator, BatchCounts)> {
        let reader = self.loader.batches(path, self.batch_size)?;
        tracing::info!(
            "{}: {} lines in {} batches",
            path.display(),
            reader.line_count(),
            reader.batch_count()
        );

        let mut aggregator = TagAggregator::new();
        let mut counts = BatchCounts::default();

        for batch in reader {
            counts.batches += 1;
            tracing::debug!(
                "batch {} (lines {}..{})",
                batch.index,
                batch.start_line,
                batch.end_line
            );

            match self.tagger.tag(&batch.content).await? {
                TagOutcome::Tagged(items) => {
                    let stats = aggregator.absorb(items);
                    tracing::debug!("batch {}: {:?}", batch.index, stats);
                }
                TagOutcome::Skipped => counts.skipped += 1,
                TagOutcome::NoData { reason } => {
                    counts.soft_failures += 1;
                    tracing::warn!(
                        "{}: batch {} produced no tags: {}",
                        path.display(),
                        batch.index,
                        reason
                    );
                }
            }
        }

        Ok((aggregator, counts))
    }

    /// Analyze `path` and write its report
    pub async fn run(&self, path: &Path) -> Result<RunReport> {
        let (aggregator, counts) = self.analyze(path).await?;
        if aggregator.is_empty() {
            tracing::info!("{}: nothing tagged", path.display());
        }
        let output = self.writer.write(path, &aggregator)?;

        Ok(RunReport {
            output,
            batches: counts.batches,
            skipped: counts.skipped,
            soft_failures: counts.soft_failures,
            tags: aggregator.tag_count(),
            entities: aggregator.entity_count(),
            topics: aggregator.topic_count(),
        })
    }
}

/// Batch tallies for one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    pub batches: usize,
    pub skipped: usize,
    pub soft_failures: usize,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_response;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tagscope_core::TagscopeError;

    /// Replays canned outcomes and records what it was sent
    struct ScriptedTagger {
        outcomes: Mutex<Vec<TagOutcome>>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedTagger {
        fn new(mut outcomes: Vec<TagOutcome>) -> (Self, Arc<Mutex<Vec<String>>>) {
            outcomes.reverse();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let tagger = Self {
                outcomes: Mutex::new(outcomes),
                seen: Arc::clone(&seen),
            };
            (tagger, seen)
        }
    }

    #[async_trait]
    impl RemoteTagger for ScriptedTagger {
        async fn tag(&self, text: &str) -> Result<TagOutcome> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok(self
                .outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(TagOutcome::Tagged(Vec::new())))
        }
    }

    struct OfflineTagger;

    #[async_trait]
    impl RemoteTagger for OfflineTagger {
        async fn tag(&self, _text: &str) -> Result<TagOutcome> {
            Err(TagscopeError::Remote("connection refused".to_string()))
        }
    }

    fn tagged(body: serde_json::Value) -> TagOutcome {
        TagOutcome::Tagged(parse_response(&body.to_string()).unwrap())
    }

    fn write_input(dir: &Path, lines: usize) -> PathBuf {
        let path = dir.join("letters.txt");
        let text: Vec<String> = (1..=lines).map(|n| format!("line {n}")).collect();
        std::fs::write(&path, text.join("\n")).unwrap();
        path
    }

    #[tokio::test]
    async fn test_batches_cover_file_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), 5);

        let (tagger, seen) = ScriptedTagger::new(Vec::new());
        let pipeline = CalaisPipeline::new(Box::new(tagger), 2, ResultWriter::new());
        let (_, counts) = pipeline.analyze(&input).await.unwrap();

        assert_eq!(counts.batches, 3);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "line 1\nline 2".to_string(),
                "line 3\nline 4".to_string(),
                "line 5".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_entities_merge_across_batches() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), 4);

        let first = tagged(json!({
            "e": { "_typeGroup": "entities", "_type": "Person", "name": "Lee",
                   "instances": [{ "offset": 3 }] },
            "s": { "_typeGroup": "socialTag", "name": "Virginia", "importance": "1" }
        }));
        let second = tagged(json!({
            "e": { "_typeGroup": "entities", "_type": "Person", "name": "Lee",
                   "instances": [{ "offset": 8 }, { "offset": 12 }] },
            "s": { "_typeGroup": "socialTag", "name": "Virginia", "importance": "2" }
        }));

        let (tagger, _) = ScriptedTagger::new(vec![first, second]);
        let pipeline = CalaisPipeline::new(Box::new(tagger), 2, ResultWriter::new());
        let report = pipeline.run(&input).await.unwrap();

        assert_eq!(report.entities, 1);
        assert_eq!(report.tags, 1);

        let written = std::fs::read_to_string(&report.output).unwrap();
        assert_eq!(
            written,
            "TOPICS\nTAGS\n1 - Virginia\nENTITIES\nLee (Person) [-] 2 instances\n"
        );
    }

    #[tokio::test]
    async fn test_soft_failure_continues() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), 3);

        let outcomes = vec![
            TagOutcome::NoData {
                reason: "HTTP 500".to_string(),
            },
            tagged(json!({
                "t": { "_typeGroup": "topics", "categoryName": "War", "category": "c", "score": 1 }
            })),
            TagOutcome::Skipped,
        ];
        let (tagger, seen) = ScriptedTagger::new(outcomes);
        let pipeline = CalaisPipeline::new(Box::new(tagger), 1, ResultWriter::new());
        let report = pipeline.run(&input).await.unwrap();

        assert_eq!(seen.lock().unwrap().len(), 3);
        assert_eq!(report.soft_failures, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.topics, 1);
    }

    #[tokio::test]
    async fn test_transport_error_aborts_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), 3);

        let pipeline = CalaisPipeline::new(Box::new(OfflineTagger), 10, ResultWriter::new());
        let err = pipeline.run(&input).await.unwrap_err();

        assert!(matches!(err, TagscopeError::Remote(_)));
        assert!(!dir.path().join("calais_letters.txt").exists());
    }

    #[tokio::test]
    async fn test_empty_file_writes_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.txt");
        std::fs::write(&input, "").unwrap();

        let (tagger, seen) = ScriptedTagger::new(Vec::new());
        let pipeline = CalaisPipeline::new(Box::new(tagger), 10, ResultWriter::new());
        let report = pipeline.run(&input).await.unwrap();

        assert_eq!(report.batches, 0);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(
            std::fs::read_to_string(report.output).unwrap(),
            "TOPICS\nTAGS\nENTITIES\n"
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let (tagger, _) = ScriptedTagger::new(Vec::new());
        let pipeline = CalaisPipeline::new(Box::new(tagger), 10, ResultWriter::new());
        let err = pipeline
            .run(Path::new("/nonexistent/letters.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, TagscopeError::Io { .. }));
    }

    #[test]
    fn test_from_config_uses_output_dir() {
        let config = CalaisConfig {
            output_dir: Some(PathBuf::from("/tmp/reports")),
            batch_size: 7,
            ..Default::default()
        };
        let pipeline = CalaisPipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.batch_size, 7);
        assert_eq!(
            pipeline.writer.output_path(Path::new("a.txt")),
            PathBuf::from("/tmp/reports/calais_a.txt")
        );
    }
}
