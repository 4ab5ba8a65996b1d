//! Plain-text report of an aggregated file

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tagscope_core::{Result, TagscopeError};

use crate::aggregate::{display_value, TagAggregator};
use crate::model::{RemoteEntity, RemoteTag, RemoteTopic};

/// Prefix of every report file name
pub const OUTPUT_PREFIX: &str = "calais_";

/// Writes `calais_<name>` reports
#[derive(Debug, Clone, Default)]
pub struct ResultWriter {
    output_dir: Option<PathBuf>,
}

impl ResultWriter {
    /// Write reports next to their input files
    pub fn new() -> Self {
        Self::default()
    }

    /// Write reports into `dir` instead
    pub fn with_output_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: Some(dir.into()),
        }
    }

    /// Report path for an input file
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = format!("{OUTPUT_PREFIX}{name}");

        match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => input.with_file_name(file_name),
        }
    }

    /// Write the report for `input`, returning where it went
    pub fn write(&self, input: &Path, aggregator: &TagAggregator) -> Result<PathBuf> {
        let path = self.output_path(input);
        let file = File::create(&path).map_err(|e| TagscopeError::io(&path, e))?;

        let mut out = BufWriter::new(file);
        render(aggregator, &mut out).map_err(|e| TagscopeError::io(&path, e))?;
        out.flush().map_err(|e| TagscopeError::io(&path, e))?;

        tracing::info!("wrote {}", path.display());
        Ok(path)
    }
}

/// Render the three report sections
pub fn render<W: Write>(aggregator: &TagAggregator, out: &mut W) -> io::Result<()> {
    writeln!(out, "TOPICS")?;
    for topic in aggregator.sorted_topics() {
        writeln!(out, "{}", clean(&topic_line(topic)))?;
    }

    writeln!(out, "TAGS")?;
    for tag in aggregator.sorted_tags() {
        writeln!(out, "{}", clean(&tag_line(tag)))?;
    }

    writeln!(out, "ENTITIES")?;
    for entity in aggregator.sorted_entities() {
        writeln!(out, "{}", clean(&entity_line(entity)))?;
    }

    Ok(())
}

fn topic_line(topic: &RemoteTopic) -> String {
    format!(
        "{} - {}",
        display_value(Some(&topic.score)),
        topic.name.as_deref().unwrap_or("-")
    )
}

fn tag_line(tag: &RemoteTag) -> String {
    format!(
        "{} - {}",
        display_value(tag.importance.as_ref()),
        tag.name.as_deref().unwrap_or("-")
    )
}

fn entity_line(entity: &RemoteEntity) -> String {
    format!(
        "{} ({}) [{}] {} instances",
        entity.name.as_deref().unwrap_or("-"),
        entity.entity_type.as_deref().unwrap_or("-"),
        display_value(entity.relevance.as_ref()),
        entity.instances.len()
    )
}

/// Drop replacement characters left by lossy decoding
fn clean(line: &str) -> String {
    line.chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
