//! Subcommand drivers
//!
//! Each driver walks its inputs in order and isolates failures per file:
//! an error is logged and counted, and the next file is processed.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tagscope_calais::CalaisPipeline;
use tagscope_extractor::{write_summary, EntityAggregator};

/// Per-run success and failure counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunTally {
    /// Process exit status for this run
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

// ============================================================================
// entities
// ============================================================================

/// Summarize each file's entities to `out`, with progress on `progress`
pub fn run_entities<O: Write, P: Write>(
    files: &[PathBuf],
    aggregator: &EntityAggregator,
    out: &mut O,
    progress: &mut P,
) -> io::Result<RunTally> {
    let mut tally = RunTally::default();

    for file in files {
        writeln!(progress, "Processing {}", file.display())?;

        match aggregator.summarize_file(file) {
            Ok(summary) => {
                write_summary(&summary, out)?;
                tally.succeeded += 1;
            }
            Err(e) => {
                tracing::error!("{}: {}", file.display(), e);
                tally.failed += 1;
            }
        }

        out.flush()?;
        writeln!(progress, "\n")?;
    }

    Ok(tally)
}

// ============================================================================
// calais
// ============================================================================

/// Tag each file and write its report
pub async fn run_calais(files: &[PathBuf], pipeline: &CalaisPipeline) -> RunTally {
    let mut tally = RunTally::default();

    for file in files {
        tracing::info!("Processing {}", file.display());

        match pipeline.run(file).await {
            Ok(report) => {
                tracing::info!(
                    "{}: {} topics, {} tags, {} entities from {} batches",
                    report.output.display(),
                    report.topics,
                    report.tags,
                    report.entities,
                    report.batches
                );
                if report.soft_failures > 0 {
                    tracing::warn!(
                        "{}: {} of {} batches returned no data",
                        file.display(),
                        report.soft_failures,
                        report.batches
                    );
                }
                tally.succeeded += 1;
            }
            Err(e) => {
                tracing::error!("{}: {}", file.display(), e);
                tally.failed += 1;
            }
        }
    }

    tally
}

// ============================================================================
// prepfiles
// ============================================================================

/// Convert every JSON document in `dir`
pub fn run_prepfiles(dir: &Path, width: usize) -> tagscope_core::Result<RunTally> {
    let report = tagscope_parser::convert_directory(dir, width)?;
    tracing::info!(
        "converted {} of {} documents in {}",
        report.converted.len(),
        report.total(),
        dir.display()
    );

    Ok(RunTally {
        succeeded: report.converted.len(),
        failed: report.skipped.len(),
    })
}
