//! Tagscope CLI
//!
//! Usage:
//!   tagscope entities <file>... [--loglevel WARN|INFO|DEBUG]
//!   tagscope calais <file>... [--batch-size N] [--output-dir DIR] [--no-social-tags]
//!   tagscope prepfiles [dir] [--width N]
//!
//! Author: hephaex@gmail.com

use anyhow::Context;
use clap::Parser;
use tagscope_calais::CalaisPipeline;
use tagscope_cli::{logging, run_calais, run_entities, run_prepfiles, Cli, Commands};
use tagscope_core::AppConfig;
use tagscope_extractor::{EntityAggregator, RuleBasedTagger};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };

    let directive = cli
        .loglevel
        .map(|level| level.directive().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    logging::init(&directive, config.logging.include_level_prefix);

    let tally = match cli.command {
        Commands::Entities { files } => {
            let tagger = RuleBasedTagger::from_config(&config.ner);
            let aggregator = EntityAggregator::with_tagger(Box::new(tagger));

            let stdout = std::io::stdout();
            let stderr = std::io::stderr();
            run_entities(&files, &aggregator, &mut stdout.lock(), &mut stderr.lock())
                .context("failed to write summary")?
        }
        Commands::Calais {
            files,
            batch_size,
            output_dir,
            no_social_tags,
        } => {
            if let Some(size) = batch_size {
                config.calais.batch_size = size;
            }
            if output_dir.is_some() {
                config.calais.output_dir = output_dir;
            }
            if no_social_tags {
                config.calais.social_tags = false;
            }
            config.validate()?;

            let pipeline = CalaisPipeline::from_config(&config.calais)?;
            run_calais(&files, &pipeline).await
        }
        Commands::Prepfiles { dir, width } => run_prepfiles(&dir, width)
            .with_context(|| format!("cannot convert documents in {}", dir.display()))?,
    };

    if tally.failed > 0 {
        tracing::debug!("{} of {} inputs failed", tally.failed, tally.failed + tally.succeeded);
        std::process::exit(tally.exit_code());
    }

    Ok(())
}
