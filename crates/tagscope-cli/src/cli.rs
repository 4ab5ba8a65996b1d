//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "tagscope")]
#[command(about = "Named entity summaries and Open Calais tagging for text files")]
#[command(version)]
pub struct Cli {
    /// Maximum level of log messages
    #[arg(long, value_enum, global = true, ignore_case = true)]
    pub loglevel: Option<LogLevel>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize the named entities of each file
    Entities {
        /// Text files to summarize
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Tag each file with Open Calais and write calais_<name> reports
    Calais {
        /// Text files to tag
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Lines per request
        #[arg(long)]
        batch_size: Option<usize>,

        /// Directory for reports instead of beside each input
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Do not request social tags
        #[arg(long)]
        no_social_tags: bool,
    },
    /// Convert JSON fulltext documents into wrapped .txt files
    Prepfiles {
        /// Directory holding the JSON documents
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Wrap column
        #[arg(long, default_value_t = tagscope_parser::fulltext::DEFAULT_WRAP_WIDTH)]
        width: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "UPPER")]
pub enum LogLevel {
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Filter directive for this level
    pub fn directive(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}
