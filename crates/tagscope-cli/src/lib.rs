//! Tagscope CLI - argument parsing, logging and per-file drivers
//!
//! Author: hephaex@gmail.com

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{Cli, Commands, LogLevel};
pub use commands::{run_calais, run_entities, run_prepfiles, RunTally};
