//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod bucket;
pub mod event;

pub use account::{handle_account_command, AccountCommands};
pub use bucket::{handle_bucket_command, BucketCommands};
pub use event::{handle_event_command, EventCommands};

use clap::ValueEnum;
use serde::Serialize;

use crate::error::BucketwiseResult;

/// How command results are written to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tables and plain text
    #[default]
    Text,
    Json,
    Yaml,
}

/// Print a result in the requested format
///
/// `text` is only rendered for the text format.
pub fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce() -> String,
) -> BucketwiseResult<()> {
    match format {
        OutputFormat::Text => print!("{}", text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}
