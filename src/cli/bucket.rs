//! Bucket CLI commands

use clap::Subcommand;

use super::{emit, OutputFormat};
use crate::config::Settings;
use crate::display::format_bucket_list;
use crate::error::BucketwiseResult;
use crate::services::AccountService;
use crate::storage::Storage;

/// Bucket subcommands
#[derive(Subcommand)]
pub enum BucketCommands {
    /// Create a bucket in an account
    Create {
        /// Account name or ID
        account: String,
        /// Bucket name
        name: String,
    },
    /// List an account's buckets, default buckets included
    List {
        /// Account name or ID
        account: String,
    },
}

/// Handle a bucket command
pub fn handle_bucket_command(
    storage: &Storage,
    settings: &Settings,
    format: OutputFormat,
    cmd: BucketCommands,
) -> BucketwiseResult<()> {
    let service = AccountService::new(storage);

    match cmd {
        BucketCommands::Create { account, name } => {
            let bucket = service.create_bucket(&account, &name)?;
            emit(format, &bucket, || {
                format!("Created bucket: {}\n  ID: {}\n", bucket.name, bucket.id)
            })?;
        }

        BucketCommands::List { account } => {
            let (account, buckets) = service.buckets(&account)?;
            emit(format, &buckets, || {
                format_bucket_list(&account, &buckets, &settings.currency_symbol)
            })?;
        }
    }

    Ok(())
}
