//! Account CLI commands
//!
//! Implements CLI commands for account management.

use clap::Subcommand;

use super::{emit, OutputFormat};
use crate::config::Settings;
use crate::display::format_account_list;
use crate::error::{BucketwiseError, BucketwiseResult};
use crate::models::AccountRole;
use crate::services::AccountService;
use crate::storage::Storage;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name
        name: String,
        /// Account role (checking, credit_card, savings, other)
        #[arg(short, long, default_value = "checking")]
        role: String,
    },
    /// List all accounts
    List,
}

/// Handle an account command
pub fn handle_account_command(
    storage: &Storage,
    settings: &Settings,
    format: OutputFormat,
    cmd: AccountCommands,
) -> BucketwiseResult<()> {
    let service = AccountService::new(storage);

    match cmd {
        AccountCommands::Create { name, role } => {
            let role = AccountRole::parse(&role).ok_or_else(|| {
                BucketwiseError::Validation(format!(
                    "Invalid account role: '{}'. Valid roles: checking, credit_card, savings, other",
                    role
                ))
            })?;

            let account = service.create(&name, role)?;
            emit(format, &account, || {
                format!(
                    "Created account: {}\n  Role: {}\n  ID: {}\n",
                    account.name, account.role, account.id
                )
            })?;
        }

        AccountCommands::List => {
            let accounts = service.list()?;
            emit(format, &accounts, || {
                format_account_list(&accounts, &settings.currency_symbol)
            })?;
        }
    }

    Ok(())
}
