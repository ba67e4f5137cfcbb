//! Event CLI commands
//!
//! Event drafts are read as urlencoded form bodies, either inline with
//! `--form` or from a file with `--form-file` (`-` reads stdin).

use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use tracing::info;

use super::{emit, OutputFormat};
use crate::config::Settings;
use crate::display::{
    format_account_list, format_evaluation, format_event, format_event_list, format_plan,
};
use crate::error::{BucketwiseError, BucketwiseResult};
use crate::form::parse_event_form;
use crate::models::{EventDraft, EventRole, Section};
use crate::services::{
    AccountService, AllocationError, AllocationErrors, EventClassifier, SectionPlan,
};
use crate::storage::Storage;

/// Where an event form body comes from
#[derive(Args, Debug, Default)]
pub struct FormSource {
    /// Urlencoded event form body
    #[arg(long, conflicts_with = "form_file")]
    pub form: Option<String>,
    /// File holding the urlencoded event form body ("-" for stdin)
    #[arg(long)]
    pub form_file: Option<PathBuf>,
}

impl FormSource {
    /// The raw form body, if one was given
    pub fn read(&self) -> BucketwiseResult<Option<String>> {
        if let Some(body) = &self.form {
            return Ok(Some(body.clone()));
        }

        match &self.form_file {
            Some(path) if path.as_os_str() == "-" => {
                let mut body = String::new();
                std::io::stdin().read_to_string(&mut body)?;
                Ok(Some(body))
            }
            Some(path) => Ok(Some(std::fs::read_to_string(path)?)),
            None => Ok(None),
        }
    }

    /// Parse the form into a draft, failing when no form was given
    pub fn draft(&self) -> BucketwiseResult<EventDraft> {
        let body = self.read()?.ok_or_else(|| {
            BucketwiseError::Validation("Provide the event with --form or --form-file".into())
        })?;
        parse_event_form(body.trim(), chrono::Local::now().date_naive())
    }
}

/// Event subcommands
#[derive(Subcommand)]
pub enum EventCommands {
    /// Show which form sections apply to an event
    Plan {
        /// Event role (expense, deposit, transfer, reallocation)
        #[arg(short, long)]
        role: Option<String>,
        #[command(flatten)]
        source: FormSource,
    },
    /// Validate an event without saving it
    Check {
        #[command(flatten)]
        source: FormSource,
    },
    /// Validate and save an event
    Commit {
        #[command(flatten)]
        source: FormSource,
    },
    /// List the accounts a section may use
    Accounts {
        /// Section identifier, e.g. payment_source
        section: String,
    },
    /// List saved events
    List {
        /// Only events touching this account (name or ID)
        #[arg(short, long)]
        account: Option<String>,
    },
}

fn parse_role(role: &str) -> BucketwiseResult<EventRole> {
    role.parse::<EventRole>()
        .map_err(|e| BucketwiseError::Validation(e.to_string()))
}

fn parse_section(token: &str) -> BucketwiseResult<Section> {
    token.parse::<Section>().map_err(|e| {
        BucketwiseError::Allocation(AllocationErrors::from(AllocationError::from(e)))
    })
}

/// Handle an event command
pub fn handle_event_command(
    storage: &Storage,
    settings: &Settings,
    format: OutputFormat,
    cmd: EventCommands,
) -> BucketwiseResult<()> {
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        EventCommands::Plan { role, source } => {
            let catalog = storage.snapshot()?;
            let classifier = EventClassifier::new(&catalog);

            let (plan, draft) = match source.read()? {
                Some(body) => {
                    let draft =
                        parse_event_form(body.trim(), chrono::Local::now().date_naive())?;
                    (classifier.classify_draft(&draft), Some(draft))
                }
                None => match role {
                    Some(role) => (classifier.classify(parse_role(&role)?, []), None),
                    None => (SectionPlan::unrestricted(), None),
                },
            };

            emit(format, &plan, || {
                let mut output = format_plan(&plan);
                if let Some(draft) = &draft {
                    let repayment = if classifier.repayment_options_visible(draft) {
                        "shown"
                    } else {
                        "hidden"
                    };
                    output.push_str(&format!("Repayment options: {}\n", repayment));
                }
                output
            })?;
        }

        EventCommands::Check { source } => {
            let draft = source.draft()?;
            let catalog = storage.snapshot()?;
            let evaluation = EventClassifier::new(&catalog).evaluate(&draft)?;

            emit(format, &evaluation, || {
                format_evaluation(&evaluation, &catalog, symbol)
            })?;
        }

        EventCommands::Commit { source } => {
            let draft = source.draft()?;
            let catalog = storage.snapshot()?;
            let evaluation = EventClassifier::new(&catalog).evaluate(&draft)?;

            let event = storage.commit(evaluation.prepared)?;
            info!(id = ?event.id, role = %event.role, "saved event");

            let catalog = storage.snapshot()?;
            emit(format, &event, || {
                format!("Saved event.\n{}", format_event(&event, &catalog, symbol))
            })?;
        }

        EventCommands::Accounts { section } => {
            let section = parse_section(&section)?;
            let catalog = storage.snapshot()?;
            let accounts: Vec<_> = EventClassifier::new(&catalog)
                .eligible_accounts(section)
                .into_iter()
                .cloned()
                .collect();

            emit(format, &accounts, || format_account_list(&accounts, symbol))?;
        }

        EventCommands::List { account } => {
            let events = match account {
                Some(account) => {
                    let account = AccountService::new(storage).get(&account)?;
                    storage.events.get_by_account(account.id)?
                }
                None => storage.events.get_all()?,
            };

            emit(format, &events, || format_event_list(&events, symbol))?;
        }
    }

    Ok(())
}
