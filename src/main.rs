use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bucketwise::cli::{
    emit, handle_account_command, handle_bucket_command, handle_event_command, OutputFormat,
};
use bucketwise::config::{BucketwisePaths, Settings};
use bucketwise::display::format_errors;
use bucketwise::error::BucketwiseResult;
use bucketwise::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "bucketwise",
    version,
    about = "Bucket-based personal finance tracker",
    long_about = "bucketwise records expenses, deposits, transfers and reallocations \
                  against the buckets of your accounts. Events are entered as form \
                  bodies, checked against the accounts and buckets you have, and \
                  only saved when every amount adds up."
)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, global = true, default_value = "text")]
    format: OutputFormat,

    /// More diagnostic output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management commands
    #[command(subcommand)]
    Account(bucketwise::cli::AccountCommands),

    /// Bucket management commands
    #[command(subcommand)]
    Bucket(bucketwise::cli::BucketCommands),

    /// Event planning, checking and saving
    #[command(subcommand)]
    Event(bucketwise::cli::EventCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn init_tracing(verbose: u8, settings: &Settings) {
    let filter = match verbose {
        0 => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| settings.log_filter.as_str().into()),
        1 => "info".into(),
        2 => "debug".into(),
        _ => "trace".into(),
    };

    // Ignore a subscriber that is already installed
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn run(cli: Cli, paths: BucketwisePaths, settings: Settings) -> BucketwiseResult<()> {
    let storage = Storage::new(paths.clone())?.with_settings(&settings);
    storage.load_all()?;

    match cli.command {
        Some(Commands::Account(cmd)) => {
            handle_account_command(&storage, &settings, cli.format, cmd)?;
        }
        Some(Commands::Bucket(cmd)) => {
            handle_bucket_command(&storage, &settings, cli.format, cmd)?;
        }
        Some(Commands::Event(cmd)) => {
            handle_event_command(&storage, &settings, cli.format, cmd)?;
        }
        Some(Commands::Audit { limit }) => {
            let entries = storage.audit().read_recent(limit)?;
            emit(cli.format, &entries, || {
                if entries.is_empty() {
                    return "No audit entries found.\n".to_string();
                }
                entries
                    .iter()
                    .map(|entry| format!("{}\n", entry.format_human_readable()))
                    .collect()
            })?;
        }
        Some(Commands::Init) => {
            println!("Initializing bucketwise at: {}", paths.base_dir().display());
            if initialize_storage(&paths, &settings)? {
                println!("Initialization complete!");
                println!();
                println!("Next steps:");
                println!("  bucketwise account create Checking");
                println!("  bucketwise bucket create Checking Rent");
            } else {
                println!("Already initialized.");
            }
        }
        Some(Commands::Config) => {
            println!("bucketwise Configuration");
            println!("========================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Log filter:      {}", settings.log_filter);
            println!("  Audit enabled:   {}", settings.audit_enabled);
            let defaults: Vec<String> = settings
                .default_buckets
                .iter()
                .map(|d| format!("{} ({})", d.name, d.role))
                .collect();
            println!("  Default buckets: {}", defaults.join(", "));
        }
        None => {
            println!("bucketwise - bucket-based personal finance tracker");
            println!();
            println!("Run 'bucketwise --help' for usage information.");
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = BucketwisePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_tracing(cli.verbose, &settings);

    if let Err(err) = run(cli, paths, settings) {
        if let Some(errors) = err.allocation_errors() {
            eprint!("{}", format_errors(errors));
            std::process::exit(1);
        }
        return Err(err.into());
    }

    Ok(())
}
