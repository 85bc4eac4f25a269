//! repo-etl: move a CSV file from one GitHub repository into another as JSON.
//!
//! A run has three stages. Extract reads the CSV through the contents API,
//! transform turns its rows into a JSON array of objects, and load creates or
//! overwrites the target file in the destination repository.
//!
//! # Modules
//!
//! - [`remote`]: File handles, the contents API wire types, the GitHub client
//! - [`tabular`]: CSV parsing and JSON rendering
//! - [`pipeline`]: The three stages and the orchestrator
//! - [`config`]: YAML config file and CLI override merging
//! - [`error`]: Error types for repo-etl operations

pub mod config;
pub mod error;
pub mod pipeline;
pub mod remote;
pub mod tabular;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use time::OffsetDateTime;
use tracing::warn;
use tracing_subscriber::EnvFilter;

pub use error::EtlError;

use config::{ConfigFile, Overrides, PipelineConfig};
use pipeline::LoadAction;
use remote::{RemoteFileHandle, Token};
use tabular::{ParseOptions, RowShapePolicy};

/// The repo-etl CLI application.
#[derive(Parser)]
#[command(name = "repo-etl")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase logging (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Extract a CSV from a repository, convert it, and load the JSON into another.
    Run(RunArgs),
    /// Convert a local CSV file to JSON without touching the network.
    Convert(ConvertArgs),
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Arguments for the run subcommand.
#[derive(clap::Args)]
struct RunArgs {
    /// YAML config file with source, destination and options.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Source CSV as <owner>/<repo>/<path>.
    #[arg(long)]
    source: Option<String>,

    /// Branch, tag or commit to read the source from.
    #[arg(long)]
    source_ref: Option<String>,

    /// Destination JSON as <owner>/<repo>/<path>.
    #[arg(long)]
    dest: Option<String>,

    /// Branch to commit the destination file to (default: main).
    #[arg(long)]
    branch: Option<String>,

    /// Commit message for the destination file.
    #[arg(long, short)]
    message: Option<String>,

    /// Contents API root, e.g. for GitHub Enterprise.
    #[arg(long)]
    api_url: Option<String>,

    /// Overall timeout per HTTP request, in seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Fail on rows whose field count differs from the header.
    #[arg(long, overrides_with = "no_strict")]
    strict: bool,

    /// Pad or keep ragged rows even if the config file sets `strict`.
    #[arg(long, overrides_with = "strict")]
    no_strict: bool,

    /// Append a UTC timestamp to the destination file name.
    #[arg(long, overrides_with = "no_timestamp")]
    timestamp: bool,

    /// Keep the destination file name even if the config file sets `timestamp`.
    #[arg(long, overrides_with = "timestamp")]
    no_timestamp: bool,

    /// Field delimiter of the source file.
    #[arg(long)]
    delimiter: Option<char>,

    /// Extract and transform only; print the JSON instead of writing it.
    #[arg(long)]
    dry_run: bool,

    /// GitHub token with contents read/write access.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Output format for the run report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// CSV file to convert.
    input: PathBuf,

    /// Write JSON here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Fail on rows whose field count differs from the header.
    #[arg(long)]
    strict: bool,

    /// Field delimiter of the input file.
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

/// Run the repo-etl CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), EtlError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Run(args)) => run_pipeline(args),
        Some(Commands::Convert(args)) => run_convert(args),
        None => {
            println!("repo-etl {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Move a CSV file from one GitHub repository into another as JSON.");
            println!();
            println!("Run 'repo-etl --help' for usage information.");
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("repo_etl={level}")));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Execute the run subcommand.
fn run_pipeline(args: RunArgs) -> Result<(), EtlError> {
    let file = match &args.config {
        Some(path) => ConfigFile::read(path)?,
        None => ConfigFile::default(),
    };

    let overrides = Overrides {
        source: args
            .source
            .as_deref()
            .map(RemoteFileHandle::parse)
            .transpose()?,
        source_ref: args.source_ref,
        destination: args
            .dest
            .as_deref()
            .map(RemoteFileHandle::parse)
            .transpose()?,
        branch: args.branch,
        message: args.message,
        api_url: args.api_url,
        timeout_secs: args.timeout,
        strict: switch(args.strict, args.no_strict),
        timestamp: switch(args.timestamp, args.no_timestamp),
        delimiter: args.delimiter,
        dry_run: args.dry_run,
    };

    let config = PipelineConfig::resolve(
        file,
        overrides,
        args.token.map(Token::new),
        OffsetDateTime::now_utc(),
    )?;
    let outcome = pipeline::run_github(&config)?;

    match args.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome)
                .map_err(|source| EtlError::JsonWrite { source })?;
            println!("{json}");
        }
        OutputFormat::Text => {
            print!("{}", outcome);
            if outcome.load.action == LoadAction::DryRun {
                if let Some(document) = &outcome.load.document {
                    println!();
                    println!("{document}");
                }
            }
        }
    }

    Ok(())
}

/// A `--flag`/`--no-flag` pair; `None` when neither was given.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), EtlError> {
    let options = ParseOptions {
        policy: if args.strict {
            RowShapePolicy::Strict
        } else {
            RowShapePolicy::Lenient
        },
        delimiter: config::delimiter_byte(args.delimiter)?,
    };

    let (records, report) = tabular::read_csv_file(&args.input, &options)?;
    for issue in &report.issues {
        warn!("{}", issue);
    }

    match &args.output {
        Some(path) => {
            tabular::write_json_file(path, &records)?;
            println!("Converted {} -> {}", args.input.display(), path.display());
            print!("{}", report);
        }
        None => println!("{}", tabular::serialize(&records)?),
    }

    Ok(())
}
