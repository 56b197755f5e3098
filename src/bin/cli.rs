//! Channel Scout CLI
//!
//! Local execution entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use channel_scout::{
    error::{AppError, Result},
    models::{Config, FilterCriteria},
    pipeline::{self, RunStatus, Scout},
    storage::{LocalExporter, ResultExporter, csv},
    utils::progress,
};

/// Channel Scout - keyword-driven channel discovery
#[derive(Parser, Debug)]
#[command(
    name = "channel-scout",
    version,
    about = "Find channels by keyword, subscriber range and upload recency"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "scout.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover, filter and export channels
    Run(RunArgs),

    /// Probe the API with the configured credential
    Check {
        #[command(flatten)]
        credential: Credential,
    },

    /// Validate the configuration file
    Validate,
}

#[derive(Args, Debug)]
struct Credential {
    /// API key
    #[arg(long = "api-key", env = "YOUTUBE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl Credential {
    fn require(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(AppError::MissingCredential)
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    credential: Credential,

    /// Search keyword; repeat to search several (replaces configured keywords)
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,

    /// Search result pages per keyword
    #[arg(long)]
    max_pages: Option<u32>,

    /// Minimum subscriber count (inclusive)
    #[arg(long)]
    min_subscribers: Option<u64>,

    /// Maximum subscriber count (inclusive)
    #[arg(long)]
    max_subscribers: Option<u64>,

    /// Require an upload within this many days
    #[arg(long)]
    within_days: Option<u32>,

    /// Directory for export files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Skip the pre-run API probe
    #[arg(long)]
    skip_sanity: bool,
}

impl RunArgs {
    /// Apply command-line overrides on top of the file configuration.
    fn apply(&self, config: &mut Config) {
        if !self.keywords.is_empty() {
            config.search.keywords = self.keywords.clone();
        }
        if let Some(pages) = self.max_pages {
            config.search.max_pages = pages;
        }
        if let Some(min) = self.min_subscribers {
            config.filter.subscribers.min = Some(min);
            config.filter.subscribers.min_inclusive = true;
        }
        if let Some(max) = self.max_subscribers {
            config.filter.subscribers.max = Some(max);
            config.filter.subscribers.max_inclusive = true;
        }
        if let Some(days) = self.within_days {
            config.filter.latest_within_days = Some(days);
            config.filter.latest_after = None;
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Missing file means defaults; a file that fails to parse is an error.
fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let config = Config::load(path)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    } else {
        Ok(Config::load_or_default(path))
    }
}

async fn run(mut config: Config, args: &RunArgs) -> Result<()> {
    args.apply(&mut config);
    config.validate()?;
    let api_key = args.credential.require()?;

    progress::header("Channel Scout");
    let criteria = FilterCriteria::from_config(&config.filter, Utc::now())?;
    let exporter = LocalExporter::from_config(&config.output);
    let max_results = config.pipeline.max_results;
    let scout = Scout::connect(config, api_key)?;

    if args.skip_sanity {
        log::warn!("Skipping API sanity check");
    } else {
        scout.sanity_check().await?;
    }

    let outcome = scout.run(criteria).await?;
    match outcome.status {
        RunStatus::NoCandidates => {
            log::warn!("No candidate channels were found; nothing to export");
        }
        RunStatus::NoMatches => {
            log::warn!(
                "{} candidates found but none matched the filters; nothing to export",
                outcome.stats.candidates
            );
        }
        RunStatus::Matched(count) => {
            print!("{}", csv::render_table(&outcome.rows));
            let summary = exporter.export(&outcome.rows, &outcome.stats).await?;
            log::info!("Exported {} channels", count);
            for file in &summary.files {
                progress::sub_item(&file.display().to_string());
            }
            if max_results.is_some_and(|cap| outcome.stats.accepted > cap) {
                log::info!("Result cap applied: {} of {} accepted", count, outcome.stats.accepted);
            }
        }
    }

    pipeline::report(&outcome.stats);
    Ok(())
}

async fn check(config: Config, credential: &Credential) -> Result<()> {
    let scout = Scout::connect(config, credential.require()?)?;
    scout.sanity_check().await
}

fn validate(config: &Config) -> Result<()> {
    log::info!("Validating configuration...");
    config.validate()?;
    FilterCriteria::from_config(&config.filter, Utc::now())?;
    log::info!("✓ Config OK ({} keywords)", config.search.keywords.len());
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match load_config(&cli.config) {
        Ok(config) => match &cli.command {
            Command::Run(args) => run(config, args).await,
            Command::Check { credential } => check(config, credential).await,
            Command::Validate => validate(&config),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            log::info!("Done!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
