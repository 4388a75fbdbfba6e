//! # QED CLI (`qed`)
//!
//! The `qed` binary takes web articles into the QED knowledge base.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `qed init` | Create the analysis directory and index headings |
//! | `qed intake <url> [priority]` | Fetch one article and file its analysis |
//! | `qed batch <file>` | Run intake for every `URL [priority]` line |
//! | `qed check` | Verify paths, headings, git and API key |
//! | `qed stats` | Summarize existing analyses |
//!
//! ## Examples
//!
//! ```bash
//! export JINA_API_KEY=...
//! qed intake https://example.com/agents high --config ./config/qed.toml
//! qed intake https://example.com/post --dry-run
//! qed batch reading-list.txt --delay 5
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use qed_intake::batch::{self, BatchOptions};
use qed_intake::config;
use qed_intake::intake::{self, Matchers};
use qed_intake::models::{IndexChange, IntakeOutcome, IntakeRequest};
use qed_intake::progress::ProgressMode;
use qed_intake::reader::ReaderClient;
use qed_intake::{check, git, stats, workspace};

/// QED intake — pull web articles into the knowledge base as analysis notes.
#[derive(Parser)]
#[command(
    name = "qed",
    about = "QED intake — pull web articles into the knowledge base as analysis notes",
    version,
    long_about = "Fetches an article through the Reader API, checks that enough content came back, \
    writes a templated Markdown analysis, files it in the README index and TODO review queue, \
    and commits the result."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/qed.toml")]
    config: PathBuf,

    /// Enable debug logging (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the analysis directory and the index/TODO headings.
    ///
    /// Idempotent: existing files keep their content and only missing
    /// headings are appended.
    Init,

    /// Fetch one URL and file its analysis.
    Intake {
        /// Article URL.
        url: String,

        /// Review priority: high, medium or low (default from config).
        priority: Option<String>,

        /// Fetch and classify, but write nothing.
        #[arg(long)]
        dry_run: bool,

        /// Write files but skip the git commit.
        #[arg(long)]
        no_commit: bool,

        /// Overwrite an analysis of a different URL with the same file name.
        #[arg(long)]
        force: bool,

        /// Processing date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Run intake for every `URL [priority]` line of a file.
    Batch {
        /// File with one URL per line.
        file: PathBuf,

        /// Seconds to wait between URLs (default from config).
        #[arg(long)]
        delay: Option<u64>,

        /// Write files but skip git commits.
        #[arg(long)]
        no_commit: bool,

        /// Overwrite analyses of different URLs with the same file name.
        #[arg(long)]
        force: bool,

        /// Processing date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Progress on stderr: off, human or json. Defaults to human on a TTY.
        #[arg(long)]
        progress: Option<ProgressMode>,
    },

    /// Check config paths, index headings, git and the Reader API key.
    Check,

    /// Summarize existing analyses.
    Stats,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "qed_intake=debug,qed=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_date(date: Option<String>) -> Result<NaiveDate> {
    match date {
        Some(s) => Ok(NaiveDate::parse_from_str(&s, "%Y-%m-%d")?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn describe_change(change: Option<IndexChange>) -> &'static str {
    match change {
        Some(IndexChange::Inserted) => "added",
        Some(IndexChange::Updated) => "updated",
        Some(IndexChange::Moved) => "moved",
        Some(IndexChange::Unchanged) => "unchanged",
        None => "skipped",
    }
}

fn print_outcome(outcome: &IntakeOutcome, dry_run: bool, commit_subject: Option<String>) {
    let rec = &outcome.record;
    for w in rec.assessment.warnings() {
        println!("⚠️  {}", w);
    }
    if dry_run {
        println!("🔍 dry run: {}", rec.title);
        println!("  would write: {}", outcome.analysis_path.display());
        if outcome.overwritten {
            println!("  (replaces an existing analysis)");
        }
        println!("  category: {}", rec.category);
        println!("  priority: {}", rec.priority);
        return;
    }

    let verb = if outcome.overwritten { "rewrote" } else { "created" };
    println!("✅ {} {}", verb, outcome.analysis_path.display());
    println!("  title: {}", rec.title);
    println!("  domain: {}", rec.domain);
    println!("  category: {}", rec.category);
    println!("  index: {}", describe_change(outcome.index_change));
    println!("  todo: {}", describe_change(outcome.todo_change));
    match commit_subject {
        Some(subject) if outcome.committed => println!("  commit: yes ({})", subject),
        _ if outcome.committed => println!("  commit: yes"),
        _ => println!("  commit: no"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let report = workspace::init_workspace(&cfg)?;
            for created in &report.created {
                println!("  created {}", created);
            }
            println!("Repository initialized.");
        }
        Commands::Intake {
            url,
            priority,
            dry_run,
            no_commit,
            force,
            date,
        } => {
            let request = IntakeRequest {
                priority: intake::resolve_priority(&cfg, priority.as_deref()),
                date: parse_date(date)?,
                commit: cfg.intake.commit && !no_commit,
                url,
                dry_run,
                force,
            };
            let reader = ReaderClient::new(&cfg.reader)?;
            let matchers = Matchers::from_config(&cfg)?;

            println!("📥 {}", request.url);
            let outcome = intake::run_intake(&cfg, &reader, &matchers, &request).await?;
            let subject = outcome
                .committed
                .then(|| git::last_commit_subject(&cfg.repo.root))
                .flatten();
            print_outcome(&outcome, dry_run, subject);
        }
        Commands::Batch {
            file,
            delay,
            no_commit,
            force,
            date,
            progress,
        } => {
            let options = BatchOptions {
                date: parse_date(date)?,
                delay: Duration::from_secs(delay.unwrap_or(cfg.batch.delay_secs)),
                commit: cfg.intake.commit && !no_commit,
                force,
            };
            let reporter = progress
                .unwrap_or_else(ProgressMode::default_for_tty)
                .reporter();
            let reader = ReaderClient::new(&cfg.reader)?;

            let summary = batch::run_batch(
                &cfg,
                &reader,
                &file,
                &options,
                reporter.as_ref(),
                |entry, result| match result {
                    Ok(outcome) => println!(
                        "✅ {} → {}",
                        entry.url,
                        outcome.analysis_path.display()
                    ),
                    Err(e) => println!("❌ {} ({})", entry.url, e),
                },
            )
            .await?;

            println!("batch {}", file.display());
            println!("  succeeded: {}", summary.succeeded);
            println!("  failed: {}", summary.failed);
            if summary.skipped > 0 {
                println!("  skipped lines: {}", summary.skipped);
            }
            if let Some(rate) = summary.success_rate() {
                println!("  success rate: {}%", rate);
            }
        }
        Commands::Check => {
            check::run_check(&cfg)?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg)?;
        }
    }

    Ok(())
}
