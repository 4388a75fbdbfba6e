//! Batch intake from a URL list.
//!
//! Reads `URL [priority]` lines and runs the intake pipeline for each one
//! in order, sleeping a fixed delay between calls to stay under the Reader
//! API's rate limit. A failed URL is counted and the loop moves on.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tracing::warn;

use crate::config::Config;
use crate::intake::{self, Matchers};
use crate::models::{IntakeOutcome, IntakeRequest};
use crate::progress::{BatchProgressEvent, BatchProgressReporter};
use crate::reader::ContentReader;

/// One URL line of a batch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub line: usize,
    pub url: String,
    pub priority: Option<String>,
}

/// Parsed batch file.
#[derive(Debug, Default)]
pub struct BatchFile {
    pub entries: Vec<BatchEntry>,
    /// Non-empty, non-comment lines that do not start with `http`.
    pub skipped: Vec<(usize, String)>,
}

pub fn parse_batch(content: &str) -> BatchFile {
    let mut out = BatchFile::default();
    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !line.starts_with("http") {
            out.skipped.push((i + 1, line.to_string()));
            continue;
        }
        let mut parts = line.split_whitespace();
        let url = parts.next().unwrap_or_default().to_string();
        let priority = parts.next().map(str::to_string);
        out.entries.push(BatchEntry {
            line: i + 1,
            url,
            priority,
        });
    }
    out
}

/// Counters for a finished batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl BatchSummary {
    pub fn attempted(&self) -> u64 {
        self.succeeded + self.failed
    }

    /// Integer-truncated success percentage, `None` when nothing was attempted.
    pub fn success_rate(&self) -> Option<u64> {
        match self.attempted() {
            0 => None,
            n => Some(self.succeeded * 100 / n),
        }
    }
}

/// Options shared by every intake in a batch.
pub struct BatchOptions {
    pub date: NaiveDate,
    pub delay: Duration,
    pub commit: bool,
    pub force: bool,
}

/// Run every entry of the batch file at `path`.
///
/// `on_result` receives each intake's outcome so the caller can print it.
pub async fn run_batch<F>(
    config: &Config,
    reader: &dyn ContentReader,
    path: &Path,
    options: &BatchOptions,
    progress: &dyn BatchProgressReporter,
    mut on_result: F,
) -> Result<BatchSummary>
where
    F: FnMut(&BatchEntry, &Result<IntakeOutcome>),
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file: {}", path.display()))?;
    let batch = parse_batch(&content);

    for (line, text) in &batch.skipped {
        warn!(line, text = %text, "skipping line that is not a URL");
    }
    if batch.entries.is_empty() {
        bail!("no URLs found in {}", path.display());
    }

    let matchers = Matchers::from_config(config)?;
    let total = batch.entries.len() as u64;
    let mut summary = BatchSummary {
        skipped: batch.skipped.len() as u64,
        ..BatchSummary::default()
    };

    for (i, entry) in batch.entries.iter().enumerate() {
        let n = i as u64 + 1;
        if i > 0 && !options.delay.is_zero() {
            progress.report(BatchProgressEvent::Waiting {
                secs: options.delay.as_secs(),
            });
            tokio::time::sleep(options.delay).await;
        }

        progress.report(BatchProgressEvent::Started {
            n,
            total,
            url: entry.url.clone(),
        });

        let request = IntakeRequest {
            url: entry.url.clone(),
            priority: intake::resolve_priority(config, entry.priority.as_deref()),
            date: options.date,
            dry_run: false,
            commit: options.commit,
            force: options.force,
        };
        let result = intake::run_intake(config, reader, &matchers, &request).await;

        let ok = result.is_ok();
        if ok {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }
        on_result(entry, &result);

        progress.report(BatchProgressEvent::Finished {
            n,
            total,
            url: entry.url.clone(),
            ok,
        });
    }

    Ok(summary)
}
