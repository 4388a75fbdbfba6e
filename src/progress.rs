//! Batch progress reporting.
//!
//! Reports per-URL progress during `qed batch` so users see which URL is
//! being fetched and how many are left. Progress is emitted on **stderr** so
//! stdout keeps the per-URL status lines and the final summary.

use std::io::Write;

/// A single progress event for a batch run.
#[derive(Clone, Debug)]
pub enum BatchProgressEvent {
    /// Intake of the n-th URL (1-based) is starting.
    Started { n: u64, total: u64, url: String },
    /// Intake of the n-th URL finished.
    Finished {
        n: u64,
        total: u64,
        url: String,
        ok: bool,
    },
    /// Waiting before the next URL.
    Waiting { secs: u64 },
}

/// Reports batch progress. Implementations write to stderr (human or JSON).
pub trait BatchProgressReporter: Send + Sync {
    fn report(&self, event: BatchProgressEvent);
}

/// Human-friendly progress on stderr: "batch  3 / 12  https://...".
pub struct StderrProgress;

impl BatchProgressReporter for StderrProgress {
    fn report(&self, event: BatchProgressEvent) {
        let line = match &event {
            BatchProgressEvent::Started { n, total, url } => {
                format!(
                    "batch  {} / {}  {}\n",
                    format_number(*n),
                    format_number(*total),
                    url
                )
            }
            BatchProgressEvent::Finished { n, total, ok, .. } => {
                let status = if *ok { "done" } else { "failed" };
                format!(
                    "batch  {} / {}  {}\n",
                    format_number(*n),
                    format_number(*total),
                    status
                )
            }
            BatchProgressEvent::Waiting { secs } => {
                format!("batch  waiting {}s\n", secs)
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl BatchProgressReporter for JsonProgress {
    fn report(&self, event: BatchProgressEvent) {
        let obj = match &event {
            BatchProgressEvent::Started { n, total, url } => serde_json::json!({
                "event": "progress",
                "phase": "started",
                "n": n,
                "total": total,
                "url": url
            }),
            BatchProgressEvent::Finished { n, total, url, ok } => serde_json::json!({
                "event": "progress",
                "phase": "finished",
                "n": n,
                "total": total,
                "url": url,
                "ok": ok
            }),
            BatchProgressEvent::Waiting { secs } => serde_json::json!({
                "event": "progress",
                "phase": "waiting",
                "secs": secs
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl BatchProgressReporter for NoProgress {
    fn report(&self, _event: BatchProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn BatchProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

impl std::str::FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" | "none" => Ok(ProgressMode::Off),
            "human" => Ok(ProgressMode::Human),
            "json" => Ok(ProgressMode::Json),
            other => Err(format!(
                "unknown progress mode '{}': expected off, human or json",
                other
            )),
        }
    }
}
