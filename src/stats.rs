//! Analysis corpus overview.
//!
//! Summarizes what has been taken in so far: analysis counts by priority and
//! category, total size, and the most recent intake. Used by `qed stats`.

use std::collections::BTreeMap;

use anyhow::Result;
use walkdir::WalkDir;

use crate::analysis;
use crate::config::Config;

/// Aggregated counts over the analysis directory.
#[derive(Debug, Default)]
pub struct CorpusStats {
    pub files: u64,
    pub bytes: u64,
    pub by_priority: BTreeMap<String, u64>,
    pub by_category: BTreeMap<String, u64>,
    /// Latest `Processed` date and the file it came from.
    pub latest: Option<(String, String)>,
}

pub fn collect_stats(config: &Config) -> Result<CorpusStats> {
    let dir = config.repo.analysis_path();
    let mut stats = CorpusStats::default();
    if !dir.is_dir() {
        return Ok(stats);
    }

    for entry in WalkDir::new(&dir).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "md") {
            continue;
        }

        let content = std::fs::read_to_string(path)?;
        let fields = analysis::header_fields(&content);
        let get = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| "unknown".to_string())
        };

        stats.files += 1;
        stats.bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        *stats.by_priority.entry(get("Priority")).or_default() += 1;
        *stats.by_category.entry(get("Category")).or_default() += 1;

        let processed = get("Processed");
        let name = entry.file_name().to_string_lossy().to_string();
        let newer = match &stats.latest {
            Some((date, file)) => (&processed, &name) > (date, file),
            None => true,
        };
        if newer && processed != "unknown" {
            stats.latest = Some((processed, name));
        }
    }

    Ok(stats)
}

pub fn run_stats(config: &Config) -> Result<()> {
    let stats = collect_stats(config)?;

    println!("QED — Analysis Stats");
    println!("====================");
    println!();
    println!("  Directory:   {}", config.repo.analysis_path().display());
    println!("  Analyses:    {}", stats.files);
    println!("  Size:        {}", format_bytes(stats.bytes));
    match &stats.latest {
        Some((date, file)) => println!("  Latest:      {} ({})", date, file),
        None => println!("  Latest:      none"),
    }

    if !stats.by_priority.is_empty() {
        println!();
        println!("  By priority:");
        for (p, n) in &stats.by_priority {
            println!("    {:<28} {:>6}", p, n);
        }
        println!();
        println!("  By category:");
        for (c, n) in &stats.by_category {
            println!("    {:<28} {:>6}", c, n);
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
