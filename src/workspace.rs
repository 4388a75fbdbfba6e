//! `qed init`: prepare a knowledge-base checkout for intake.
//!
//! Creates the analysis directory and makes sure the index and TODO files
//! exist with the configured headings. Idempotent.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::index;

/// What `init` created, for the status output.
#[derive(Debug, Default)]
pub struct InitReport {
    pub created: Vec<String>,
}

pub fn init_workspace(config: &Config) -> Result<InitReport> {
    let mut report = InitReport::default();
    let repo = &config.repo;

    let analysis_dir = repo.analysis_path();
    if !analysis_dir.is_dir() {
        std::fs::create_dir_all(&analysis_dir).with_context(|| {
            format!(
                "Failed to create analysis directory: {}",
                analysis_dir.display()
            )
        })?;
        report.created.push(analysis_dir.display().to_string());
    }

    let index_path = repo.index_path();
    let index_headings = [
        "## Analysis Index".to_string(),
        config.index.tool_heading.clone(),
        config.index.framework_heading.clone(),
    ];
    ensure_headings(&index_path, &index_headings, &mut report)?;

    let todo_path = repo.todo_path();
    ensure_headings(&todo_path, &[config.index.todo_heading.clone()], &mut report)?;

    Ok(report)
}

/// Append any of `headings` missing from the file at `path`.
///
/// The first heading is a section heading and is only added to files that
/// have none of the others.
fn ensure_headings(
    path: &std::path::Path,
    headings: &[String],
    report: &mut InitReport,
) -> Result<()> {
    let existing = if path.exists() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    } else {
        String::new()
    };

    // A category heading already present means the file has its own index
    // layout; only the missing category headings are added then.
    let has_layout =
        headings.len() > 1 && headings[1..].iter().any(|h| index::has_heading(&existing, h));
    let missing: Vec<&String> = headings
        .iter()
        .enumerate()
        .filter(|(i, h)| !(has_layout && *i == 0) && !index::has_heading(&existing, h))
        .map(|(_, h)| h)
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let mut content = existing.trim_end().to_string();
    for h in &missing {
        if !content.is_empty() {
            content.push_str("\n\n");
        }
        content.push_str(h.trim());
    }
    content.push('\n');

    index::write_atomic(path, &content)?;
    for h in missing {
        report
            .created
            .push(format!("{} ({})", path.display(), h.trim()));
    }
    Ok(())
}
