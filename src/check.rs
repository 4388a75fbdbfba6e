//! `qed check`: health report for a knowledge-base checkout.
//!
//! Verifies the configured repository root, the analysis directory, the
//! index and TODO headings, git availability and the Reader API key, then
//! prints one table row per check. Fails if any required check is unhealthy.

use anyhow::Result;

use crate::config::Config;
use crate::git;
use crate::index;

/// Status of one health check.
#[derive(Debug, Clone)]
pub struct CheckStatus {
    pub name: String,
    pub status: String,
    pub healthy: bool,
}

fn status(name: &str, status: impl Into<String>, healthy: bool) -> CheckStatus {
    CheckStatus {
        name: name.to_string(),
        status: status.into(),
        healthy,
    }
}

/// Evaluate the repository layout, index headings, git and credentials.
pub fn get_checks(config: &Config) -> Vec<CheckStatus> {
    let mut out = Vec::new();
    let repo = &config.repo;

    out.push(if repo.root.is_dir() {
        status("repo root", "OK", true)
    } else {
        status("repo root", "MISSING", false)
    });

    out.push(if repo.analysis_path().is_dir() {
        status("analysis dir", "OK", true)
    } else {
        status("analysis dir", "MISSING (created on first intake)", true)
    });

    let index_path = repo.index_path();
    out.push(match std::fs::read_to_string(&index_path) {
        Ok(content) => {
            let missing: Vec<&str> = [&config.index.tool_heading, &config.index.framework_heading]
                .into_iter()
                .filter(|h| !index::has_heading(&content, h))
                .map(String::as_str)
                .collect();
            if missing.is_empty() {
                status("index file", "OK", true)
            } else {
                status(
                    "index file",
                    format!("MISSING HEADING {}", missing.join(", ")),
                    true,
                )
            }
        }
        Err(_) => status("index file", "MISSING (created on first intake)", true),
    });

    let todo_path = repo.todo_path();
    out.push(match std::fs::read_to_string(&todo_path) {
        Ok(content) if index::has_heading(&content, &config.index.todo_heading) => {
            status("todo file", "OK", true)
        }
        Ok(_) => status(
            "todo file",
            format!("MISSING HEADING {}", config.index.todo_heading),
            true,
        ),
        Err(_) => status("todo file", "MISSING (created on first intake)", true),
    });

    out.push(if git::is_work_tree(&repo.root) {
        status("git", "OK", true)
    } else if config.intake.commit {
        status("git", "NOT A WORK TREE", false)
    } else {
        status("git", "NOT A WORK TREE (commit disabled)", true)
    });

    out.push(if config.reader.api_key().is_some() {
        status("reader api key", "OK", true)
    } else {
        status(
            "reader api key",
            format!("UNSET ({})", config.reader.api_key_env),
            true,
        )
    });

    out
}

pub fn run_check(config: &Config) -> Result<()> {
    let checks = get_checks(config);

    println!("{:<16} {:<44} HEALTHY", "CHECK", "STATUS");
    for c in &checks {
        println!("{:<16} {:<44} {}", c.name, c.status, c.healthy);
    }

    if let Some(bad) = checks.iter().find(|c| !c.healthy) {
        anyhow::bail!("check failed: {} is {}", bad.name, bad.status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn find<'a>(checks: &'a [CheckStatus], name: &str) -> &'a CheckStatus {
        checks.iter().find(|c| c.name == name).unwrap()
    }

    #[test]
    fn test_missing_heading_reported() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("README.md"),
            "# KB\n\n### Tool-Specific Evaluations\n",
        )
        .unwrap();
        let mut cfg = Config::default();
        cfg.repo.root = tmp.path().to_path_buf();
        cfg.intake.commit = false;

        let checks = get_checks(&cfg);
        let index = find(&checks, "index file");
        assert!(index.status.contains("### Framework Assessments"));
        assert!(find(&checks, "git").healthy);
    }

    #[test]
    fn test_missing_root_unhealthy() {
        let mut cfg = Config::default();
        cfg.repo.root = "/nonexistent/qed-root".into();
        let checks = get_checks(&cfg);
        assert!(!find(&checks, "repo root").healthy);
        assert!(run_check(&cfg).is_err());
    }
}
