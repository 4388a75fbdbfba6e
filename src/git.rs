//! Git plumbing for committing an intake.
//!
//! Shells out to the `git` binary in the knowledge-base root. Only the files
//! an intake touched are staged and committed; anything else sitting in the
//! index or the work tree is left alone.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::error::IntakeError;

/// Fail with [`IntakeError::NotAGitRepo`] unless `root` is inside a git work tree.
pub fn ensure_work_tree(root: &Path) -> Result<()> {
    if is_work_tree(root) {
        Ok(())
    } else {
        Err(IntakeError::NotAGitRepo(root.to_path_buf()).into())
    }
}

pub fn is_work_tree(root: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(root)
        .output()
        .map(|o| o.status.success() && String::from_utf8_lossy(&o.stdout).trim() == "true")
        .unwrap_or(false)
}

/// Stage exactly `paths` and commit them with `message`.
///
/// The commit is limited to `paths` (`--only`), so changes the user already
/// staged elsewhere stay staged and out of the commit. Returns `false` when
/// none of `paths` differ from HEAD, in which case no commit is created.
pub fn commit_paths(root: &Path, paths: &[PathBuf], message: &str) -> Result<bool> {
    let rel: Vec<PathBuf> = paths.iter().map(|p| relative_to(root, p)).collect();

    let mut add = Command::new("git");
    add.args(["add", "--"]).args(&rel).current_dir(root);
    run(add, "git add")?;

    // `git diff --cached --quiet` exits 1 when something is staged.
    let staged = Command::new("git")
        .args(["diff", "--cached", "--quiet", "--"])
        .args(&rel)
        .current_dir(root)
        .status()
        .with_context(|| "Failed to execute 'git diff'")?;
    if staged.success() {
        debug!("nothing staged; skipping commit");
        return Ok(false);
    }

    let mut commit = Command::new("git");
    commit
        .args(["commit", "-q", "-m", message, "--only", "--"])
        .args(&rel)
        .current_dir(root);
    run(commit, "git commit")?;
    Ok(true)
}

fn run(mut cmd: Command, what: &str) -> Result<()> {
    let output = cmd
        .output()
        .with_context(|| format!("Failed to execute '{}'. Is git installed?", what))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        bail!("{} failed: {}", what, detail);
    }
    Ok(())
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

/// Subject of the last commit in `root`.
pub fn last_commit_subject(root: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["log", "-1", "--format=%s"])
        .current_dir(root)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let subject = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if subject.is_empty() {
        None
    } else {
        Some(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn init_repo() -> Option<TempDir> {
        let tmp = TempDir::new().unwrap();
        if !git(tmp.path(), &["init", "-q"]) {
            // git not available in this environment
            return None;
        }
        git(tmp.path(), &["config", "user.email", "qed@example.com"]);
        git(tmp.path(), &["config", "user.name", "QED"]);
        git(tmp.path(), &["config", "commit.gpgsign", "false"]);
        Some(tmp)
    }

    #[test]
    fn test_plain_dir_is_not_work_tree() {
        let tmp = TempDir::new().unwrap();
        let err = ensure_work_tree(tmp.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IntakeError>(),
            Some(IntakeError::NotAGitRepo(_))
        ));
    }

    #[test]
    fn test_commit_only_given_paths() {
        let Some(repo) = init_repo() else { return };
        let root = repo.path();
        std::fs::write(root.join("a.md"), "a\n").unwrap();
        std::fs::write(root.join("unrelated.md"), "u\n").unwrap();

        let committed = commit_paths(root, &[root.join("a.md")], "Add a").unwrap();
        assert!(committed);
        assert_eq!(last_commit_subject(root).as_deref(), Some("Add a"));

        // unrelated.md stays untracked
        let out = Command::new("git")
            .args(["status", "--porcelain"])
            .current_dir(root)
            .output()
            .unwrap();
        assert!(String::from_utf8_lossy(&out.stdout).contains("?? unrelated.md"));

        // Nothing changed: no second commit
        let committed = commit_paths(root, &[root.join("a.md")], "Again").unwrap();
        assert!(!committed);
        assert_eq!(last_commit_subject(root).as_deref(), Some("Add a"));
    }

    fn committed_files(root: &Path) -> Vec<String> {
        let out = Command::new("git")
            .args(["show", "--name-only", "--format=", "HEAD"])
            .current_dir(root)
            .output()
            .unwrap();
        String::from_utf8_lossy(&out.stdout)
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_commit_leaves_prestaged_files_alone() {
        let Some(repo) = init_repo() else { return };
        let root = repo.path();
        std::fs::write(root.join("seed.md"), "seed\n").unwrap();
        assert!(git(root, &["add", "seed.md"]));
        assert!(git(root, &["commit", "-q", "-m", "seed"]));

        std::fs::write(root.join("unrelated.md"), "u\n").unwrap();
        assert!(git(root, &["add", "unrelated.md"]));
        std::fs::write(root.join("a.md"), "a\n").unwrap();

        let committed = commit_paths(root, &[root.join("a.md")], "Add a").unwrap();
        assert!(committed);
        assert_eq!(committed_files(root), vec!["a.md".to_string()]);

        // still staged, waiting for the user's own commit
        let out = Command::new("git")
            .args(["status", "--porcelain"])
            .current_dir(root)
            .output()
            .unwrap();
        assert!(String::from_utf8_lossy(&out.stdout).contains("A  unrelated.md"));
    }

    #[test]
    fn test_commit_on_fresh_repo_with_prestaged_file() {
        let Some(repo) = init_repo() else { return };
        let root = repo.path();
        std::fs::write(root.join("unrelated.md"), "u\n").unwrap();
        assert!(git(root, &["add", "unrelated.md"]));
        std::fs::write(root.join("a.md"), "a\n").unwrap();

        assert!(commit_paths(root, &[root.join("a.md")], "Add a").unwrap());
        assert_eq!(committed_files(root), vec!["a.md".to_string()]);
    }
}
