use std::path::PathBuf;

use thiserror::Error;

/// Domain failures of the intake pipeline.
///
/// Plumbing errors (I/O, config parsing) stay `anyhow::Error`; these are
/// the conditions callers and tests match on.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("URL must not be empty")]
    EmptyUrl,

    #[error("content extraction failed: got {chars} characters, need at least {min}. Preview: {preview}")]
    ContentTooShort {
        chars: usize,
        min: usize,
        preview: String,
    },

    #[error("{} already holds an analysis of {existing_url} (use --force to overwrite)", .path.display())]
    SlugCollision { path: PathBuf, existing_url: String },

    #[error("reader API returned {status}: {body}")]
    Reader { status: u16, body: String },

    #[error("{} is not a git work tree (use --no-commit to skip committing)", .0.display())]
    NotAGitRepo(PathBuf),
}
