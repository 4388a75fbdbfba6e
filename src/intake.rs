//! Intake pipeline orchestration.
//!
//! Coordinates one intake: fetch → validate → assess → derive record →
//! write analysis → update index and TODO → commit. Nothing touches the
//! filesystem until the fetched content has passed validation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::analysis;
use crate::classify::{self, KeywordMatcher};
use crate::config::Config;
use crate::error::IntakeError;
use crate::git;
use crate::index;
use crate::models::{AnalysisRecord, Category, IntakeOutcome, IntakeRequest, Priority};
use crate::reader::ContentReader;

/// Maximum characters shown when rejecting short content.
const PREVIEW_CHARS: usize = 200;

/// Keyword matchers built once per run and shared across a batch.
pub struct Matchers {
    pub relevance: KeywordMatcher,
    pub marketing: KeywordMatcher,
}

impl Matchers {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            relevance: KeywordMatcher::new(&config.keywords.relevance)
                .context("invalid keywords.relevance")?,
            marketing: KeywordMatcher::new(&config.keywords.marketing)
                .context("invalid keywords.marketing")?,
        })
    }
}

/// Resolve the priority token, falling back to the configured default.
pub fn resolve_priority(config: &Config, token: Option<&str>) -> Priority {
    let raw = token
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(&config.intake.default_priority);
    let priority: Priority = raw.parse().unwrap_or(Priority::Medium);
    if !priority.is_known() {
        warn!(priority = %priority, "unrecognized priority; expected high, medium or low");
    }
    priority
}

/// Reject content below the configured length threshold.
pub fn validate_content(content: &str, min_chars: usize) -> Result<(), IntakeError> {
    let chars = content.chars().count();
    if chars < min_chars {
        let preview: String = content.chars().take(PREVIEW_CHARS).collect();
        return Err(IntakeError::ContentTooShort {
            chars,
            min: min_chars,
            preview,
        });
    }
    Ok(())
}

/// Derive the analysis record from validated content.
pub fn build_record(
    config: &Config,
    matchers: &Matchers,
    request: &IntakeRequest,
    content: &str,
) -> AnalysisRecord {
    let url = request.url.trim().to_string();
    let domain = classify::domain_of(&url);
    let title = classify::extract_title(content).unwrap_or_else(|| domain.clone());
    let slug = classify::slugify(&title, config.intake.slug_max_chars);

    AnalysisRecord {
        source_id: classify::source_id(&url),
        content_hash: classify::sha256_hex(content),
        assessment: classify::assess(content, &matchers.relevance, &matchers.marketing),
        category: classify::categorize(content),
        excerpt: classify::excerpt(content, config.intake.excerpt_chars),
        file_name: analysis::file_name(request.date, &slug),
        priority: request.priority.clone(),
        date: request.date,
        url,
        title,
        domain,
    }
}

/// Link target for `analysis_path` as seen from the file at `from`.
fn link_from(from: &Path, root: &Path, analysis_path: &Path) -> String {
    let base = from.parent().unwrap_or(root);
    let rel = analysis_path
        .strip_prefix(base)
        .or_else(|_| analysis_path.strip_prefix(root))
        .unwrap_or(analysis_path);
    rel.to_string_lossy().replace('\\', "/")
}

pub fn index_entry(record: &AnalysisRecord, link: &str) -> String {
    format!(
        "- [{}]({}) - {} ({} priority, {})",
        record.title,
        link,
        record.domain,
        record.priority,
        record.date.format("%Y-%m-%d")
    )
}

pub fn todo_entry(record: &AnalysisRecord) -> String {
    format!(
        "- [ ] Review `{}` ({} priority): {}",
        record.file_name, record.priority, record.title
    )
}

pub fn commit_message(record: &AnalysisRecord, rel_path: &str) -> String {
    format!(
        "Add analysis: {}\n\nSource: {}\nPriority: {}\nCategory: {}\nFile: {}\n",
        record.title, record.url, record.priority, record.category, rel_path
    )
}

/// Run a single intake.
pub async fn run_intake(
    config: &Config,
    reader: &dyn ContentReader,
    matchers: &Matchers,
    request: &IntakeRequest,
) -> Result<IntakeOutcome> {
    if request.url.trim().is_empty() {
        return Err(IntakeError::EmptyUrl.into());
    }

    let root = &config.repo.root;
    if request.commit && !request.dry_run {
        git::ensure_work_tree(root)?;
    }

    info!(url = %request.url, "fetching content");
    let content = reader.read(request.url.trim()).await?;
    validate_content(&content, config.reader.min_content_chars)?;
    debug!(chars = content.chars().count(), "content accepted");

    let record = build_record(config, matchers, request, &content);
    for w in record.assessment.warnings() {
        info!(url = %record.url, "{}", w);
    }

    let analysis_dir = config.repo.analysis_path();
    let analysis_path = analysis_dir.join(&record.file_name);
    let overwritten = analysis::check_target(&analysis_path, &record.url, request.force)?;

    if request.dry_run {
        return Ok(IntakeOutcome {
            record,
            analysis_path,
            overwritten,
            index_change: None,
            todo_change: None,
            committed: false,
        });
    }

    analysis::write(&analysis_dir, &record)?;
    info!(path = %analysis_path.display(), "analysis written");

    let index_path = config.repo.index_path();
    let todo_path = config.repo.todo_path();
    let heading = match record.category {
        Category::ToolSpecific => &config.index.tool_heading,
        Category::Framework => &config.index.framework_heading,
    };

    let index_change = index::upsert_file(
        &index_path,
        heading,
        &record.file_name,
        &index_entry(&record, &link_from(&index_path, root, &analysis_path)),
    )
    .with_context(|| {
        format!(
            "analysis written to {} but index update failed",
            analysis_path.display()
        )
    })?;

    let todo_change = index::upsert_file(
        &todo_path,
        &config.index.todo_heading,
        &record.file_name,
        &todo_entry(&record),
    )
    .with_context(|| {
        format!(
            "analysis written to {} but TODO update failed",
            analysis_path.display()
        )
    })?;

    let committed = if request.commit {
        let rel = analysis_path
            .strip_prefix(root)
            .unwrap_or(&analysis_path)
            .to_string_lossy()
            .to_string();
        let paths: Vec<PathBuf> = vec![analysis_path.clone(), index_path, todo_path];
        git::commit_paths(root, &paths, &commit_message(&record, &rel))
            .with_context(|| {
                format!(
                    "analysis written to {} but commit failed",
                    analysis_path.display()
                )
            })?
    } else {
        false
    };

    Ok(IntakeOutcome {
        record,
        analysis_path,
        overwritten,
        index_change: Some(index_change),
        todo_change: Some(todo_change),
        committed,
    })
}
