//! Analysis file naming, rendering and writing.
//!
//! An analysis file is keyed by `<date>-<slug>.md`. The slug is lossy, so
//! the source URL recorded in the file header is what identifies an
//! analysis: rewriting a file that belongs to another URL is refused unless
//! forced.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::error::IntakeError;
use crate::models::AnalysisRecord;

const SOURCE_URL_FIELD: &str = "**Source URL**:";

pub fn file_name(date: NaiveDate, slug: &str) -> String {
    format!("{}-{}.md", date.format("%Y-%m-%d"), slug)
}

/// Render the Markdown body of an analysis file.
pub fn render(record: &AnalysisRecord) -> String {
    let relevance = if record.assessment.is_relevant() {
        format!(
            "✅ technical keywords: {}",
            record.assessment.relevance_hits.join(", ")
        )
    } else {
        "⚠️ no technical keywords found".to_string()
    };
    let marketing = if record.assessment.has_marketing() {
        format!(
            "⚠️ marketing phrases: {}",
            record.assessment.marketing_hits.join(", ")
        )
    } else {
        "✅ none detected".to_string()
    };

    format!(
        "# {title}\n\
         \n\
         {source_field} {url}\n\
         **Source ID**: {source_id}\n\
         **Domain**: {domain}\n\
         **Processed**: {date}\n\
         **Priority**: {priority}\n\
         **Category**: {category}\n\
         **Content Hash**: sha256:{hash}\n\
         \n\
         ## Intake Checks\n\
         \n\
         - Technical relevance: {relevance}\n\
         - Marketing language: {marketing}\n\
         \n\
         ## Content Excerpt\n\
         \n\
         {excerpt}\n\
         \n\
         ## Analysis\n\
         \n\
         _Pending review._\n\
         \n\
         ## Next Steps\n\
         \n\
         - [ ] Read the full source and summarize its key claims\n\
         - [ ] Assess applicability to current projects\n\
         - [ ] Decide tier placement (Tier 1 research, Tier 2 analysis, Tier 3 proven practice)\n",
        title = record.title,
        source_field = SOURCE_URL_FIELD,
        url = record.url,
        source_id = record.source_id,
        domain = record.domain,
        date = record.date.format("%Y-%m-%d"),
        priority = record.priority,
        category = record.category,
        hash = record.content_hash,
        relevance = relevance,
        marketing = marketing,
        excerpt = record.excerpt,
    )
}

/// Source URL recorded in an existing analysis file.
pub fn recorded_url(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|l| l.trim().strip_prefix(SOURCE_URL_FIELD))
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
}

/// Header fields of an analysis file, as `(key, value)` pairs.
///
/// Reads the `**Key**: value` lines that precede the first `##` section.
pub fn header_fields(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .take_while(|l| !l.starts_with("## "))
        .filter_map(|l| {
            let rest = l.trim().strip_prefix("**")?;
            let (key, value) = rest.split_once("**:")?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Check whether `path` may be (re)written for `url`.
///
/// Returns `Ok(true)` when the file exists and holds the same URL (an
/// in-place rewrite), `Ok(false)` when it does not exist.
pub fn check_target(path: &Path, url: &str, force: bool) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    let existing = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read existing analysis: {}", path.display()))?;

    match recorded_url(&existing) {
        Some(existing_url) if existing_url == url.trim() => Ok(true),
        _ if force => Ok(true),
        Some(existing_url) => Err(IntakeError::SlugCollision {
            path: path.to_path_buf(),
            existing_url,
        }
        .into()),
        None => Err(IntakeError::SlugCollision {
            path: path.to_path_buf(),
            existing_url: "an unknown source".to_string(),
        }
        .into()),
    }
}

pub fn write(dir: &Path, record: &AnalysisRecord) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create analysis directory: {}", dir.display()))?;

    let path = dir.join(&record.file_name);
    std::fs::write(&path, render(record))
        .with_context(|| format!("Failed to write analysis file: {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assessment, Category, Priority};
    use tempfile::TempDir;

    fn record(url: &str) -> AnalysisRecord {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        AnalysisRecord {
            url: url.to_string(),
            title: "Agents in Practice".to_string(),
            domain: "example.com".to_string(),
            date,
            priority: Priority::High,
            category: Category::Framework,
            content_hash: "abc123".to_string(),
            source_id: "0123456789ab".to_string(),
            excerpt: "Body text".to_string(),
            assessment: Assessment {
                relevance_hits: vec!["agent".to_string()],
                marketing_hits: vec![],
            },
            file_name: file_name(date, "agents-in-practice"),
        }
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(file_name(date, "x"), "2026-01-05-x.md");
    }

    #[test]
    fn test_render_contains_fields() {
        let out = render(&record("https://example.com/a"));
        assert!(out.starts_with("# Agents in Practice\n"));
        assert!(out.contains("**Source URL**: https://example.com/a"));
        assert!(out.contains("**Priority**: high"));
        assert!(out.contains("**Category**: Framework Assessments"));
        assert!(out.contains("**Content Hash**: sha256:abc123"));
        assert!(out.contains("✅ technical keywords: agent"));
        assert!(out.contains("## Next Steps"));
    }

    #[test]
    fn test_header_fields_round_trip() {
        let out = render(&record("https://example.com/a"));
        let fields = header_fields(&out);
        assert!(fields.contains(&("Domain".to_string(), "example.com".to_string())));
        assert!(fields.contains(&("Processed".to_string(), "2026-03-14".to_string())));
        assert_eq!(recorded_url(&out).as_deref(), Some("https://example.com/a"));
    }

    #[test]
    fn test_check_target_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.md");
        assert!(!check_target(&path, "https://x", false).unwrap());
    }

    #[test]
    fn test_check_target_same_url_rewrites() {
        let tmp = TempDir::new().unwrap();
        let rec = record("https://example.com/a");
        let path = write(tmp.path(), &rec).unwrap();
        assert!(check_target(&path, "https://example.com/a", false).unwrap());
    }

    #[test]
    fn test_check_target_other_url_collides() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), &record("https://example.com/a")).unwrap();
        let err = check_target(&path, "https://example.com/b", false).unwrap_err();
        match err.downcast_ref::<IntakeError>() {
            Some(IntakeError::SlugCollision { existing_url, .. }) => {
                assert_eq!(existing_url, "https://example.com/a")
            }
            other => panic!("expected SlugCollision, got {:?}", other),
        }
        assert!(check_target(&path, "https://example.com/b", true).unwrap());
    }
}
