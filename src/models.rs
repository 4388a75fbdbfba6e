//! Core data types that flow through the intake pipeline.

use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Review priority attached to an intake.
///
/// `high`, `medium` and `low` are the conventional tokens; anything else is
/// kept verbatim so the knowledge base can grow its own labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
    Other(String),
}

impl Priority {
    pub fn is_known(&self) -> bool {
        !matches!(self, Priority::Other(_))
    }
}

impl FromStr for Priority {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Ok(match token.to_ascii_lowercase().as_str() {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Other(token.to_string()),
        })
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => f.write_str("high"),
            Priority::Medium => f.write_str("medium"),
            Priority::Low => f.write_str("low"),
            Priority::Other(s) => f.write_str(s),
        }
    }
}

/// Index category an analysis is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    ToolSpecific,
    Framework,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::ToolSpecific => "Tool-Specific Evaluations",
            Category::Framework => "Framework Assessments",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One unit of work for the intake pipeline.
#[derive(Debug, Clone)]
pub struct IntakeRequest {
    pub url: String,
    pub priority: Priority,
    pub date: NaiveDate,
    pub dry_run: bool,
    pub commit: bool,
    pub force: bool,
}

/// Result of the keyword heuristics. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assessment {
    pub relevance_hits: Vec<String>,
    pub marketing_hits: Vec<String>,
}

impl Assessment {
    pub fn is_relevant(&self) -> bool {
        !self.relevance_hits.is_empty()
    }

    pub fn has_marketing(&self) -> bool {
        !self.marketing_hits.is_empty()
    }

    /// Human-readable warnings for the status output.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.is_relevant() {
            out.push("low technical relevance: no technical keywords found".to_string());
        }
        if self.has_marketing() {
            out.push(format!(
                "marketing language detected: {}",
                self.marketing_hits.join(", ")
            ));
        }
        out
    }
}

/// Everything derived from the fetched content before anything is written.
#[derive(Debug, Clone)]
pub struct AnalysisRecord {
    pub url: String,
    pub title: String,
    pub domain: String,
    pub date: NaiveDate,
    pub priority: Priority,
    pub category: Category,
    pub content_hash: String,
    pub source_id: String,
    pub excerpt: String,
    pub assessment: Assessment,
    /// File name inside the analysis directory, e.g. `2026-10-19-some-title.md`.
    pub file_name: String,
}

/// How an index file changed for a given record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexChange {
    Inserted,
    Updated,
    Moved,
    Unchanged,
}

/// Outcome of a completed (or dry-run) intake.
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub record: AnalysisRecord,
    pub analysis_path: PathBuf,
    /// `true` when an existing analysis of the same URL was rewritten.
    pub overwritten: bool,
    pub index_change: Option<IndexChange>,
    pub todo_change: Option<IndexChange>,
    pub committed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parse_known() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("MEDIUM".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!(" low ".parse::<Priority>().unwrap(), Priority::Low);
    }

    #[test]
    fn test_priority_unknown_kept_verbatim() {
        let p: Priority = "urgent".parse().unwrap();
        assert_eq!(p, Priority::Other("urgent".to_string()));
        assert!(!p.is_known());
        assert_eq!(p.to_string(), "urgent");
    }

    #[test]
    fn test_assessment_warnings() {
        let a = Assessment {
            relevance_hits: vec![],
            marketing_hits: vec!["10x".to_string()],
        };
        let w = a.warnings();
        assert_eq!(w.len(), 2);
        assert!(w[1].contains("10x"));

        let clean = Assessment {
            relevance_hits: vec!["llm".to_string()],
            marketing_hits: vec![],
        };
        assert!(clean.warnings().is_empty());
    }
}
