//! TOML configuration for the intake pipeline.
//!
//! Every section is optional; missing keys fall back to the defaults below.
//! The Reader API key is never read from this file, only from the
//! environment variable named by `reader.api_key_env`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub repo: RepoConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub intake: IntakeConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub keywords: KeywordsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RepoConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_analysis_dir")]
    pub analysis_dir: PathBuf,
    #[serde(default = "default_index_file")]
    pub index_file: PathBuf,
    #[serde(default = "default_todo_file")]
    pub todo_file: PathBuf,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            analysis_dir: default_analysis_dir(),
            index_file: default_index_file(),
            todo_file: default_todo_file(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_analysis_dir() -> PathBuf {
    PathBuf::from("docs/analysis")
}
fn default_index_file() -> PathBuf {
    PathBuf::from("README.md")
}
fn default_todo_file() -> PathBuf {
    PathBuf::from("TODO.md")
}

impl RepoConfig {
    /// Absolute-or-root-relative location of the analysis directory.
    pub fn analysis_path(&self) -> PathBuf {
        self.root.join(&self.analysis_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_file)
    }

    pub fn todo_path(&self) -> PathBuf {
        self.root.join(&self.todo_file)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReaderConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            min_content_chars: default_min_content_chars(),
        }
    }
}

fn default_endpoint() -> String {
    "https://r.jina.ai/".to_string()
}
fn default_api_key_env() -> String {
    "JINA_API_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_min_content_chars() -> usize {
    500
}

impl ReaderConfig {
    /// The API key from the environment, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IntakeConfig {
    #[serde(default = "default_priority")]
    pub default_priority: String,
    #[serde(default = "default_slug_max_chars")]
    pub slug_max_chars: usize,
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
    #[serde(default = "default_true")]
    pub commit: bool,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            default_priority: default_priority(),
            slug_max_chars: default_slug_max_chars(),
            excerpt_chars: default_excerpt_chars(),
            commit: true,
        }
    }
}

fn default_priority() -> String {
    "medium".to_string()
}
fn default_slug_max_chars() -> usize {
    50
}
fn default_excerpt_chars() -> usize {
    2000
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct BatchConfig {
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_delay_secs(),
        }
    }
}

fn default_delay_secs() -> u64 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_tool_heading")]
    pub tool_heading: String,
    #[serde(default = "default_framework_heading")]
    pub framework_heading: String,
    #[serde(default = "default_todo_heading")]
    pub todo_heading: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            tool_heading: default_tool_heading(),
            framework_heading: default_framework_heading(),
            todo_heading: default_todo_heading(),
        }
    }
}

fn default_tool_heading() -> String {
    "### Tool-Specific Evaluations".to_string()
}
fn default_framework_heading() -> String {
    "### Framework Assessments".to_string()
}
fn default_todo_heading() -> String {
    "## Content Review Queue".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeywordsConfig {
    #[serde(default = "default_relevance_keywords")]
    pub relevance: Vec<String>,
    #[serde(default = "default_marketing_keywords")]
    pub marketing: Vec<String>,
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        Self {
            relevance: default_relevance_keywords(),
            marketing: default_marketing_keywords(),
        }
    }
}

fn default_relevance_keywords() -> Vec<String> {
    [
        "ai",
        "llm",
        "agent",
        "agents",
        "code",
        "coding",
        "developer",
        "programming",
        "api",
        "model",
        "prompt",
        "architecture",
        "framework",
        "pattern",
        "tool",
        "workflow",
        "automation",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_marketing_keywords() -> Vec<String> {
    [
        "revolutionary",
        "game-changer",
        "game changer",
        "unlock the power",
        "10x",
        "cutting-edge",
        "best-in-class",
        "sign up now",
        "limited time",
        "act now",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.reader.min_content_chars == 0 {
        anyhow::bail!("reader.min_content_chars must be > 0");
    }
    if config.reader.timeout_secs == 0 {
        anyhow::bail!("reader.timeout_secs must be > 0");
    }
    if !config.reader.endpoint.starts_with("http") {
        anyhow::bail!(
            "reader.endpoint must be an http(s) URL, got '{}'",
            config.reader.endpoint
        );
    }

    if config.intake.slug_max_chars == 0 {
        anyhow::bail!("intake.slug_max_chars must be > 0");
    }

    for (key, heading) in [
        ("index.tool_heading", &config.index.tool_heading),
        ("index.framework_heading", &config.index.framework_heading),
        ("index.todo_heading", &config.index.todo_heading),
    ] {
        if !heading.trim_start().starts_with('#') {
            anyhow::bail!("{} must be a Markdown heading, got '{}'", key, heading);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_str)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.reader.endpoint, "https://r.jina.ai/");
        assert_eq!(cfg.reader.min_content_chars, 500);
        assert_eq!(cfg.reader.max_retries, 0);
        assert_eq!(cfg.batch.delay_secs, 3);
        assert_eq!(cfg.intake.default_priority, "medium");
        assert!(cfg.intake.commit);
        assert_eq!(cfg.index.framework_heading, "### Framework Assessments");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let cfg = parse(
            r#"
            [reader]
            min_content_chars = 1000
            "#,
        )
        .unwrap();
        assert_eq!(cfg.reader.min_content_chars, 1000);
        assert_eq!(cfg.reader.timeout_secs, 30);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = parse("[reader]\nmin_content_chars = 0\n").unwrap_err();
        assert!(err.to_string().contains("min_content_chars"));
    }

    #[test]
    fn test_heading_must_be_markdown() {
        let err = parse("[index]\ntool_heading = \"Tools\"\n").unwrap_err();
        assert!(err.to_string().contains("index.tool_heading"));
    }

    #[test]
    fn test_endpoint_must_be_http() {
        assert!(parse("[reader]\nendpoint = \"ftp://x/\"\n").is_err());
    }

    #[test]
    fn test_repo_paths_join_root() {
        let cfg = parse("[repo]\nroot = \"/kb\"\n").unwrap();
        assert_eq!(cfg.repo.analysis_path(), PathBuf::from("/kb/docs/analysis"));
        assert_eq!(cfg.repo.index_path(), PathBuf::from("/kb/README.md"));
        assert_eq!(cfg.repo.todo_path(), PathBuf::from("/kb/TODO.md"));
    }
}
