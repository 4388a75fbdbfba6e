//! Text heuristics applied to fetched content.
//!
//! Keyword checks, category routing and the title/domain/slug derivation
//! that decides where an analysis file lands. All functions are pure.

use regex::Regex;
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::models::{Assessment, Category};

/// Vendor names that route an entry to the tool-specific section.
const TOOL_TERMS: &[&str] = &["google", "gemini", "openai", "anthropic", "claude"];

/// Terms that route an entry to the framework section when no vendor matches.
const FRAMEWORK_TERMS: &[&str] = &["framework", "pattern", "architecture"];

/// Case-insensitive whole-word matcher over a keyword list.
pub struct KeywordMatcher {
    regex: Option<Regex>,
}

impl KeywordMatcher {
    pub fn new(keywords: &[String]) -> anyhow::Result<Self> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { regex: None });
        }

        // \b only anchors on word characters, so edges like "10x" and
        // "game-changer" still match inside prose.
        let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
        Ok(Self {
            regex: Some(Regex::new(&pattern)?),
        })
    }

    /// Distinct keywords found in `text`, lowercased, in order of first appearance.
    pub fn hits(&self, text: &str) -> Vec<String> {
        let Some(re) = &self.regex else {
            return Vec::new();
        };
        let mut out: Vec<String> = Vec::new();
        for m in re.find_iter(text) {
            let hit = m.as_str().to_lowercase();
            if !out.contains(&hit) {
                out.push(hit);
            }
        }
        out
    }
}

pub fn assess(text: &str, relevance: &KeywordMatcher, marketing: &KeywordMatcher) -> Assessment {
    Assessment {
        relevance_hits: relevance.hits(text),
        marketing_hits: marketing.hits(text),
    }
}

/// Pick the index category for the content.
///
/// Vendor names win over framework terms; content matching neither falls
/// back to the tool-specific section.
pub fn categorize(text: &str) -> Category {
    let lower = text.to_lowercase();
    if TOOL_TERMS.iter().any(|t| lower.contains(t)) {
        Category::ToolSpecific
    } else if FRAMEWORK_TERMS.iter().any(|t| lower.contains(t)) {
        Category::Framework
    } else {
        Category::ToolSpecific
    }
}

/// Extract a title from Reader output.
///
/// The Reader API prefixes its output with `Title: ...`; plain Markdown
/// falls back to the first `# ` heading.
pub fn extract_title(content: &str) -> Option<String> {
    let from_header = content
        .lines()
        .take_while(|l| !l.starts_with("Markdown Content:"))
        .find_map(|l| l.strip_prefix("Title:"))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(t) = from_header {
        return Some(t.to_string());
    }

    content
        .lines()
        .find_map(|l| l.trim_start().strip_prefix("# "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Host of the URL without a leading `www.`, or `unknown`.
pub fn domain_of(url: &str) -> String {
    Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .map(|h| h.strip_prefix("www.").map(str::to_string).unwrap_or(h))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Lowercase, dash-separated, truncated slug of a title.
pub fn slugify(title: &str, max_chars: usize) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    let truncated: String = slug.chars().take(max_chars).collect();
    let trimmed = truncated.trim_end_matches('-');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// First `max_chars` characters of the content, with an ellipsis when cut.
pub fn excerpt(content: &str, max_chars: usize) -> String {
    let trimmed = content.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", trimmed[..idx].trim_end()),
        None => trimmed.to_string(),
    }
}

pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Stable short identifier of a source URL.
pub fn source_id(url: &str) -> String {
    sha256_hex(url.trim())[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(words: &[&str]) -> KeywordMatcher {
        let owned: Vec<String> = words.iter().map(|s| s.to_string()).collect();
        KeywordMatcher::new(&owned).unwrap()
    }

    #[test]
    fn test_category_vendor_wins() {
        assert_eq!(
            categorize("An architecture pattern built on Claude"),
            Category::ToolSpecific
        );
        assert_eq!(categorize("Notes on GEMINI pricing"), Category::ToolSpecific);
    }

    #[test]
    fn test_category_framework_terms() {
        assert_eq!(
            categorize("A layered architecture for agents"),
            Category::Framework
        );
        assert_eq!(categorize("Design Patterns revisited"), Category::Framework);
    }

    #[test]
    fn test_category_default_is_tool_specific() {
        assert_eq!(categorize("gardening tips"), Category::ToolSpecific);
        assert_eq!(categorize(""), Category::ToolSpecific);
    }

    #[test]
    fn test_keyword_whole_word_case_insensitive() {
        let m = matcher(&["ai", "llm"]);
        assert_eq!(m.hits("LLM tooling and AI"), vec!["llm", "ai"]);
        // "ai" inside "maintain" is not a hit
        assert!(m.hits("maintain the rain gauge").is_empty());
    }

    #[test]
    fn test_keyword_hits_deduplicated() {
        let m = matcher(&["agent"]);
        assert_eq!(m.hits("agent Agent AGENT"), vec!["agent"]);
    }

    #[test]
    fn test_marketing_phrases_with_punctuation() {
        let m = matcher(&["game-changer", "10x"]);
        let hits = m.hits("This game-changer makes you 10x faster.");
        assert_eq!(hits, vec!["game-changer", "10x"]);
    }

    #[test]
    fn test_empty_keyword_list_never_matches() {
        let m = matcher(&[]);
        assert!(m.hits("anything").is_empty());
    }

    #[test]
    fn test_assess() {
        let rel = matcher(&["llm"]);
        let mkt = matcher(&["revolutionary"]);
        let a = assess("A revolutionary LLM", &rel, &mkt);
        assert!(a.is_relevant());
        assert!(a.has_marketing());
    }

    #[test]
    fn test_extract_title_reader_header() {
        let content = "Title: Building Agents\n\nURL Source: https://x.dev\n\nMarkdown Content:\n# Other";
        assert_eq!(extract_title(content).as_deref(), Some("Building Agents"));
    }

    #[test]
    fn test_extract_title_heading_fallback() {
        let content = "Some intro\n\n# Heading Title\n\nbody";
        assert_eq!(extract_title(content).as_deref(), Some("Heading Title"));
        assert_eq!(extract_title("no title here"), None);
    }

    #[test]
    fn test_title_line_in_body_ignored() {
        let content = "Markdown Content:\nTitle: not a header\n";
        assert_eq!(extract_title(content), None);
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("https://www.example.com/a/b"), "example.com");
        assert_eq!(domain_of("http://blog.rust-lang.org"), "blog.rust-lang.org");
        assert_eq!(domain_of("not a url"), "unknown");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!", 50), "hello-world");
        assert_eq!(slugify("  --Rust & LLMs: A Guide--  ", 50), "rust-llms-a-guide");
        assert_eq!(slugify("!!!", 50), "untitled");
    }

    #[test]
    fn test_slugify_truncates_without_trailing_dash() {
        let slug = slugify("abcde fghij", 6);
        assert_eq!(slug, "abcde");
        assert!(slugify(&"word ".repeat(40), 50).chars().count() <= 50);
    }

    #[test]
    fn test_slug_lossy_collision() {
        let a = slugify("Understanding Agents: Part One of a Very Long Series Title", 30);
        let b = slugify("Understanding agents - part one of a very long series (draft)", 30);
        assert_eq!(a, b);
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("  short  ", 10), "short");
        assert_eq!(excerpt("abcdefgh", 3), "abc…");
        // Multi-byte characters are cut on char boundaries
        assert_eq!(excerpt("ééééé", 2), "éé…");
    }

    #[test]
    fn test_source_id_stable() {
        assert_eq!(source_id("https://a.dev/x"), source_id(" https://a.dev/x "));
        assert_eq!(source_id("https://a.dev/x").len(), 12);
        assert_ne!(source_id("https://a.dev/x"), source_id("https://a.dev/y"));
    }
}
