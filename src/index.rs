//! Structured maintenance of Markdown index files.
//!
//! An index file is treated as a list of sections, each opened by a
//! heading line and closed by the next heading of the same or higher
//! level. Records are single bullet lines keyed by the analysis file name:
//! upserting a key that already exists rewrites that line instead of adding
//! another, and a missing heading is appended rather than failing.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::models::IndexChange;

/// Markdown heading level of a line (`### Foo` → 3), if it is a heading.
fn heading_level(line: &str) -> Option<usize> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    match trimmed[level..].chars().next() {
        Some(' ') | None => Some(level),
        _ => None,
    }
}

/// Whether `line` references `key` as a whole path component, so that
/// `a.md` does not match `data.md`.
fn references(line: &str, key: &str) -> bool {
    const LEFT: &[char] = &['/', '(', '[', '`', ' '];
    const RIGHT: &[char] = &[')', ']', '`', ' '];
    line.match_indices(key).any(|(i, _)| {
        let before = line[..i].chars().next_back();
        let after = line[i + key.len()..].chars().next();
        before.map_or(true, |c| LEFT.contains(&c)) && after.map_or(true, |c| RIGHT.contains(&c))
    })
}

fn is_bullet(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("- ") || t.starts_with("* ")
}

/// Half-open line range `[start, end)` of the section body under `heading`.
fn section_bounds(lines: &[String], heading: &str) -> Option<(usize, usize)> {
    let wanted = heading.trim();
    let level = wanted.chars().take_while(|c| *c == '#').count().max(1);
    let pos = lines.iter().position(|l| l.trim() == wanted)?;
    let end = lines[pos + 1..]
        .iter()
        .position(|l| heading_level(l).is_some_and(|lv| lv <= level))
        .map(|off| pos + 1 + off)
        .unwrap_or(lines.len());
    Some((pos + 1, end))
}

/// Insert or update `entry` under `heading`, keyed by `key`.
///
/// Pure text transformation; see [`upsert_file`] for the on-disk variant.
pub fn upsert(content: &str, heading: &str, key: &str, entry: &str) -> (String, IndexChange) {
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let existing = lines
        .iter()
        .position(|l| is_bullet(l) && references(l, key));
    let target = section_bounds(&lines, heading);

    if let (Some(idx), Some((start, end))) = (existing, target) {
        if idx >= start && idx < end {
            if lines[idx] == entry {
                return (content.to_string(), IndexChange::Unchanged);
            }
            lines[idx] = entry.to_string();
            return (join(&lines), IndexChange::Updated);
        }
    }

    let mut change = IndexChange::Inserted;
    if let Some(idx) = existing {
        lines.remove(idx);
        change = IndexChange::Moved;
    }

    match section_bounds(&lines, heading) {
        Some((start, end)) => {
            let first_bullet = lines[start..end]
                .iter()
                .position(|l| is_bullet(l))
                .map(|off| start + off);
            match first_bullet {
                Some(at) => lines.insert(at, entry.to_string()),
                None => {
                    // Empty section: keep one blank line around the new list.
                    lines.insert(start, String::new());
                    lines.insert(start + 1, entry.to_string());
                    if start + 2 < lines.len() && !lines[start + 2].trim().is_empty() {
                        lines.insert(start + 2, String::new());
                    }
                    if lines.get(start + 3).is_some_and(|l| l.trim().is_empty())
                        && lines.get(start + 2).is_some_and(|l| l.trim().is_empty())
                    {
                        lines.remove(start + 3);
                    }
                }
            }
        }
        None => {
            if lines.last().is_some_and(|l| !l.trim().is_empty()) {
                lines.push(String::new());
            }
            lines.push(heading.trim().to_string());
            lines.push(String::new());
            lines.push(entry.to_string());
        }
    }

    (join(&lines), change)
}

fn join(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Apply [`upsert`] to a file, creating it if missing, and replace it atomically.
pub fn upsert_file(path: &Path, heading: &str, key: &str, entry: &str) -> Result<IndexChange> {
    let content = if path.exists() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read index file: {}", path.display()))?
    } else {
        String::new()
    };

    let (updated, change) = upsert(&content, heading, key, entry);
    if change == IndexChange::Unchanged {
        return Ok(change);
    }

    write_atomic(path, &updated)?;
    Ok(change)
}

/// Write via a temp file in the same directory and rename over the target.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Whether `content` contains `heading` as a line of its own.
pub fn has_heading(content: &str, heading: &str) -> bool {
    content.lines().any(|l| l.trim() == heading.trim())
}
