//! Markdown heading scanning and section extraction.
//!
//! Headings are ATX-style (`#` through `######`). Lines inside fenced code
//! blocks are never treated as headings. Each heading owns every line from
//! itself up to the next heading, at any level, or the end of the document.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// ATX heading: 1-6 `#`, whitespace, then the title.
static HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,6})\s+(.+)$").expect("Failed to compile heading regex")
});

/// Code fence marker. Every line starting with it toggles code-block state.
const CODE_FENCE: &str = "```";

/// A heading found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading text without the `#` markers.
    pub title: String,
    /// 1-indexed line number of the heading.
    pub line_num: usize,
    /// Number of leading `#` characters.
    pub level: usize,
}

/// A heading together with the text it owns, before tree nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatSection {
    /// Section title.
    pub title: String,
    /// Heading depth (1-6).
    pub level: usize,
    /// 1-indexed line number of the heading.
    pub line_num: usize,
    /// Owned text, heading line included, trimmed.
    pub text: String,
    /// Estimated tokens of this section plus its descendants, once accounted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_count: Option<usize>,
}

/// Line-oriented heading scanner.
pub struct HeadingScanner;

impl HeadingScanner {
    /// Scan `content` for headings.
    ///
    /// Returns the headings in document order together with the line stream.
    pub fn scan(content: &str) -> (Vec<Heading>, Vec<&str>) {
        let lines: Vec<&str> = content.split('\n').collect();
        let mut headings = Vec::new();
        let mut in_code_block = false;

        for (idx, line) in lines.iter().enumerate() {
            let trimmed = line.trim();

            if trimmed.starts_with(CODE_FENCE) {
                in_code_block = !in_code_block;
                continue;
            }

            if trimmed.is_empty() || in_code_block {
                continue;
            }

            if let Some((level, title)) = parse_heading(trimmed) {
                headings.push(Heading {
                    title: title.to_string(),
                    line_num: idx + 1,
                    level,
                });
            }
        }

        (headings, lines)
    }
}

/// Parse a trimmed line as an ATX heading.
///
/// Returns `(level, title)` for 1-6 `#` characters followed by whitespace
/// and a non-empty title.
pub fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let caps = HEADING_REGEX.captures(line)?;
    let level = caps.get(1)?.as_str().len();
    let title = caps.get(2)?.as_str().trim();

    if title.is_empty() {
        None
    } else {
        Some((level, title))
    }
}

/// Attach to each heading the text span it owns.
pub fn materialize_sections(headings: &[Heading], lines: &[&str]) -> Vec<FlatSection> {
    headings
        .iter()
        .enumerate()
        .map(|(i, heading)| {
            let start = heading.line_num - 1;
            let end = headings
                .get(i + 1)
                .map(|next| next.line_num - 1)
                .unwrap_or(lines.len());

            FlatSection {
                title: heading.title.clone(),
                level: heading.level,
                line_num: heading.line_num,
                text: lines[start..end].join("\n").trim().to_string(),
                token_count: None,
            }
        })
        .collect()
}

/// Scan and materialize in one step.
pub fn extract_sections(content: &str) -> Vec<FlatSection> {
    let (headings, lines) = HeadingScanner::scan(content);
    tracing::debug!(headings = headings.len(), lines = lines.len(), "scanned markdown");
    materialize_sections(&headings, &lines)
}
