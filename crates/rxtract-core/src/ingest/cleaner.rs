use std::fmt;

use serde::{Deserialize, Serialize};

use super::patterns::{StaticPattern, PAGE_MARKER, UNIT_MISREAD};

/// OCR text reduced to trimmed, non-empty, printable-ASCII lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedText {
    text: String,
    lines: Vec<String>,
}

impl CleanedText {
    fn from_lines(lines: Vec<String>) -> Self {
        Self {
            text: lines.join("\n"),
            lines,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for CleanedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Normalizes raw OCR output into clean lines. Never fails; running it on
/// its own output is a no-op.
#[must_use]
pub fn clean(raw: &str) -> CleanedText {
    if raw.trim().is_empty() {
        return CleanedText::default();
    }

    let text: String = raw
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .map(|c| match c {
            '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
            '\t' | '\n' | ' '..='~' => c,
            _ => ' ',
        })
        .collect();

    let lines = text
        .split('\n')
        .map(|line| clean_line(line.trim()))
        .filter(|line| !line.is_empty() && !is_page_marker(line))
        .collect();

    CleanedText::from_lines(lines)
}

/// Collapses every whitespace run to one space and trims both ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_page_marker(line: &str) -> bool {
    PAGE_MARKER.is_match(line).unwrap_or(false)
}

fn clean_line(line: &str) -> String {
    let repaired = repair_units(line);
    let collapsed = drop_isolated_letters(&repaired);
    collapse_whitespace(&repair_units(&collapsed))
}

/// "20 me", "20 m g" and "20 mgm" are all OCR misreads of "20 mg".
fn repair_units(line: &str) -> String {
    replace_all(&UNIT_MISREAD, line, "${1} mg")
}

/// Single letters standing alone between other tokens are split-letter noise.
fn drop_isolated_letters(line: &str) -> String {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let last = tokens.len().saturating_sub(1);

    tokens
        .iter()
        .enumerate()
        .filter(|(i, token)| {
            let interior = *i > 0 && *i < last;
            !(interior && token.len() == 1 && token.chars().all(|c| c.is_ascii_alphabetic()))
        })
        .map(|(_, token)| *token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn replace_all(pattern: &StaticPattern, text: &str, replacement: &str) -> String {
    match pattern.regex() {
        Ok(re) => re.replace_all(text, replacement).into_owned(),
        Err(e) => {
            tracing::warn!("Skipping cleanup step: {}", e);
            text.to_string()
        }
    }
}
