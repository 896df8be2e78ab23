//! Single-value fields: doctor, patient, date, address and refill count.
//!
//! Every function here works on cleaned text and answers independently of
//! the others. `Ok(None)` means the field is not present; `Err` means the
//! field could not be evaluated at all.

use regex::Regex;

use super::cleaner::{collapse_whitespace, CleanedText};
use super::extractor::ExtractionResult;
use super::patterns::{
    ADDRESS_LABEL, ADDRESS_LOOSE, ADDRESS_PREFIX, BARE_YEAR, CAPITALIZED_WORD, DATE_COMPOSITE,
    DATE_LABEL, DIRECTION_WORD, DOCTOR_LABEL, DOSAGE_LINE_START, LOOSE_NAME, NAME_PREFIX,
    NAME_RESERVED, PATIENT_LABEL, REFILL_COUNT, REFILL_WORD, SPACE_BEFORE_COMMA, UNIT_WORD,
};

pub fn doctor_name(cleaned: &CleanedText) -> ExtractionResult<Option<String>> {
    Ok(first_capture(DOCTOR_LABEL.regex()?, cleaned.as_str())
        .map(tidy_name)
        .filter(|name| !name.is_empty()))
}

/// Tries the labelled form first, then a line that looks like a bare
/// personal name, then a loose "Name ... Capitalized Words" match.
pub fn patient_name(cleaned: &CleanedText) -> ExtractionResult<Option<String>> {
    let labelled = first_capture(PATIENT_LABEL.regex()?, cleaned.as_str())
        .map(tidy_name)
        .filter(|name| !name.is_empty());
    if labelled.is_some() {
        return Ok(labelled);
    }

    if let Some(name) = name_line(cleaned.lines())? {
        return Ok(Some(name));
    }

    Ok(first_capture(LOOSE_NAME.regex()?, cleaned.as_str()).map(collapse_whitespace))
}

fn name_line(lines: &[String]) -> ExtractionResult<Option<String>> {
    let reserved = NAME_RESERVED.regex()?;
    let prefix = NAME_PREFIX.regex()?;
    let word = CAPITALIZED_WORD.regex()?;

    for line in lines {
        if reserved.is_match(line) {
            continue;
        }

        let stripped = prefix.replace(line, "");
        let stripped = stripped.trim();
        let words: Vec<&str> = stripped.split_whitespace().collect();

        if (2..=4).contains(&words.len()) && words.iter().all(|w| word.is_match(w)) {
            let candidate = stripped.trim_end_matches([',', ':', ';', '|']);
            return Ok(Some(collapse_whitespace(candidate)));
        }
    }

    Ok(None)
}

/// Returns the raw date substring, unnormalized.
pub fn date(cleaned: &CleanedText) -> ExtractionResult<Option<String>> {
    let text = cleaned.as_str();

    if let Some(m) = DATE_COMPOSITE.regex()?.find(text) {
        return Ok(Some(m.as_str().trim().to_string()));
    }

    let year = BARE_YEAR.regex()?;

    if let Some(window) = first_capture(DATE_LABEL.regex()?, text) {
        if let Some(m) = year.find(window) {
            return Ok(Some(m.as_str().to_string()));
        }
    }

    Ok(year.find(text).map(|m| m.as_str().to_string()))
}

/// Missing or unparseable counts are 0.
pub fn refills(cleaned: &CleanedText) -> ExtractionResult<u32> {
    Ok(first_capture(REFILL_COUNT.regex()?, cleaned.as_str())
        .and_then(|count| count.parse().ok())
        .unwrap_or(0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddressScan {
    Searching,
    Accumulating,
}

/// Collects the "Address" line and its continuation lines, stopping at the
/// first line that looks like a dosage, a direction or a refill entry.
pub fn patient_address(cleaned: &CleanedText) -> ExtractionResult<Option<String>> {
    let label = ADDRESS_LABEL.regex()?;
    let prefix = ADDRESS_PREFIX.regex()?;
    let terminators = [
        UNIT_WORD.regex()?,
        DIRECTION_WORD.regex()?,
        REFILL_WORD.regex()?,
        DOSAGE_LINE_START.regex()?,
    ];

    let mut state = AddressScan::Searching;
    let mut fragments: Vec<&str> = Vec::new();

    for line in cleaned.lines() {
        match state {
            AddressScan::Searching => {
                if label.is_match(line) {
                    let rest = prefix
                        .find_iter(line)
                        .last()
                        .map_or(line.as_str(), |m| &line[m.end()..])
                        .trim();
                    if !rest.is_empty() {
                        fragments.push(rest);
                    }
                    state = AddressScan::Accumulating;
                }
            }
            AddressScan::Accumulating => {
                if terminators.iter().any(|re| re.is_match(line)) {
                    break;
                }
                fragments.push(line);
            }
        }
    }

    if !fragments.is_empty() {
        let joined = fragments.join(" ");
        let joined = SPACE_BEFORE_COMMA.regex()?.replace_all(&joined, ",");
        let address = tidy_address(&joined);
        if !address.is_empty() {
            return Ok(Some(address));
        }
    }

    Ok(first_capture(ADDRESS_LOOSE.regex()?, cleaned.as_str())
        .map(tidy_address)
        .filter(|address| !address.is_empty()))
}

/// Collapses whitespace and strips trailing `.`, `,` and `|`.
#[must_use]
pub fn tidy_address(address: &str) -> String {
    collapse_whitespace(address)
        .trim_end_matches(|c: char| c.is_whitespace() || ".,|".contains(c))
        .to_string()
}

fn tidy_name(candidate: &str) -> String {
    collapse_whitespace(
        candidate.trim_end_matches(|c: char| c.is_whitespace() || ",:;|-".contains(c)),
    )
}

fn first_capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
