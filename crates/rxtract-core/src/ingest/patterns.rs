//! Static pattern tables shared by the cleaning, extraction and
//! normalization stages.
//!
//! Each pattern is compiled on first use and cached for the life of the
//! process. Compilation failures are reported through [`PatternError`] so a
//! bad pattern degrades the one field that needs it instead of panicking.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("pattern `{name}` failed to compile: {reason}")]
pub struct PatternError {
    pub name: &'static str,
    pub reason: String,
}

pub struct StaticPattern {
    name: &'static str,
    source: &'static str,
    compiled: OnceLock<Result<Regex, regex::Error>>,
}

impl StaticPattern {
    #[must_use]
    pub const fn new(name: &'static str, source: &'static str) -> Self {
        Self {
            name,
            source,
            compiled: OnceLock::new(),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn regex(&self) -> Result<&Regex, PatternError> {
        self.compiled
            .get_or_init(|| Regex::new(self.source))
            .as_ref()
            .map_err(|e| PatternError {
                name: self.name,
                reason: e.to_string(),
            })
    }

    pub fn is_match(&self, text: &str) -> Result<bool, PatternError> {
        Ok(self.regex()?.is_match(text))
    }
}

// --- Cleaning ---

pub static PAGE_MARKER: StaticPattern =
    StaticPattern::new("page_marker", r"(?i)^=+\s*PAGE\s+\d+\s*=+$");

pub static UNIT_MISREAD: StaticPattern =
    StaticPattern::new("unit_misread", r"(?i)(\d+)\s+(?:me|m g|mgm)\b");

// --- Vocabulary ---

pub static UNIT_WORD: StaticPattern = StaticPattern::new(
    "unit_word",
    r"(?i)\b(?:mg|g|gram|grams|ml|mcg|tablet|tab|capsule|drop|patch)\b",
);

pub static DIRECTION_WORD: StaticPattern = StaticPattern::new(
    "direction_word",
    r"(?i)\b(?:take|every|daily|once|twice|before|after|with|apply|taper|inhale|use|for)\b",
);

// --- Names ---

pub static DOCTOR_LABEL: StaticPattern = StaticPattern::new(
    "doctor_label",
    r"\b(?i:Dr\.|Dr\b|Doctor|Physician)[:\s\-]*([A-Z][A-Za-z.'\- ]{1,60})",
);

pub static PATIENT_LABEL: StaticPattern = StaticPattern::new(
    "patient_label",
    r"\b(?i:Patient|Name)[:;\-\s]*([A-Z][A-Za-z.'\- \t]{1,60}?)(?:\s+(?i:date)\b|\n|$)",
);

pub static NAME_RESERVED: StaticPattern = StaticPattern::new(
    "name_reserved",
    r"(?i)\b(?:Address|Date|Phone|Dr|Physician|Directions|Refill|Amount|Page)\b",
);

pub static NAME_PREFIX: StaticPattern =
    StaticPattern::new("name_prefix", r"(?i)^(?:Name|Patient)[:;\-\s]*");

pub static CAPITALIZED_WORD: StaticPattern =
    StaticPattern::new("capitalized_word", r"^[A-Z][A-Za-z'\-.]+$");

pub static LOOSE_NAME: StaticPattern = StaticPattern::new(
    "loose_name",
    r"\bName\b[^\nA-Za-z0-9]{0,6}([A-Z][A-Za-z'\-]+(?:\s+[A-Z][A-Za-z'\-]+){1,3})",
);

pub static DATE_ARTIFACT: StaticPattern =
    StaticPattern::new("date_artifact", r"(?i)\s*\bDate\b.*$");

// --- Dates ---

pub static DATE_COMPOSITE: StaticPattern = StaticPattern::new(
    "date_composite",
    r"(?i)\b\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}\b|\b\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{2,4}\b|\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{1,2},?\s+\d{4}\b",
);

pub static DATE_LABEL: StaticPattern =
    StaticPattern::new("date_label", r"(?i)Date[:;\s]*([^\n]{0,30})");

pub static BARE_YEAR: StaticPattern = StaticPattern::new("bare_year", r"\b(?:19|20)\d{2}\b");

// --- Refills ---

pub static REFILL_COUNT: StaticPattern =
    StaticPattern::new("refill_count", r"(?i)\bRefills?\s*[:\-]?\s*([0-9]+)");

pub static REFILL_WORD: StaticPattern = StaticPattern::new("refill_word", r"(?i)\bRefill\b");

// --- Address ---

pub static ADDRESS_LABEL: StaticPattern =
    StaticPattern::new("address_label", r"(?i)\bAddress[:\s\-]");

pub static ADDRESS_PREFIX: StaticPattern =
    StaticPattern::new("address_prefix", r"(?i)Address[:\s\-]*");

pub static ADDRESS_LOOSE: StaticPattern = StaticPattern::new(
    "address_loose",
    r"(?i)\bAddress[:\s]*([A-Za-z0-9,.\s\-]{10,120})",
);

pub static DOSAGE_LINE_START: StaticPattern =
    StaticPattern::new("dosage_line_start", r"[A-Z][a-z]{2,}\s+\d");

pub static SPACE_BEFORE_COMMA: StaticPattern =
    StaticPattern::new("space_before_comma", r"\s+,");

// --- Medicines ---

pub static DRUG_WITH_STRENGTH: StaticPattern = StaticPattern::new(
    "drug_with_strength",
    r"(?i)([A-Za-z][A-Za-z0-9\-()/. ]{2,80}?)\s*[,:\-]?\s*(\d+(?:\.\d+)?\s*(?:grams|gram|mcg|mg|ml|g)\b)",
);

pub static MEDICINE_SKIP: StaticPattern = StaticPattern::new(
    "medicine_skip",
    r"(?i)^(?:Address|Name|Patient|Date|Phone|Dr|Doctor|Physician|Refills?|Amount|Page)\b",
);

pub static DIRECTIONS_HEADER: StaticPattern =
    StaticPattern::new("directions_header", r"(?i)^directions\b");

pub static INLINE_DOSAGE: StaticPattern = StaticPattern::new(
    "inline_dosage",
    r"(?i)\b\d[\d.]*\s*(?:grams|gram|mcg|mg|ml|g)\b",
);

pub static WORD_DIGIT: StaticPattern = StaticPattern::new("word_digit", r"\b\d");

pub static LONG_WORD: StaticPattern = StaticPattern::new("long_word", r"\b[A-Za-z]{6,}\b");

pub static NAME_SEPARATOR: StaticPattern = StaticPattern::new("name_separator", r"[,;\-:]\s*");

pub static NAME_TOKEN: StaticPattern =
    StaticPattern::new("name_token", r"\b([A-Za-z][A-Za-z\-']{2,60})\b");
