use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::cleaner::{clean, CleanedText};
use super::fields;
use super::medicines::extract_medicines;
use super::patterns::PatternError;
use crate::record::ExtractedFields;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("Invalid field mapping: {0}")]
    InvalidMapping(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionStrategy {
    RuleBased,
    Mapping,
}

impl ExtractionStrategy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RuleBased => "rules",
            Self::Mapping => "mapping",
        }
    }

    /// A fresh extractor implementing this strategy.
    #[must_use]
    pub fn extractor(self) -> Box<dyn Extractor> {
        match self {
            Self::RuleBased => Box::new(RuleBasedExtractor::new()),
            Self::Mapping => Box::new(MappingExtractor::new()),
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionStrategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rules" => Ok(Self::RuleBased),
            "mapping" => Ok(Self::Mapping),
            _ => Err(crate::Error::InvalidStrategy(s.to_string())),
        }
    }
}

/// Turns document text into raw, unnormalized fields.
pub trait Extractor: Send + Sync {
    fn strategy(&self) -> ExtractionStrategy;

    fn extract(&self, text: &str) -> ExtractionResult<ExtractedFields>;
}

/// Heuristic extraction over cleaned OCR text. Each field is extracted in
/// isolation: a field that cannot be evaluated keeps its default and adds a
/// warning, and the remaining fields are still returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedExtractor;

impl RuleBasedExtractor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn extract_cleaned(&self, cleaned: &CleanedText) -> ExtractedFields {
        let mut warnings = Vec::new();

        let mut output = ExtractedFields {
            doctor_name: isolate("doctor_name", fields::doctor_name(cleaned), &mut warnings),
            patient_name: isolate("patient_name", fields::patient_name(cleaned), &mut warnings),
            date: isolate("date", fields::date(cleaned), &mut warnings),
            patient_address: isolate(
                "patient_address",
                fields::patient_address(cleaned),
                &mut warnings,
            ),
            medicines: isolate("medicines", extract_medicines(cleaned), &mut warnings),
            refills: isolate("refills", fields::refills(cleaned), &mut warnings),
            warnings: Vec::new(),
        };
        output.warnings = warnings;

        tracing::debug!(
            lines = cleaned.lines().len(),
            medicines = output.medicines.len(),
            warnings = output.warnings.len(),
            "Rule-based extraction complete"
        );

        output
    }
}

impl Extractor for RuleBasedExtractor {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::RuleBased
    }

    fn extract(&self, text: &str) -> ExtractionResult<ExtractedFields> {
        Ok(self.extract_cleaned(&clean(text)))
    }
}

/// Accepts the JSON field mapping emitted by some other extractor, such as
/// a model-based one, and feeds it into the same normalization path.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingExtractor;

impl MappingExtractor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Extractor for MappingExtractor {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::Mapping
    }

    fn extract(&self, text: &str) -> ExtractionResult<ExtractedFields> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(ExtractedFields::new());
        }

        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| ExtractionError::InvalidMapping(e.to_string()))?;

        if !value.is_object() {
            return Err(ExtractionError::InvalidMapping(
                "expected a JSON object".into(),
            ));
        }

        Ok(ExtractedFields::from_mapping(&value))
    }
}

fn isolate<T: Default>(field: &str, result: ExtractionResult<T>, warnings: &mut Vec<String>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(field, "Field extraction failed: {}", e);
        warnings.push(format!("{field} extraction failed: {e}"));
        T::default()
    })
}
