use thiserror::Error;

use super::cleaner::collapse_whitespace;
use super::dates::normalize_date;
use super::fields::tidy_address;
use super::medicines::dedup_medicines;
use super::patterns::DATE_ARTIFACT;
use crate::record::{ExtractedFields, Medicine, NormalizedPatientRecord};

#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("Normalization failed: {0}")]
    Failed(String),
}

pub type NormalizationResult<T> = Result<T, NormalizationError>;

/// Turns raw extracted fields into the canonical record.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, fields: ExtractedFields) -> NormalizationResult<NormalizedPatientRecord>;
}

/// Trims, deduplicates and parses the date. Upstream warnings are carried
/// over in order and new ones are appended after them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNormalizer;

impl DefaultNormalizer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn patient_name(name: &str, warnings: &mut Vec<String>) -> String {
        let name = collapse_whitespace(name);
        match DATE_ARTIFACT.regex() {
            Ok(re) => re.replace(&name, "").trim().to_string(),
            Err(e) => {
                tracing::warn!("Patient name left untrimmed: {}", e);
                warnings.push(format!("patient_name normalization failed: {e}"));
                name
            }
        }
    }

    fn medicines(medicines: Vec<Medicine>, warnings: &mut Vec<String>) -> Vec<Medicine> {
        let kept: Vec<Medicine> = medicines
            .iter()
            .map(Medicine::normalized)
            .filter(|m| {
                let keep = m.alphabetic_len() >= 3;
                if !keep {
                    warnings.push(format!("dropped medicine entry {:?}: name too short", m.name));
                }
                keep
            })
            .collect();

        dedup_medicines(kept)
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, fields: ExtractedFields) -> NormalizationResult<NormalizedPatientRecord> {
        let ExtractedFields {
            doctor_name,
            patient_name,
            date,
            patient_address,
            medicines,
            refills,
            mut warnings,
        } = fields;

        let patient_name = patient_name
            .map(|name| Self::patient_name(&name, &mut warnings))
            .filter(|name| !name.is_empty());
        let medicines = Self::medicines(medicines, &mut warnings);
        let date = non_empty(date.as_deref().map(collapse_whitespace));
        let parsed_date = date.as_deref().and_then(normalize_date);

        let record = NormalizedPatientRecord {
            doctor_name: non_empty(doctor_name.as_deref().map(collapse_whitespace)),
            patient_name,
            date,
            parsed_date,
            patient_address: non_empty(patient_address.as_deref().map(tidy_address)),
            medicines,
            refills,
            warnings,
        };

        tracing::debug!(
            parsed_date = ?record.parsed_date,
            medicines = record.medicines.len(),
            "Normalized patient record"
        );

        Ok(record)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_fields() -> ExtractedFields {
        ExtractedFields::from_mapping(&json!({
            "doctor_name": null,
            "patient_name": "Adarta Sharapova Date",
            "date": "wfil/2022",
            "patient_address": "9 tennis court, new Russia, DC\nLN\nOX",
            "medicines": [
                {"name": "Prednisone", "strength": "20 mg", "directions": "Taper 5 mg every 3 days"},
                {"name": "Lialda", "strength": "2.4 gram", "directions": "take 2 pill everyday for 1 month"}
            ],
            "refills": "2",
            "warnings": []
        }))
    }

    #[test]
    fn test_default_normalizer() {
        let record = DefaultNormalizer::new().normalize(sample_fields()).unwrap();

        assert_eq!(record.patient_name.as_deref(), Some("Adarta Sharapova"));
        assert_eq!(record.date.as_deref(), Some("wfil/2022"));
        assert_eq!(record.parsed_date.map(|d| d.to_string()).as_deref(), Some("2022-01-01"));
        assert_eq!(
            record.patient_address.as_deref(),
            Some("9 tennis court, new Russia, DC LN OX")
        );
        assert_eq!(record.medicines.len(), 2);
        assert_eq!(record.refills, 2);
        assert!(record.doctor_name.is_none());
        assert!(record.warnings.is_empty());
    }

    #[test]
    fn test_date_artifact_with_suffix() {
        let fields = ExtractedFields {
            patient_name: Some("  Jane   Roe Date: 12/01".into()),
            ..ExtractedFields::default()
        };
        let record = DefaultNormalizer::new().normalize(fields).unwrap();

        assert_eq!(record.patient_name.as_deref(), Some("Jane Roe"));
    }

    #[test]
    fn test_name_that_is_only_artifact() {
        let fields = ExtractedFields {
            patient_name: Some("Date".into()),
            ..ExtractedFields::default()
        };
        let record = DefaultNormalizer::new().normalize(fields).unwrap();

        assert!(record.patient_name.is_none());
    }

    #[test]
    fn test_medicines_collapsed_and_deduplicated() {
        let fields = ExtractedFields {
            medicines: vec![
                Medicine::new(" Prednisone ").with_strength("20  mg"),
                Medicine::new("prednisone").with_strength("20 MG"),
                Medicine::new("Xy"),
                Medicine::new("Lialda").with_directions(" take\t2  daily "),
            ],
            ..ExtractedFields::default()
        };
        let record = DefaultNormalizer::new().normalize(fields).unwrap();

        assert_eq!(
            record.medicines,
            vec![
                Medicine::new("Prednisone").with_strength("20 mg"),
                Medicine::new("Lialda").with_directions("take 2 daily"),
            ]
        );
        assert_eq!(record.warnings.len(), 1);
        assert!(record.warnings[0].contains("Xy"));
    }

    #[test]
    fn test_upstream_warnings_preserved() {
        let fields = ExtractedFields::new()
            .with_warning("first")
            .with_warning("second");
        let record = DefaultNormalizer::new().normalize(fields).unwrap();

        assert_eq!(record.warnings, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_unparseable_date_keeps_raw() {
        let fields = ExtractedFields {
            date: Some("smudged".into()),
            ..ExtractedFields::default()
        };
        let record = DefaultNormalizer::new().normalize(fields).unwrap();

        assert_eq!(record.date.as_deref(), Some("smudged"));
        assert!(record.parsed_date.is_none());
    }

    #[test]
    fn test_empty_fields() {
        let record = DefaultNormalizer::new()
            .normalize(ExtractedFields::default())
            .unwrap();

        assert_eq!(record, NormalizedPatientRecord::default());
    }
}
