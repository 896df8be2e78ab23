use std::time::Instant;

use serde::Serialize;

use super::extractor::{ExtractionStrategy, Extractor, RuleBasedExtractor};
use super::normalizer::{DefaultNormalizer, Normalizer};
use crate::record::{ExtractedFields, NormalizedPatientRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessStats {
    pub medicines: usize,
    pub warnings: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub strategy: ExtractionStrategy,
    pub record: NormalizedPatientRecord,
    pub stats: ProcessStats,
}

/// Text in, normalized record out. The extractor and normalizer are
/// injected; neither stage can make [`ExtractionPipeline::process`] fail.
pub struct ExtractionPipeline {
    extractor: Box<dyn Extractor>,
    normalizer: Box<dyn Normalizer>,
}

impl ExtractionPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractor: Box::new(RuleBasedExtractor::new()),
            normalizer: Box::new(DefaultNormalizer::new()),
        }
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Box<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn with_normalizer(mut self, normalizer: Box<dyn Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    #[must_use]
    pub fn strategy(&self) -> ExtractionStrategy {
        self.extractor.strategy()
    }

    #[must_use]
    pub fn process(&self, text: &str) -> ProcessOutput {
        let start = Instant::now();
        let strategy = self.extractor.strategy();

        let fields = self.extractor.extract(text).unwrap_or_else(|e| {
            tracing::warn!(%strategy, "Extraction failed: {}", e);
            ExtractedFields::new().with_warning(format!("extraction failed: {e}"))
        });

        let upstream = fields.warnings.clone();
        let record = self.normalizer.normalize(fields).unwrap_or_else(|e| {
            tracing::warn!("Normalization failed: {}", e);
            let mut warnings = upstream;
            warnings.push(format!("normalization failed: {e}"));
            NormalizedPatientRecord::with_warnings(warnings)
        });

        let stats = ProcessStats {
            medicines: record.medicines.len(),
            warnings: record.warnings.len(),
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        tracing::debug!(
            %strategy,
            medicines = stats.medicines,
            warnings = stats.warnings,
            duration_ms = stats.duration_ms,
            "Processed document"
        );

        ProcessOutput {
            strategy,
            record,
            stats,
        }
    }

    #[must_use]
    pub fn extract_record(&self, text: &str) -> NormalizedPatientRecord {
        self.process(text).record
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::extractor::{ExtractionError, ExtractionResult, MappingExtractor};
    use crate::ingest::normalizer::{NormalizationError, NormalizationResult};

    struct FailingExtractor;

    impl Extractor for FailingExtractor {
        fn strategy(&self) -> ExtractionStrategy {
            ExtractionStrategy::Mapping
        }

        fn extract(&self, _text: &str) -> ExtractionResult<ExtractedFields> {
            Err(ExtractionError::InvalidMapping("boom".into()))
        }
    }

    struct FailingNormalizer;

    impl Normalizer for FailingNormalizer {
        fn normalize(
            &self,
            _fields: ExtractedFields,
        ) -> NormalizationResult<NormalizedPatientRecord> {
            Err(NormalizationError::Failed("bad record".into()))
        }
    }

    #[test]
    fn test_process_sample() {
        let pipeline = ExtractionPipeline::new();
        let output = pipeline.process("Patient: Mary-Ann O'Neill\nAddress: x\nRefill: 1");

        assert_eq!(output.strategy, ExtractionStrategy::RuleBased);
        assert_eq!(output.record.patient_name.as_deref(), Some("Mary-Ann O'Neill"));
        assert_eq!(output.record.refills, 1);
        assert_eq!(output.stats.warnings, 0);
    }

    #[test]
    fn test_extractor_failure_degrades() {
        let pipeline = ExtractionPipeline::new().with_extractor(Box::new(FailingExtractor));
        let output = pipeline.process("anything");

        assert_eq!(output.record.refills, 0);
        assert!(output.record.patient_name.is_none());
        assert_eq!(output.record.warnings.len(), 1);
        assert!(output.record.warnings[0].contains("boom"));
        assert_eq!(output.stats.warnings, 1);
    }

    #[test]
    fn test_normalizer_failure_keeps_upstream_warnings() {
        let pipeline = ExtractionPipeline::new()
            .with_extractor(Box::new(MappingExtractor::new()))
            .with_normalizer(Box::new(FailingNormalizer));
        let output = pipeline.process(r#"{"patient_name": "Jane Roe", "warnings": ["from upstream"]}"#);

        assert!(output.record.patient_name.is_none());
        assert_eq!(
            output.record.warnings,
            vec![
                "from upstream".to_string(),
                "normalization failed: Normalization failed: bad record".to_string(),
            ]
        );
    }

    #[test]
    fn test_strategy_reported() {
        let pipeline = ExtractionPipeline::new().with_extractor(Box::new(MappingExtractor::new()));
        assert_eq!(pipeline.strategy(), ExtractionStrategy::Mapping);
    }

    #[test]
    fn test_stats_count_medicines() {
        let pipeline = ExtractionPipeline::default();
        let output = pipeline.process("Prednisone 20 mg\nMetformin 500 mg");

        assert_eq!(output.stats.medicines, 2);
        assert_eq!(output.stats.medicines, output.record.medicines.len());
    }
}
