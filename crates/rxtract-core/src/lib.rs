pub mod error;
pub mod ingest;
pub mod record;

pub use error::{Error, Result};
pub use ingest::{
    clean, normalize_date, CleanedText, DefaultNormalizer, ExtractionError, ExtractionPipeline,
    ExtractionResult, ExtractionStrategy, Extractor, MappingExtractor, NormalizationError,
    NormalizationResult, Normalizer, ProcessOutput, ProcessStats, RuleBasedExtractor,
};
pub use record::{ExtractedFields, Medicine, NormalizedPatientRecord};
