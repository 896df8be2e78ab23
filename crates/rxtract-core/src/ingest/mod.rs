mod cleaner;
mod dates;
mod extractor;
mod fields;
mod medicines;
mod normalizer;
pub mod patterns;
mod pipeline;

pub use cleaner::{clean, collapse_whitespace, CleanedText};
pub use dates::normalize_date;
pub use extractor::{
    ExtractionError, ExtractionResult, ExtractionStrategy, Extractor, MappingExtractor,
    RuleBasedExtractor,
};
pub use fields::{doctor_name, date, patient_address, patient_name, refills, tidy_address};
pub use medicines::{dedup_medicines, extract_medicines};
pub use normalizer::{DefaultNormalizer, NormalizationError, NormalizationResult, Normalizer};
pub use patterns::PatternError;
pub use pipeline::{ExtractionPipeline, ProcessOutput, ProcessStats};
