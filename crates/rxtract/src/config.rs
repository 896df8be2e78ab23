use std::path::PathBuf;

use anyhow::{Context, Result};
use rxtract_core::ExtractionStrategy;

const STORE_FILE: &str = "extractions.jsonl";
const FALLBACK_STORE: &str = "stored_extractions.jsonl";

/// Settings resolved from the environment; command-line flags are applied
/// on top with [`CliConfig::with_overrides`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Append-only JSONL file that stored records go to
    pub store_path: PathBuf,
    /// Extractor used when a command doesn't name one
    pub extractor: ExtractionStrategy,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            extractor: ExtractionStrategy::RuleBased,
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Result<Self> {
        let store_path = std::env::var_os("RXTRACT_STORE")
            .filter(|v| !v.is_empty())
            .map_or_else(default_store_path, PathBuf::from);

        let extractor = match std::env::var("RXTRACT_EXTRACTOR") {
            Ok(v) if !v.trim().is_empty() => v
                .trim()
                .parse::<ExtractionStrategy>()
                .context("invalid RXTRACT_EXTRACTOR")?,
            _ => ExtractionStrategy::RuleBased,
        };

        Ok(Self {
            store_path,
            extractor,
        })
    }

    #[must_use]
    pub fn with_overrides(
        mut self,
        store_path: Option<PathBuf>,
        extractor: Option<ExtractionStrategy>,
    ) -> Self {
        if let Some(path) = store_path {
            self.store_path = path;
        }
        if let Some(strategy) = extractor {
            self.extractor = strategy;
        }
        self
    }
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir().map_or_else(
        || PathBuf::from(FALLBACK_STORE),
        |dir| dir.join("rxtract").join(STORE_FILE),
    )
}
