pub mod batch;
pub mod clean;
pub mod extract;
pub mod list;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rxtract_core::{ExtractionPipeline, ExtractionStrategy, NormalizedPatientRecord};

#[derive(Parser)]
#[command(
    name = "rxtract",
    about = "Extract structured prescription records from OCR text",
    version
)]
pub struct Cli {
    /// Store file to use instead of RXTRACT_STORE
    #[arg(long = "store-path", global = true)]
    pub store_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a normalized record from a text file or stdin
    Extract {
        /// Input file (stdin if omitted)
        path: Option<PathBuf>,
        /// Extraction strategy (rules or mapping)
        #[arg(long)]
        extractor: Option<ExtractionStrategy>,
        /// Append the record to the store
        #[arg(long)]
        store: bool,
        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },
    /// Print the cleaned text the extractor works on
    Clean {
        /// Input file (stdin if omitted)
        path: Option<PathBuf>,
    },
    /// Extract records from many files; directories are expanded one level
    Batch {
        /// Files or directories to process
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Extraction strategy (rules or mapping)
        #[arg(long)]
        extractor: Option<ExtractionStrategy>,
        /// Append every record to the store
        #[arg(long)]
        store: bool,
    },
    /// Show stored records, newest first
    List {
        /// Maximum number of records
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

/// Reads a document as text. Invalid UTF-8 is replaced rather than rejected.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    let bytes = match path {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[must_use]
pub fn pipeline_for(strategy: ExtractionStrategy) -> ExtractionPipeline {
    ExtractionPipeline::new().with_extractor(strategy.extractor())
}

pub fn render(record: &NormalizedPatientRecord, compact: bool) -> Result<String> {
    let value = record.to_json()?;
    let rendered = if compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    Ok(rendered)
}
