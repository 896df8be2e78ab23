use std::path::Path;

use anyhow::Result;
use rxtract_core::ExtractionStrategy;

use super::{pipeline_for, read_input, render};
use crate::store::RecordStore;

pub fn run(
    path: Option<&Path>,
    strategy: ExtractionStrategy,
    store: Option<&RecordStore>,
    compact: bool,
) -> Result<()> {
    let text = read_input(path)?;
    let output = pipeline_for(strategy).process(&text);

    tracing::info!(
        %strategy,
        medicines = output.stats.medicines,
        warnings = output.stats.warnings,
        duration_ms = output.stats.duration_ms,
        "Extracted record"
    );

    println!("{}", render(&output.record, compact)?);

    for warning in &output.record.warnings {
        eprintln!("  warning: {warning}");
    }

    if let Some(store) = store {
        let stored = store.append(&output.record)?;
        eprintln!("Stored: {} -> {}", stored.id, store.path().display());
    }

    Ok(())
}
