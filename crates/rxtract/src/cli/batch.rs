use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rxtract_core::{ExtractionPipeline, ExtractionStrategy, ProcessOutput};
use serde_json::json;
use tokio::task::JoinSet;

use super::pipeline_for;
use crate::store::RecordStore;

/// Outcome of a batch run, in input order.
#[derive(Default)]
pub struct BatchResult {
    pub successes: Vec<(PathBuf, ProcessOutput)>,
    pub failures: Vec<(PathBuf, anyhow::Error)>,
}

impl BatchResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_success(&mut self, path: PathBuf, output: ProcessOutput) {
        self.successes.push((path, output));
    }

    pub fn add_failure(&mut self, path: PathBuf, error: anyhow::Error) {
        self.failures.push((path, error));
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

pub async fn run(
    paths: &[PathBuf],
    strategy: ExtractionStrategy,
    store: Option<&RecordStore>,
) -> Result<()> {
    let pipeline = Arc::new(pipeline_for(strategy));
    let result = process_paths(pipeline, paths).await?;

    for (path, output) in &result.successes {
        let line = json!({
            "source": path.display().to_string(),
            "record": output.record.to_json()?,
        });
        println!("{line}");

        if let Some(store) = store {
            store.append(&output.record)?;
        }
    }

    for (path, error) in &result.failures {
        tracing::warn!(path = %path.display(), "Skipped document: {:#}", error);
        eprintln!("  warning: {}: {error:#}", path.display());
    }

    eprintln!(
        "Processed {} document(s), {} failed",
        result.success_count(),
        result.failure_count()
    );

    Ok(())
}

/// Reads and extracts every document concurrently. Extraction itself is
/// CPU-bound, so each document gets its own blocking task.
pub async fn process_paths(
    pipeline: Arc<ExtractionPipeline>,
    paths: &[PathBuf],
) -> Result<BatchResult> {
    let mut result = BatchResult::new();
    let mut files = Vec::new();

    for path in paths {
        match expand(path).await {
            Ok(found) => files.extend(found),
            Err(e) => result.add_failure(path.clone(), e),
        }
    }

    let mut tasks = JoinSet::new();
    for (idx, path) in files.into_iter().enumerate() {
        let pipeline = Arc::clone(&pipeline);
        tasks.spawn(async move {
            let outcome = process_file(pipeline, &path).await;
            (idx, path, outcome)
        });
    }

    let mut finished = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        finished.push(joined.context("batch task panicked")?);
    }
    finished.sort_by_key(|(idx, _, _)| *idx);

    for (_, path, outcome) in finished {
        match outcome {
            Ok(output) => result.add_success(path, output),
            Err(e) => result.add_failure(path, e),
        }
    }

    Ok(result)
}

async fn process_file(pipeline: Arc<ExtractionPipeline>, path: &Path) -> Result<ProcessOutput> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();

    tokio::task::spawn_blocking(move || pipeline.process(&text))
        .await
        .context("extraction task panicked")
}

/// A file stands for itself; a directory stands for the regular files
/// directly inside it, sorted by path.
async fn expand(path: &Path) -> Result<Vec<PathBuf>> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("file not found: {}", path.display()))?;

    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(path).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
