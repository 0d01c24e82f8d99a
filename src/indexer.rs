//! Indexing pipeline orchestration.
//!
//! Coordinates the full index flow: health precondition → walk → batched
//! upload → stats. Batches run strictly sequentially; items within a batch
//! are uploaded concurrently, each settling to a tagged outcome so one
//! failure never aborts the batch or the run. Stats are reduced from the
//! settled outcomes after each batch's concurrent phase, so the accumulator
//! never has concurrent writers.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::client::RagClient;
use crate::config::Config;
use crate::models::{InclusionSpec, IndexingStats, WorkItem};
use crate::progress::{IndexProgressEvent, ProgressReporter};
use crate::walker;

/// Destination for uploaded documents.
///
/// The batcher only depends on this seam, so it can be driven by a mock in
/// tests. [`RagClient`] is the production implementation.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn upload(&self, item: &WorkItem) -> Result<()>;
}

#[async_trait]
impl DocumentSink for RagClient {
    async fn upload(&self, item: &WorkItem) -> Result<()> {
        self.upload_document(&item.path, &item.metadata).await
    }
}

/// Upload the worklist in sequential batches of at most `batch_size`,
/// with all items inside a batch running concurrently.
///
/// Every item settles to success or failure; a transport error or a panicked
/// upload task is recorded as a failure for that item only. Per-category
/// tallies count processed items, so a failed upload still increments its
/// category (`by_category` sums to `total_files`).
pub async fn run_batches(
    sink: Arc<dyn DocumentSink>,
    work_items: &[WorkItem],
    batch_size: usize,
    reporter: &dyn ProgressReporter,
) -> IndexingStats {
    let batch_size = batch_size.max(1);

    let mut stats = IndexingStats {
        total_files: work_items.len() as u64,
        ..Default::default()
    };

    let mut processed: u64 = 0;

    for batch in work_items.chunks(batch_size) {
        // Fan out: one task per item, all concurrent within the batch.
        let mut handles = Vec::with_capacity(batch.len());
        for item in batch {
            let sink = Arc::clone(&sink);
            let item = item.clone();
            handles.push((
                item.metadata.category,
                item.path.clone(),
                tokio::spawn(async move { sink.upload(&item).await }),
            ));
        }

        // Fan in: wait for the whole batch to settle, then reduce outcomes.
        for (category, path, handle) in handles {
            let outcome = match handle.await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e),
                Err(e) => Err(anyhow::anyhow!("upload task panicked: {}", e)),
            };

            *stats.by_category.entry(category).or_insert(0) += 1;
            match outcome {
                Ok(()) => stats.successful += 1,
                Err(e) => {
                    eprintln!("warning: failed to upload {}: {:#}", path.display(), e);
                    stats.failed += 1;
                }
            }
            processed += 1;
        }

        reporter.report(IndexProgressEvent::Uploading {
            n: processed,
            total: stats.total_files,
        });
    }

    stats
}

/// Run the `index` command: walk the project and upload everything selected.
pub async fn run_index(
    config: &Config,
    path: &Path,
    recursive: bool,
    spec: &InclusionSpec,
    batch_size: Option<usize>,
    reporter: &dyn ProgressReporter,
    json: bool,
) -> Result<()> {
    let client = Arc::new(RagClient::new(config)?);

    if !client.health().await {
        bail!(
            "RAG service is not accessible at {}. Start it with: rag server start",
            config.api.url
        );
    }

    reporter.report(IndexProgressEvent::Scanning {
        root: path.display().to_string(),
    });

    let work_items = walker::walk(config, path, recursive, spec)?;

    if work_items.is_empty() {
        // A valid nothing-to-do outcome, not an error.
        if json {
            println!("{}", serde_json::to_string_pretty(&IndexingStats::default())?);
        } else {
            println!("No files found to index (selection: {})", spec.describe());
            println!("Try adjusting --include-* flags or check the project path.");
        }
        return Ok(());
    }

    let batch_size = batch_size.unwrap_or(config.indexing.batch_size);
    let stats = run_batches(client, &work_items, batch_size, reporter).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("index {}", path.display());
        println!("  selection: {}", spec.describe());
        println!("  total files: {}", stats.total_files);
        println!("  successful: {}", stats.successful);
        println!("  failed: {}", stats.failed);
        println!("  by type:");
        for (category, count) in &stats.by_category {
            println!("    {}: {}", category, count);
        }
    }

    if stats.successful == 0 {
        bail!("Failed to index all {} files", stats.total_files);
    }

    Ok(())
}
