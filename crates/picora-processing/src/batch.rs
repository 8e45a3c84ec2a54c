//! Batch coordination: bounded fan-out of item pipelines.
//!
//! Every submitted ref ends up exactly once in the outcome, as a success or
//! as a failure. Workers acquire a semaphore permit before doing any work,
//! so at most `concurrency_limit` pipelines run the compute-heavy stages at
//! once; results are collected in submission order regardless of which
//! worker finishes first.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;

use picora_core::{
    BatchContext, BatchOutcome, FailureKind, ItemError, ItemFailure, ItemStage, ProcessedItem,
    ProcessingOptions, SelectionMode, SourceRef,
};
use picora_storage::ArtifactStore;

use crate::pipeline::ItemPipeline;

/// Runs batches of sources through [`ItemPipeline`]s under a concurrency
/// budget.
#[derive(Clone)]
pub struct BatchCoordinator {
    store: Arc<dyn ArtifactStore>,
}

impl BatchCoordinator {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    /// Process a batch with a fresh, never-cancelled context.
    pub async fn run(&self, sources: Vec<SourceRef>, options: ProcessingOptions) -> BatchOutcome {
        self.run_with_context(sources, BatchContext::new(options))
            .await
    }

    /// Process a batch under the caller's context, which may be cancelled
    /// at any point. In-flight items run to completion; unstarted items
    /// report a `Cancelled` failure.
    pub async fn run_with_context(
        &self,
        sources: Vec<SourceRef>,
        context: BatchContext,
    ) -> BatchOutcome {
        if sources.is_empty() {
            return BatchOutcome::empty();
        }

        let options = context.options().clone();
        if options.selection_mode == SelectionMode::Single && sources.len() > 1 {
            tracing::warn!(
                count = sources.len(),
                "single selection submitted multiple refs, accumulating failures instead"
            );
        }

        let limit = options.effective_concurrency();
        let started = Instant::now();
        tracing::info!(
            count = sources.len(),
            concurrency_limit = limit,
            "Batch started"
        );

        // Failure reports need the display name even when the task that
        // owned the ref is gone.
        let names: Vec<String> = sources.iter().map(|s| s.display_name()).collect();

        let semaphore = Arc::new(Semaphore::new(limit));
        let pipeline = Arc::new(ItemPipeline::new(self.store.clone()));
        let token = context.cancellation_token();

        let mut handles = Vec::with_capacity(sources.len());
        for (index, source) in sources.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let pipeline = pipeline.clone();
            let options = options.clone();
            let token = token.clone();

            handles.push(tokio::spawn(async move {
                let permit = tokio::select! {
                    _ = token.cancelled() => None,
                    permit = semaphore.acquire_owned() => permit.ok(),
                };
                let Some(_permit) = permit else {
                    return Err(cancelled_failure(index, &source));
                };
                // The permit may have raced a cancellation; items that have
                // not started yet must not start now.
                if token.is_cancelled() {
                    return Err(cancelled_failure(index, &source));
                }

                pipeline.run(index, &source, &options).await
            }));
        }

        // Awaiting in submission order keeps the aggregate input-ordered.
        let mut items = Vec::new();
        let mut failures = Vec::new();
        for (index, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(Ok(item)) => items.push(item),
                Ok(Err(failure)) => failures.push(failure),
                Err(e) => {
                    let kind = if context.is_cancelled() {
                        FailureKind::Cancelled
                    } else {
                        FailureKind::Io
                    };
                    failures.push(ItemFailure {
                        index,
                        source: names[index].clone(),
                        kind,
                        stage: ItemStage::Failed,
                        reason: format!("item task failed: {}", e),
                    });
                }
            }
        }

        let outcome = BatchOutcome::from_results(items, failures, context.is_cancelled());
        tracing::info!(
            items = outcome.items.len(),
            failures = outcome.failures.len(),
            verdict = ?outcome.verdict,
            duration_ms = started.elapsed().as_millis() as u64,
            "Batch finished"
        );
        outcome
    }

    /// Single-selection entry point: one source, and its failure surfaces
    /// directly instead of being folded into an aggregate.
    pub async fn process_single(
        &self,
        source: SourceRef,
        options: ProcessingOptions,
    ) -> Result<ProcessedItem, ItemFailure> {
        ItemPipeline::new(self.store.clone())
            .run(0, &source, &options)
            .await
    }
}

fn cancelled_failure(index: usize, source: &SourceRef) -> ItemFailure {
    ItemFailure {
        index,
        source: source.display_name(),
        kind: FailureKind::Cancelled,
        stage: ItemStage::Pending,
        reason: ItemError::Cancelled.to_string(),
    }
}
