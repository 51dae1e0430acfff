// THEORY:
// The batch scheduler fans one comparison out per item while never letting more
// than `concurrency` of them hold decoded rasters at the same time.
//
// - Admission gate: a `Semaphore` with `concurrency` permits. A permit is moved
//   into the blocking task and released when the comparison returns.
// - Compute: pixel work is CPU-bound, so it runs on tokio's blocking pool rather
//   than on the async workers.
// - Progress: a single collecting loop owns the counter and publishes
//   `(completed, total)` on a channel after each completion. Nothing else is
//   shared between comparisons.
// - Completion: `run` returns only when every item has a result. A comparison
//   that panics is reported as `Failed` for its row; the batch never aborts.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
#[cfg(feature = "serde")]
use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};

use crate::config::DEFAULT_CONCURRENCY;
use crate::pipeline::{ComparisonItem, ComparisonPipeline, ComparisonResult};

/// Anything that can turn one item into a result. Must not fail.
pub trait PairComparator: Send + Sync + 'static {
    fn compare(&self, item: &ComparisonItem) -> ComparisonResult;
}

impl PairComparator for ComparisonPipeline {
    fn compare(&self, item: &ComparisonItem) -> ComparisonResult {
        ComparisonPipeline::compare(self, item)
    }
}

/// Published after each completed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    /// Row of the item that just finished.
    pub row_index: u32,
}

impl BatchProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}

/// One item's outcome, tagged with its row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BatchEntry {
    pub row_index: u32,
    pub result: ComparisonResult,
}

pub struct BatchScheduler<C> {
    comparator: Arc<C>,
    concurrency: usize,
}

impl<C: PairComparator> BatchScheduler<C> {
    /// A zero `concurrency` is raised to 1.
    pub fn new(comparator: C, concurrency: usize) -> Self {
        Self::from_shared(Arc::new(comparator), concurrency)
    }

    pub fn from_shared(comparator: Arc<C>, concurrency: usize) -> Self {
        Self {
            comparator,
            concurrency: concurrency.max(1),
        }
    }

    pub fn with_default_concurrency(comparator: C) -> Self {
        Self::new(comparator, DEFAULT_CONCURRENCY)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Compares every item, at most `concurrency` at a time.
    ///
    /// Entries come back in input order. Progress events, if requested, arrive in
    /// completion order with `completed` counting up from 1 to `total`.
    pub async fn run(
        &self,
        items: Vec<ComparisonItem>,
        progress: Option<mpsc::UnboundedSender<BatchProgress>>,
    ) -> Vec<BatchEntry> {
        let total = items.len();
        let gate = Arc::new(Semaphore::new(self.concurrency));
        log::info!("starting batch of {} pair(s), {} at a time", total, self.concurrency);

        let mut in_flight = FuturesUnordered::new();
        for (position, item) in items.into_iter().enumerate() {
            let gate = Arc::clone(&gate);
            let comparator = Arc::clone(&self.comparator);
            in_flight.push(async move {
                let row_index = item.row_index;
                let result = run_admitted(gate, comparator, item).await;
                (position, BatchEntry { row_index, result })
            });
        }

        let mut slots: Vec<Option<BatchEntry>> = (0..total).map(|_| None).collect();
        let mut completed = 0;
        while let Some((position, entry)) = in_flight.next().await {
            completed += 1;
            log::debug!("progress {}/{} (row {})", completed, total, entry.row_index);
            if let Some(sender) = &progress {
                // A dropped receiver only means nobody is watching.
                let _ = sender.send(BatchProgress {
                    completed,
                    total,
                    row_index: entry.row_index,
                });
            }
            slots[position] = Some(entry);
        }

        let entries: Vec<BatchEntry> = slots.into_iter().flatten().collect();
        let failed = entries.iter().filter(|e| e.result.is_failure()).count();
        log::info!("batch finished: {} pair(s), {} failed", entries.len(), failed);
        entries
    }
}

async fn run_admitted<C: PairComparator>(
    gate: Arc<Semaphore>,
    comparator: Arc<C>,
    item: ComparisonItem,
) -> ComparisonResult {
    let permit = match gate.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            return ComparisonResult::Failed {
                error_message: "admission gate closed".to_string(),
            };
        }
    };

    let outcome = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        comparator.compare(&item)
    })
    .await;

    outcome.unwrap_or_else(|join_error| ComparisonResult::Failed {
        error_message: format!("comparison task aborted: {join_error}"),
    })
}
