//! Per-batch progress observation for recursive ACL runs.
//!
//! The driver invokes the handler synchronously, on its own task, exactly
//! once per batch and in batch order. A handler that blocks stalls the loop;
//! that trade-off buys deterministic ordering.

use crate::batch::{ChangeCounters, EntryFailure};
use parking_lot::Mutex;
use std::sync::Arc;

/// Snapshot handed to a progress handler after one batch is merged.
#[derive(Debug, Clone, Copy)]
pub struct BatchProgress<'a> {
    /// Counters for the batch that just completed.
    pub batch: ChangeCounters,
    /// The driver's running aggregate, batch included.
    pub cumulative: ChangeCounters,
    /// Failures reported inside this batch. Empty unless the run was started
    /// with continue-on-failure.
    pub failures: &'a [EntryFailure],
}

/// Observer invoked once per completed batch.
pub trait ProgressHandler: Send {
    fn on_batch(&mut self, progress: BatchProgress<'_>);
}

impl<F> ProgressHandler for F
where
    F: FnMut(BatchProgress<'_>) + Send,
{
    fn on_batch(&mut self, progress: BatchProgress<'_>) {
        self(progress)
    }
}

/// Owned copy of one progress snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRecord {
    pub batch: ChangeCounters,
    pub cumulative: ChangeCounters,
    pub failures: Vec<EntryFailure>,
}

/// A handler that records every batch, for callers that want to inspect the
/// run after the fact (and for tests). Clone it before handing it to a
/// `RunRequest`; all clones share the same record list.
#[derive(Debug, Clone, Default)]
pub struct RecordingProgress {
    records: Arc<Mutex<Vec<BatchRecord>>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<BatchRecord> {
        self.records.lock().clone()
    }

    pub fn batch_count(&self) -> usize {
        self.records.lock().len()
    }

    /// The aggregate reported with the most recent batch, if any.
    pub fn last_cumulative(&self) -> Option<ChangeCounters> {
        self.records.lock().last().map(|r| r.cumulative)
    }
}

impl ProgressHandler for RecordingProgress {
    fn on_batch(&mut self, progress: BatchProgress<'_>) {
        self.records.lock().push(BatchRecord {
            batch: progress.batch,
            cumulative: progress.cumulative,
            failures: progress.failures.to_vec(),
        });
    }
}
