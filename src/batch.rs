//! Result model for one batch of a recursive ACL walk.
//!
//! A walk is applied in bounded increments; each increment produces a
//! `BatchOutcome` that the driver folds into its running aggregate. All types
//! here are plain values: created inside one loop iteration, consumed by the
//! merge, never shared.

use serde::{Deserialize, Serialize};

/// Entry counters for a batch or for a running aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounters {
    /// Directories whose ACL was changed (the walk root counts as one).
    pub directories_changed: u64,
    /// Files whose ACL was changed.
    pub files_changed: u64,
    /// Entries that could not be changed. Non-zero only under
    /// continue-on-failure; otherwise the containing batch call fails.
    pub failures: u64,
}

impl ChangeCounters {
    pub fn new(directories_changed: u64, files_changed: u64, failures: u64) -> Self {
        Self {
            directories_changed,
            files_changed,
            failures,
        }
    }

    /// Elementwise sum. Aggregates after batch k equal the merged counters of
    /// batches 1..=k within one run.
    #[must_use]
    pub fn merged(&self, other: &ChangeCounters) -> ChangeCounters {
        ChangeCounters {
            directories_changed: self.directories_changed + other.directories_changed,
            files_changed: self.files_changed + other.files_changed,
            failures: self.failures + other.failures,
        }
    }

    /// Total entries this counter accounts for, successful or not.
    pub fn total(&self) -> u64 {
        self.directories_changed + self.files_changed + self.failures
    }
}

/// One tree entry whose mutation failed without aborting the walk.
///
/// Produced only when continue-on-failure is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFailure {
    /// Namespace path of the entry, as reported by the endpoint.
    pub path: String,
    pub is_directory: bool,
    /// Endpoint-supplied description of why the entry was skipped.
    pub message: String,
}

/// The result of one walk-endpoint call.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Counters for the entries covered by this batch alone.
    pub batch: ChangeCounters,
    /// Endpoint-reported running totals. Informational only: the driver keeps
    /// its own aggregate, since these may reset across resumed walks.
    pub cumulative: ChangeCounters,
    /// Entries in this batch that failed, in endpoint-reported order.
    pub failures: Vec<EntryFailure>,
    /// Cursor for the next batch. `None` means the walk is finished.
    pub continuation: Option<String>,
}
