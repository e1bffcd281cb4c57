//! Recursive Change Driver
//!
//! Converts one `RunRequest` into exactly one `RunResult` by repeatedly
//! asking the walk endpoint to advance the server-side subtree walk. The loop
//! is strictly sequential: each batch's cursor comes from the previous
//! batch's response, so batches cannot be pipelined or reordered.
//!
//! The driver holds no state across invocations. Resuming an interrupted walk
//! means calling [`run`] again with the continuation token from the previous
//! `RunResult` and summing the partial aggregates caller-side.

use crate::batch::{ChangeCounters, EntryFailure};
use crate::endpoint::{AclMode, AclMutation, AclWalkEndpoint};
use crate::error::AclError;
use crate::progress::{BatchProgress, ProgressHandler};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Cooperative cancellation for an in-flight run.
///
/// Observed at batch boundaries only: the in-flight remote call completes,
/// but no further batch is issued. Batch granularity belongs to the endpoint,
/// so there is no mid-batch cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Caller-supplied configuration for one recursive change run.
///
/// Immutable once a run starts; [`run`] consumes it.
pub struct RunRequest {
    /// Root of the subtree to mutate.
    pub target_path: String,
    /// Opaque ACL spec forwarded to the endpoint.
    pub entries: String,
    /// Per-batch entry cap hint. `None` lets the service choose.
    pub batch_size: Option<u32>,
    /// Stop after this many batches, returning a resumable token. `None`
    /// runs to completion.
    pub max_batches: Option<u32>,
    /// Collect per-entry failures as data instead of aborting on the first.
    pub continue_on_failure: bool,
    /// Resume point from a previous run's `RunResult`.
    pub continuation_token: Option<String>,
    /// Invoked once per completed batch, in batch order.
    pub progress: Option<Box<dyn ProgressHandler>>,
    /// Checked at each batch boundary.
    pub cancel: Option<CancelHandle>,
}

impl RunRequest {
    pub fn new(target_path: impl Into<String>, entries: impl Into<String>) -> Self {
        Self {
            target_path: target_path.into(),
            entries: entries.into(),
            batch_size: None,
            max_batches: None,
            continue_on_failure: false,
            continuation_token: None,
            progress: None,
            cancel: None,
        }
    }

    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn max_batches(mut self, max_batches: u32) -> Self {
        self.max_batches = Some(max_batches);
        self
    }

    pub fn continue_on_failure(mut self, continue_on_failure: bool) -> Self {
        self.continue_on_failure = continue_on_failure;
        self
    }

    pub fn continuation_token(mut self, token: impl Into<String>) -> Self {
        self.continuation_token = Some(token.into());
        self
    }

    pub fn progress(mut self, handler: impl ProgressHandler + 'static) -> Self {
        self.progress = Some(Box::new(handler));
        self
    }

    pub fn cancel_handle(mut self, handle: CancelHandle) -> Self {
        self.cancel = Some(handle);
        self
    }

    /// Local misuse checks, applied before any remote call.
    fn validate(&self) -> Result<(), AclError> {
        if self.target_path.trim().is_empty() {
            return Err(AclError::InvalidRequest(
                "target path must not be empty".to_string(),
            ));
        }
        if self.entries.trim().is_empty() {
            return Err(AclError::InvalidRequest(
                "ACL entries must not be empty".to_string(),
            ));
        }
        if self.batch_size == Some(0) {
            return Err(AclError::InvalidRequest(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.max_batches == Some(0) {
            return Err(AclError::InvalidRequest(
                "max batches must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for RunRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunRequest")
            .field("target_path", &self.target_path)
            .field("batch_size", &self.batch_size)
            .field("max_batches", &self.max_batches)
            .field("continue_on_failure", &self.continue_on_failure)
            .field("continuation_token", &self.continuation_token)
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel.is_some())
            .finish()
    }
}

/// Final aggregate of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Sum of all batch counters processed in this invocation.
    pub aggregate: ChangeCounters,
    /// `None` when the walk finished; `Some` when it stopped at a batch cap
    /// or a cancellation and can be resumed.
    pub continuation_token: Option<String>,
    /// `Some` only when continue-on-failure was requested and at least one
    /// entry failed. Order: batch order, then endpoint order within a batch.
    pub failures: Option<Vec<EntryFailure>>,
}

impl RunResult {
    pub fn is_complete(&self) -> bool {
        self.continuation_token.is_none()
    }
}

/// Drive a recursive ACL change to its stop condition.
///
/// Fails with [`AclError::ChangeFailed`] as soon as a batch call fails; no
/// partial result is returned in that case. Progress already committed
/// server-side by earlier batches is not rolled back and not surfaced here.
pub async fn run(
    endpoint: &dyn AclWalkEndpoint,
    mode: AclMode,
    mut request: RunRequest,
) -> Result<RunResult, AclError> {
    request.validate()?;

    let mutation = AclMutation::new(mode, std::mem::take(&mut request.entries));
    let mut aggregate = ChangeCounters::default();
    let mut failures: Vec<EntryFailure> = Vec::new();
    let mut cursor = request.continuation_token.take();
    let mut batches_issued: u32 = 0;

    loop {
        if request
            .cancel
            .as_ref()
            .is_some_and(CancelHandle::is_cancelled)
        {
            debug!(
                target_path = %request.target_path,
                batches = batches_issued,
                "run cancelled at batch boundary"
            );
            break;
        }

        let outcome = endpoint
            .advance_walk(
                &request.target_path,
                &mutation,
                cursor.as_deref(),
                request.batch_size,
                request.continue_on_failure,
            )
            .await?;

        aggregate = aggregate.merged(&outcome.batch);
        if request.continue_on_failure {
            failures.extend(outcome.failures.iter().cloned());
        }

        if let Some(handler) = request.progress.as_deref_mut() {
            handler.on_batch(BatchProgress {
                batch: outcome.batch,
                cumulative: aggregate,
                failures: &outcome.failures,
            });
        }

        batches_issued += 1;
        cursor = outcome.continuation;
        debug!(
            target_path = %request.target_path,
            batch = batches_issued,
            directories = aggregate.directories_changed,
            files = aggregate.files_changed,
            failed = aggregate.failures,
            more = cursor.is_some(),
            "batch merged"
        );

        if cursor.is_none() {
            break;
        }
        if request.max_batches.is_some_and(|max| batches_issued >= max) {
            break;
        }
    }

    info!(
        target_path = %request.target_path,
        mode = mutation.mode.as_str(),
        batches = batches_issued,
        entries = aggregate.total(),
        complete = cursor.is_none(),
        "recursive ACL run finished"
    );

    Ok(RunResult {
        aggregate,
        continuation_token: cursor,
        failures: (request.continue_on_failure && !failures.is_empty()).then_some(failures),
    })
}
