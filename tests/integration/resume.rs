//! Capped runs, continuation tokens, and cancellation.

use crate::integration::test_utils::{seven_entry_tree, TreeEndpoint};
use aclwalk::batch::ChangeCounters;
use aclwalk::client::RecursiveAclClient;
use aclwalk::driver::{CancelHandle, RunRequest};
use aclwalk::progress::BatchProgress;
use std::sync::Arc;

#[tokio::test]
async fn capped_run_returns_token_and_resumes_to_completion() {
    let endpoint = Arc::new(TreeEndpoint::new(seven_entry_tree()));
    let client = RecursiveAclClient::new(endpoint);

    let first = client
        .set_recursive_with_options(
            RunRequest::new("/data", "user::rwx")
                .batch_size(2)
                .max_batches(1),
        )
        .await
        .unwrap();

    assert!(!first.is_complete());
    assert_eq!(first.aggregate.total(), 2);

    let token = first.continuation_token.clone().unwrap();
    let second = client
        .set_recursive_with_options(
            RunRequest::new("/data", "user::rwx")
                .batch_size(2)
                .continuation_token(token),
        )
        .await
        .unwrap();

    assert!(second.is_complete());
    assert_eq!(second.aggregate.total(), 5);
    assert_eq!(first.aggregate.merged(&second.aggregate).total(), 7);
}

#[tokio::test]
async fn capped_resumption_sums_to_a_single_full_run() {
    let full_endpoint = Arc::new(TreeEndpoint::new(seven_entry_tree()));
    let full_client = RecursiveAclClient::new(full_endpoint);
    let full = full_client
        .set_recursive_with_options(RunRequest::new("/data", "user::rwx").batch_size(2))
        .await
        .unwrap();

    for max_batches in 1..=4u32 {
        let endpoint = Arc::new(TreeEndpoint::new(seven_entry_tree()));
        let client = RecursiveAclClient::new(endpoint);

        let mut summed = ChangeCounters::default();
        let mut token: Option<String> = None;
        loop {
            let mut request = RunRequest::new("/data", "user::rwx")
                .batch_size(2)
                .max_batches(max_batches);
            if let Some(token) = token.take() {
                request = request.continuation_token(token);
            }
            let partial = client.set_recursive_with_options(request).await.unwrap();
            summed = summed.merged(&partial.aggregate);
            match partial.continuation_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        assert_eq!(summed, full.aggregate, "max_batches = {max_batches}");
    }
}

#[tokio::test]
async fn exhausted_token_resumes_as_a_no_op() {
    let endpoint = Arc::new(TreeEndpoint::new(seven_entry_tree()));
    let client = RecursiveAclClient::new(endpoint.clone());

    // Walk to completion once.
    let first = client
        .set_recursive_with_options(
            RunRequest::new("/data", "user::rwx")
                .batch_size(7)
                .max_batches(1),
        )
        .await
        .unwrap();
    assert!(first.is_complete());

    // "7" points past the final entry (test_utils cursors encode the next
    // index). The endpoint answers with one empty terminal batch and the
    // run completes without changing anything.
    let calls_before = endpoint.call_count();
    let replay = client
        .set_recursive_with_options(
            RunRequest::new("/data", "user::rwx").continuation_token("7"),
        )
        .await
        .unwrap();

    assert!(replay.is_complete());
    assert_eq!(replay.aggregate, ChangeCounters::default());
    assert!(replay.failures.is_none());
    assert_eq!(endpoint.call_count(), calls_before + 1);
}

#[tokio::test]
async fn cancellation_stops_at_the_next_batch_boundary() {
    let endpoint = Arc::new(TreeEndpoint::new(seven_entry_tree()));
    let client = RecursiveAclClient::new(endpoint.clone());

    let cancel = CancelHandle::new();
    let cancel_from_handler = cancel.clone();
    let result = client
        .set_recursive_with_options(
            RunRequest::new("/data", "user::rwx")
                .batch_size(2)
                .progress(move |_progress: BatchProgress<'_>| {
                    cancel_from_handler.cancel();
                })
                .cancel_handle(cancel),
        )
        .await
        .unwrap();

    // The first batch completed and was merged; nothing further was issued.
    assert_eq!(endpoint.call_count(), 1);
    assert_eq!(result.aggregate.total(), 2);
    let token = result.continuation_token.expect("run should be resumable");

    let rest = client
        .set_recursive_with_options(
            RunRequest::new("/data", "user::rwx")
                .batch_size(2)
                .continuation_token(token),
        )
        .await
        .unwrap();
    assert_eq!(result.aggregate.merged(&rest.aggregate).total(), 7);
}
