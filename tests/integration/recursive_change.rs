//! Whole-subtree runs: batching, counters, and progress reporting.

use crate::integration::test_utils::{seven_entry_tree, TreeEndpoint, TreeEntry};
use aclwalk::batch::ChangeCounters;
use aclwalk::client::RecursiveAclClient;
use aclwalk::driver::RunRequest;
use aclwalk::progress::RecordingProgress;
use std::sync::Arc;

#[tokio::test]
async fn seven_entries_batch_two_walks_in_four_batches() {
    let endpoint = Arc::new(TreeEndpoint::new(seven_entry_tree()));
    let client = RecursiveAclClient::new(endpoint.clone());
    let recorder = RecordingProgress::new();

    let result = client
        .set_recursive_with_options(
            RunRequest::new("/data", "user::rwx,group::r-x,other::---")
                .batch_size(2)
                .progress(recorder.clone()),
        )
        .await
        .unwrap();

    assert_eq!(result.aggregate, ChangeCounters::new(3, 4, 0));
    assert!(result.continuation_token.is_none());
    assert!(result.failures.is_none());
    assert_eq!(endpoint.call_count(), 4);

    let records = recorder.records();
    let batch_totals: Vec<u64> = records.iter().map(|r| r.batch.total()).collect();
    assert_eq!(batch_totals, vec![2, 2, 2, 1]);
    let cumulative_totals: Vec<u64> = records.iter().map(|r| r.cumulative.total()).collect();
    assert_eq!(cumulative_totals, vec![2, 4, 6, 7]);
}

#[tokio::test]
async fn completed_walk_covers_every_entry_once() {
    for batch_size in [1u32, 2, 3, 5, 7, 100] {
        let endpoint = Arc::new(TreeEndpoint::new(seven_entry_tree()));
        let client = RecursiveAclClient::new(endpoint.clone());

        let result = client
            .set_recursive_with_options(
                RunRequest::new("/data", "user::rwx").batch_size(batch_size),
            )
            .await
            .unwrap();

        assert!(result.is_complete());
        assert_eq!(result.aggregate.total(), endpoint.entry_count());
    }
}

#[tokio::test]
async fn progress_cumulative_matches_driver_aggregate_at_every_batch() {
    let endpoint = Arc::new(TreeEndpoint::new(seven_entry_tree()));
    let client = RecursiveAclClient::new(endpoint);
    let recorder = RecordingProgress::new();

    let result = client
        .update_recursive_with_options(
            RunRequest::new("/data", "user:alice:r-x")
                .batch_size(3)
                .progress(recorder.clone()),
        )
        .await
        .unwrap();

    let mut expected = ChangeCounters::default();
    for record in recorder.records() {
        expected = expected.merged(&record.batch);
        assert_eq!(record.cumulative, expected);
    }
    assert_eq!(recorder.last_cumulative(), Some(result.aggregate));
}

#[tokio::test]
async fn simple_form_runs_whole_walk_with_service_chosen_batches() {
    let endpoint = Arc::new(TreeEndpoint::new(seven_entry_tree()));
    let client = RecursiveAclClient::new(endpoint.clone());

    let result = client.set_recursive("/data", "user::rwx").await.unwrap();

    assert_eq!(result.aggregate.total(), 7);
    // Default batch hint is None; the endpoint covers the tree in one batch.
    assert_eq!(endpoint.call_count(), 1);
}

#[tokio::test]
async fn single_entry_tree_counts_the_root_directory() {
    let endpoint = Arc::new(TreeEndpoint::new(vec![TreeEntry::dir("/data")]));
    let client = RecursiveAclClient::new(endpoint);

    let result = client
        .remove_recursive("/data", "default:user:alice")
        .await
        .unwrap();

    assert_eq!(result.aggregate, ChangeCounters::new(1, 0, 0));
    assert!(result.is_complete());
}
