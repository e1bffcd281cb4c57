//! Aclwalk: Recursive Access-Control Propagation
//!
//! A client-side engine that applies ACL changes to an entire subtree of a
//! hierarchical storage namespace, driving the service's bounded-batch walk
//! protocol: resumable continuation cursors, per-batch progress, and an
//! explicit continue-on-failure policy.

pub mod batch;
pub mod client;
pub mod config;
pub mod driver;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod progress;
