//! Walk Endpoint Abstraction
//!
//! The driver's single external dependency: a remote service that advances a
//! server-side subtree walk by a bounded number of entries, applying an ACL
//! mutation as it goes. The service owns traversal order and the continuation
//! cursor; the client never inspects either.

use crate::batch::BatchOutcome;
use crate::error::EndpointError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod http;

pub use http::{EndpointConfig, HttpAclEndpoint};

/// How the supplied ACL entries are applied to each visited entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclMode {
    /// Replace the entry's ACL wholesale.
    Set,
    /// Merge the supplied entries into the existing ACL.
    Update,
    /// Delete the named entries from the existing ACL.
    Remove,
}

impl AclMode {
    /// Wire tag for the mode, as sent to the endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            AclMode::Set => "set",
            AclMode::Update => "update",
            AclMode::Remove => "remove",
        }
    }
}

/// The mutation applied at every visited entry: a mode tag plus an opaque
/// ACL spec. The spec's grammar is the service's concern, not ours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclMutation {
    pub mode: AclMode,
    pub entries: String,
}

impl AclMutation {
    pub fn new(mode: AclMode, entries: impl Into<String>) -> Self {
        Self {
            mode,
            entries: entries.into(),
        }
    }
}

/// Remote mutation endpoint for recursive ACL walks.
#[async_trait]
pub trait AclWalkEndpoint: Send + Sync {
    /// Advance the walk rooted at `target_path` by up to `batch_size` entries,
    /// starting at `continuation` (`None` starts a fresh walk), applying
    /// `mutation` to each visited entry.
    ///
    /// When `continue_on_failure` is false, a single failed entry makes the
    /// whole call fail with a service error; when true, failed entries are
    /// reported on the outcome and the walk keeps going.
    async fn advance_walk(
        &self,
        target_path: &str,
        mutation: &AclMutation,
        continuation: Option<&str>,
        batch_size: Option<u32>,
        continue_on_failure: bool,
    ) -> Result<BatchOutcome, EndpointError>;
}
