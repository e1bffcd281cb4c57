//! Public Operation Façade
//!
//! Thin entry points over the driver: *set* replaces an ACL, *update* merges
//! entries into it, *remove* deletes named entries. All six methods share the
//! driver unchanged; an operation only picks the mode tag.

use crate::config::AclwalkConfig;
use crate::driver::{self, RunRequest, RunResult};
use crate::endpoint::{AclMode, AclWalkEndpoint, HttpAclEndpoint};
use crate::error::{AclError, ConfigError};
use std::sync::Arc;

/// Client for recursive ACL changes against one namespace endpoint.
pub struct RecursiveAclClient {
    endpoint: Arc<dyn AclWalkEndpoint>,
    default_batch_size: Option<u32>,
}

impl RecursiveAclClient {
    pub fn new(endpoint: Arc<dyn AclWalkEndpoint>) -> Self {
        Self {
            endpoint,
            default_batch_size: None,
        }
    }

    /// Batch-size hint applied by the simple operation forms. The
    /// configurable forms take the hint from their `RunRequest` instead.
    pub fn with_default_batch_size(mut self, batch_size: u32) -> Self {
        self.default_batch_size = Some(batch_size);
        self
    }

    /// Build a client over the HTTP endpoint described by `config`.
    pub fn from_config(config: &AclwalkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let endpoint = HttpAclEndpoint::new(&config.endpoint)?;
        Ok(Self {
            endpoint: Arc::new(endpoint),
            default_batch_size: config.run.batch_size,
        })
    }

    /// Replace the ACL on `target_path` and everything beneath it. Runs to
    /// completion and fails fast on the first error.
    pub async fn set_recursive(
        &self,
        target_path: impl Into<String>,
        entries: impl Into<String>,
    ) -> Result<RunResult, AclError> {
        self.run_simple(AclMode::Set, target_path.into(), entries.into())
            .await
    }

    /// Merge `entries` into the existing ACLs under `target_path`.
    pub async fn update_recursive(
        &self,
        target_path: impl Into<String>,
        entries: impl Into<String>,
    ) -> Result<RunResult, AclError> {
        self.run_simple(AclMode::Update, target_path.into(), entries.into())
            .await
    }

    /// Delete the named entries from the ACLs under `target_path`.
    pub async fn remove_recursive(
        &self,
        target_path: impl Into<String>,
        entries: impl Into<String>,
    ) -> Result<RunResult, AclError> {
        self.run_simple(AclMode::Remove, target_path.into(), entries.into())
            .await
    }

    /// Replace ACLs with full control: batch cap, resume token, failure
    /// policy, progress handler, cancellation.
    pub async fn set_recursive_with_options(
        &self,
        request: RunRequest,
    ) -> Result<RunResult, AclError> {
        driver::run(self.endpoint.as_ref(), AclMode::Set, request).await
    }

    pub async fn update_recursive_with_options(
        &self,
        request: RunRequest,
    ) -> Result<RunResult, AclError> {
        driver::run(self.endpoint.as_ref(), AclMode::Update, request).await
    }

    pub async fn remove_recursive_with_options(
        &self,
        request: RunRequest,
    ) -> Result<RunResult, AclError> {
        driver::run(self.endpoint.as_ref(), AclMode::Remove, request).await
    }

    async fn run_simple(
        &self,
        mode: AclMode,
        target_path: String,
        entries: String,
    ) -> Result<RunResult, AclError> {
        let mut request = RunRequest::new(target_path, entries);
        if let Some(batch_size) = self.default_batch_size {
            request = request.batch_size(batch_size);
        }
        driver::run(self.endpoint.as_ref(), mode, request).await
    }
}
