//! HTTP walk endpoint.
//!
//! Speaks a minimal REST dialect: `PATCH {base}/{path}?op=aclRecursive` with
//! the mutation described in query parameters and the ACL spec in the
//! `x-acl-spec` header. The next cursor comes back in the `x-walk-cursor`
//! response header; batch counters and failed entries in a JSON body.

use crate::batch::{BatchOutcome, ChangeCounters, EntryFailure};
use crate::endpoint::{AclMutation, AclWalkEndpoint};
use crate::error::{ConfigError, EndpointError};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const WALK_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const WALK_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const CURSOR_HEADER: &str = "x-walk-cursor";
const ACL_SPEC_HEADER: &str = "x-acl-spec";

/// Connection settings for the HTTP walk endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Root URL of the namespace, e.g. `https://store.example.com/fs1`.
    pub base_url: String,

    /// Pre-issued bearer token, attached verbatim. Credential selection is
    /// the caller's concern.
    #[serde(default)]
    pub bearer_token: Option<String>,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    WALK_HTTP_CONNECT_TIMEOUT.as_secs()
}

fn default_request_timeout_secs() -> u64 {
    WALK_HTTP_REQUEST_TIMEOUT.as_secs()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            bearer_token: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// `AclWalkEndpoint` implementation over HTTP.
pub struct HttpAclEndpoint {
    client: Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl HttpAclEndpoint {
    pub fn new(config: &EndpointConfig) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::Invalid(format!("invalid endpoint base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!(
                "endpoint base URL cannot carry paths: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            bearer_token: config.bearer_token.clone(),
        })
    }
}

#[async_trait]
impl AclWalkEndpoint for HttpAclEndpoint {
    async fn advance_walk(
        &self,
        target_path: &str,
        mutation: &AclMutation,
        continuation: Option<&str>,
        batch_size: Option<u32>,
        continue_on_failure: bool,
    ) -> Result<BatchOutcome, EndpointError> {
        let url = build_walk_url(
            &self.base_url,
            target_path,
            mutation,
            continuation,
            batch_size,
            continue_on_failure,
        )?;

        let mut request = self
            .client
            .patch(url)
            .header(ACL_SPEC_HEADER, &mutation.entries);
        if let Some(token) = &self.bearer_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(parse_service_error(status.as_u16(), &error_text));
        }

        let continuation = response
            .headers()
            .get(CURSOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .filter(|cursor| !cursor.is_empty());

        let body = response.text().await.map_err(map_http_error)?;
        parse_walk_body(&body, continuation)
    }
}

// Wire shapes for the walk response.
#[derive(Deserialize)]
struct WalkResponseBody {
    batch: WireCounters,
    #[serde(default)]
    cumulative: WireCounters,
    #[serde(rename = "failedEntries", default)]
    failed_entries: Vec<WireFailedEntry>,
}

#[derive(Deserialize, Default)]
struct WireCounters {
    #[serde(rename = "directoriesChanged", default)]
    directories: u64,
    #[serde(rename = "filesChanged", default)]
    files: u64,
    #[serde(rename = "failureCount", default)]
    failures: u64,
}

#[derive(Deserialize)]
struct WireFailedEntry {
    name: String,
    #[serde(rename = "type", default)]
    entry_type: Option<String>,
    #[serde(rename = "errorMessage", default)]
    error_message: String,
}

#[derive(Deserialize)]
struct WireErrorBody {
    error: Option<WireErrorDetail>,
}

#[derive(Deserialize)]
struct WireErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

impl From<WireCounters> for ChangeCounters {
    fn from(wire: WireCounters) -> Self {
        ChangeCounters {
            directories_changed: wire.directories,
            files_changed: wire.files,
            failures: wire.failures,
        }
    }
}

fn build_walk_url(
    base: &Url,
    target_path: &str,
    mutation: &AclMutation,
    continuation: Option<&str>,
    batch_size: Option<u32>,
    continue_on_failure: bool,
) -> Result<Url, EndpointError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| EndpointError::Transport("endpoint base URL cannot carry paths".to_string()))?
        .pop_if_empty()
        .extend(target_path.split('/').filter(|segment| !segment.is_empty()));

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("op", "aclRecursive");
        pairs.append_pair("mode", mutation.mode.as_str());
        if let Some(cursor) = continuation {
            pairs.append_pair("cursor", cursor);
        }
        if let Some(limit) = batch_size {
            pairs.append_pair("limit", &limit.to_string());
        }
        if continue_on_failure {
            pairs.append_pair("continueOnFailure", "true");
        }
    }

    Ok(url)
}

fn parse_walk_body(
    body: &str,
    continuation: Option<String>,
) -> Result<BatchOutcome, EndpointError> {
    let parsed: WalkResponseBody = serde_json::from_str(body)
        .map_err(|e| EndpointError::MalformedResponse(format!("walk response: {}", e)))?;

    let failures = parsed
        .failed_entries
        .into_iter()
        .map(|entry| EntryFailure {
            path: entry.name,
            is_directory: entry
                .entry_type
                .map(|t| t.eq_ignore_ascii_case("directory"))
                .unwrap_or(false),
            message: entry.error_message,
        })
        .collect();

    Ok(BatchOutcome {
        batch: parsed.batch.into(),
        cumulative: parsed.cumulative.into(),
        failures,
        continuation,
    })
}

fn parse_service_error(status: u16, body: &str) -> EndpointError {
    let detail = serde_json::from_str::<WireErrorBody>(body)
        .ok()
        .and_then(|b| b.error);
    match detail {
        Some(detail) => EndpointError::Service {
            status,
            code: detail.code,
            message: detail.message.unwrap_or_else(|| body.to_string()),
        },
        None => EndpointError::Service {
            status,
            code: None,
            message: body.to_string(),
        },
    }
}

fn map_http_error(error: reqwest::Error) -> EndpointError {
    if error.is_timeout() {
        EndpointError::Transport(format!("request timeout: {}", error))
    } else if error.is_connect() {
        EndpointError::Transport(format!("connection error: {}", error))
    } else if error.is_decode() {
        EndpointError::MalformedResponse(format!("response decode: {}", error))
    } else {
        EndpointError::Transport(format!("HTTP error: {}", error))
    }
}
