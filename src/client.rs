//! Core client trait and error types.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::Instrument;

use crate::context::Context;
use crate::endpoints::EndpointTable;
use crate::model::{Capabilities, Model, ModelTest};
use crate::probe::EndpointProbe;
use crate::validator;

/// Longest response body excerpt carried in a status error.
const BODY_SNIPPET_CHARS: usize = 200;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("HTTP {status}{}", body_suffix(.body))]
    Status { status: StatusCode, body: String },

    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("critical endpoint {path} failed: {error}")]
    CriticalEndpoint { path: String, error: String },
}

impl ClientError {
    /// Build a status error, keeping only a short excerpt of the body.
    pub fn status(status: StatusCode, body: &str) -> Self {
        let trimmed = body.trim();
        let body = match trimmed.char_indices().nth(BODY_SNIPPET_CHARS) {
            Some((cut, _)) => format!("{}...", &trimmed[..cut]),
            None => trimmed.to_string(),
        };
        ClientError::Status { status, body }
    }

    /// Whether the failure came from cancellation or a timeout rather than
    /// from the remote side rejecting the request.
    pub fn is_timeout_or_cancel(&self) -> bool {
        match self {
            ClientError::Cancelled | ClientError::DeadlineExceeded => true,
            ClientError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}

/// Capability set every provider adapter implements.
///
/// `validate_endpoints` is provided: it hands the provider's endpoint table
/// and probe to the vendor-agnostic validator.
#[async_trait]
pub trait Client: Send + Sync {
    /// Registry name of the provider (e.g. `"openai"`).
    fn name(&self) -> &'static str;

    /// Enumerate available models, enriched with static metadata.
    async fn list_models(&self, ctx: &Context) -> Result<Vec<Model>, ClientError>;

    /// Union of what this provider can do.
    fn get_capabilities(&self) -> Capabilities;

    /// The provider's endpoint table. Every call returns a handle to the
    /// same storage.
    fn get_endpoints(&self) -> EndpointTable;

    /// Probe strategy used for endpoint validation.
    fn probe(&self) -> Arc<dyn EndpointProbe>;

    /// Probe every endpoint concurrently and record the results in the
    /// endpoint table.
    ///
    /// Per-endpoint failures are recorded, not returned. The call only fails
    /// when an endpoint flagged critical ends up failed.
    async fn validate_endpoints(&self, ctx: &Context, verbose: bool) -> Result<(), ClientError> {
        let span = tracing::info_span!("validate_endpoints", provider = self.name());
        validator::validate_endpoints(&self.get_endpoints(), self.probe(), ctx, verbose)
            .instrument(span)
            .await
    }

    /// Exercise one model end to end with a minimal live request.
    async fn test_model(&self, ctx: &Context, model: &str) -> Result<ModelTest, ClientError>;
}
