//! Probe strategies: how a single endpoint is exercised and judged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

use crate::audio::silent_wav;
use crate::client::ClientError;
use crate::http::{Connection, RequestBuilderExt, ResponseExt};
use crate::model::{Endpoint, ProbePayload, ResponseKind};

/// Length of the silent clip sent to speech-to-text endpoints.
pub const PROBE_AUDIO_MS: u32 = 250;

/// Result of one probe, folded into the endpoint record by the validator.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub latency: Duration,
    pub result: Result<(), String>,
}

/// Exercises one endpoint with a minimal request.
///
/// Implementations must not touch endpoint state; the validator records the
/// returned result.
#[async_trait]
pub trait EndpointProbe: Send + Sync {
    async fn probe(&self, endpoint: &Endpoint) -> Result<(), ClientError>;
}

/// Which response statuses count as a working endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Only 2xx.
    #[default]
    SuccessOnly,
    /// 2xx through 4xx: a client error still proves the route is live.
    Reachable,
}

impl StatusPolicy {
    pub fn accepts(&self, status: StatusCode) -> bool {
        match self {
            StatusPolicy::SuccessOnly => status.is_success(),
            StatusPolicy::Reachable => (200..500).contains(&status.as_u16()),
        }
    }
}

/// Probe that sends the endpoint's payload over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    connection: Connection,
    policy: StatusPolicy,
}

impl HttpProbe {
    pub fn new(connection: Connection, policy: StatusPolicy) -> Self {
        Self { connection, policy }
    }

    pub fn policy(&self) -> StatusPolicy {
        self.policy
    }
}

#[async_trait]
impl EndpointProbe for HttpProbe {
    async fn probe(&self, endpoint: &Endpoint) -> Result<(), ClientError> {
        let mut req = self
            .connection
            .request(endpoint.method().clone(), endpoint.path())?;

        for (name, value) in endpoint.headers() {
            req = req.header(name, value);
        }

        req = match endpoint.payload() {
            ProbePayload::Empty => req,
            ProbePayload::Json(body) => req.json_logged(body),
            ProbePayload::AudioUpload { model } => {
                let file = Part::bytes(silent_wav(PROBE_AUDIO_MS).to_vec())
                    .file_name("probe.wav")
                    .mime_str("audio/wav")?;
                let mut form = Form::new().part("file", file);
                if let Some(model) = model {
                    form = form.text("model", model.clone());
                }
                req.multipart(form)
            }
            ProbePayload::RawAudio => req
                .header(reqwest::header::CONTENT_TYPE, "audio/wav")
                .body(silent_wav(PROBE_AUDIO_MS)),
        };

        let response = req.send().await?;
        let status = response.status();

        if !self.policy.accepts(status) {
            let body = response.text_logged().await.unwrap_or_default();
            return Err(ClientError::status(status, &body));
        }

        if !status.is_success() {
            tracing::debug!(path = endpoint.path(), %status, "endpoint reachable");
            return Ok(());
        }

        match endpoint.response_kind() {
            ResponseKind::Json => {
                let _: Value = response.json_logged().await?;
            }
            ResponseKind::Binary => {
                let bytes = response.bytes_logged().await?;
                if bytes.is_empty() {
                    return Err(ClientError::Decode("empty response body".to_string()));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_only_rejects_client_errors() {
        let policy = StatusPolicy::SuccessOnly;
        assert!(policy.accepts(StatusCode::OK));
        assert!(policy.accepts(StatusCode::NO_CONTENT));
        assert!(!policy.accepts(StatusCode::UNAUTHORIZED));
        assert!(!policy.accepts(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn reachable_accepts_up_to_4xx() {
        let policy = StatusPolicy::Reachable;
        assert!(policy.accepts(StatusCode::CREATED));
        assert!(policy.accepts(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(policy.accepts(StatusCode::NOT_MODIFIED));
        assert!(!policy.accepts(StatusCode::BAD_GATEWAY));
        assert!(!policy.accepts(StatusCode::CONTINUE));
    }
}
