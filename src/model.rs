//! Common shapes every provider normalizes into: models, capabilities and
//! the endpoint descriptors checked by the validator.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

/// What a model (or a whole provider) can do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub text_generation: bool,
    pub image_generation: bool,
    pub video_generation: bool,
    pub speech_to_text: bool,
    pub text_to_speech: bool,
    pub realtime: bool,
    pub vision: bool,
    pub function_calling: bool,
    pub embeddings: bool,
}

impl Capabilities {
    pub fn text() -> Self {
        Self {
            text_generation: true,
            ..Self::default()
        }
    }

    pub fn chat() -> Self {
        Self {
            text_generation: true,
            function_calling: true,
            ..Self::default()
        }
    }

    pub fn image() -> Self {
        Self {
            image_generation: true,
            ..Self::default()
        }
    }

    pub fn video() -> Self {
        Self {
            video_generation: true,
            ..Self::default()
        }
    }

    pub fn speech_to_text() -> Self {
        Self {
            speech_to_text: true,
            ..Self::default()
        }
    }

    pub fn text_to_speech() -> Self {
        Self {
            text_to_speech: true,
            ..Self::default()
        }
    }

    pub fn realtime() -> Self {
        Self {
            realtime: true,
            speech_to_text: true,
            text_to_speech: true,
            ..Self::default()
        }
    }

    pub fn embeddings() -> Self {
        Self {
            embeddings: true,
            ..Self::default()
        }
    }

    pub fn with_vision(mut self) -> Self {
        self.vision = true;
        self
    }

    /// Everything either side can do.
    pub fn union(self, other: Capabilities) -> Self {
        Self {
            text_generation: self.text_generation || other.text_generation,
            image_generation: self.image_generation || other.image_generation,
            video_generation: self.video_generation || other.video_generation,
            speech_to_text: self.speech_to_text || other.speech_to_text,
            text_to_speech: self.text_to_speech || other.text_to_speech,
            realtime: self.realtime || other.realtime,
            vision: self.vision || other.vision,
            function_calling: self.function_calling || other.function_calling,
            embeddings: self.embeddings || other.embeddings,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Published list prices in USD. Which fields apply depends on the modality.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub input_per_million: Option<f64>,
    pub output_per_million: Option<f64>,
    pub per_image: Option<f64>,
    pub per_minute: Option<f64>,
    pub per_thousand_characters: Option<f64>,
}

impl Pricing {
    pub fn tokens(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million: Some(input_per_million),
            output_per_million: Some(output_per_million),
            ..Self::default()
        }
    }

    pub fn per_image(price: f64) -> Self {
        Self {
            per_image: Some(price),
            ..Self::default()
        }
    }

    pub fn per_minute(price: f64) -> Self {
        Self {
            per_minute: Some(price),
            ..Self::default()
        }
    }

    pub fn per_thousand_characters(price: f64) -> Self {
        Self {
            per_thousand_characters: Some(price),
            ..Self::default()
        }
    }
}

/// Static metadata a vendor table knows about a model id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelProfile {
    pub capabilities: Capabilities,
    pub context_window: Option<u32>,
    pub max_output_tokens: Option<u32>,
    pub pricing: Option<Pricing>,
    pub description: Option<&'static str>,
    pub deprecated: bool,
}

impl ModelProfile {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    pub fn context(mut self, context_window: u32, max_output_tokens: u32) -> Self {
        self.context_window = Some(context_window);
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = Some(pricing);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

/// A model offered by a provider.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub description: Option<String>,
    pub capabilities: Capabilities,
    pub context_window: Option<u32>,
    pub max_output_tokens: Option<u32>,
    pub pricing: Option<Pricing>,
    /// Creation time, unix seconds.
    pub created: Option<i64>,
    pub owned_by: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
}

impl Model {
    pub fn new(provider: impl Into<String>, id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            provider: provider.into(),
            description: None,
            capabilities: Capabilities::default(),
            context_window: None,
            max_output_tokens: None,
            pricing: None,
            created: None,
            owned_by: None,
            deprecated: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Fill in whatever the vendor response left empty from a static profile.
    /// Values reported by the vendor win over the table.
    pub fn enrich(mut self, profile: ModelProfile) -> Self {
        self.capabilities = self.capabilities.union(profile.capabilities);
        self.context_window = self.context_window.or(profile.context_window);
        self.max_output_tokens = self.max_output_tokens.or(profile.max_output_tokens);
        self.pricing = self.pricing.or(profile.pricing);
        if self.description.is_none() {
            self.description = profile.description.map(str::to_string);
        }
        self.deprecated |= profile.deprecated;
        self
    }
}

/// Result of a smoke test against one model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTest {
    pub model: String,
    pub latency: Duration,
    /// Short description of what the model returned.
    pub detail: String,
}

/// Health of an endpoint as last observed by the validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStatus {
    #[default]
    Unknown,
    Working,
    Failed,
    Deprecated,
}

impl fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EndpointStatus::Unknown => "unknown",
            EndpointStatus::Working => "working",
            EndpointStatus::Failed => "failed",
            EndpointStatus::Deprecated => "deprecated",
        };
        f.write_str(s)
    }
}

/// Minimal request body sent when probing an endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ProbePayload {
    /// No body.
    #[default]
    Empty,
    /// A JSON document.
    Json(Value),
    /// A multipart form carrying a short silent WAV as `file`, plus an
    /// optional `model` field.
    AudioUpload { model: Option<String> },
    /// A short silent WAV sent as the raw request body.
    RawAudio,
}

/// What a successful probe response is expected to contain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseKind {
    /// Must decode as JSON.
    #[default]
    Json,
    /// Opaque bytes (audio, images); drained but not decoded.
    Binary,
}

/// One testable API surface of a provider.
///
/// Descriptive fields are fixed at construction. `status`, `latency` and
/// `error` are written only by the validator.
#[derive(Debug, Clone)]
pub struct Endpoint {
    path: String,
    method: Method,
    description: String,
    headers: BTreeMap<String, String>,
    payload: ProbePayload,
    response: ResponseKind,
    critical: bool,
    status: EndpointStatus,
    latency: Duration,
    error: String,
}

impl Endpoint {
    pub fn new(method: Method, path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            description: description.into(),
            headers: BTreeMap::new(),
            payload: ProbePayload::Empty,
            response: ResponseKind::Json,
            critical: false,
            status: EndpointStatus::Unknown,
            latency: Duration::ZERO,
            error: String::new(),
        }
    }

    pub fn get(path: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Method::GET, path, description)
    }

    pub fn post(path: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Method::POST, path, description)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_json(self, body: Value) -> Self {
        self.with_payload(ProbePayload::Json(body))
    }

    pub fn with_payload(mut self, payload: ProbePayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn binary_response(mut self) -> Self {
        self.response = ResponseKind::Binary;
        self
    }

    /// Mark this endpoint as critical: its failure fails the whole
    /// validation call.
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn payload(&self) -> &ProbePayload {
        &self.payload
    }

    pub fn response_kind(&self) -> ResponseKind {
        self.response
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn status(&self) -> EndpointStatus {
        self.status
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Last failure message; empty unless the endpoint failed.
    pub fn error(&self) -> &str {
        &self.error
    }

    pub(crate) fn set_critical(&mut self, critical: bool) {
        self.critical = critical;
    }

    /// Fold a probe outcome into this record.
    pub(crate) fn record(&mut self, latency: Duration, result: Result<(), String>) {
        self.latency = latency;
        match result {
            Ok(()) => {
                self.status = EndpointStatus::Working;
                self.error.clear();
            }
            Err(error) => {
                self.status = EndpointStatus::Failed;
                self.error = if error.trim().is_empty() {
                    "unknown error".to_string()
                } else {
                    error
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_endpoint_starts_unknown() {
        let endpoint = Endpoint::get("/models", "List models");
        assert_eq!(endpoint.status(), EndpointStatus::Unknown);
        assert_eq!(endpoint.latency(), Duration::ZERO);
        assert!(endpoint.error().is_empty());
    }

    #[test]
    fn failed_record_never_has_empty_error() {
        let mut endpoint = Endpoint::get("/models", "List models");
        endpoint.record(Duration::from_millis(3), Err(String::new()));
        assert_eq!(endpoint.status(), EndpointStatus::Failed);
        assert!(!endpoint.error().is_empty());

        endpoint.record(Duration::from_millis(4), Ok(()));
        assert_eq!(endpoint.status(), EndpointStatus::Working);
        assert!(endpoint.error().is_empty());
        assert_eq!(endpoint.latency(), Duration::from_millis(4));
    }

    #[test]
    fn enrich_keeps_vendor_values() {
        let mut model = Model::new("mistral", "mistral-small-latest");
        model.context_window = Some(32_000);

        let profile = ModelProfile::new(Capabilities::chat())
            .context(128_000, 8_192)
            .describe("Small model");
        let model = model.enrich(profile);

        assert_eq!(model.context_window, Some(32_000));
        assert_eq!(model.max_output_tokens, Some(8_192));
        assert!(model.capabilities.text_generation);
        assert_eq!(model.description.as_deref(), Some("Small model"));
    }
}
