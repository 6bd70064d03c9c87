//! ElevenLabs text-to-speech API.
//! See: <https://elevenlabs.io/docs/api-reference>

use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use nonempty::{nonempty, NonEmpty};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{timed_test, ProviderCore, VendorSpec};
use crate::client::{Client, ClientError};
use crate::context::Context;
use crate::endpoints::EndpointTable;
use crate::http::Auth;
use crate::model::{Capabilities, Endpoint, Model, ModelProfile, ModelTest, Pricing};
use crate::options::ProviderOptions;
use crate::probe::{EndpointProbe, StatusPolicy};
use crate::providers::{ElevenLabs, Provider};

/// Voice used for probes and smoke tests ("Rachel", a default library voice).
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

const PROBE_MODEL: &str = "eleven_flash_v2_5";

pub(crate) fn spec() -> VendorSpec {
    VendorSpec {
        name: ElevenLabs::NAME,
        base_url: "https://api.elevenlabs.io/v1",
        timeout: std::time::Duration::from_secs(60),
        policy: StatusPolicy::SuccessOnly,
    }
}

fn endpoints() -> NonEmpty<Endpoint> {
    nonempty![
        Endpoint::get("/models", "List models"),
        Endpoint::get("/voices", "List voices"),
        Endpoint::post(
            format!("/text-to-speech/{}", DEFAULT_VOICE_ID),
            "Text to speech",
        )
        .with_json(json!({ "text": "ok", "model_id": PROBE_MODEL }))
        .binary_response()
    ]
}

/// Static enrichment for ElevenLabs models.
pub fn profile(id: &str) -> ModelProfile {
    let tts = ModelProfile::new(Capabilities::text_to_speech());
    if id.contains("_sts_") {
        // Speech-to-speech (voice changer) models take audio in, not text.
        ModelProfile::default()
    } else if id.starts_with("scribe") {
        ModelProfile::new(Capabilities::speech_to_text()).pricing(Pricing::per_minute(0.0067))
    } else if id.contains("flash") || id.contains("turbo") {
        tts.pricing(Pricing::per_thousand_characters(0.15))
            .describe("Low-latency speech synthesis")
    } else if id.starts_with("eleven_monolingual_v1") || id.starts_with("eleven_multilingual_v1") {
        tts.pricing(Pricing::per_thousand_characters(0.30)).deprecated()
    } else if id.starts_with("eleven_") {
        tts.pricing(Pricing::per_thousand_characters(0.30))
    } else {
        tts
    }
}

/// ElevenLabs client.
#[derive(Debug)]
pub struct ElevenLabsClient {
    core: ProviderCore,
    voice_id: String,
}

impl ElevenLabsClient {
    pub fn new(api_key: String, options: ProviderOptions) -> Self {
        let auth = Auth::Header {
            name: "xi-api-key",
            value: api_key,
        };
        Self {
            core: ProviderCore::new(spec(), auth, options),
            voice_id: DEFAULT_VOICE_ID.to_string(),
        }
    }

    /// Use a different voice for smoke tests.
    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = voice_id.into();
        self
    }

    async fn test_speech(&self, ctx: &Context, model: &str) -> Result<String, ClientError> {
        let request = SpeechRequest {
            text: "ok".to_string(),
            model_id: model.to_string(),
        };
        let audio = self
            .core
            .post_for_bytes(ctx, &format!("/text-to-speech/{}", self.voice_id), &request)
            .await?;
        Ok(format!("{} bytes of audio", audio.len()))
    }
}

#[async_trait]
impl Client for ElevenLabsClient {
    fn name(&self) -> &'static str {
        self.core.name()
    }

    async fn list_models(&self, ctx: &Context) -> Result<Vec<Model>, ClientError> {
        let list: Vec<ModelInfo> = self.core.get_json(ctx, "/models").await?;

        let models = list
            .into_iter()
            .unique_by(|m| m.model_id.clone())
            .map(|m| {
                let known = profile(&m.model_id);
                let mut model = Model::new(self.core.name(), m.model_id);
                if let Some(name) = m.name {
                    model = model.with_name(name);
                }
                model.description = m.description.filter(|d| !d.is_empty());
                model.owned_by = Some("elevenlabs".to_string());
                let mut model = model.enrich(known);
                if let Some(tts) = m.can_do_text_to_speech {
                    model.capabilities.text_to_speech = tts;
                }
                model
            })
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .collect();
        Ok(models)
    }

    fn get_capabilities(&self) -> Capabilities {
        Capabilities::text_to_speech().union(Capabilities::speech_to_text())
    }

    fn get_endpoints(&self) -> EndpointTable {
        self.core.endpoints(endpoints)
    }

    fn probe(&self) -> Arc<dyn EndpointProbe> {
        self.core.probe()
    }

    async fn test_model(&self, ctx: &Context, model: &str) -> Result<ModelTest, ClientError> {
        if !profile(model).capabilities.text_to_speech {
            return Err(ClientError::Unsupported(format!(
                "smoke tests for non-TTS ElevenLabs model {}",
                model
            )));
        }
        timed_test(model, self.test_speech(ctx, model)).await
    }
}

// --- ElevenLabs API Types ---

#[derive(Debug, Clone, Deserialize)]
struct ModelInfo {
    model_id: String,
    name: Option<String>,
    description: Option<String>,
    can_do_text_to_speech: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
struct SpeechRequest {
    text: String,
    model_id: String,
}
