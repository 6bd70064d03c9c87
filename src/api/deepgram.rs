//! Deepgram speech-to-text and text-to-speech API.
//! See: <https://developers.deepgram.com/reference>

use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use nonempty::{nonempty, NonEmpty};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::api::{excerpt, timed_test, ProviderCore, VendorSpec};
use crate::audio::silent_wav;
use crate::client::{Client, ClientError};
use crate::context::Context;
use crate::endpoints::EndpointTable;
use crate::http::{Auth, ResponseExt};
use crate::model::{Capabilities, Endpoint, Model, ModelProfile, ModelTest, Pricing, ProbePayload};
use crate::options::ProviderOptions;
use crate::probe::{EndpointProbe, StatusPolicy, PROBE_AUDIO_MS};
use crate::providers::{Deepgram, Provider};

pub(crate) fn spec() -> VendorSpec {
    VendorSpec {
        name: Deepgram::NAME,
        base_url: "https://api.deepgram.com/v1",
        timeout: std::time::Duration::from_secs(60),
        policy: StatusPolicy::SuccessOnly,
    }
}

fn endpoints() -> NonEmpty<Endpoint> {
    nonempty![
        Endpoint::get("/models", "List models"),
        Endpoint::post("/listen?model=nova-2", "Pre-recorded transcription")
            .with_payload(ProbePayload::RawAudio),
        Endpoint::post("/speak?model=aura-asteria-en", "Text to speech")
            .with_json(json!({ "text": "ok" }))
            .binary_response()
    ]
}

/// Static enrichment for Deepgram models.
pub fn profile(id: &str) -> ModelProfile {
    if id.starts_with("aura-2") {
        ModelProfile::new(Capabilities::text_to_speech())
            .pricing(Pricing::per_thousand_characters(0.030))
    } else if id.starts_with("aura") {
        ModelProfile::new(Capabilities::text_to_speech())
            .pricing(Pricing::per_thousand_characters(0.015))
    } else if id.starts_with("nova") {
        ModelProfile::new(Capabilities::speech_to_text()).pricing(Pricing::per_minute(0.0043))
    } else if id.starts_with("enhanced") || id.starts_with("base") {
        ModelProfile::new(Capabilities::speech_to_text()).deprecated()
    } else {
        ModelProfile::new(Capabilities::speech_to_text())
    }
}

/// Deepgram client.
#[derive(Debug)]
pub struct DeepgramClient {
    core: ProviderCore,
}

impl DeepgramClient {
    pub fn new(api_key: String, options: ProviderOptions) -> Self {
        let auth = Auth::Scheme {
            scheme: "Token",
            token: api_key,
        };
        Self {
            core: ProviderCore::new(spec(), auth, options),
        }
    }

    async fn test_listen(&self, ctx: &Context, model: &str) -> Result<String, ClientError> {
        let connection = self.core.connection();
        let req = connection
            .request(Method::POST, &format!("/listen?model={}", model))?
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(silent_wav(PROBE_AUDIO_MS));
        let response = connection.send(ctx, req).await?;
        let listen: ListenResponse = ctx.run(response.json_logged()).await?;

        let transcript = listen
            .results
            .channels
            .first()
            .and_then(|c| c.alternatives.first())
            .map(|a| a.transcript.as_str())
            .unwrap_or_default();
        Ok(format!("transcript {:?}", excerpt(transcript, 60)))
    }

    async fn test_speak(&self, ctx: &Context, model: &str) -> Result<String, ClientError> {
        let audio = self
            .core
            .post_for_bytes(ctx, &format!("/speak?model={}", model), &json!({ "text": "ok" }))
            .await?;
        Ok(format!("{} bytes of audio", audio.len()))
    }
}

#[async_trait]
impl Client for DeepgramClient {
    fn name(&self) -> &'static str {
        self.core.name()
    }

    async fn list_models(&self, ctx: &Context) -> Result<Vec<Model>, ClientError> {
        let list: ModelList = self.core.get_json(ctx, "/models").await?;
        let provider = self.core.name();

        let stt = list.stt.into_iter().map(|m| (m, Capabilities::speech_to_text()));
        let tts = list.tts.into_iter().map(|m| (m, Capabilities::text_to_speech()));

        let models = stt
            .chain(tts)
            .map(|(m, capabilities)| {
                let id = m.canonical_name.unwrap_or_else(|| m.name.clone());
                let known = profile(&id);
                let mut model = Model::new(provider, id).with_name(m.name);
                model.capabilities = capabilities;
                model.owned_by = Some("deepgram".to_string());
                model.enrich(known)
            })
            .unique_by(|m| m.id.clone())
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .collect();
        Ok(models)
    }

    fn get_capabilities(&self) -> Capabilities {
        Capabilities::speech_to_text().union(Capabilities::text_to_speech())
    }

    fn get_endpoints(&self) -> EndpointTable {
        self.core.endpoints(endpoints)
    }

    fn probe(&self) -> Arc<dyn EndpointProbe> {
        self.core.probe()
    }

    async fn test_model(&self, ctx: &Context, model: &str) -> Result<ModelTest, ClientError> {
        if profile(model).capabilities.text_to_speech {
            timed_test(model, self.test_speak(ctx, model)).await
        } else {
            timed_test(model, self.test_listen(ctx, model)).await
        }
    }
}

// --- Deepgram API Types ---

#[derive(Debug, Clone, Deserialize)]
struct ModelList {
    #[serde(default)]
    stt: Vec<ModelInfo>,
    #[serde(default)]
    tts: Vec<ModelInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelInfo {
    name: String,
    canonical_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ListenResponse {
    results: ListenResults,
}

#[derive(Debug, Clone, Deserialize)]
struct ListenResults {
    #[serde(default)]
    channels: Vec<ListenChannel>,
}

#[derive(Debug, Clone, Deserialize)]
struct ListenChannel {
    #[serde(default)]
    alternatives: Vec<ListenAlternative>,
}

#[derive(Debug, Clone, Deserialize)]
struct ListenAlternative {
    transcript: String,
}
