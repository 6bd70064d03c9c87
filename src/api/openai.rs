//! OpenAI-compatible API family (OpenAI, Groq, xAI, Mistral).
//!
//! Vendors speaking this dialect share model listing, chat completions,
//! image generation, speech and transcription routes. Each vendor supplies
//! its base URL, endpoint list and model table through
//! [`OpenAiCompatibleVendor`].
//! See: <https://platform.openai.com/docs/api-reference>

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use nonempty::NonEmpty;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::skip_serializing_none;

use crate::api::{excerpt, timed_test, ProviderCore, VendorSpec, SMOKE_MAX_TOKENS, SMOKE_PROMPT};
use crate::audio::silent_wav;
use crate::client::{Client, ClientError};
use crate::context::Context;
use crate::endpoints::EndpointTable;
use crate::http::{Auth, ResponseExt};
use crate::model::{Capabilities, Endpoint, Model, ModelProfile, ModelTest, ProbePayload};
use crate::options::ProviderOptions;
use crate::probe::{EndpointProbe, PROBE_AUDIO_MS};

/// Vendor-specific facts for an OpenAI-compatible API.
pub trait OpenAiCompatibleVendor: Send + Sync + 'static {
    fn spec() -> VendorSpec;

    /// Endpoints checked by `validate_endpoints`.
    fn endpoints() -> NonEmpty<Endpoint>;

    /// Static enrichment for a model id.
    fn profile(model_id: &str) -> ModelProfile;

    /// Union of what the vendor offers.
    fn capabilities() -> Capabilities;

    /// Voice used by text-to-speech smoke tests.
    fn default_voice() -> &'static str {
        "alloy"
    }
}

/// Standard chat probe: the smallest valid chat request for `model`.
pub fn chat_probe(model: &str) -> Endpoint {
    Endpoint::post("/chat/completions", "Chat completions").with_json(json!({
        "model": model,
        "messages": [{ "role": "user", "content": "ping" }],
        "max_tokens": 1,
    }))
}

/// Standard model-listing probe.
pub fn models_probe() -> Endpoint {
    Endpoint::get("/models", "List models")
}

/// Standard transcription probe: a short silent clip.
pub fn transcription_probe(model: &str) -> Endpoint {
    Endpoint::post("/audio/transcriptions", "Speech to text").with_payload(
        ProbePayload::AudioUpload {
            model: Some(model.to_string()),
        },
    )
}

/// Generic client for OpenAI-compatible APIs.
#[derive(Debug)]
pub struct OpenAiCompatibleClient<V> {
    core: ProviderCore,
    _vendor: PhantomData<fn() -> V>,
}

impl<V: OpenAiCompatibleVendor> OpenAiCompatibleClient<V> {
    /// Create a new client.
    pub fn new(api_key: String, options: ProviderOptions) -> Self {
        Self {
            core: ProviderCore::new(V::spec(), Auth::Bearer(api_key), options),
            _vendor: PhantomData,
        }
    }

    async fn test_chat(&self, ctx: &Context, model: &str) -> Result<String, ClientError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(SMOKE_PROMPT.to_string()),
            }],
            max_tokens: Some(SMOKE_MAX_TOKENS),
        };
        let response: ChatResponse = self
            .core
            .post_json(ctx, "/chat/completions", &request)
            .await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Decode("response contained no choices".to_string()))?;
        let content = choice.message.content.unwrap_or_default();
        Ok(match response.usage {
            Some(usage) => format!(
                "{:?} ({} prompt / {} completion tokens)",
                excerpt(&content, 60),
                usage.prompt_tokens,
                usage.completion_tokens
            ),
            None => format!("{:?}", excerpt(&content, 60)),
        })
    }

    async fn test_image(&self, ctx: &Context, model: &str) -> Result<String, ClientError> {
        let request = ImageRequest {
            model: model.to_string(),
            prompt: "a small red dot on a white background".to_string(),
            n: 1,
            size: image_size(model),
        };
        let response: ImageResponse = self
            .core
            .post_json(ctx, "/images/generations", &request)
            .await?;
        if response.data.is_empty() {
            return Err(ClientError::Decode("no images returned".to_string()));
        }
        Ok(format!("{} image(s)", response.data.len()))
    }

    async fn test_speech(&self, ctx: &Context, model: &str) -> Result<String, ClientError> {
        let request = SpeechRequest {
            model: model.to_string(),
            input: "ok".to_string(),
            voice: V::default_voice().to_string(),
        };
        let audio = self
            .core
            .post_for_bytes(ctx, "/audio/speech", &request)
            .await?;
        Ok(format!("{} bytes of audio", audio.len()))
    }

    async fn test_transcription(&self, ctx: &Context, model: &str) -> Result<String, ClientError> {
        let file = Part::bytes(silent_wav(PROBE_AUDIO_MS).to_vec())
            .file_name("probe.wav")
            .mime_str("audio/wav")?;
        let form = Form::new()
            .part("file", file)
            .text("model", model.to_string());

        let connection = self.core.connection();
        let req = connection
            .request(Method::POST, "/audio/transcriptions")?
            .multipart(form);
        let response = connection.send(ctx, req).await?;
        let transcription: TranscriptionResponse = ctx.run(response.json_logged()).await?;
        Ok(format!("transcript {:?}", excerpt(&transcription.text, 60)))
    }

    async fn test_realtime(&self, ctx: &Context, model: &str) -> Result<String, ClientError> {
        let response: RealtimeSession = self
            .core
            .post_json(ctx, "/realtime/sessions", &json!({ "model": model }))
            .await?;
        Ok(match response.id {
            Some(id) => format!("session {}", id),
            None => "session created".to_string(),
        })
    }
}

#[async_trait]
impl<V: OpenAiCompatibleVendor> Client for OpenAiCompatibleClient<V> {
    fn name(&self) -> &'static str {
        self.core.name()
    }

    async fn list_models(&self, ctx: &Context) -> Result<Vec<Model>, ClientError> {
        let response: ModelList = self.core.get_json(ctx, "/models").await?;
        let provider = self.core.name();

        let models = response
            .data
            .into_iter()
            .unique_by(|m| m.id.clone())
            .map(|m| {
                let profile = V::profile(&m.id);
                let mut model = Model::new(provider, m.id);
                if let Some(name) = m.name {
                    model = model.with_name(name);
                }
                model.description = m.description;
                model.created = m.created;
                model.owned_by = m.owned_by;
                model.context_window = m.max_context_length.or(m.context_window);
                model.enrich(profile)
            })
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .collect();

        Ok(models)
    }

    fn get_capabilities(&self) -> Capabilities {
        V::capabilities()
    }

    fn get_endpoints(&self) -> EndpointTable {
        self.core.endpoints(V::endpoints)
    }

    fn probe(&self) -> Arc<dyn EndpointProbe> {
        self.core.probe()
    }

    async fn test_model(&self, ctx: &Context, model: &str) -> Result<ModelTest, ClientError> {
        let caps = V::profile(model).capabilities;
        timed_test(model, async {
            if caps.realtime {
                self.test_realtime(ctx, model).await
            } else if caps.image_generation {
                self.test_image(ctx, model).await
            } else if caps.text_to_speech {
                self.test_speech(ctx, model).await
            } else if caps.speech_to_text {
                self.test_transcription(ctx, model).await
            } else if caps.embeddings {
                Err(ClientError::Unsupported(format!(
                    "smoke tests for embedding model {}",
                    model
                )))
            } else {
                self.test_chat(ctx, model).await
            }
        })
        .await
    }
}

/// Smallest size each image model accepts.
fn image_size(model: &str) -> Option<String> {
    if model.starts_with("dall-e-2") {
        Some("256x256".to_string())
    } else if model.starts_with("dall-e-3") || model.starts_with("gpt-image") {
        Some("1024x1024".to_string())
    } else {
        None
    }
}

// --- API Types ---

#[derive(Debug, Clone, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelEntry {
    id: String,
    name: Option<String>,
    description: Option<String>,
    created: Option<i64>,
    owned_by: Option<String>,
    max_context_length: Option<u32>,
    context_window: Option<u32>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: Option<u32>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
struct ImageRequest {
    model: String,
    prompt: String,
    n: u32,
    size: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ImageResponse {
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
struct SpeechRequest {
    model: String,
    input: String,
    voice: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RealtimeSession {
    id: Option<String>,
}
