//! Google Gemini API client implementation.
//!
//! The model listing endpoint is critical by default: without it nothing
//! else about the account can be trusted, so a failed listing fails the
//! whole validation run.
//! See: <https://ai.google.dev/api/rest>

use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use nonempty::{nonempty, NonEmpty};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::skip_serializing_none;

use crate::api::{excerpt, timed_test, ProviderCore, VendorSpec, SMOKE_MAX_TOKENS, SMOKE_PROMPT};
use crate::client::{Client, ClientError};
use crate::context::Context;
use crate::endpoints::EndpointTable;
use crate::http::Auth;
use crate::model::{Capabilities, Endpoint, Model, ModelProfile, ModelTest, Pricing};
use crate::options::ProviderOptions;
use crate::probe::{EndpointProbe, StatusPolicy};
use crate::providers::{Gemini, Provider};

const PROBE_MODEL: &str = "gemini-2.0-flash";

pub(crate) fn spec() -> VendorSpec {
    VendorSpec {
        name: Gemini::NAME,
        base_url: "https://generativelanguage.googleapis.com/v1beta",
        timeout: std::time::Duration::from_secs(60),
        policy: StatusPolicy::SuccessOnly,
    }
}

fn endpoints() -> NonEmpty<Endpoint> {
    nonempty![
        Endpoint::get("/models", "List models").critical(),
        Endpoint::post(
            format!("/models/{}:generateContent", PROBE_MODEL),
            "Generate content",
        )
        .with_json(json!({
            "contents": [{ "parts": [{ "text": "ping" }] }],
            "generationConfig": { "maxOutputTokens": 1 },
        }))
    ]
}

/// Static enrichment for Gemini models.
pub fn profile(id: &str) -> ModelProfile {
    let id = id.strip_prefix("models/").unwrap_or(id);

    if id.starts_with("imagen") {
        ModelProfile::new(Capabilities::image()).pricing(Pricing::per_image(0.03))
    } else if id.starts_with("veo") {
        ModelProfile::new(Capabilities::video())
    } else if id.contains("embedding") {
        ModelProfile::new(Capabilities::embeddings())
    } else if id.contains("native-audio") || id.contains("live") {
        ModelProfile::new(Capabilities::realtime().union(Capabilities::chat()))
    } else if id.contains("tts") {
        ModelProfile::new(Capabilities::text_to_speech())
    } else if id.starts_with("gemini-2.5-pro") {
        ModelProfile::new(Capabilities::chat().with_vision())
            .context(1_048_576, 65_536)
            .pricing(Pricing::tokens(1.25, 10.0))
    } else if id.starts_with("gemini-2.5-flash") {
        ModelProfile::new(Capabilities::chat().with_vision())
            .context(1_048_576, 65_536)
            .pricing(Pricing::tokens(0.3, 2.5))
    } else if id.starts_with("gemini-2.0-flash") {
        ModelProfile::new(Capabilities::chat().with_vision())
            .context(1_048_576, 8_192)
            .pricing(Pricing::tokens(0.1, 0.4))
    } else if id.starts_with("gemini-1.5") {
        ModelProfile::new(Capabilities::chat().with_vision())
            .context(1_048_576, 8_192)
            .deprecated()
    } else if id.starts_with("gemini") || id.starts_with("gemma") {
        ModelProfile::new(Capabilities::chat())
    } else {
        ModelProfile::default()
    }
}

/// Gemini client.
#[derive(Debug)]
pub struct GeminiClient {
    core: ProviderCore,
}

impl GeminiClient {
    pub fn new(api_key: String, options: ProviderOptions) -> Self {
        let auth = Auth::Header {
            name: "x-goog-api-key",
            value: api_key,
        };
        Self {
            core: ProviderCore::new(spec(), auth, options),
        }
    }

    async fn test_generate(&self, ctx: &Context, model: &str) -> Result<String, ClientError> {
        let model = model.strip_prefix("models/").unwrap_or(model);
        let request = GenerateContentRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(SMOKE_PROMPT.to_string()),
                }],
            }],
            generation_config: Some(GenerationConfig {
                max_output_tokens: Some(SMOKE_MAX_TOKENS),
            }),
        };
        let response: GenerateContentResponse = self
            .core
            .post_json(ctx, &format!("/models/{}:generateContent", model), &request)
            .await?;

        let text = response
            .candidates
            .iter()
            .flat_map(|c| c.content.iter())
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .join("");
        if response.candidates.is_empty() {
            return Err(ClientError::Decode("response contained no candidates".to_string()));
        }
        Ok(format!("{:?}", excerpt(&text, 60)))
    }
}

#[async_trait]
impl Client for GeminiClient {
    fn name(&self) -> &'static str {
        self.core.name()
    }

    async fn list_models(&self, ctx: &Context) -> Result<Vec<Model>, ClientError> {
        let list: ModelList = self.core.get_json(ctx, "/models?pageSize=1000").await?;

        let models = list
            .models
            .into_iter()
            .map(|m| {
                let id = m
                    .name
                    .strip_prefix("models/")
                    .unwrap_or(&m.name)
                    .to_string();
                let mut known = profile(&id);
                if m
                    .supported_generation_methods
                    .iter()
                    .any(|method| method == "generateContent")
                {
                    known.capabilities.text_generation = true;
                }
                if m
                    .supported_generation_methods
                    .iter()
                    .any(|method| method == "embedContent")
                {
                    known.capabilities.embeddings = true;
                }
                let mut model = Model::new(self.core.name(), id);
                if let Some(display_name) = m.display_name {
                    model = model.with_name(display_name);
                }
                model.description = m.description;
                model.context_window = m.input_token_limit;
                model.max_output_tokens = m.output_token_limit;
                model.owned_by = Some("google".to_string());
                model.enrich(known)
            })
            .unique_by(|m| m.id.clone())
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .collect();
        Ok(models)
    }

    fn get_capabilities(&self) -> Capabilities {
        Capabilities::chat()
            .with_vision()
            .union(Capabilities::image())
            .union(Capabilities::video())
            .union(Capabilities::embeddings())
            .union(Capabilities::realtime())
    }

    fn get_endpoints(&self) -> EndpointTable {
        self.core.endpoints(endpoints)
    }

    fn probe(&self) -> Arc<dyn EndpointProbe> {
        self.core.probe()
    }

    async fn test_model(&self, ctx: &Context, model: &str) -> Result<ModelTest, ClientError> {
        let caps = profile(model).capabilities;
        if !caps.is_empty() && !caps.text_generation {
            return Err(ClientError::Unsupported(format!(
                "smoke tests for non-text Gemini model {}",
                model
            )));
        }
        timed_test(model, self.test_generate(ctx, model)).await
    }
}

// --- Gemini API Types ---

#[derive(Debug, Clone, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<GeminiModelInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModelInfo {
    name: String,
    display_name: Option<String>,
    description: Option<String>,
    input_token_limit: Option<u32>,
    output_token_limit: Option<u32>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    generation_config: Option<GenerationConfig>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}
