//! Anthropic API client implementation.
//! See: <https://docs.anthropic.com/en/api>

use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use nonempty::{nonempty, NonEmpty};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{excerpt, timed_test, ProviderCore, VendorSpec, SMOKE_MAX_TOKENS, SMOKE_PROMPT};
use crate::client::{Client, ClientError};
use crate::context::Context;
use crate::endpoints::EndpointTable;
use crate::http::{Auth, RequestBuilderExt, ResponseExt};
use crate::model::{Capabilities, Endpoint, Model, ModelProfile, ModelTest, Pricing};
use crate::options::ProviderOptions;
use crate::probe::{EndpointProbe, StatusPolicy};
use crate::providers::{Anthropic, Provider};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROBE_MODEL: &str = "claude-3-5-haiku-latest";

pub(crate) fn spec() -> VendorSpec {
    VendorSpec {
        name: Anthropic::NAME,
        base_url: "https://api.anthropic.com/v1",
        timeout: std::time::Duration::from_secs(60),
        policy: StatusPolicy::SuccessOnly,
    }
}

fn endpoints() -> NonEmpty<Endpoint> {
    nonempty![
        Endpoint::get("/models", "List models").with_header("anthropic-version", ANTHROPIC_VERSION),
        Endpoint::post("/messages", "Messages")
            .with_header("anthropic-version", ANTHROPIC_VERSION)
            .with_json(json!({
                "model": PROBE_MODEL,
                "max_tokens": 1,
                "messages": [{ "role": "user", "content": "ping" }],
            }))
    ]
}

/// Static enrichment for Claude models.
pub fn profile(id: &str) -> ModelProfile {
    let base = ModelProfile::new(Capabilities::chat().with_vision()).context(200_000, 8_192);

    if id.contains("opus-4") {
        base.context(200_000, 32_000)
            .pricing(Pricing::tokens(15.0, 75.0))
            .describe("Most capable Claude model")
    } else if id.contains("sonnet-4") || id.contains("3-7-sonnet") {
        base.context(200_000, 64_000)
            .pricing(Pricing::tokens(3.0, 15.0))
            .describe("Balanced Claude model with extended thinking")
    } else if id.contains("3-5-sonnet") {
        base.pricing(Pricing::tokens(3.0, 15.0))
    } else if id.contains("3-5-haiku") {
        base.pricing(Pricing::tokens(0.8, 4.0))
            .describe("Fastest Claude model")
    } else if id.contains("3-opus") {
        base.context(200_000, 4_096)
            .pricing(Pricing::tokens(15.0, 75.0))
            .deprecated()
    } else if id.contains("3-haiku") {
        base.context(200_000, 4_096)
            .pricing(Pricing::tokens(0.25, 1.25))
    } else {
        base
    }
}

/// Anthropic client.
#[derive(Debug)]
pub struct AnthropicClient {
    core: ProviderCore,
}

impl AnthropicClient {
    pub fn new(api_key: String, options: ProviderOptions) -> Self {
        let auth = Auth::Header {
            name: "x-api-key",
            value: api_key,
        };
        Self {
            core: ProviderCore::new(spec(), auth, options),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> Result<reqwest::RequestBuilder, ClientError> {
        Ok(self
            .core
            .connection()
            .request(method, path)?
            .header("anthropic-version", ANTHROPIC_VERSION))
    }

    async fn test_messages(&self, ctx: &Context, model: &str) -> Result<String, ClientError> {
        let request = MessagesRequest {
            model: model.to_string(),
            max_tokens: SMOKE_MAX_TOKENS,
            messages: vec![MessageParam {
                role: "user".to_string(),
                content: SMOKE_PROMPT.to_string(),
            }],
        };
        let req = self
            .request(reqwest::Method::POST, "/messages")?
            .json_logged(&request);
        let response = self.core.connection().send(ctx, req).await?;
        let response: MessagesResponse = ctx.run(response.json_logged()).await?;

        let text = response
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .join("");
        Ok(format!(
            "{:?} ({} input / {} output tokens)",
            excerpt(&text, 60),
            response.usage.input_tokens,
            response.usage.output_tokens
        ))
    }
}

#[async_trait]
impl Client for AnthropicClient {
    fn name(&self) -> &'static str {
        self.core.name()
    }

    async fn list_models(&self, ctx: &Context) -> Result<Vec<Model>, ClientError> {
        let req = self.request(reqwest::Method::GET, "/models?limit=1000")?;
        let response = self.core.connection().send(ctx, req).await?;
        let list: ModelList = ctx.run(response.json_logged()).await?;

        let models = list
            .data
            .into_iter()
            .unique_by(|m| m.id.clone())
            .map(|m| {
                let known = profile(&m.id);
                let mut model = Model::new(self.core.name(), m.id);
                if let Some(display_name) = m.display_name {
                    model = model.with_name(display_name);
                }
                model.owned_by = Some("anthropic".to_string());
                model.enrich(known)
            })
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .collect();
        Ok(models)
    }

    fn get_capabilities(&self) -> Capabilities {
        Capabilities::chat().with_vision()
    }

    fn get_endpoints(&self) -> EndpointTable {
        self.core.endpoints(endpoints)
    }

    fn probe(&self) -> Arc<dyn EndpointProbe> {
        self.core.probe()
    }

    async fn test_model(&self, ctx: &Context, model: &str) -> Result<ModelTest, ClientError> {
        timed_test(model, self.test_messages(ctx, model)).await
    }
}

// --- Anthropic API Types ---

#[derive(Debug, Clone, Deserialize)]
struct ModelList {
    data: Vec<ModelInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelInfo {
    id: String,
    display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<MessageParam>,
}

#[derive(Debug, Clone, Serialize)]
struct MessageParam {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: MessagesUsage,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct MessagesUsage {
    input_tokens: u32,
    output_tokens: u32,
}
