//! xAI API client implementation.

use std::time::Duration;

use nonempty::{nonempty, NonEmpty};
use serde_json::json;

use crate::api::openai::{chat_probe, models_probe, OpenAiCompatibleClient, OpenAiCompatibleVendor};
use crate::api::VendorSpec;
use crate::model::{Capabilities, Endpoint, ModelProfile, Pricing};
use crate::options::ProviderOptions;
use crate::probe::StatusPolicy;
use crate::providers::Provider;

#[derive(Debug, Clone, Copy, Default)]
pub struct XAIVendor;

impl OpenAiCompatibleVendor for XAIVendor {
    fn spec() -> VendorSpec {
        VendorSpec {
            name: XAI::NAME,
            base_url: "https://api.x.ai/v1",
            timeout: Duration::from_secs(60),
            policy: StatusPolicy::SuccessOnly,
        }
    }

    fn endpoints() -> NonEmpty<Endpoint> {
        nonempty![
            models_probe(),
            chat_probe("grok-3-mini"),
            Endpoint::post("/images/generations", "Image generation")
                .with_json(json!({ "model": "grok-2-image", "prompt": "a red dot", "n": 1 }))
        ]
    }

    fn profile(id: &str) -> ModelProfile {
        if id.contains("image") {
            ModelProfile::new(Capabilities::image()).pricing(Pricing::per_image(0.07))
        } else if id.contains("vision") {
            ModelProfile::new(Capabilities::chat().with_vision()).context(32_768, 8_192)
        } else if id.starts_with("grok-4") {
            ModelProfile::new(Capabilities::chat().with_vision())
                .context(256_000, 64_000)
                .pricing(Pricing::tokens(3.0, 15.0))
        } else if id.starts_with("grok-3-mini") {
            ModelProfile::new(Capabilities::chat())
                .context(131_072, 32_768)
                .pricing(Pricing::tokens(0.3, 0.5))
        } else if id.starts_with("grok-3") {
            ModelProfile::new(Capabilities::chat())
                .context(131_072, 32_768)
                .pricing(Pricing::tokens(3.0, 15.0))
        } else if id.starts_with("grok-2") || id.starts_with("grok-beta") {
            ModelProfile::new(Capabilities::chat())
                .context(131_072, 32_768)
                .deprecated()
        } else {
            ModelProfile::new(Capabilities::chat())
        }
    }

    fn capabilities() -> Capabilities {
        Capabilities::chat()
            .with_vision()
            .union(Capabilities::image())
    }
}

pub type XAIClient = OpenAiCompatibleClient<XAIVendor>;

pub struct XAI;

impl Provider for XAI {
    type Client = XAIClient;

    const NAME: &'static str = "xai";

    fn create_with_options(api_key: String, options: ProviderOptions) -> Self::Client {
        XAIClient::new(api_key, options)
    }
}
