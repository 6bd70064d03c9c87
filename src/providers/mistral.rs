//! Mistral API client implementation.

use std::time::Duration;

use nonempty::{nonempty, NonEmpty};

use crate::api::openai::{chat_probe, models_probe, OpenAiCompatibleClient, OpenAiCompatibleVendor};
use crate::api::VendorSpec;
use crate::model::{Capabilities, Endpoint, ModelProfile, Pricing};
use crate::options::ProviderOptions;
use crate::probe::StatusPolicy;
use crate::providers::Provider;

#[derive(Debug, Clone, Copy, Default)]
pub struct MistralVendor;

impl OpenAiCompatibleVendor for MistralVendor {
    fn spec() -> VendorSpec {
        VendorSpec {
            name: Mistral::NAME,
            base_url: "https://api.mistral.ai/v1",
            timeout: Duration::from_secs(30),
            policy: StatusPolicy::SuccessOnly,
        }
    }

    fn endpoints() -> NonEmpty<Endpoint> {
        nonempty![models_probe(), chat_probe("mistral-small-latest")]
    }

    fn profile(id: &str) -> ModelProfile {
        if id.contains("embed") {
            ModelProfile::new(Capabilities::embeddings()).pricing(Pricing::tokens(0.1, 0.0))
        } else if id.starts_with("voxtral") {
            ModelProfile::new(Capabilities::speech_to_text().union(Capabilities::text()))
        } else if id.starts_with("pixtral") {
            ModelProfile::new(Capabilities::chat().with_vision()).context(128_000, 8_192)
        } else if id.starts_with("mistral-large") {
            ModelProfile::new(Capabilities::chat())
                .context(128_000, 8_192)
                .pricing(Pricing::tokens(2.0, 6.0))
        } else if id.starts_with("mistral-medium") {
            ModelProfile::new(Capabilities::chat().with_vision())
                .context(128_000, 8_192)
                .pricing(Pricing::tokens(0.4, 2.0))
        } else if id.starts_with("mistral-small") {
            ModelProfile::new(Capabilities::chat().with_vision())
                .context(128_000, 8_192)
                .pricing(Pricing::tokens(0.1, 0.3))
        } else if id.starts_with("codestral") {
            ModelProfile::new(Capabilities::chat())
                .context(256_000, 8_192)
                .pricing(Pricing::tokens(0.3, 0.9))
        } else if id.starts_with("open-mistral-7b") || id.starts_with("open-mixtral") {
            ModelProfile::new(Capabilities::text()).deprecated()
        } else {
            ModelProfile::new(Capabilities::chat())
        }
    }

    fn capabilities() -> Capabilities {
        Capabilities::chat()
            .with_vision()
            .union(Capabilities::speech_to_text())
            .union(Capabilities::embeddings())
    }
}

pub type MistralClient = OpenAiCompatibleClient<MistralVendor>;

pub struct Mistral;

impl Provider for Mistral {
    type Client = MistralClient;

    const NAME: &'static str = "mistral";

    fn create_with_options(api_key: String, options: ProviderOptions) -> Self::Client {
        MistralClient::new(api_key, options)
    }
}
