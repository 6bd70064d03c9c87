//! Groq API client implementation.

use std::time::Duration;

use nonempty::{nonempty, NonEmpty};

use crate::api::openai::{
    chat_probe, models_probe, transcription_probe, OpenAiCompatibleClient, OpenAiCompatibleVendor,
};
use crate::api::VendorSpec;
use crate::model::{Capabilities, Endpoint, ModelProfile, Pricing};
use crate::options::ProviderOptions;
use crate::probe::StatusPolicy;
use crate::providers::Provider;

#[derive(Debug, Clone, Copy, Default)]
pub struct GroqVendor;

impl OpenAiCompatibleVendor for GroqVendor {
    fn spec() -> VendorSpec {
        VendorSpec {
            name: Groq::NAME,
            base_url: "https://api.groq.com/openai/v1",
            timeout: Duration::from_secs(30),
            policy: StatusPolicy::SuccessOnly,
        }
    }

    fn endpoints() -> NonEmpty<Endpoint> {
        nonempty![
            models_probe(),
            chat_probe("llama-3.1-8b-instant"),
            transcription_probe("whisper-large-v3-turbo")
        ]
    }

    fn profile(id: &str) -> ModelProfile {
        if id.starts_with("whisper") || id.starts_with("distil-whisper") {
            ModelProfile::new(Capabilities::speech_to_text()).pricing(Pricing::per_minute(0.00067))
        } else if id.starts_with("playai-tts") {
            ModelProfile::new(Capabilities::text_to_speech())
        } else if id.contains("guard") {
            ModelProfile::new(Capabilities::text()).context(131_072, 1_024)
        } else if id.starts_with("llama-3.1-8b") {
            ModelProfile::new(Capabilities::chat())
                .context(131_072, 131_072)
                .pricing(Pricing::tokens(0.05, 0.08))
        } else if id.starts_with("llama-3.3-70b") {
            ModelProfile::new(Capabilities::chat())
                .context(131_072, 32_768)
                .pricing(Pricing::tokens(0.59, 0.79))
        } else if id.contains("llama-4") {
            ModelProfile::new(Capabilities::chat().with_vision()).context(131_072, 8_192)
        } else if id.starts_with("gemma") || id.starts_with("mixtral") {
            ModelProfile::new(Capabilities::chat()).deprecated()
        } else {
            ModelProfile::new(Capabilities::chat())
        }
    }

    fn capabilities() -> Capabilities {
        Capabilities::chat()
            .with_vision()
            .union(Capabilities::speech_to_text())
            .union(Capabilities::text_to_speech())
    }

    fn default_voice() -> &'static str {
        "Fritz-PlayAI"
    }
}

pub type GroqClient = OpenAiCompatibleClient<GroqVendor>;

pub struct Groq;

impl Provider for Groq {
    type Client = GroqClient;

    const NAME: &'static str = "groq";

    fn create_with_options(api_key: String, options: ProviderOptions) -> Self::Client {
        GroqClient::new(api_key, options)
    }
}
