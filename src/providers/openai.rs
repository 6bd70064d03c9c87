//! OpenAI API client implementation.

use std::time::Duration;

use nonempty::{nonempty, NonEmpty};
use serde_json::json;

use crate::api::openai::{
    chat_probe, models_probe, transcription_probe, OpenAiCompatibleClient, OpenAiCompatibleVendor,
};
use crate::api::VendorSpec;
use crate::model::{Capabilities, Endpoint, ModelProfile, Pricing};
use crate::options::ProviderOptions;
use crate::probe::StatusPolicy;
use crate::providers::Provider;

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiVendor;

impl OpenAiCompatibleVendor for OpenAiVendor {
    fn spec() -> VendorSpec {
        VendorSpec {
            name: OpenAi::NAME,
            base_url: "https://api.openai.com/v1",
            timeout: Duration::from_secs(60),
            policy: StatusPolicy::SuccessOnly,
        }
    }

    fn endpoints() -> NonEmpty<Endpoint> {
        nonempty![
            models_probe(),
            chat_probe("gpt-4o-mini"),
            Endpoint::post("/audio/speech", "Text to speech")
                .with_json(json!({ "model": "tts-1", "input": "ok", "voice": "alloy" }))
                .binary_response(),
            transcription_probe("whisper-1"),
            Endpoint::post("/realtime/sessions", "Realtime session")
                .with_json(json!({ "model": "gpt-4o-realtime-preview" }))
        ]
    }

    fn profile(id: &str) -> ModelProfile {
        let chat = Capabilities::chat().with_vision();

        if id.contains("realtime") {
            ModelProfile::new(Capabilities::realtime().union(Capabilities::text()))
                .context(128_000, 4_096)
                .pricing(Pricing::tokens(5.0, 20.0))
        } else if id.contains("transcribe") || id.starts_with("whisper") {
            ModelProfile::new(Capabilities::speech_to_text()).pricing(Pricing::per_minute(0.006))
        } else if id.starts_with("tts") || id.ends_with("-tts") {
            ModelProfile::new(Capabilities::text_to_speech())
                .pricing(Pricing::per_thousand_characters(0.015))
        } else if id.starts_with("dall-e-2") {
            ModelProfile::new(Capabilities::image())
                .pricing(Pricing::per_image(0.016))
                .deprecated()
        } else if id.starts_with("dall-e") || id.starts_with("gpt-image") {
            ModelProfile::new(Capabilities::image()).pricing(Pricing::per_image(0.04))
        } else if id.starts_with("text-embedding") {
            ModelProfile::new(Capabilities::embeddings()).pricing(Pricing::tokens(0.02, 0.0))
        } else if id.starts_with("gpt-4.1-mini") {
            ModelProfile::new(chat)
                .context(1_047_576, 32_768)
                .pricing(Pricing::tokens(0.4, 1.6))
        } else if id.starts_with("gpt-4.1") {
            ModelProfile::new(chat)
                .context(1_047_576, 32_768)
                .pricing(Pricing::tokens(2.0, 8.0))
        } else if id.starts_with("gpt-4o-mini") {
            ModelProfile::new(chat)
                .context(128_000, 16_384)
                .pricing(Pricing::tokens(0.15, 0.6))
        } else if id.starts_with("gpt-4o") {
            ModelProfile::new(chat)
                .context(128_000, 16_384)
                .pricing(Pricing::tokens(2.5, 10.0))
        } else if id.starts_with("o1") || id.starts_with("o3") || id.starts_with("o4") {
            let profile = ModelProfile::new(chat).context(200_000, 100_000);
            if id.contains("mini") {
                profile.pricing(Pricing::tokens(1.1, 4.4))
            } else {
                profile.pricing(Pricing::tokens(2.0, 8.0))
            }
        } else if id.starts_with("gpt-3.5") {
            ModelProfile::new(Capabilities::chat())
                .context(16_385, 4_096)
                .pricing(Pricing::tokens(0.5, 1.5))
                .deprecated()
        } else if id.starts_with("gpt") {
            ModelProfile::new(chat)
        } else {
            ModelProfile::default()
        }
    }

    fn capabilities() -> Capabilities {
        Capabilities::chat()
            .with_vision()
            .union(Capabilities::image())
            .union(Capabilities::realtime())
            .union(Capabilities::embeddings())
    }
}

pub type OpenAiClient = OpenAiCompatibleClient<OpenAiVendor>;

pub struct OpenAi;

impl Provider for OpenAi {
    type Client = OpenAiClient;

    const NAME: &'static str = "openai";

    fn create_with_options(api_key: String, options: ProviderOptions) -> Self::Client {
        OpenAiClient::new(api_key, options)
    }
}
