//! ElevenLabs API client implementation.

pub use crate::api::elevenlabs::ElevenLabsClient;
use crate::options::ProviderOptions;
use crate::providers::Provider;

pub struct ElevenLabs;

impl Provider for ElevenLabs {
    type Client = ElevenLabsClient;

    const NAME: &'static str = "elevenlabs";

    fn create_with_options(api_key: String, options: ProviderOptions) -> Self::Client {
        ElevenLabsClient::new(api_key, options)
    }
}
