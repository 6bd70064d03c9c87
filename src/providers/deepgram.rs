//! Deepgram API client implementation.

pub use crate::api::deepgram::DeepgramClient;
use crate::options::ProviderOptions;
use crate::providers::Provider;

pub struct Deepgram;

impl Provider for Deepgram {
    type Client = DeepgramClient;

    const NAME: &'static str = "deepgram";

    fn create_with_options(api_key: String, options: ProviderOptions) -> Self::Client {
        DeepgramClient::new(api_key, options)
    }
}
