//! Google Gemini API client implementation.

pub use crate::api::gemini::GeminiClient;
use crate::options::ProviderOptions;
use crate::providers::Provider;

pub struct Gemini;

impl Provider for Gemini {
    type Client = GeminiClient;

    const NAME: &'static str = "gemini";

    fn create_with_options(api_key: String, options: ProviderOptions) -> Self::Client {
        GeminiClient::new(api_key, options)
    }
}
