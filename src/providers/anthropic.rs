//! Anthropic API client implementation.

pub use crate::api::anthropic::AnthropicClient;
use crate::options::ProviderOptions;
use crate::providers::Provider;

pub struct Anthropic;

impl Provider for Anthropic {
    type Client = AnthropicClient;

    const NAME: &'static str = "anthropic";

    fn create_with_options(api_key: String, options: ProviderOptions) -> Self::Client {
        AnthropicClient::new(api_key, options)
    }
}
