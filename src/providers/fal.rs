//! fal.ai API client implementation.

pub use crate::api::fal::FalClient;
use crate::options::ProviderOptions;
use crate::providers::Provider;

pub struct Fal;

impl Provider for Fal {
    type Client = FalClient;

    const NAME: &'static str = "fal";

    fn create_with_options(api_key: String, options: ProviderOptions) -> Self::Client {
        FalClient::new(api_key, options)
    }
}
