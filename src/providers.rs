//! Provider implementations.

use crate::client::Client;
use crate::options::ProviderOptions;

/// Trait for providers that can create configured clients.
pub trait Provider {
    /// The client type produced by this provider.
    type Client: Client;

    /// Registry name, also used to derive the API key environment variable.
    const NAME: &'static str;

    /// Create a new client with the given API key and default options.
    fn create(api_key: String) -> Self::Client {
        Self::create_with_options(api_key, ProviderOptions::default())
    }

    /// Create a new client with custom options.
    fn create_with_options(api_key: String, options: ProviderOptions) -> Self::Client;
}

pub mod anthropic;
pub mod deepgram;
pub mod elevenlabs;
pub mod fal;
pub mod gemini;
pub mod groq;
pub mod mistral;
pub mod openai;
pub mod xai;

// Re-export for convenience
pub use anthropic::{Anthropic, AnthropicClient};
pub use deepgram::{Deepgram, DeepgramClient};
pub use elevenlabs::{ElevenLabs, ElevenLabsClient};
pub use fal::{Fal, FalClient};
pub use gemini::{Gemini, GeminiClient};
pub use groq::{Groq, GroqClient, GroqVendor};
pub use mistral::{Mistral, MistralClient, MistralVendor};
pub use openai::{OpenAi, OpenAiClient, OpenAiVendor};
pub use xai::{XAIClient, XAIVendor, XAI};
