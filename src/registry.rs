//! Name → constructor lookup for providers.
//!
//! Nothing registers itself: a registry starts empty and is filled through
//! explicit [`ProviderRegistry::register`] calls, or all at once with
//! [`ProviderRegistry::with_builtin`].

use std::collections::BTreeMap;

use crate::client::{Client, ClientError};
use crate::options::{api_key_from_env, ProviderOptions};
use crate::providers::{
    Anthropic, Deepgram, ElevenLabs, Fal, Gemini, Groq, Mistral, OpenAi, Provider, XAI,
};

/// Builds a boxed client from an API key and options.
pub type Constructor = fn(String, ProviderOptions) -> Box<dyn Client>;

fn construct<P>(api_key: String, options: ProviderOptions) -> Box<dyn Client>
where
    P: Provider,
    P::Client: 'static,
{
    Box::new(P::create_with_options(api_key, options))
}

/// Process-lifetime map from provider name to constructor.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl ProviderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in provider.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_provider::<OpenAi>();
        registry.register_provider::<Anthropic>();
        registry.register_provider::<Gemini>();
        registry.register_provider::<Groq>();
        registry.register_provider::<XAI>();
        registry.register_provider::<Mistral>();
        registry.register_provider::<ElevenLabs>();
        registry.register_provider::<Deepgram>();
        registry.register_provider::<Fal>();
        registry
    }

    /// Register `constructor` under `name`, returning the constructor it
    /// replaced, if any.
    pub fn register(&mut self, name: impl Into<String>, constructor: Constructor) -> Option<Constructor> {
        let name = name.into();
        tracing::debug!(provider = %name, "registering provider");
        self.constructors.insert(name, constructor)
    }

    /// Register a [`Provider`] under its own name.
    pub fn register_provider<P>(&mut self) -> Option<Constructor>
    where
        P: Provider,
        P::Client: 'static,
    {
        self.register(P::NAME, construct::<P>)
    }

    pub fn lookup(&self, name: &str) -> Option<Constructor> {
        self.constructors.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Construct the provider registered as `name`.
    pub fn create(
        &self,
        name: &str,
        api_key: String,
        options: ProviderOptions,
    ) -> Result<Box<dyn Client>, ClientError> {
        let constructor = self
            .lookup(name)
            .ok_or_else(|| ClientError::Config(format!("unknown provider: {}", name)))?;
        Ok(constructor(api_key, options))
    }

    /// Construct the provider registered as `name`, reading its API key from
    /// `<NAME>_API_KEY`.
    pub fn create_from_env(
        &self,
        name: &str,
        options: ProviderOptions,
    ) -> Result<Box<dyn Client>, ClientError> {
        if !self.contains(name) {
            return Err(ClientError::Config(format!("unknown provider: {}", name)));
        }
        let api_key = api_key_from_env(name)?;
        self.create(name, api_key, options)
    }
}
