//! Wire-protocol families and the state every provider adapter shares.
//!
//! Each submodule speaks one API dialect. Thin vendor modules under
//! [`crate::providers`] pick a dialect and supply base URL, credentials,
//! endpoint list and model tables.

use std::sync::Arc;
use std::time::{Duration, Instant};

use nonempty::NonEmpty;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::ClientError;
use crate::context::Context;
use crate::endpoints::{EndpointRegistry, EndpointTable};
use crate::http::{Auth, Connection, RequestBuilderExt, ResponseExt};
use crate::model::{Endpoint, ModelTest};
use crate::options::ProviderOptions;
use crate::probe::{EndpointProbe, HttpProbe, StatusPolicy};

pub mod anthropic;
pub mod deepgram;
pub mod elevenlabs;
pub mod fal;
pub mod gemini;
pub mod openai;

/// Prompt used by chat smoke tests.
pub(crate) const SMOKE_PROMPT: &str = "Reply with the single word: ok";

/// Output cap used by chat smoke tests.
pub(crate) const SMOKE_MAX_TOKENS: u32 = 5;

/// Static facts about one vendor, supplied by its provider module.
#[derive(Debug, Clone)]
pub struct VendorSpec {
    pub name: &'static str,
    pub base_url: &'static str,
    pub timeout: Duration,
    pub policy: StatusPolicy,
}

/// Connection, probe and lazily built endpoint table of one provider
/// instance.
#[derive(Debug)]
pub struct ProviderCore {
    name: &'static str,
    connection: Connection,
    probe: Arc<HttpProbe>,
    endpoints: EndpointRegistry,
}

impl ProviderCore {
    pub fn new(spec: VendorSpec, auth: Auth, options: ProviderOptions) -> Self {
        let base_url = options
            .base_url
            .unwrap_or_else(|| spec.base_url.to_string());
        let transport = options.transport.or_timeout(spec.timeout);
        let connection = Connection::new(base_url, auth, transport);
        let policy = options.status_policy.unwrap_or(spec.policy);

        Self {
            name: spec.name,
            probe: Arc::new(HttpProbe::new(connection.clone(), policy)),
            connection,
            endpoints: EndpointRegistry::with_critical_override(options.critical_endpoints),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn endpoints(&self, build: impl FnOnce() -> NonEmpty<Endpoint>) -> EndpointTable {
        self.endpoints.get_or_init(build)
    }

    pub fn probe(&self) -> Arc<dyn EndpointProbe> {
        self.probe.clone()
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        path: &str,
    ) -> Result<T, ClientError> {
        let req = self.connection.request(Method::GET, path)?;
        let response = self.connection.send(ctx, req).await?;
        ctx.run(response.json_logged()).await
    }

    /// POST a JSON body to `path` and decode the JSON answer.
    pub async fn post_json<B, T>(&self, ctx: &Context, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let req = self.connection.request(Method::POST, path)?.json_logged(body);
        let response = self.connection.send(ctx, req).await?;
        ctx.run(response.json_logged()).await
    }

    /// POST a JSON body to `path` and return the raw answer (audio, images).
    pub async fn post_for_bytes<B>(
        &self,
        ctx: &Context,
        path: &str,
        body: &B,
    ) -> Result<bytes::Bytes, ClientError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let req = self.connection.request(Method::POST, path)?.json_logged(body);
        let response = self.connection.send(ctx, req).await?;
        let bytes = ctx.run(response.bytes_logged()).await?;
        if bytes.is_empty() {
            return Err(ClientError::Decode("empty response body".to_string()));
        }
        Ok(bytes)
    }
}

/// Time `call` and wrap its detail into a [`ModelTest`].
pub(crate) async fn timed_test<F>(model: &str, call: F) -> Result<ModelTest, ClientError>
where
    F: std::future::Future<Output = Result<String, ClientError>>,
{
    let start = Instant::now();
    let detail = call.await?;
    let latency = start.elapsed();
    tracing::debug!(model, latency_ms = latency.as_millis() as u64, "smoke test passed");
    Ok(ModelTest {
        model: model.to_string(),
        latency,
        detail,
    })
}

/// First `max` characters of `text`, for smoke-test details.
pub(crate) fn excerpt(text: &str, max: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
