//! fal.ai image and video generation.
//!
//! fal has no model listing API; `list_models` returns the static catalog.
//! Its generation routes answer 4xx for requests they understand but refuse
//! (quota, validation), so probes use [`StatusPolicy::Reachable`].
//! See: <https://docs.fal.ai/model-endpoints>

use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use nonempty::{nonempty, NonEmpty};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::skip_serializing_none;

use crate::api::{timed_test, ProviderCore, VendorSpec};
use crate::client::{Client, ClientError};
use crate::context::Context;
use crate::endpoints::EndpointTable;
use crate::http::Auth;
use crate::model::{Capabilities, Endpoint, Model, ModelProfile, ModelTest, Pricing};
use crate::options::ProviderOptions;
use crate::probe::{EndpointProbe, StatusPolicy};
use crate::providers::{Fal, Provider};

const PROBE_PROMPT: &str = "a small red dot on a white background";

/// Known fal model routes and what they produce.
const CATALOG: &[(&str, &str)] = &[
    ("fal-ai/flux/schnell", "FLUX.1 [schnell]"),
    ("fal-ai/flux/dev", "FLUX.1 [dev]"),
    ("fal-ai/flux-pro/v1.1", "FLUX1.1 [pro]"),
    ("fal-ai/recraft-v3", "Recraft V3"),
    ("fal-ai/ltx-video", "LTX Video"),
    ("fal-ai/kling-video/v1.6/standard/text-to-video", "Kling 1.6 Standard"),
    ("fal-ai/minimax/video-01", "MiniMax Video-01"),
];

pub(crate) fn spec() -> VendorSpec {
    VendorSpec {
        name: Fal::NAME,
        base_url: "https://fal.run",
        timeout: std::time::Duration::from_secs(120),
        policy: StatusPolicy::Reachable,
    }
}

fn endpoints() -> NonEmpty<Endpoint> {
    nonempty![
        Endpoint::post("/fal-ai/flux/schnell", "Image generation").with_json(json!({
            "prompt": PROBE_PROMPT,
            "image_size": "square",
            "num_images": 1,
            "num_inference_steps": 1,
        })),
        Endpoint::post("/fal-ai/ltx-video", "Video generation").with_json(json!({
            "prompt": PROBE_PROMPT,
            "num_frames": 1,
        }))
    ]
}

/// Static enrichment for fal model routes.
pub fn profile(id: &str) -> ModelProfile {
    if id.contains("video") {
        ModelProfile::new(Capabilities::video())
    } else if id.contains("flux/schnell") {
        ModelProfile::new(Capabilities::image()).pricing(Pricing::per_image(0.003))
    } else if id.contains("flux-pro") {
        ModelProfile::new(Capabilities::image()).pricing(Pricing::per_image(0.04))
    } else if id.contains("flux") {
        ModelProfile::new(Capabilities::image()).pricing(Pricing::per_image(0.025))
    } else {
        ModelProfile::new(Capabilities::image())
    }
}

/// fal client.
#[derive(Debug)]
pub struct FalClient {
    core: ProviderCore,
}

impl FalClient {
    pub fn new(api_key: String, options: ProviderOptions) -> Self {
        let auth = Auth::Scheme {
            scheme: "Key",
            token: api_key,
        };
        Self {
            core: ProviderCore::new(spec(), auth, options),
        }
    }

    async fn test_generation(&self, ctx: &Context, model: &str) -> Result<String, ClientError> {
        let video = profile(model).capabilities.video_generation;
        let request = GenerationRequest {
            prompt: PROBE_PROMPT.to_string(),
            num_images: (!video).then_some(1),
            num_frames: video.then_some(1),
        };
        let path = format!("/{}", model.trim_start_matches('/'));
        let response: GenerationResponse = self.core.post_json(ctx, &path, &request).await?;

        match (response.images.len(), response.video) {
            (_, Some(video)) => Ok(format!("video at {}", video.url)),
            (0, None) => Err(ClientError::Decode(
                "response contained neither images nor video".to_string(),
            )),
            (n, None) => Ok(format!("{} image(s)", n)),
        }
    }
}

#[async_trait]
impl Client for FalClient {
    fn name(&self) -> &'static str {
        self.core.name()
    }

    async fn list_models(&self, ctx: &Context) -> Result<Vec<Model>, ClientError> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        Ok(CATALOG
            .iter()
            .map(|(id, name)| {
                let mut model = Model::new(self.core.name(), *id).with_name(*name);
                model.owned_by = id.split('/').next().map(str::to_string);
                model.enrich(profile(id))
            })
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .collect())
    }

    fn get_capabilities(&self) -> Capabilities {
        Capabilities::image().union(Capabilities::video())
    }

    fn get_endpoints(&self) -> EndpointTable {
        self.core.endpoints(endpoints)
    }

    fn probe(&self) -> Arc<dyn EndpointProbe> {
        self.core.probe()
    }

    async fn test_model(&self, ctx: &Context, model: &str) -> Result<ModelTest, ClientError> {
        timed_test(model, self.test_generation(ctx, model)).await
    }
}

// --- fal API Types ---

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
struct GenerationRequest {
    prompt: String,
    num_images: Option<u32>,
    num_frames: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    images: Vec<serde_json::Value>,
    video: Option<GeneratedFile>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeneratedFile {
    url: String,
}
