//! # aiprobe - health checks for AI model providers
//!
//! A set of adapters for third-party AI model APIs (text, image and video
//! generation, speech-to-text, text-to-speech, realtime voice). Every adapter
//! normalizes its vendor into the same [`Model`] / [`Capabilities`] /
//! [`Endpoint`] shapes and offers three operations:
//!
//! - list the available models with enriched metadata,
//! - validate its declared endpoints concurrently,
//! - smoke-test one model with a minimal live request.
//!
//! ## Architecture
//!
//! 1. **Providers** are factories that create clients ([`providers::Provider`]).
//! 2. **Clients** hold the connection, the probe strategy and the lazily built
//!    endpoint table ([`Client`]).
//! 3. The **validator** probes every endpoint in its own task and records the
//!    outcome in the shared [`EndpointTable`] under one mutex
//!    ([`validator::validate_endpoints`]).
//! 4. The **registry** maps provider names to constructors
//!    ([`ProviderRegistry`]).
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use aiprobe::{Client, Context};
//! use aiprobe::providers::{OpenAi, Provider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAi::create("your-api-key".to_string());
//!     let ctx = Context::with_timeout(Duration::from_secs(30));
//!
//!     client.validate_endpoints(&ctx, true).await?;
//!     for endpoint in client.get_endpoints().snapshot() {
//!         println!(
//!             "{} {} {} {:?} {}",
//!             endpoint.method(),
//!             endpoint.path(),
//!             endpoint.status(),
//!             endpoint.latency(),
//!             endpoint.error()
//!         );
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod audio;
pub mod client;
pub mod context;
pub mod endpoints;
pub mod http;
pub mod model;
pub mod options;
pub mod probe;
pub mod providers;
pub mod registry;
pub mod validator;

pub use client::{Client, ClientError};
pub use context::Context;
pub use endpoints::{EndpointRegistry, EndpointTable};
pub use model::{Capabilities, Endpoint, EndpointStatus, Model, ModelTest, Pricing};
pub use options::{ProviderOptions, TransportOptions};
pub use probe::{EndpointProbe, HttpProbe, StatusPolicy};
pub use registry::ProviderRegistry;
