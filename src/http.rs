//! HTTP client utilities for talking to provider APIs.

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder};

use crate::client::ClientError;
use crate::context::Context;
use crate::options::TransportOptions;

/// Build a configured HTTP client from transport options.
pub fn build_http_client(transport_options: &TransportOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    match transport_options {
        TransportOptions::Http { timeout, proxy, .. } => {
            if let Some(t) = timeout {
                builder = builder.timeout(*t);
            }
            if let Some(proxy_url) = proxy {
                match reqwest::Proxy::all(proxy_url) {
                    Ok(p) => builder = builder.proxy(p),
                    Err(e) => tracing::warn!("ignoring invalid proxy {}: {}", proxy_url, e),
                }
            }
        }
    }

    builder.build()
}

/// Add extra headers to a request if specified in transport options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    transport_options: &TransportOptions,
) -> RequestBuilder {
    match transport_options {
        TransportOptions::Http { headers, .. } => {
            if let Some(h) = headers {
                for (key, value) in h {
                    request = request.header(key, value);
                }
            }
        }
    }
    request
}

/// How a vendor expects its credential to be presented.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// No credential.
    None,
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    /// `Authorization: <scheme> <token>`, e.g. `Token` or `Key`.
    Scheme { scheme: &'static str, token: String },
    /// A dedicated header such as `x-api-key`.
    Header { name: &'static str, value: String },
}

impl Auth {
    /// Attach the credential. An empty credential attaches nothing.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Auth::None => request,
            Auth::Bearer(token) if token.is_empty() => request,
            Auth::Bearer(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            Auth::Scheme { token, .. } if token.is_empty() => request,
            Auth::Scheme { scheme, token } => {
                request.header(AUTHORIZATION, format!("{} {}", scheme, token))
            }
            Auth::Header { value, .. } if value.is_empty() => request,
            Auth::Header { name, value } => request.header(*name, value),
        }
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::None => f.write_str("None"),
            Auth::Bearer(_) => f.write_str("Bearer(***)"),
            Auth::Scheme { scheme, .. } => write!(f, "Scheme({} ***)", scheme),
            Auth::Header { name, .. } => write!(f, "Header({}: ***)", name),
        }
    }
}

/// Where and how to reach one provider: base URL, credential and transport.
///
/// The HTTP client is built once, when the connection is created. Clones
/// share its connection pool.
#[derive(Debug, Clone)]
pub struct Connection {
    base_url: String,
    auth: Auth,
    transport_options: TransportOptions,
    http_client: Result<Client, String>,
}

impl Connection {
    pub fn new(base_url: impl Into<String>, auth: Auth, transport_options: TransportOptions) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http_client = build_http_client(&transport_options).map_err(|e| {
            tracing::warn!(base_url = %base_url, "failed to build HTTP client: {}", e);
            e.to_string()
        });
        Self {
            base_url,
            auth,
            transport_options,
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport_options(&self) -> &TransportOptions {
        &self.transport_options
    }

    /// Absolute URL for a path relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Start an authenticated request for `path`.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let http_client = self
            .http_client
            .as_ref()
            .map_err(|e| ClientError::Config(format!("HTTP client unavailable: {}", e)))?;
        let req = http_client.request(method, self.url(path));
        let req = self.auth.apply(req);
        Ok(add_extra_headers(req, &self.transport_options))
    }

    /// Send `request` under `ctx` and require a 2xx response.
    pub async fn send(
        &self,
        ctx: &Context,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let response = ctx
            .run(async { request.send().await.map_err(ClientError::from) })
            .await?;
        ensure_success(response).await
    }
}

/// Turn a non-2xx response into a status error carrying a body excerpt.
pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text_logged().await.unwrap_or_default();
    Err(ClientError::status(status, &body))
}

/// Extension trait for RequestBuilder that logs request body.
pub trait RequestBuilderExt {
    /// Set JSON request body and log it. Returns the RequestBuilder for chaining.
    fn json_logged<T: serde::Serialize + ?Sized>(self, json: &T) -> Self;
}

impl RequestBuilderExt for RequestBuilder {
    fn json_logged<T: serde::Serialize + ?Sized>(self, json: &T) -> Self {
        if let Ok(req_body) = serde_json::to_string_pretty(json) {
            tracing::debug!("API request body ({} bytes):\n{}", req_body.len(), req_body);
        }

        self.json(json)
    }
}

/// Extension trait for Response that logs response body.
#[async_trait::async_trait]
pub trait ResponseExt {
    /// Get response text and log it. Consumes the response.
    async fn text_logged(self) -> Result<String, reqwest::Error>;

    /// Parse response as JSON and log it. Consumes the response.
    async fn json_logged<T: serde::de::DeserializeOwned>(self) -> Result<T, ClientError>;

    /// Drain the body without decoding it. Consumes the response.
    async fn bytes_logged(self) -> Result<bytes::Bytes, ClientError>;
}

#[async_trait::async_trait]
impl ResponseExt for reqwest::Response {
    async fn text_logged(self) -> Result<String, reqwest::Error> {
        let text = self.text().await?;
        tracing::debug!("API response ({} bytes):\n{}", text.len(), text);
        Ok(text)
    }

    async fn json_logged<T: serde::de::DeserializeOwned>(self) -> Result<T, ClientError> {
        let bytes = self.bytes().await?;

        if let Ok(text) = std::str::from_utf8(&bytes) {
            tracing::debug!("API response ({} bytes):\n{}", text.len(), text);
        }

        serde_json::from_slice(&bytes).map_err(ClientError::from)
    }

    async fn bytes_logged(self) -> Result<bytes::Bytes, ClientError> {
        let content_type = self
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let bytes = self.bytes().await?;
        tracing::debug!("API response ({} bytes, {})", bytes.len(), content_type);
        Ok(bytes)
    }
}
