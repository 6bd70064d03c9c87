//! Provider and transport configuration.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::ClientError;
use crate::probe::StatusPolicy;

/// Transport configuration options.
///
/// Controls how requests are sent over the network.
#[derive(Debug, Clone)]
pub enum TransportOptions {
    /// HTTP transport configuration
    Http {
        /// Request timeout. If None, the provider's default timeout is used.
        timeout: Option<Duration>,
        /// HTTP proxy URL.
        proxy: Option<String>,
        /// Additional HTTP headers to send with every request.
        headers: Option<HashMap<String, String>>,
    },
}

impl Default for TransportOptions {
    fn default() -> Self {
        TransportOptions::Http {
            timeout: None,
            proxy: None,
            headers: None,
        }
    }
}

impl TransportOptions {
    /// Create new default HTTP transport options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        match &mut self {
            TransportOptions::Http { timeout, .. } => *timeout = Some(duration),
        }
        self
    }

    /// Set the proxy.
    pub fn with_proxy(mut self, proxy_url: String) -> Self {
        match &mut self {
            TransportOptions::Http { proxy, .. } => *proxy = Some(proxy_url),
        }
        self
    }

    /// Add a header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        match &mut self {
            TransportOptions::Http { headers, .. } => {
                headers.get_or_insert_with(HashMap::new).insert(key, value);
            }
        }
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        match self {
            TransportOptions::Http { timeout, .. } => *timeout,
        }
    }

    /// Use `default` unless a timeout was set explicitly.
    pub fn or_timeout(self, default: Duration) -> Self {
        match self.timeout() {
            Some(_) => self,
            None => self.with_timeout(default),
        }
    }
}

/// Per-instance provider configuration.
///
/// Everything is optional; unset values fall back to the vendor's defaults.
#[derive(Debug, Clone, Default)]
pub struct ProviderOptions {
    /// Override the vendor's API base URL (proxies, mock servers).
    pub base_url: Option<String>,
    /// Transport settings; the vendor's timeout applies when none is set.
    pub transport: TransportOptions,
    /// When set, exactly these endpoint paths are critical, replacing the
    /// vendor's defaults. An empty list disables the critical policy.
    pub critical_endpoints: Option<Vec<String>>,
    /// Override how probe responses are classified.
    pub status_policy: Option<StatusPolicy>,
}

impl ProviderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.transport = self.transport.with_timeout(timeout);
        self
    }

    /// Add `path` to the critical set.
    pub fn with_critical_endpoint(mut self, path: impl Into<String>) -> Self {
        self.critical_endpoints
            .get_or_insert_with(Vec::new)
            .push(path.into());
        self
    }

    /// No endpoint is critical; validation never fails as a whole.
    pub fn without_critical_endpoints(mut self) -> Self {
        self.critical_endpoints = Some(Vec::new());
        self
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = Some(policy);
        self
    }
}

/// Environment variable holding the API key for a provider name,
/// e.g. `"openai"` → `OPENAI_API_KEY`.
pub fn api_key_env_var(provider: &str) -> String {
    let name: String = provider
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_API_KEY", name)
}

/// Read the API key for `provider` from the environment.
pub fn api_key_from_env(provider: &str) -> Result<String, ClientError> {
    let var = api_key_env_var(provider);
    match std::env::var(&var) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        Ok(_) => Err(ClientError::Config(format!("{} is empty", var))),
        Err(_) => Err(ClientError::Config(format!("{} is not set", var))),
    }
}
