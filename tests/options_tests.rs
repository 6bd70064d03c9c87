use std::time::Duration;

use aiprobe::options::{api_key_env_var, api_key_from_env, ProviderOptions, TransportOptions};
use aiprobe::{ClientError, StatusPolicy};

#[test]
fn test_transport_options_builder() {
    let options = TransportOptions::new()
        .with_timeout(Duration::from_secs(30))
        .with_proxy("http://proxy.example.com".to_string())
        .with_header("X-Custom-Header".to_string(), "Value".to_string());

    match options {
        TransportOptions::Http {
            timeout,
            proxy,
            headers,
        } => {
            assert_eq!(timeout, Some(Duration::from_secs(30)));
            assert_eq!(proxy, Some("http://proxy.example.com".to_string()));

            let headers = headers.unwrap();
            assert_eq!(headers.get("X-Custom-Header"), Some(&"Value".to_string()));
        }
    }
}

#[test]
fn test_explicit_timeout_beats_vendor_default() {
    let explicit = TransportOptions::new()
        .with_timeout(Duration::from_secs(5))
        .or_timeout(Duration::from_secs(60));
    assert_eq!(explicit.timeout(), Some(Duration::from_secs(5)));

    let defaulted = TransportOptions::new().or_timeout(Duration::from_secs(60));
    assert_eq!(defaulted.timeout(), Some(Duration::from_secs(60)));
}

#[test]
fn test_provider_options_builder() {
    let options = ProviderOptions::new()
        .with_base_url("http://localhost:8080/v1")
        .with_timeout(Duration::from_secs(3))
        .with_critical_endpoint("/models")
        .with_critical_endpoint("/chat/completions")
        .with_status_policy(StatusPolicy::Reachable);

    assert_eq!(options.base_url.as_deref(), Some("http://localhost:8080/v1"));
    assert_eq!(options.transport.timeout(), Some(Duration::from_secs(3)));
    assert_eq!(
        options.critical_endpoints,
        Some(vec!["/models".to_string(), "/chat/completions".to_string()])
    );
    assert_eq!(options.status_policy, Some(StatusPolicy::Reachable));

    let options = options.without_critical_endpoints();
    assert_eq!(options.critical_endpoints, Some(Vec::new()));
}

#[test]
fn test_provider_options_default_is_empty() {
    let options = ProviderOptions::default();
    assert!(options.base_url.is_none());
    assert!(options.transport.timeout().is_none());
    assert!(options.critical_endpoints.is_none());
    assert!(options.status_policy.is_none());
}

#[test]
fn test_api_key_env_var_names() {
    assert_eq!(api_key_env_var("openai"), "OPENAI_API_KEY");
    assert_eq!(api_key_env_var("xai"), "XAI_API_KEY");
    assert_eq!(api_key_env_var("my-vendor"), "MY_VENDOR_API_KEY");
}

#[test]
fn test_api_key_from_env() {
    std::env::set_var("OPTIONS_TEST_VENDOR_API_KEY", "  secret  ");
    assert_eq!(api_key_from_env("options-test-vendor").unwrap(), "secret");

    std::env::set_var("OPTIONS_TEST_BLANK_API_KEY", "   ");
    assert!(matches!(
        api_key_from_env("options-test-blank"),
        Err(ClientError::Config(_))
    ));

    assert!(matches!(
        api_key_from_env("options-test-missing"),
        Err(ClientError::Config(_))
    ));
}
