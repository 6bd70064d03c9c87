use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aiprobe::providers::{Mistral, Provider};
use aiprobe::{Client, ClientError, Context, EndpointStatus, ProviderOptions, ProviderRegistry};

fn boxed_mistral(api_key: String, options: ProviderOptions) -> Box<dyn Client> {
    Box::new(Mistral::create_with_options(api_key, options))
}

#[test]
fn test_builtin_registry_names() {
    let registry = ProviderRegistry::with_builtin();
    let names: Vec<_> = registry.names().collect();
    assert_eq!(
        names,
        vec![
            "anthropic",
            "deepgram",
            "elevenlabs",
            "fal",
            "gemini",
            "groq",
            "mistral",
            "openai",
            "xai"
        ]
    );
}

#[test]
fn test_new_registry_is_empty() {
    let registry = ProviderRegistry::new();
    assert_eq!(registry.names().count(), 0);
    assert!(registry.lookup("openai").is_none());
}

#[test]
fn test_create_by_name() {
    let registry = ProviderRegistry::with_builtin();
    for name in registry.names() {
        let client = registry
            .create(name, "key".to_string(), ProviderOptions::default())
            .unwrap();
        assert_eq!(client.name(), name);
        assert!(!client.get_endpoints().is_empty());
    }
}

#[test]
fn test_unknown_provider_is_a_config_error() {
    let registry = ProviderRegistry::with_builtin();
    let err = registry
        .create("nope", "key".to_string(), ProviderOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, ClientError::Config(_)));
    assert!(err.to_string().contains("nope"));
}

#[test]
fn test_register_replaces_existing_entry() {
    let mut registry = ProviderRegistry::new();
    assert!(registry.register("chat-proxy", boxed_mistral).is_none());
    assert!(registry.register("chat-proxy", boxed_mistral).is_some());
    assert!(registry.contains("chat-proxy"));

    let client = registry
        .create("chat-proxy", "key".to_string(), ProviderOptions::default())
        .unwrap();
    assert_eq!(client.name(), "mistral");
}

#[test]
fn test_create_from_env() {
    let mut registry = ProviderRegistry::new();
    registry.register("registry-env-vendor", boxed_mistral);

    let err = registry
        .create_from_env("registry-env-vendor", ProviderOptions::default())
        .err()
        .unwrap();
    assert!(err.to_string().contains("REGISTRY_ENV_VENDOR_API_KEY"));

    std::env::set_var("REGISTRY_ENV_VENDOR_API_KEY", "from-env");
    assert!(registry
        .create_from_env("registry-env-vendor", ProviderOptions::default())
        .is_ok());

    assert!(matches!(
        registry.create_from_env("unregistered", ProviderOptions::default()),
        Err(ClientError::Config(_))
    ));
}

#[tokio::test]
async fn test_registry_client_validates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let registry = ProviderRegistry::with_builtin();
    let client = registry
        .create(
            "mistral",
            "key".to_string(),
            ProviderOptions::new().with_base_url(server.uri()),
        )
        .unwrap();

    client
        .validate_endpoints(&Context::background(), false)
        .await
        .unwrap();

    let endpoints = client.get_endpoints();
    assert_eq!(
        endpoints.find("/models").unwrap().status(),
        EndpointStatus::Working
    );
    let chat = endpoints.find("/chat/completions").unwrap();
    assert_eq!(chat.status(), EndpointStatus::Failed);
    assert!(chat.error().contains("503"));
}
