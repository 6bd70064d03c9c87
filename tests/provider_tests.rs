use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aiprobe::providers::{
    Anthropic, Deepgram, ElevenLabs, Fal, Gemini, Groq, Mistral, OpenAi, Provider, XAI,
};
use aiprobe::{Client, ClientError, Context, EndpointStatus, ProviderOptions, StatusPolicy};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn options(server: &MockServer) -> ProviderOptions {
    ProviderOptions::new().with_base_url(server.uri())
}

fn assert_all_working(client: &dyn Client) {
    for endpoint in client.get_endpoints().snapshot() {
        assert_eq!(
            endpoint.status(),
            EndpointStatus::Working,
            "{} {} failed: {}",
            endpoint.method(),
            endpoint.path(),
            endpoint.error()
        );
    }
}

#[test]
fn test_provider_names() {
    assert_eq!(OpenAi::create("k".to_string()).name(), "openai");
    assert_eq!(Anthropic::create("k".to_string()).name(), "anthropic");
    assert_eq!(Gemini::create("k".to_string()).name(), "gemini");
    assert_eq!(Groq::create("k".to_string()).name(), "groq");
    assert_eq!(XAI::create("k".to_string()).name(), "xai");
    assert_eq!(Mistral::create("k".to_string()).name(), "mistral");
    assert_eq!(ElevenLabs::create("k".to_string()).name(), "elevenlabs");
    assert_eq!(Deepgram::create("k".to_string()).name(), "deepgram");
    assert_eq!(Fal::create("k".to_string()).name(), "fal");
}

#[test]
fn test_endpoint_table_is_built_once() {
    let client = OpenAi::create("k".to_string());
    let first = client.get_endpoints();
    let second = client.get_endpoints();

    assert!(first.ptr_eq(&second));
    assert_eq!(first.len(), 5);
    for endpoint in first.snapshot() {
        assert_eq!(endpoint.status(), EndpointStatus::Unknown);
        assert!(endpoint.path().starts_with('/'));
        assert!(!endpoint.description().is_empty());
    }
}

#[test]
fn test_capabilities_match_vendor() {
    let openai = OpenAi::create("k".to_string()).get_capabilities();
    assert!(openai.text_generation && openai.image_generation && openai.realtime);

    let deepgram = Deepgram::create("k".to_string()).get_capabilities();
    assert!(deepgram.speech_to_text && deepgram.text_to_speech);
    assert!(!deepgram.text_generation);

    let fal = Fal::create("k".to_string()).get_capabilities();
    assert!(fal.image_generation && fal.video_generation);
    assert!(!fal.text_generation);

    let mistral = Mistral::create("k".to_string()).get_capabilities();
    assert!(mistral.text_generation && mistral.embeddings);
    assert!(mistral.speech_to_text);
}

#[tokio::test]
async fn test_openai_list_models_enriches_and_dedups() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                { "id": "whisper-1", "object": "model", "created": 1677532384, "owned_by": "openai-internal" },
                { "id": "gpt-4o-mini", "object": "model", "created": 1721172741, "owned_by": "system" },
                { "id": "gpt-4o-mini", "object": "model", "created": 1721172741, "owned_by": "system" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAi::create_with_options("test-key".to_string(), options(&server));
    let models = client.list_models(&Context::background()).await.unwrap();

    let ids: Vec<_> = models.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["gpt-4o-mini", "whisper-1"]);

    let mini = &models[0];
    assert_eq!(mini.provider, "openai");
    assert_eq!(mini.created, Some(1721172741));
    assert_eq!(mini.context_window, Some(128_000));
    assert!(mini.capabilities.text_generation);
    assert!(mini.pricing.is_some());

    let whisper = &models[1];
    assert!(whisper.capabilities.speech_to_text);
    assert!(!whisper.capabilities.text_generation);
}

#[tokio::test]
async fn test_openai_validates_every_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(vec![0xff, 0xf3, 0x44, 0xc4]),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/realtime/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "sess_1" })))
        .mount(&server)
        .await;

    let client = OpenAi::create_with_options("test-key".to_string(), options(&server));
    client
        .validate_endpoints(&Context::background(), true)
        .await
        .unwrap();

    assert_all_working(&client);
}

#[tokio::test]
async fn test_openai_empty_audio_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = OpenAi::create_with_options("test-key".to_string(), options(&server));
    client
        .validate_endpoints(&Context::background(), false)
        .await
        .unwrap();

    let speech = client.get_endpoints().find("/audio/speech").unwrap();
    assert_eq!(speech.status(), EndpointStatus::Failed);
    assert!(speech.error().contains("empty response body"));

    // Unmocked routes answer 404.
    let models = client.get_endpoints().find("/models").unwrap();
    assert_eq!(models.status(), EndpointStatus::Failed);
    assert!(models.error().contains("404"));
}

#[tokio::test]
async fn test_openai_chat_smoke_test() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "ok" }, "finish_reason": "stop" }
            ],
            "usage": { "prompt_tokens": 12, "completion_tokens": 1, "total_tokens": 13 }
        })))
        .mount(&server)
        .await;

    let client = OpenAi::create_with_options("test-key".to_string(), options(&server));
    let result = client
        .test_model(&Context::background(), "gpt-4o-mini")
        .await
        .unwrap();

    assert_eq!(result.model, "gpt-4o-mini");
    assert!(result.detail.contains("ok"));
    assert!(result.detail.contains("12 prompt"));
}

#[tokio::test]
async fn test_openai_embedding_smoke_test_is_unsupported() {
    let client = OpenAi::create("k".to_string());
    let err = client
        .test_model(&Context::background(), "text-embedding-3-small")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unsupported(_)));
}

#[tokio::test]
async fn test_smoke_test_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "message": "The model `nope` does not exist" }
        })))
        .mount(&server)
        .await;

    let client = Groq::create_with_options("k".to_string(), options(&server));
    let err = client
        .test_model(&Context::background(), "nope")
        .await
        .unwrap_err();

    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status.as_u16(), 404);
            assert!(body.contains("does not exist"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_anthropic_sends_vendor_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("x-api-key", "ant-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "type": "model", "id": "claude-3-5-haiku-20241022", "display_name": "Claude Haiku 3.5" }
            ],
            "has_more": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "ant-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "content": [{ "type": "text", "text": "ok" }],
            "usage": { "input_tokens": 14, "output_tokens": 1 }
        })))
        .mount(&server)
        .await;

    let client = Anthropic::create_with_options("ant-key".to_string(), options(&server));
    let ctx = Context::background();

    let models = client.list_models(&ctx).await.unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, "Claude Haiku 3.5");
    assert!(models[0].pricing.is_some());

    client.validate_endpoints(&ctx, false).await.unwrap();
    assert_all_working(&client);

    let result = client
        .test_model(&ctx, "claude-3-5-haiku-20241022")
        .await
        .unwrap();
    assert!(result.detail.contains("14 input"));
}

#[tokio::test]
async fn test_gemini_models_endpoint_is_critical() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let client = Gemini::create_with_options("g-key".to_string(), options(&server));
    let err = client
        .validate_endpoints(&Context::background(), false)
        .await
        .unwrap_err();

    match err {
        ClientError::CriticalEndpoint { path, error } => {
            assert_eq!(path, "/models");
            assert!(error.contains("403"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let generate = client
        .get_endpoints()
        .find("/models/gemini-2.0-flash:generateContent")
        .unwrap();
    assert_eq!(generate.status(), EndpointStatus::Working);
}

#[tokio::test]
async fn test_gemini_critical_policy_can_be_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = Gemini::create_with_options(
        "g-key".to_string(),
        options(&server).without_critical_endpoints(),
    );
    client
        .validate_endpoints(&Context::background(), false)
        .await
        .unwrap();

    let models = client.get_endpoints().find("/models").unwrap();
    assert!(!models.is_critical());
    assert_eq!(models.status(), EndpointStatus::Failed);
}

#[tokio::test]
async fn test_gemini_list_models_strips_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("x-goog-api-key", "g-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {
                    "name": "models/gemini-2.0-flash",
                    "displayName": "Gemini 2.0 Flash",
                    "inputTokenLimit": 1048576,
                    "outputTokenLimit": 8192,
                    "supportedGenerationMethods": ["generateContent", "countTokens"]
                },
                {
                    "name": "models/text-embedding-004",
                    "displayName": "Text Embedding 004",
                    "supportedGenerationMethods": ["embedContent"]
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = Gemini::create_with_options("g-key".to_string(), options(&server));
    let models = client.list_models(&Context::background()).await.unwrap();

    assert_eq!(models[0].id, "gemini-2.0-flash");
    assert_eq!(models[0].name, "Gemini 2.0 Flash");
    assert!(models[0].capabilities.text_generation);
    assert_eq!(models[1].id, "text-embedding-004");
    assert!(models[1].capabilities.embeddings);
}

#[tokio::test]
async fn test_fal_client_errors_count_as_reachable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Key fal-key"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "detail": "invalid" })))
        .mount(&server)
        .await;

    let client = Fal::create_with_options("fal-key".to_string(), options(&server));
    client
        .validate_endpoints(&Context::background(), false)
        .await
        .unwrap();

    assert_all_working(&client);
}

#[tokio::test]
async fn test_strict_policy_override_rejects_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;

    let client = Fal::create_with_options(
        "fal-key".to_string(),
        options(&server).with_status_policy(StatusPolicy::SuccessOnly),
    );
    client
        .validate_endpoints(&Context::background(), false)
        .await
        .unwrap();

    for endpoint in client.get_endpoints().snapshot() {
        assert_eq!(endpoint.status(), EndpointStatus::Failed);
        assert!(endpoint.error().contains("422"));
    }
}

#[tokio::test]
async fn test_fal_lists_static_catalog() {
    let client = Fal::create("fal-key".to_string());
    let models = client.list_models(&Context::background()).await.unwrap();

    assert!(!models.is_empty());
    assert!(models.windows(2).all(|w| w[0].id < w[1].id));
    let ltx = models.iter().find(|m| m.id == "fal-ai/ltx-video").unwrap();
    assert!(ltx.capabilities.video_generation);

    let ctx = Context::background();
    ctx.cancel();
    assert!(matches!(
        client.list_models(&ctx).await,
        Err(ClientError::Cancelled)
    ));
}

#[tokio::test]
async fn test_deepgram_probes_audio_routes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("authorization", "Token dg-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "stt": [], "tts": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/listen"))
        .and(query_param("model", "nova-2"))
        .and(header("content-type", "audio/wav"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": { "channels": [{ "alternatives": [{ "transcript": "" }] }] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/speak"))
        .and(query_param("model", "aura-asteria-en"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 32]))
        .mount(&server)
        .await;

    let client = Deepgram::create_with_options("dg-key".to_string(), options(&server));
    client
        .validate_endpoints(&Context::background(), false)
        .await
        .unwrap();
    assert_all_working(&client);

    let result = client
        .test_model(&Context::background(), "aura-asteria-en")
        .await
        .unwrap();
    assert_eq!(result.detail, "32 bytes of audio");
}

#[tokio::test]
async fn test_deepgram_lists_both_model_families() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stt": [
                { "name": "nova-2", "canonical_name": "nova-2-general" }
            ],
            "tts": [
                { "name": "asteria", "canonical_name": "aura-asteria-en" }
            ]
        })))
        .mount(&server)
        .await;

    let client = Deepgram::create_with_options("dg-key".to_string(), options(&server));
    let models = client.list_models(&Context::background()).await.unwrap();

    assert_eq!(models.len(), 2);
    assert_eq!(models[0].id, "aura-asteria-en");
    assert!(models[0].capabilities.text_to_speech);
    assert_eq!(models[1].id, "nova-2-general");
    assert!(models[1].capabilities.speech_to_text);
}

#[tokio::test]
async fn test_elevenlabs_speech_smoke_test() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/text-to-speech/21m00Tcm4TlvDq8ikWAM"))
        .and(header("xi-api-key", "el-key"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 3]))
        .mount(&server)
        .await;

    let client = ElevenLabs::create_with_options("el-key".to_string(), options(&server));
    let result = client
        .test_model(&Context::background(), "eleven_flash_v2_5")
        .await
        .unwrap();
    assert_eq!(result.detail, "3 bytes of audio");

    let err = client
        .test_model(&Context::background(), "scribe_v1")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unsupported(_)));
}

#[tokio::test]
async fn test_elevenlabs_list_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "model_id": "eleven_multilingual_v2",
                "name": "Eleven Multilingual v2",
                "description": "",
                "can_do_text_to_speech": true
            },
            {
                "model_id": "eleven_flash_v2_5",
                "name": "Eleven Flash v2.5",
                "can_do_text_to_speech": true
            }
        ])))
        .mount(&server)
        .await;

    let client = ElevenLabs::create_with_options("el-key".to_string(), options(&server));
    let models = client.list_models(&Context::background()).await.unwrap();

    assert_eq!(models[0].id, "eleven_flash_v2_5");
    assert_eq!(
        models[0].description.as_deref(),
        Some("Low-latency speech synthesis")
    );
    assert_eq!(models[1].name, "Eleven Multilingual v2");
    assert!(models[1].description.is_none());
}

#[tokio::test]
async fn test_elevenlabs_reported_tts_flag_wins() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "model_id": "eleven_english_sts_v2",
                "name": "Eleven English v2",
                "can_do_text_to_speech": false
            },
            {
                "model_id": "eleven_turbo_v2",
                "name": "Eleven Turbo v2",
                "can_do_text_to_speech": false
            },
            {
                "model_id": "eleven_v3",
                "name": "Eleven v3"
            }
        ])))
        .mount(&server)
        .await;

    let client = ElevenLabs::create_with_options("el-key".to_string(), options(&server));
    let models = client.list_models(&Context::background()).await.unwrap();

    let sts = models.iter().find(|m| m.id == "eleven_english_sts_v2").unwrap();
    assert!(!sts.capabilities.text_to_speech);
    let turbo = models.iter().find(|m| m.id == "eleven_turbo_v2").unwrap();
    assert!(!turbo.capabilities.text_to_speech);
    let v3 = models.iter().find(|m| m.id == "eleven_v3").unwrap();
    assert!(v3.capabilities.text_to_speech);

    let err = client
        .test_model(&Context::background(), "eleven_english_sts_v2")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unsupported(_)));
}

#[tokio::test]
async fn test_xai_image_smoke_test() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "url": "https://example.invalid/a.png" }]
        })))
        .mount(&server)
        .await;

    let client = XAI::create_with_options("x-key".to_string(), options(&server));
    let result = client
        .test_model(&Context::background(), "grok-2-image")
        .await
        .unwrap();
    assert_eq!(result.detail, "1 image(s)");
}
