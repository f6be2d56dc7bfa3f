mod common;

use serde_json::json;
use threadcast_llm::openai::OpenAiClient;
use threadcast_llm::traits::LlmClient;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PERSONA: &str = "You are a professional AI social media manager with expertise in finding relevant resources.";

fn client_for(server: &MockServer) -> OpenAiClient {
    OpenAiClient::with_endpoint(
        "sk-test".to_string(),
        "gpt-4".to_string(),
        &format!("{}/v1", server.uri()),
    )
    .expect("client")
}

#[tokio::test]
async fn chat_completion_carries_persona_and_sampling_settings() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4",
            "max_tokens": 500,
            "temperature": 0.7,
            "messages": [
                { "role": "system", "content": PERSONA },
                { "role": "user", "content": "Write a tweet" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-4-0613",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "  TWEET: hi\nLINK: https://x.y  " } }
            ],
            "usage": { "prompt_tokens": 10, "completion_tokens": 8, "total_tokens": 18 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_for(&server)
        .generate("Write a tweet", Some(PERSONA), Some(500), Some(0.7))
        .await
        .expect("completion");

    assert_eq!(resp.text, "TWEET: hi\nLINK: https://x.y");
    assert_eq!(resp.model.as_deref(), Some("gpt-4-0613"));
    assert_eq!(resp.tokens_used, Some(18));
}

#[tokio::test]
async fn provider_errors_surface_as_generation_failures() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate("Write a tweet", None, Some(400), Some(0.7))
        .await
        .expect_err("401 must fail");
    let msg = err.to_string();
    assert!(msg.starts_with("Generation failed"), "{msg}");
    assert!(msg.contains("Incorrect API key provided"), "{msg}");
}

#[tokio::test]
async fn empty_choices_are_a_generation_failure() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.generate("hi", None, None, None).await.is_err());
    assert!(!client.health_check().await.expect("health check never errors"));
}

#[tokio::test]
#[ignore]
async fn openai_generate_smoketest() {
    common::init_test_tracing();
    let Ok(key) = std::env::var("OPENAI_API_KEY") else {
        tracing::debug!("Skipping: OPENAI_API_KEY not set");
        return;
    };
    let client = OpenAiClient::new(key, "gpt-4o-mini".to_string()).expect("client");
    let response = client
        .generate("Say Ok", None, Some(8), Some(0.2))
        .await
        .expect("live completion");
    assert!(!response.text.trim().is_empty());
}
