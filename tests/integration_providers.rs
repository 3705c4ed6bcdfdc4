#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// Tests for the remote embedding strategies against a mocked provider.

use std::time::Duration;

use askdocs::EngineError;
use askdocs::config::{EmbeddingConfig, EmbeddingProvider};
use askdocs::embeddings::{CohereEmbedder, Embedder, OpenAiEmbedder, create_embedder};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn remote_config(provider: EmbeddingProvider, base_url: &str) -> EmbeddingConfig {
    EmbeddingConfig {
        provider,
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url.to_string()),
        timeout_secs: 5,
        ..EmbeddingConfig::default()
    }
}

async fn embed_blocking(
    embedder: impl Embedder + 'static,
    text: &str,
) -> Result<Vec<f32>, EngineError> {
    let text = text.to_string();
    tokio::task::spawn_blocking(move || embedder.embed(&text))
        .await
        .expect("embed task completes")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn openai_embeds_and_sends_expected_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_json(serde_json::json!({
            "model": "text-embedding-3-small",
            "input": ["What is phishing?"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.25,0.5,0.25]}],"model":"text-embedding-3-small"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = remote_config(EmbeddingProvider::OpenAi, &server.uri());
    let embedder = OpenAiEmbedder::new(&config).expect("key is configured");

    let vector = embed_blocking(embedder, "What is phishing?")
        .await
        .expect("embedding succeeds");
    assert_eq!(vector, vec![0.25, 0.5, 0.25]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn openai_server_error_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = remote_config(EmbeddingProvider::OpenAi, &server.uri());
    let embedder = OpenAiEmbedder::new(&config).expect("key is configured");

    let err = embed_blocking(embedder, "anything")
        .await
        .expect_err("503 must fail");
    assert!(matches!(err, EngineError::Transport(_)), "got {:?}", err);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn openai_wrong_shape_is_unexpected_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"surprise":"no embeddings here"}"#),
        )
        .mount(&server)
        .await;

    let config = remote_config(EmbeddingProvider::OpenAi, &server.uri());
    let embedder = OpenAiEmbedder::new(&config).expect("key is configured");

    let err = embed_blocking(embedder, "anything")
        .await
        .expect_err("shape mismatch must fail");
    assert!(
        matches!(err, EngineError::UnexpectedResponse(_)),
        "got {:?}",
        err
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn openai_empty_data_is_unexpected_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":[]}"#))
        .mount(&server)
        .await;

    let config = remote_config(EmbeddingProvider::OpenAi, &server.uri());
    let embedder = OpenAiEmbedder::new(&config).expect("key is configured");

    let err = embed_blocking(embedder, "anything")
        .await
        .expect_err("empty data must fail");
    assert!(matches!(err, EngineError::UnexpectedResponse(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_provider_times_out_as_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"data":[{"embedding":[1.0]}]}"#)
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let config = remote_config(EmbeddingProvider::OpenAi, &server.uri());
    let embedder = OpenAiEmbedder::new(&config)
        .expect("key is configured")
        .with_timeout(Duration::from_millis(200));

    let err = embed_blocking(embedder, "anything")
        .await
        .expect_err("timeout must fail");
    assert!(matches!(err, EngineError::Transport(_)), "got {:?}", err);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cohere_embeds_and_sends_expected_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embed"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_json(serde_json::json!({
            "model": "embed-english-v3.0",
            "texts": ["What is phishing?"],
            "input_type": "search_document",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"id":"abc","embeddings":[[0.1,0.9]],"texts":["What is phishing?"]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = remote_config(EmbeddingProvider::Cohere, &server.uri());
    let embedder = CohereEmbedder::new(&config).expect("key is configured");

    let vector = embed_blocking(embedder, "What is phishing?")
        .await
        .expect("embedding succeeds");
    assert_eq!(vector, vec![0.1, 0.9]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cohere_client_error_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embed"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = remote_config(EmbeddingProvider::Cohere, &server.uri());
    let embedder = CohereEmbedder::new(&config).expect("key is configured");

    let err = embed_blocking(embedder, "anything")
        .await
        .expect_err("401 must fail");
    assert!(matches!(err, EngineError::Transport(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn factory_selects_the_configured_strategy() {
    let server = MockServer::start().await;

    let hash = create_embedder(&EmbeddingConfig::default()).expect("hash needs no credentials");
    assert_eq!(hash.name(), "hash");

    let openai = create_embedder(&remote_config(EmbeddingProvider::OpenAi, &server.uri()))
        .expect("key is configured");
    assert_eq!(openai.name(), "openai");

    let cohere = create_embedder(&remote_config(EmbeddingProvider::Cohere, &server.uri()))
        .expect("key is configured");
    assert_eq!(cohere.name(), "cohere");
}
