// Generation orchestrator tests: pathway selection, degradation, aborts

use axum::extract::State;
use axum::routing::post;
use axum::Router;
use bouquetly::config::GenerationConfig;
use bouquetly::error::BouquetError;
use bouquetly::generation::GenerationClient;
use bouquetly::models::bouquet::{
    Credentials, GenerationRequest, ImageRef, PromptTemplates,
};
use mockito::Matcher;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_test::assert_ok;

const BASIC_DESCRIPTION: &str = "A basic bouquet of rose, peony, fern.";
const ENHANCED_DESCRIPTION: &str = "An exquisite cascade of roses and peonies.";

fn fast_config() -> GenerationConfig {
    GenerationConfig {
        max_retries: 0,
        retry_delay_ms: 1,
        poll_interval_ms: 1,
        poll_timeout_seconds: 5,
        completion_timeout_seconds: 5,
        light_timeout_seconds: 5,
    }
}

fn prompts() -> PromptTemplates {
    PromptTemplates {
        system_prompt: "You are a professional florist.".to_string(),
        image_prompt: "A bouquet of {flowers} for {occasion} for {recipient}".to_string(),
        suggestion_prompt: "Suggest combinations for {occasion} for {recipient}".to_string(),
    }
}

fn yandex_request() -> GenerationRequest {
    GenerationRequest::new(
        "birthday",
        "Anna",
        vec!["rose".into(), "peony".into(), "fern".into()],
        "yandexgpt-pro",
        "yandex-art",
        0.7,
        prompts(),
        Credentials::Yandex {
            api_key: "test-key".into(),
            folder_id: "b1gtest".into(),
        },
    )
}

fn openai_request(image_model: &str) -> GenerationRequest {
    GenerationRequest::new(
        "birthday",
        "Anna",
        vec!["rose".into(), "peony".into()],
        "gpt-4o",
        image_model,
        0.7,
        prompts(),
        Credentials::OpenAi {
            api_key: "sk-test".into(),
            image_api_key: None,
        },
    )
}

fn completion_body(text: &str) -> String {
    json!({
        "result": {
            "alternatives": [{
                "message": { "role": "assistant", "text": text },
                "status": "ALTERNATIVE_STATUS_FINAL"
            }]
        }
    })
    .to_string()
}

/// Mock the base-description completion (maxTokens "500").
async fn mock_base_description(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/api/yandex/v1/completion")
        .match_header("authorization", "Api-Key test-key")
        .match_header("x-folder-id", "b1gtest")
        .match_body(Matcher::PartialJson(json!({
            "completionOptions": { "maxTokens": "500" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(BASIC_DESCRIPTION))
        .expect(1)
        .create_async()
        .await
}

#[tokio::test]
async fn test_empty_flower_list_fails_before_any_network_call() {
    let mut server = mockito::Server::new_async().await;
    let catch_all = server
        .mock("POST", Matcher::Regex(".*".to_string()))
        .expect(0)
        .create_async()
        .await;

    let client = GenerationClient::new(server.url(), fast_config()).unwrap();
    let mut request = yandex_request();
    request.flowers.clear();

    let err = client.generate_bouquet(&request).await.unwrap_err();
    assert!(matches!(err, BouquetError::Validation(_)));
    catch_all.assert_async().await;
}

#[tokio::test]
async fn test_mismatched_credentials_fail_suggestions() {
    let client = GenerationClient::new("http://127.0.0.1:1", fast_config()).unwrap();
    let mut request = yandex_request();
    request.credentials = Credentials::OpenAi {
        api_key: "sk-test".into(),
        image_api_key: None,
    };

    let err = client.get_suggestions(&request).await.unwrap_err();
    assert!(matches!(err, BouquetError::Validation(_)));
}

#[tokio::test]
async fn test_openai_pathway_single_image_for_higher_tier_model() {
    let mut server = mockito::Server::new_async().await;
    let chat = server
        .mock("POST", "/api/openai/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "Lovely bouquet." }
                }]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let images = server
        .mock("POST", "/api/openai/v1/images/generations")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({ "model": "dall-e-3", "n": 1 })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "data": [{ "url": "https://img.example/1.png" }] }).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = GenerationClient::new(server.url(), fast_config()).unwrap();
    let bouquet = client.generate_bouquet(&openai_request("dall-e-3")).await.unwrap();

    assert_eq!(bouquet.description, "Lovely bouquet.");
    assert_eq!(
        bouquet.images,
        vec![ImageRef::Url("https://img.example/1.png".to_string())]
    );
    assert_eq!(bouquet.flowers, vec!["rose", "peony"]);
    chat.assert_async().await;
    images.assert_async().await;
}

#[tokio::test]
async fn test_openai_pathway_three_images_for_lower_tier_model() {
    let mut server = mockito::Server::new_async().await;
    let _chat = server
        .mock("POST", "/api/openai/v1/chat/completions")
        .with_status(200)
        .with_body(
            json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "Lovely bouquet." }
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let images = server
        .mock("POST", "/api/openai/v1/images/generations")
        .with_status(200)
        .with_body(json!({ "data": [{ "url": "https://img.example/n.png" }] }).to_string())
        .expect(3)
        .create_async()
        .await;

    let client = GenerationClient::new(server.url(), fast_config()).unwrap();
    let bouquet = client.generate_bouquet(&openai_request("dall-e-2")).await.unwrap();

    assert_eq!(bouquet.images.len(), 3);
    images.assert_async().await;
}

#[tokio::test]
async fn test_openai_image_failure_aborts_whole_generation() {
    // The second of three image calls returns 400; the flow must abort
    // with the upstream message and never issue the third call.
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/api/openai/v1/chat/completions",
            post(|| async {
                axum::Json(json!({
                    "choices": [{
                        "message": { "role": "assistant", "content": "Lovely bouquet." }
                    }]
                }))
            }),
        )
        .route(
            "/api/openai/v1/images/generations",
            post(|State(hits): State<Arc<AtomicUsize>>| async move {
                if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                    (
                        axum::http::StatusCode::OK,
                        axum::Json(json!({ "data": [{ "url": "https://img.example/1.png" }] })),
                    )
                } else {
                    (
                        axum::http::StatusCode::BAD_REQUEST,
                        axum::Json(json!({ "error": { "message": "content policy violation" } })),
                    )
                }
            }),
        )
        .with_state(hits.clone());
    let base_url = spawn_stub(router).await;

    let client = GenerationClient::new(base_url, fast_config()).unwrap();
    let err = client
        .generate_bouquet(&openai_request("dall-e-2"))
        .await
        .unwrap_err();

    match err {
        BouquetError::PermanentApi { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "content policy violation");
        }
        other => panic!("expected permanent API error, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_yandex_pathway_full_success() {
    let mut server = mockito::Server::new_async().await;
    let base = mock_base_description(&mut server).await;
    let enhance = server
        .mock("POST", "/api/yandex/v1/completion")
        .match_body(Matcher::PartialJson(json!({
            "completionOptions": { "maxTokens": "1000" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(ENHANCED_DESCRIPTION))
        .expect(1)
        .create_async()
        .await;
    let submit = server
        .mock("POST", "/api/yandex/v1/images/generations")
        .match_header("authorization", "Api-Key test-key")
        .match_header("x-folder-id", "b1gtest")
        .match_body(Matcher::PartialJson(json!({
            "modelUri": "art://b1gtest/yandex-art/latest"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"op-7"}"#)
        .expect(2)
        .create_async()
        .await;
    let poll = server
        .mock("GET", "/api/operations/op-7")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"done":true,"response":{"image":"QQ=="}}"#)
        .expect(2)
        .create_async()
        .await;

    let client = GenerationClient::new(server.url(), fast_config()).unwrap();
    let bouquet = assert_ok!(client.generate_bouquet(&yandex_request()).await);

    assert_eq!(bouquet.description, ENHANCED_DESCRIPTION);
    assert_eq!(
        bouquet.images,
        vec![
            ImageRef::DataUri("data:image/jpeg;base64,QQ==".to_string()),
            ImageRef::DataUri("data:image/jpeg;base64,QQ==".to_string()),
        ]
    );
    base.assert_async().await;
    enhance.assert_async().await;
    submit.assert_async().await;
    poll.assert_async().await;
}

#[tokio::test]
async fn test_yandex_enhancement_failure_degrades_to_base_description() {
    let mut server = mockito::Server::new_async().await;
    let base = mock_base_description(&mut server).await;
    let enhance = server
        .mock("POST", "/api/yandex/v1/completion")
        .match_body(Matcher::PartialJson(json!({
            "completionOptions": { "maxTokens": "1000" }
        })))
        .with_status(500)
        .with_body(r#"{"error":{"message":"model unavailable"}}"#)
        .expect(1)
        .create_async()
        .await;
    // Degradation happens before any image job is submitted.
    let submit = server
        .mock("POST", "/api/yandex/v1/images/generations")
        .expect(0)
        .create_async()
        .await;

    let client = GenerationClient::new(server.url(), fast_config()).unwrap();
    let bouquet = client.generate_bouquet(&yandex_request()).await.unwrap();

    assert_eq!(bouquet.description, BASIC_DESCRIPTION);
    assert!(bouquet.images.is_empty());
    assert_eq!(bouquet.flowers, vec!["rose", "peony", "fern"]);
    base.assert_async().await;
    enhance.assert_async().await;
    submit.assert_async().await;
}

#[tokio::test]
async fn test_yandex_second_image_failure_keeps_collected_images() {
    let mut server = mockito::Server::new_async().await;
    let _base = mock_base_description(&mut server).await;
    let _enhance = server
        .mock("POST", "/api/yandex/v1/completion")
        .match_body(Matcher::PartialJson(json!({
            "completionOptions": { "maxTokens": "1000" }
        })))
        .with_status(200)
        .with_body(completion_body(ENHANCED_DESCRIPTION))
        .create_async()
        .await;
    let _submit = server
        .mock("POST", "/api/yandex/v1/images/generations")
        .with_status(200)
        .with_body(r#"{"id":"op-9"}"#)
        .expect(2)
        .create_async()
        .await;

    // First poll succeeds, second reports a provider error.
    let polls = Arc::new(AtomicUsize::new(0));
    let polls_in_mock = polls.clone();
    let _poll = server
        .mock("GET", "/api/operations/op-9")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body_from_request(move |_| {
            if polls_in_mock.fetch_add(1, Ordering::SeqCst) == 0 {
                br#"{"done":true,"response":{"image":"QQ=="}}"#.to_vec()
            } else {
                br#"{"done":true,"error":{"message":"prompt was filtered"}}"#.to_vec()
            }
        })
        .expect(2)
        .create_async()
        .await;

    let client = GenerationClient::new(server.url(), fast_config()).unwrap();
    let bouquet = client.generate_bouquet(&yandex_request()).await.unwrap();

    // Degraded: the enhanced description is dropped with the failure, the
    // image already collected is kept.
    assert_eq!(bouquet.description, BASIC_DESCRIPTION);
    assert_eq!(
        bouquet.images,
        vec![ImageRef::DataUri("data:image/jpeg;base64,QQ==".to_string())]
    );
}

#[tokio::test]
async fn test_yandex_suggestions_with_fenced_payload() {
    let mut server = mockito::Server::new_async().await;
    let payload = "```json\n{\"suggestions\": [[\"rose\", \"lily\", \"fern\"], [\"tulip\", \"iris\", \"mint\"]]}\n```";
    let completion = server
        .mock("POST", "/api/yandex/v1/completion")
        .match_body(Matcher::PartialJson(json!({
            "completionOptions": { "maxTokens": "2000" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(payload))
        .expect(1)
        .create_async()
        .await;

    let client = GenerationClient::new(server.url(), fast_config()).unwrap();
    let set = client.get_suggestions(&yandex_request()).await.unwrap();

    assert_eq!(set.len(), 2);
    assert_eq!(set.combinations[0], vec!["rose", "lily", "fern"]);
    completion.assert_async().await;
}

#[tokio::test]
async fn test_yandex_suggestions_parse_error_propagates() {
    let mut server = mockito::Server::new_async().await;
    let _completion = server
        .mock("POST", "/api/yandex/v1/completion")
        .with_status(200)
        .with_body(completion_body("I would recommend roses and lilies!"))
        .create_async()
        .await;

    let client = GenerationClient::new(server.url(), fast_config()).unwrap();
    let err = client.get_suggestions(&yandex_request()).await.unwrap_err();

    match err {
        BouquetError::Parse { text, .. } => {
            assert!(text.contains("roses and lilies"));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_openai_suggestions() {
    let mut server = mockito::Server::new_async().await;
    let chat = server
        .mock("POST", "/api/openai/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "{\"suggestions\": [[\"rose\", \"lily\", \"fern\"]]}"
                    }
                }]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = GenerationClient::new(server.url(), fast_config()).unwrap();
    let set = client.get_suggestions(&openai_request("dall-e-3")).await.unwrap();

    assert_eq!(set.len(), 1);
    chat.assert_async().await;
}

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
