//! Error classification and malformed-response tests

use base64::Engine as _;
use stability_ai::{
    GenerateOptions, Stability, StabilityConfig, StabilityError, VideoOptions,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_client(mock_server: &MockServer) -> Stability {
    Stability::with_config(
        StabilityConfig::new("test_api_key").with_base_url(mock_server.uri()),
    )
    .expect("Failed to create test client")
}

async fn generate_with_status(
    status: u16,
    body: serde_json::Value,
) -> Result<stability_ai::ContentResult, StabilityError> {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2beta/stable-image/generate/core"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    client.generate_core("test", GenerateOptions::new()).await
}

// ============ Status Classification ============

#[tokio::test]
async fn test_400_maps_to_invalid_request() {
    let error = generate_with_status(400, serde_json::json!({"errors": ["bad prompt"]}))
        .await
        .expect_err("400 must fail");

    match &error {
        StabilityError::InvalidRequest { message, .. } => {
            assert!(message.contains("bad prompt"), "body must be embedded: {message}");
        }
        other => panic!("Expected InvalidRequest, got {other:?}"),
    }
    assert_eq!(error.status(), Some(400));
}

#[tokio::test]
async fn test_401_maps_to_unauthorized() {
    let error = generate_with_status(401, serde_json::json!({"message": "invalid key"}))
        .await
        .expect_err("401 must fail");
    assert!(matches!(error, StabilityError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_403_maps_to_content_moderation() {
    let error = generate_with_status(403, serde_json::json!({"name": "content_moderation"}))
        .await
        .expect_err("403 must fail");
    assert!(matches!(error, StabilityError::ContentModeration { .. }));
}

#[tokio::test]
async fn test_404_maps_to_record_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2beta/results/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"name": "not_found"})),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let error = client
        .fetch_async_result("missing")
        .await
        .expect_err("404 must fail");
    assert!(matches!(error, StabilityError::RecordNotFound { .. }));
}

#[tokio::test]
async fn test_unexpected_status_maps_to_unknown() {
    let error = generate_with_status(500, serde_json::json!({"message": "boom"}))
        .await
        .expect_err("500 must fail");

    match error {
        StabilityError::Unknown { status, .. } => assert_eq!(status, 500),
        other => panic!("Expected Unknown, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body_is_preserved() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2beta/stable-image/generate/core"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let error = client
        .generate_core("test", GenerateOptions::new())
        .await
        .expect_err("502 must fail");

    match &error {
        StabilityError::Unknown { message, .. } => {
            assert!(message.contains("bad gateway"), "raw body lost: {message}");
        }
        other => panic!("Expected Unknown, got {other:?}"),
    }
}

// ============ Malformed Success Responses ============

#[tokio::test]
async fn test_success_without_media_is_malformed() {
    let error = generate_with_status(200, serde_json::json!({"finish_reason": "SUCCESS"}))
        .await
        .expect_err("Missing media field must fail");
    assert!(matches!(error, StabilityError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_invalid_base64_is_malformed() {
    let error = generate_with_status(
        200,
        serde_json::json!({"image": "not$valid$base64", "finish_reason": "SUCCESS"}),
    )
    .await
    .expect_err("Invalid base64 must fail");
    assert!(matches!(error, StabilityError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_error_finish_reason_flags_result() {
    let encoded = base64::engine::general_purpose::STANDARD.encode(b"partial");
    let result = generate_with_status(
        200,
        serde_json::json!({"image": encoded, "finish_reason": "ERROR"}),
    )
    .await
    .expect("Decoding still succeeds");

    assert!(result.errored);
    assert!(!result.content_filtered);
    std::fs::remove_file(&result.filepath).ok();
}

// ============ Async Protocol Errors ============

#[tokio::test]
async fn test_poll_propagates_client_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2beta/image-to-video/result/job-1"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({"errors": ["bad id"]})),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let error = client
        .image_to_video_result("job-1")
        .await
        .expect_err("4xx during polling must abort");
    assert!(matches!(error, StabilityError::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_submission_ack_without_id_fails() {
    let mock_server = MockServer::start().await;
    let input = tempfile::NamedTempFile::new().expect("create temp image");
    std::fs::write(input.path(), b"fake-png-bytes").expect("write temp image");

    Mock::given(method("POST"))
        .and(path("/v2beta/image-to-video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let error = client
        .image_to_video(&input.path().to_string_lossy(), VideoOptions::new())
        .await
        .expect_err("Ack without id must fail");

    match error {
        StabilityError::Unknown { status, .. } => assert_eq!(status, 200),
        other => panic!("Expected Unknown, got {other:?}"),
    }
}

// ============ Input Validation ============

#[tokio::test]
async fn test_nonexistent_local_path_rejected_before_network() {
    // no mock server needed; validation happens before any request
    let client = Stability::new("test_api_key").expect("Failed to create client");
    let error = client
        .generate_sd3(
            "test",
            stability_ai::Sd3Options::new().with_mode(stability_ai::Sd3Mode::ImageToImage {
                image: "/no/such/file.png".to_string(),
                strength: 0.5,
            }),
        )
        .await
        .expect_err("Missing file must fail");
    assert!(matches!(error, StabilityError::InvalidRequest { .. }));
}
