// Error taxonomy and envelope tests

use axum::http::StatusCode;
use axum::response::IntoResponse;
use bouquetly::error::BouquetError;
use serde_json::Value;

#[test]
fn test_error_display_messages() {
    let errors = vec![
        BouquetError::Validation("At least one flower must be selected".to_string()),
        BouquetError::TransientApi {
            status: Some(503),
            message: "unavailable".to_string(),
        },
        BouquetError::PermanentApi {
            status: 404,
            message: "no such model".to_string(),
        },
        BouquetError::Parse {
            message: "missing `suggestions` field".to_string(),
            text: "{}".to_string(),
        },
        BouquetError::Timeout("operation op-1 did not finish".to_string()),
        BouquetError::Config("bad value".to_string()),
        BouquetError::Internal("broken".to_string()),
    ];

    for error in errors {
        let display = format!("{}", error);
        assert!(!display.is_empty(), "Error should have display message");
    }
}

#[test]
fn test_permanent_api_error_carries_upstream_message() {
    let error = BouquetError::PermanentApi {
        status: 404,
        message: "no such model".to_string(),
    };
    assert_eq!(format!("{}", error), "no such model");
}

#[test]
fn test_parse_error_mentions_parsing() {
    let error = BouquetError::Parse {
        message: "not well-formed JSON".to_string(),
        text: "oops".to_string(),
    };
    assert!(format!("{}", error).contains("parse"));
}

async fn envelope_of(error: BouquetError) -> (StatusCode, Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_validation_maps_to_400() {
    let (status, body) = envelope_of(BouquetError::Validation(
        "Missing authorization header".to_string(),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "validation_error");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("authorization"));
}

#[tokio::test]
async fn test_timeout_maps_to_408() {
    let (status, body) = envelope_of(BouquetError::Timeout("op-1".to_string())).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["error"]["type"], "timeout_error");
}

#[tokio::test]
async fn test_permanent_api_mirrors_upstream_status() {
    let (status, body) = envelope_of(BouquetError::PermanentApi {
        status: 404,
        message: "no such model".to_string(),
    })
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "api_error");
    assert_eq!(body["error"]["message"], "no such model");
}

#[tokio::test]
async fn test_transient_api_maps_to_502() {
    let (status, body) = envelope_of(BouquetError::TransientApi {
        status: Some(503),
        message: "unavailable".to_string(),
    })
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["type"], "api_error");
}

#[tokio::test]
async fn test_parse_maps_to_500() {
    let (status, body) = envelope_of(BouquetError::Parse {
        message: "not well-formed JSON".to_string(),
        text: "oops".to_string(),
    })
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["type"], "parse_error");
}
