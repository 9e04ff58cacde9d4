// Bounded fixed-delay retry for provider-bound requests

use crate::error::{BouquetError, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Fixed delay between attempts; no exponential backoff.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2000);

/// Determine if an HTTP status code is retryable.
pub fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Extract a human-readable message from a conventional
/// `{"error":{"message":...}}` envelope.
pub fn extract_error_message(body: &str) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct ErrorResponse {
        error: Option<ErrorDetail>,
    }

    #[derive(serde::Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|resp| resp.error)
        .and_then(|detail| detail.message)
}

/// Send a request, retrying transient failures with a fixed delay.
///
/// - 2xx: returned immediately.
/// - 429 or 5xx: retried while budget remains, then surfaced as
///   [`BouquetError::TransientApi`].
/// - Network-level errors: retried while budget remains, then surfaced as
///   [`BouquetError::TransientApi`] with no status.
/// - Any other non-2xx: fails immediately as
///   [`BouquetError::PermanentApi`].
///
/// The error message is taken from the server's `{"error":{"message"}}`
/// envelope when present, otherwise a generic one carrying the status.
///
/// The attempt budget is an explicit loop counter, not recursion, so a
/// request is sent at most `1 + max_retries` times.
pub async fn send_with_retry(
    operation_name: &str,
    request: RequestBuilder,
    max_retries: u32,
    retry_delay: Duration,
) -> Result<Response> {
    let mut remaining = max_retries;

    loop {
        let attempt = request.try_clone().ok_or_else(|| {
            BouquetError::Internal(format!("{operation_name}: request is not cloneable"))
        })?;

        match attempt.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    if remaining < max_retries {
                        debug!(
                            "{} succeeded after {} retries",
                            operation_name,
                            max_retries - remaining
                        );
                    }
                    return Ok(response);
                }

                if is_retryable(status) && remaining > 0 {
                    warn!(
                        "{} failed with {}, retrying in {}ms ({} retries left)",
                        operation_name,
                        status,
                        retry_delay.as_millis(),
                        remaining
                    );
                    remaining -= 1;
                    tokio::time::sleep(retry_delay).await;
                    continue;
                }

                let body = response.text().await.unwrap_or_default();
                let message = extract_error_message(&body)
                    .unwrap_or_else(|| format!("API error: {}", status.as_u16()));

                return Err(if is_retryable(status) {
                    BouquetError::TransientApi {
                        status: Some(status.as_u16()),
                        message,
                    }
                } else {
                    BouquetError::PermanentApi {
                        status: status.as_u16(),
                        message,
                    }
                });
            }
            Err(err) => {
                if remaining > 0 {
                    warn!(
                        "{} failed with network error ({}), retrying in {}ms ({} retries left)",
                        operation_name,
                        err,
                        retry_delay.as_millis(),
                        remaining
                    );
                    remaining -= 1;
                    tokio::time::sleep(retry_delay).await;
                    continue;
                }

                return Err(BouquetError::TransientApi {
                    status: None,
                    message: format!("network error: {err}"),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable(StatusCode::GATEWAY_TIMEOUT));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
        assert!(!is_retryable(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_extract_error_message() {
        let body = r#"{"error":{"message":"quota exceeded","type":"api_error"}}"#;
        assert_eq!(extract_error_message(body).unwrap(), "quota exceeded");
    }

    #[test]
    fn test_extract_error_message_missing() {
        assert!(extract_error_message("not json").is_none());
        assert!(extract_error_message(r#"{"error":{}}"#).is_none());
        assert!(extract_error_message(r#"{"result":"ok"}"#).is_none());
    }
}
