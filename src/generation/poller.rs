// Long-running operation polling for async image jobs

use super::orchestrator::GenerationClient;
use crate::error::{BouquetError, Result};
use crate::models::bouquet::{Credentials, OperationStatus};
use crate::models::yandex::Operation;
use base64::Engine;
use std::time::Duration;
use tracing::{debug, warn};

impl GenerationClient {
    /// Poll an async image operation until it reports done or the attempt
    /// ceiling is reached.
    ///
    /// One status check per poll interval. A failed check (non-2xx,
    /// transport error, or an undecodable body) is logged and the loop
    /// moves on to the next tick; it still consumes one attempt, so the
    /// loop terminates after at most `poll_timeout_seconds` checks.
    ///
    /// The returned status is terminal: `Succeeded` with the base64 image
    /// payload, `Failed` with the provider's error, or `TimedOut` when the
    /// ceiling is exhausted.
    pub async fn poll_operation(
        &self,
        operation_id: &str,
        credentials: &Credentials,
    ) -> Result<OperationStatus> {
        let Credentials::Yandex { api_key, folder_id } = credentials else {
            return Err(BouquetError::Validation(
                "operation polling requires Yandex credentials".to_string(),
            ));
        };

        let url = format!("{}/api/operations/{}", self.base_url, operation_id);
        let max_attempts = self.config.poll_timeout_seconds;
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        for attempt in 1..=max_attempts {
            let result = self
                .http
                .get(&url)
                .header("Authorization", format!("Api-Key {}", api_key.expose()))
                .header("x-folder-id", folder_id)
                .timeout(Duration::from_secs(self.config.light_timeout_seconds))
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    match response.json::<Operation>().await {
                        Ok(operation) if operation.done => {
                            return Ok(Self::terminal_status(operation_id, attempt, operation));
                        }
                        Ok(_) => {
                            debug!(
                                "Operation {} still pending (check {}/{})",
                                operation_id, attempt, max_attempts
                            );
                        }
                        Err(err) => {
                            warn!(
                                "Status check {}/{} for {} returned an undecodable body: {}",
                                attempt, max_attempts, operation_id, err
                            );
                        }
                    }
                }
                Ok(response) => {
                    warn!(
                        "Status check {}/{} for {} failed with {}",
                        attempt,
                        max_attempts,
                        operation_id,
                        response.status()
                    );
                }
                Err(err) => {
                    warn!(
                        "Status check {}/{} for {} errored: {}",
                        attempt, max_attempts, operation_id, err
                    );
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(interval).await;
            }
        }

        warn!(
            "Operation {} timed out after {} checks",
            operation_id, max_attempts
        );
        Ok(OperationStatus::TimedOut)
    }

    fn terminal_status(operation_id: &str, attempt: u32, operation: Operation) -> OperationStatus {
        if let Some(error) = operation.error {
            let message = error
                .message
                .unwrap_or_else(|| "image generation failed".to_string());
            warn!("Operation {} failed: {}", operation_id, message);
            return OperationStatus::Failed { message };
        }

        if let Some(image) = operation.response.and_then(|r| r.image) {
            if base64::engine::general_purpose::STANDARD
                .decode(image.as_bytes())
                .is_err()
            {
                warn!("Operation {} returned an undecodable image payload", operation_id);
                return OperationStatus::Failed {
                    message: "operation returned an undecodable image payload".to_string(),
                };
            }
            debug!(
                "Operation {} finished successfully after {} checks",
                operation_id, attempt
            );
            return OperationStatus::Succeeded { image };
        }

        OperationStatus::Failed {
            message: "operation finished without an image payload".to_string(),
        }
    }
}
