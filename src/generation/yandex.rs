// Yandex pathway: completion, enhancement, then polled image jobs

use super::orchestrator::GenerationClient;
use crate::error::{BouquetError, Result};
use crate::models::bouquet::{
    Credentials, GeneratedBouquet, GenerationRequest, ImageRef, OperationStatus, Secret,
};
use crate::models::mapping;
use crate::models::yandex::{
    CompletionOptions, CompletionRequest, CompletionResponse, ImageGenerationRequest, Message,
    OperationSubmitted,
};
use crate::utils::retry;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

const BASE_DESCRIPTION_MAX_TOKENS: u32 = 500;
const ENHANCE_MAX_TOKENS: u32 = 1000;
const SUGGESTION_MAX_TOKENS: u32 = 2000;

/// Number of image jobs submitted per generation, sequentially.
const IMAGE_JOB_COUNT: usize = 2;

const BASE_DESCRIPTION_PROMPT: &str = "Write a short, direct description of a bouquet for {occasion} for {recipient}. The bouquet contains: {flowers}.";

const ENHANCE_INSTRUCTION: &str = "Describe this bouquet beautifully and emotionally, using artistic turns of phrase and epithets, without meta phrases like \"here is a description\" or \"it could be\". The description must be direct. Base text for the description: ";

impl GenerationClient {
    /// The Yandex pathway: a completion call for the base description, an
    /// enhancement call rewriting it more evocatively, then two polled
    /// image jobs yielding inline base64 payloads.
    ///
    /// The base description must succeed. Everything after it is fallback
    /// territory: on any failure the generation degrades to the base
    /// description and the images collected so far, rather than failing.
    pub(super) async fn generate_yandex(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedBouquet> {
        let Credentials::Yandex { api_key, folder_id } = &request.credentials else {
            return Err(BouquetError::Validation(
                "YandexGPT API key and folder id are required".to_string(),
            ));
        };
        let model_uri = mapping::yandex_model_uri(folder_id, &request.text_model)?;

        let basic = self
            .yandex_base_description(request, api_key, folder_id, &model_uri)
            .await?;
        debug!("Base description generated ({} chars)", basic.len());

        let mut images = Vec::new();
        let description = match self
            .enhance_and_render(request, api_key, folder_id, &model_uri, &basic, &mut images)
            .await
        {
            Ok(enhanced) => enhanced,
            Err(err) => {
                warn!(
                    "Degrading to base description after failure ({} images kept): {}",
                    images.len(),
                    err
                );
                basic
            }
        };

        Ok(GeneratedBouquet {
            flowers: request.flowers.clone(),
            description,
            images,
        })
    }

    pub(super) async fn suggestion_text_yandex(
        &self,
        request: &GenerationRequest,
    ) -> Result<String> {
        let Credentials::Yandex { api_key, folder_id } = &request.credentials else {
            return Err(BouquetError::Validation(
                "YandexGPT API key and folder id are required".to_string(),
            ));
        };
        let model_uri = mapping::yandex_model_uri(folder_id, &request.text_model)?;

        let prompt = request.render_template(&request.prompts.suggestion_prompt);
        let body = CompletionRequest {
            model_uri,
            completion_options: CompletionOptions::new(request.temperature, SUGGESTION_MAX_TOKENS),
            messages: vec![Message::user(prompt)],
        };

        let raw = self
            .yandex_post(
                "/api/yandex/v1/completion",
                api_key,
                folder_id,
                &body,
                self.config.completion_timeout_seconds,
                "YandexGPT suggestions",
            )
            .await?;

        final_text(&raw)
    }

    /// Enhancement plus image rendering. Errors here never fail the
    /// generation; the caller keeps whatever landed in `images`.
    async fn enhance_and_render(
        &self,
        request: &GenerationRequest,
        api_key: &Secret,
        folder_id: &str,
        model_uri: &str,
        basic: &str,
        images: &mut Vec<ImageRef>,
    ) -> Result<String> {
        let enhanced = self
            .yandex_enhance(request, api_key, folder_id, model_uri, basic)
            .await?;
        debug!("Enhanced description generated ({} chars)", enhanced.len());

        let image_prompt = request.render_template(&request.prompts.image_prompt);
        for index in 0..IMAGE_JOB_COUNT {
            let operation = self
                .submit_image_job(api_key, folder_id, &image_prompt)
                .await?;
            debug!(
                "Submitted image job {}/{}: operation {}",
                index + 1,
                IMAGE_JOB_COUNT,
                operation.id
            );

            match self.poll_operation(&operation.id, &request.credentials).await? {
                OperationStatus::Succeeded { image } => {
                    images.push(ImageRef::from_base64_jpeg(&image));
                }
                OperationStatus::Failed { message } => {
                    return Err(BouquetError::PermanentApi {
                        status: 400,
                        message,
                    });
                }
                OperationStatus::TimedOut => {
                    return Err(BouquetError::Timeout(format!(
                        "image operation {} did not finish within {} checks",
                        operation.id, self.config.poll_timeout_seconds
                    )));
                }
            }
        }

        Ok(enhanced)
    }

    async fn yandex_base_description(
        &self,
        request: &GenerationRequest,
        api_key: &Secret,
        folder_id: &str,
        model_uri: &str,
    ) -> Result<String> {
        let body = CompletionRequest {
            model_uri: model_uri.to_string(),
            completion_options: CompletionOptions::new(
                request.temperature,
                BASE_DESCRIPTION_MAX_TOKENS,
            ),
            messages: vec![Message::user(request.render_template(BASE_DESCRIPTION_PROMPT))],
        };

        let raw = self
            .yandex_post(
                "/api/yandex/v1/completion",
                api_key,
                folder_id,
                &body,
                self.config.completion_timeout_seconds,
                "YandexGPT base description",
            )
            .await?;

        final_text(&raw)
    }

    async fn yandex_enhance(
        &self,
        request: &GenerationRequest,
        api_key: &Secret,
        folder_id: &str,
        model_uri: &str,
        basic: &str,
    ) -> Result<String> {
        let body = CompletionRequest {
            model_uri: model_uri.to_string(),
            completion_options: CompletionOptions::new(request.temperature, ENHANCE_MAX_TOKENS),
            messages: vec![Message::user(format!("{ENHANCE_INSTRUCTION}\"{basic}\""))],
        };

        let raw = self
            .yandex_post(
                "/api/yandex/v1/completion",
                api_key,
                folder_id,
                &body,
                self.config.light_timeout_seconds,
                "YandexGPT enhancement",
            )
            .await?;

        final_text(&raw)
    }

    async fn submit_image_job(
        &self,
        api_key: &Secret,
        folder_id: &str,
        image_prompt: &str,
    ) -> Result<OperationSubmitted> {
        let body =
            ImageGenerationRequest::square_jpeg(mapping::yandex_art_uri(folder_id), image_prompt);

        let raw = self
            .yandex_post(
                "/api/yandex/v1/images/generations",
                api_key,
                folder_id,
                &body,
                self.config.light_timeout_seconds,
                "YandexART submission",
            )
            .await?;

        serde_json::from_str(&raw).map_err(|e| BouquetError::Parse {
            message: format!("image submission returned no operation id: {e}"),
            text: raw,
        })
    }

    async fn yandex_post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        api_key: &Secret,
        folder_id: &str,
        body: &T,
        timeout_seconds: u64,
        operation: &str,
    ) -> Result<String> {
        let request = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Api-Key {}", api_key.expose()))
            .header("x-folder-id", folder_id)
            .header("Content-Type", "application/json")
            .json(body)
            .timeout(Duration::from_secs(timeout_seconds));

        let response = retry::send_with_retry(
            operation,
            request,
            self.config.max_retries,
            Duration::from_millis(self.config.retry_delay_ms),
        )
        .await?;

        Ok(response.text().await?)
    }
}

/// Extract the final alternative's text from a completion body, failing
/// with the offending payload when the envelope is off-shape.
fn final_text(raw: &str) -> Result<String> {
    let response: CompletionResponse = serde_json::from_str(raw).map_err(|e| {
        BouquetError::Parse {
            message: format!("malformed completion response: {e}"),
            text: raw.to_string(),
        }
    })?;

    response
        .final_text()
        .map(str::to_string)
        .ok_or_else(|| BouquetError::Parse {
            message: "completion response carried no final alternative".to_string(),
            text: raw.to_string(),
        })
}
