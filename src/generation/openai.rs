// OpenAI pathway: single-call text flow plus direct image generations

use super::orchestrator::GenerationClient;
use crate::error::{BouquetError, Result};
use crate::models::bouquet::{
    Credentials, GeneratedBouquet, GenerationRequest, ImageRef, Secret,
};
use crate::models::openai::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ImageGenerationRequest,
    ImageGenerationResponse,
};
use crate::utils::retry;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const DESCRIPTION_MAX_TOKENS: u32 = 300;
const SUGGESTION_MAX_TOKENS: u32 = 300;

const SUGGESTION_SYSTEM_PROMPT: &str = "You are a professional florist. Generate two different flower combinations. Each combination should contain 3-5 flowers that work well together. Return the response in the following format: {\"suggestions\": [[\"flower1\", \"flower2\", \"flower3\"], [\"flower1\", \"flower2\", \"flower3\"]]}";

const IMAGE_PROMPT_TEMPLATE: &str = "A professional, high-quality photograph of a beautiful flower bouquet containing {flowers}. The bouquet is designed for {occasion} for {recipient}. Photorealistic style, studio lighting, white background.";

impl GenerationClient {
    /// The OpenAI pathway: one description call, then N image calls, each
    /// returning a remote URL. Any image failure aborts the generation;
    /// no partial results on this pathway.
    pub(super) async fn generate_openai(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedBouquet> {
        let description = self.openai_description(request).await?;

        let image_prompt = request.render_template(IMAGE_PROMPT_TEMPLATE);
        let count = request.openai_image_count();
        let mut images = Vec::with_capacity(count);
        for index in 0..count {
            let url = self.openai_image(request, &image_prompt).await?;
            debug!("Generated image {}/{}", index + 1, count);
            images.push(ImageRef::Url(url));
        }

        Ok(GeneratedBouquet {
            flowers: request.flowers.clone(),
            description,
            images,
        })
    }

    pub(super) async fn suggestion_text_openai(
        &self,
        request: &GenerationRequest,
    ) -> Result<String> {
        let Credentials::OpenAi { api_key, .. } = &request.credentials else {
            return Err(BouquetError::Validation(
                "OpenAI API key is required".to_string(),
            ));
        };

        let body = ChatCompletionRequest {
            model: request.text_model.clone(),
            messages: vec![
                ChatMessage::system(SUGGESTION_SYSTEM_PROMPT),
                ChatMessage::user(format!(
                    "Create 2 different flower combinations for a {} bouquet for {}.",
                    request.occasion, request.recipient
                )),
            ],
            temperature: request.temperature,
            max_tokens: SUGGESTION_MAX_TOKENS,
        };

        let raw = self
            .openai_post(
                "/api/openai/v1/chat/completions",
                api_key,
                &body,
                self.config.completion_timeout_seconds,
                "OpenAI suggestions",
            )
            .await?;

        let response: ChatCompletionResponse = serde_json::from_str(&raw)
            .map_err(|e| parse_error(format!("malformed completion response: {e}"), &raw))?;
        response
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| parse_error("completion response carried no message text", &raw))
    }

    async fn openai_description(&self, request: &GenerationRequest) -> Result<String> {
        let Credentials::OpenAi { api_key, .. } = &request.credentials else {
            return Err(BouquetError::Validation(
                "OpenAI API key is required".to_string(),
            ));
        };

        let body = ChatCompletionRequest {
            model: request.text_model.clone(),
            messages: vec![
                ChatMessage::system(request.prompts.system_prompt.as_str()),
                ChatMessage::user(format!(
                    "Create a beautiful description for a {} bouquet for {}. The bouquet contains: {}.",
                    request.occasion,
                    request.recipient,
                    request.flower_list()
                )),
            ],
            temperature: request.temperature,
            max_tokens: DESCRIPTION_MAX_TOKENS,
        };

        let raw = self
            .openai_post(
                "/api/openai/v1/chat/completions",
                api_key,
                &body,
                self.config.completion_timeout_seconds,
                "OpenAI description",
            )
            .await?;

        let response: ChatCompletionResponse = serde_json::from_str(&raw)
            .map_err(|e| parse_error(format!("malformed completion response: {e}"), &raw))?;
        response
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| parse_error("completion response carried no message text", &raw))
    }

    async fn openai_image(&self, request: &GenerationRequest, prompt: &str) -> Result<String> {
        let body = ImageGenerationRequest::studio(&request.image_model, prompt);

        let raw = self
            .openai_post(
                "/api/openai/v1/images/generations",
                request.credentials.image_key(),
                &body,
                self.config.completion_timeout_seconds,
                "OpenAI image",
            )
            .await?;

        let response: ImageGenerationResponse = serde_json::from_str(&raw)
            .map_err(|e| parse_error(format!("malformed image response: {e}"), &raw))?;
        response
            .first_url()
            .map(str::to_string)
            .ok_or_else(|| parse_error("no image was generated", &raw))
    }

    async fn openai_post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        api_key: &Secret,
        body: &T,
        timeout_seconds: u64,
        operation: &str,
    ) -> Result<String> {
        let request = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", api_key.expose()))
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

fn parse_error(message: impl Into<String>, raw: &str) -> BouquetError {
    BouquetError::Parse {
        message: message.into(),
        text: raw.to_string(),
    }
}
