//! Yandex Foundation Models API type definitions.
//!
//! Request and response structures for the text-completion endpoint and the
//! asynchronous image-generation endpoint (`imageGenerationAsync` plus the
//! operations status resource), as forwarded through the relay.

use serde::{Deserialize, Serialize};

/// Text completion request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub model_uri: String,
    pub completion_options: CompletionOptions,
    pub messages: Vec<Message>,
}

/// Completion sampling options. `max_tokens` is a string on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    pub stream: bool,
    pub temperature: f32,
    pub max_tokens: String,
}

impl CompletionOptions {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            stream: false,
            temperature,
            max_tokens: max_tokens.to_string(),
        }
    }
}

/// A single completion message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            text: text.into(),
        }
    }
}

/// Alternative status value marking a finished, usable completion.
pub const ALTERNATIVE_STATUS_FINAL: &str = "ALTERNATIVE_STATUS_FINAL";

/// Text completion response envelope.
#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub result: Option<CompletionResult>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResult {
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
pub struct Alternative {
    pub message: Option<Message>,
    pub status: Option<String>,
}

impl CompletionResponse {
    /// The text of the first alternative, only when it is final.
    pub fn final_text(&self) -> Option<&str> {
        let alternative = self.result.as_ref()?.alternatives.first()?;
        if alternative.status.as_deref() != Some(ALTERNATIVE_STATUS_FINAL) {
            return None;
        }
        alternative
            .message
            .as_ref()
            .map(|message| message.text.as_str())
    }
}

/// Image generation request body for `imageGenerationAsync`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationRequest {
    pub model_uri: String,
    pub messages: Vec<ImageMessage>,
    pub generation_options: GenerationOptions,
}

/// A weighted image prompt message. `weight` is a string on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct ImageMessage {
    pub text: String,
    pub weight: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub mime_type: String,
    pub aspect_ratio: AspectRatio,
}

/// Ratios are strings on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectRatio {
    pub width_ratio: String,
    pub height_ratio: String,
}

impl ImageGenerationRequest {
    /// Square JPEG job for the given `art://` model URI and prompt.
    pub fn square_jpeg(model_uri: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model_uri: model_uri.into(),
            messages: vec![ImageMessage {
                text: prompt.into(),
                weight: "1".to_string(),
            }],
            generation_options: GenerationOptions {
                mime_type: "image/jpeg".to_string(),
                aspect_ratio: AspectRatio {
                    width_ratio: "1".to_string(),
                    height_ratio: "1".to_string(),
                },
            },
        }
    }
}

/// Response to an async image job submission: the operation handle used
/// for status polling. It has no lifecycle beyond the poll loop.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationSubmitted {
    pub id: String,
}

/// Status payload of an in-flight operation.
#[derive(Debug, Default, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub done: bool,
    pub response: Option<OperationResponse>,
    pub error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
pub struct OperationResponse {
    /// Base64-encoded image payload.
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OperationError {
    pub message: Option<String>,
    pub code: Option<i64>,
}
