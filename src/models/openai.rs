//! OpenAI API type definitions.
//!
//! Request and response structures for the chat-completions and
//! image-generation endpoints, as forwarded through the relay.

use serde::{Deserialize, Serialize};

/// Chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion response. Only the fields the client reads are modeled.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChatMessage>,
}

impl ChatCompletionResponse {
    /// The assistant text of the first choice, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .map(|message| message.content.as_str())
    }
}

/// Image generation request body.
#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
    pub quality: String,
    pub style: String,
}

impl ImageGenerationRequest {
    /// Standard single-image request at the fixed size/quality the wizard
    /// uses.
    pub fn studio(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            n: 1,
            size: "1024x1024".to_string(),
            quality: "hd".to_string(),
            style: "natural".to_string(),
        }
    }
}

/// Image generation response.
#[derive(Debug, Deserialize)]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
pub struct ImageData {
    pub url: Option<String>,
}

impl ImageGenerationResponse {
    /// The remote URL of the first generated image, if any.
    pub fn first_url(&self) -> Option<&str> {
        self.data.first().and_then(|d| d.url.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_content() {
        let resp: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"A lush bouquet."}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.first_content(), Some("A lush bouquet."));

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(empty.first_content(), None);
    }

    #[test]
    fn test_first_url() {
        let resp: ImageGenerationResponse =
            serde_json::from_str(r#"{"data":[{"url":"https://img.example/1.png"}]}"#).unwrap();
        assert_eq!(resp.first_url(), Some("https://img.example/1.png"));

        let missing: ImageGenerationResponse = serde_json::from_str(r#"{"data":[{}]}"#).unwrap();
        assert_eq!(missing.first_url(), None);
    }

    #[test]
    fn test_studio_request_shape() {
        let req = ImageGenerationRequest::studio("dall-e-3", "a bouquet");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["n"], 1);
        assert_eq!(json["size"], "1024x1024");
        assert_eq!(json["quality"], "hd");
        assert_eq!(json["style"], "natural");
    }
}
