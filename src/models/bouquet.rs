//! Bouquet domain types.
//!
//! These are the types the generation client operates on: the per-submission
//! request, the credential bundle, operation outcomes for async image jobs,
//! and the assembled result handed back to the caller.

use crate::models::mapping;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The provider pathway a request resolves to. Resolved once when the
/// request is constructed and carried explicitly from there on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Single-call text + image flow (chat completions + image URLs).
    OpenAi,
    /// Multi-step flow: completion, enhancement, then polled image jobs
    /// returning inline base64 payloads.
    Yandex,
}

/// An API key that wipes its contents on drop and redacts Debug output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Provider-specific credential bundle supplied by the caller.
#[derive(Debug, Clone)]
pub enum Credentials {
    OpenAi {
        api_key: Secret,
        /// Separate key for the image endpoint; falls back to `api_key`
        /// when absent.
        image_api_key: Option<Secret>,
    },
    Yandex {
        api_key: Secret,
        folder_id: String,
    },
}

impl Credentials {
    /// The key used for image-generation calls.
    pub fn image_key(&self) -> &Secret {
        match self {
            Credentials::OpenAi {
                api_key,
                image_api_key,
            } => image_api_key.as_ref().unwrap_or(api_key),
            Credentials::Yandex { api_key, .. } => api_key,
        }
    }
}

/// Prompt templates carried with each request. Placeholders `{occasion}`,
/// `{recipient}` and `{flowers}` are substituted before use.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    /// System prompt for the OpenAI description call.
    pub system_prompt: String,
    /// Template for the Yandex ART image prompt.
    pub image_prompt: String,
    /// Template for the Yandex suggestion completion.
    pub suggestion_prompt: String,
}

/// One bouquet-generation submission. Constructed per generation, owned by
/// the caller for its duration, never persisted.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub occasion: String,
    pub recipient: String,
    /// Ordered, must be non-empty; validated before any network call.
    pub flowers: Vec<String>,
    pub text_model: String,
    pub image_model: String,
    /// Sampling temperature, 0.0–1.0 inclusive.
    pub temperature: f32,
    pub prompts: PromptTemplates,
    pub credentials: Credentials,
    provider: Provider,
}

impl GenerationRequest {
    /// Build a request, resolving the provider tag from the selected text
    /// model. The tag is fixed for the lifetime of the request.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        occasion: impl Into<String>,
        recipient: impl Into<String>,
        flowers: Vec<String>,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
        temperature: f32,
        prompts: PromptTemplates,
        credentials: Credentials,
    ) -> Self {
        let text_model = text_model.into();
        let provider = mapping::provider_for(&text_model);
        Self {
            occasion: occasion.into(),
            recipient: recipient.into(),
            flowers,
            text_model,
            image_model: image_model.into(),
            temperature,
            prompts,
            credentials,
            provider,
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Comma-joined flower list for prompt substitution.
    pub fn flower_list(&self) -> String {
        self.flowers.join(", ")
    }

    /// Substitute `{occasion}`, `{recipient}` and `{flowers}` in a template.
    pub fn render_template(&self, template: &str) -> String {
        template
            .replace("{occasion}", &self.occasion)
            .replace("{recipient}", &self.recipient)
            .replace("{flowers}", &self.flower_list())
    }

    /// Number of images requested in the OpenAI pathway: one for the
    /// higher-tier model, three otherwise.
    pub fn openai_image_count(&self) -> usize {
        if self.image_model == "dall-e-3" {
            1
        } else {
            3
        }
    }
}

/// Terminal outcome of one polled image-generation operation.
///
/// Transitions are monotonic: a pending job either succeeds, fails with a
/// provider error, or is declared timed out after the attempt ceiling.
/// The pending state lives only inside the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    /// The job finished and produced a base64 image payload.
    Succeeded { image: String },
    /// The job finished with a provider-side error.
    Failed { message: String },
    /// The attempt ceiling was reached before the job finished.
    TimedOut,
}

/// A validated set of flower-combination suggestions. Every combination
/// holds 3–5 flower names; violating combinations invalidate the whole set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionSet {
    pub combinations: Vec<Vec<String>>,
}

impl SuggestionSet {
    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }
}

/// A reference to a generated image: either an inline data URI (Yandex
/// pathway) or a remote URL (OpenAI pathway).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ImageRef {
    DataUri(String),
    Url(String),
}

impl ImageRef {
    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::DataUri(s) | ImageRef::Url(s) => s,
        }
    }

    /// Wrap a base64 JPEG payload as a data URI.
    pub fn from_base64_jpeg(payload: &str) -> Self {
        ImageRef::DataUri(format!("data:image/jpeg;base64,{payload}"))
    }
}

/// The assembled output of one generation: immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedBouquet {
    pub flowers: Vec<String>,
    pub description: String,
    /// Ordered as submitted; possibly shorter than requested when the
    /// Yandex pathway degrades.
    pub images: Vec<ImageRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompts() -> PromptTemplates {
        PromptTemplates {
            system_prompt: "You are a florist.".into(),
            image_prompt: "Bouquet of {flowers} for {occasion} for {recipient}".into(),
            suggestion_prompt: "Suggest for {occasion}, {recipient}".into(),
        }
    }

    #[test]
    fn test_provider_resolved_at_construction() {
        let req = GenerationRequest::new(
            "birthday",
            "mom",
            vec!["rose".into()],
            "yandexgpt-pro",
            "yandex-art",
            0.7,
            prompts(),
            Credentials::Yandex {
                api_key: "key".into(),
                folder_id: "b1g".into(),
            },
        );
        assert_eq!(req.provider(), Provider::Yandex);

        let req = GenerationRequest::new(
            "birthday",
            "mom",
            vec!["rose".into()],
            "gpt-4o",
            "dall-e-3",
            0.7,
            prompts(),
            Credentials::OpenAi {
                api_key: "key".into(),
                image_api_key: None,
            },
        );
        assert_eq!(req.provider(), Provider::OpenAi);
    }

    #[test]
    fn test_render_template() {
        let req = GenerationRequest::new(
            "anniversary",
            "partner",
            vec!["peony".into(), "lily".into()],
            "gpt-4o",
            "dall-e-3",
            0.5,
            prompts(),
            Credentials::OpenAi {
                api_key: "key".into(),
                image_api_key: None,
            },
        );
        assert_eq!(
            req.render_template("Bouquet of {flowers} for {occasion} for {recipient}"),
            "Bouquet of peony, lily for anniversary for partner"
        );
    }

    #[test]
    fn test_openai_image_count() {
        let mut req = GenerationRequest::new(
            "birthday",
            "mom",
            vec!["rose".into()],
            "gpt-4o",
            "dall-e-3",
            0.7,
            prompts(),
            Credentials::OpenAi {
                api_key: "key".into(),
                image_api_key: None,
            },
        );
        assert_eq!(req.openai_image_count(), 1);
        req.image_model = "dall-e-2".into();
        assert_eq!(req.openai_image_count(), 3);
    }

    #[test]
    fn test_image_key_fallback() {
        let creds = Credentials::OpenAi {
            api_key: "chat-key".into(),
            image_api_key: None,
        };
        assert_eq!(creds.image_key().expose(), "chat-key");

        let creds = Credentials::OpenAi {
            api_key: "chat-key".into(),
            image_api_key: Some("image-key".into()),
        };
        assert_eq!(creds.image_key().expose(), "image-key");
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = Secret::new("sk-very-secret");
        assert_eq!(format!("{:?}", secret), "Secret([REDACTED])");
    }

    #[test]
    fn test_data_uri_wrapping() {
        let image = ImageRef::from_base64_jpeg("QQ==");
        assert_eq!(image.as_str(), "data:image/jpeg;base64,QQ==");
    }
}
