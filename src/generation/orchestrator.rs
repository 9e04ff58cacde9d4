// Generation orchestration: validate inputs, select pathway, assemble result

use super::parser;
use crate::config::GenerationConfig;
use crate::error::{BouquetError, Result};
use crate::models::bouquet::{
    Credentials, GeneratedBouquet, GenerationRequest, Provider, SuggestionSet,
};
use std::time::Duration;
use tracing::{debug, info};

/// Client for the generation relay.
///
/// Owns a pooled HTTP client and drives both entry points: full bouquet
/// generation (description plus images) and suggestion generation. All
/// provider traffic goes through the relay at `base_url`; the pathway is
/// the request's pre-resolved provider tag.
///
/// The client holds no per-request state, so it is safe to re-invoke after
/// a failed or degraded generation.
pub struct GenerationClient {
    pub(super) http: reqwest::Client,
    pub(super) base_url: String,
    pub(super) config: GenerationConfig,
}

impl GenerationClient {
    /// Create a client talking to the relay at `base_url`.
    pub fn new(base_url: impl Into<String>, config: GenerationConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| BouquetError::Internal(format!("Failed to create HTTP client: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!("Created generation client for relay at {}", base_url);

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Generate a bouquet description and images for one request.
    ///
    /// Validates inputs before any network call, then runs the pathway the
    /// request resolved to. The OpenAI pathway fails on any image error;
    /// the Yandex pathway degrades to the unenhanced description and the
    /// images collected so far.
    pub async fn generate_bouquet(&self, request: &GenerationRequest) -> Result<GeneratedBouquet> {
        self.validate(request)?;

        let generation_id = format!("gen_{}", uuid::Uuid::new_v4().simple());
        info!(
            "[{}] Generating bouquet: provider={:?}, flowers={}, occasion={}",
            generation_id,
            request.provider(),
            request.flowers.len(),
            request.occasion
        );

        match request.provider() {
            Provider::OpenAi => self.generate_openai(request).await,
            Provider::Yandex => self.generate_yandex(request).await,
        }
    }

    /// Generate flower-combination suggestions for one request.
    ///
    /// Issues a single completion call with the suggestion prompt and
    /// validates the returned combinations. Parse errors propagate
    /// verbatim.
    pub async fn get_suggestions(&self, request: &GenerationRequest) -> Result<SuggestionSet> {
        self.validate_credentials(request)?;

        let raw = match request.provider() {
            Provider::OpenAi => self.suggestion_text_openai(request).await?,
            Provider::Yandex => self.suggestion_text_yandex(request).await?,
        };

        parser::parse_suggestions(&raw)
    }

    fn validate(&self, request: &GenerationRequest) -> Result<()> {
        if request.flowers.is_empty() {
            return Err(BouquetError::Validation(
                "At least one flower must be selected".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&request.temperature) {
            return Err(BouquetError::Validation(
                "temperature must be between 0.0 and 1.0".to_string(),
            ));
        }
        self.validate_credentials(request)
    }

    fn validate_credentials(&self, request: &GenerationRequest) -> Result<()> {
        match (request.provider(), &request.credentials) {
            (Provider::OpenAi, Credentials::OpenAi { api_key, .. }) if !api_key.is_empty() => {
                Ok(())
            }
            (Provider::OpenAi, _) => Err(BouquetError::Validation(
                "OpenAI API key is required".to_string(),
            )),
            (Provider::Yandex, Credentials::Yandex { api_key, folder_id })
                if !api_key.is_empty() && !folder_id.is_empty() =>
            {
                Ok(())
            }
            (Provider::Yandex, _) => Err(BouquetError::Validation(
                "YandexGPT API key and folder id are required".to_string(),
            )),
        }
    }
}
