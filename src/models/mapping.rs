// Provider resolution and Yandex model URI mapping

use crate::error::{BouquetError, Result};
use crate::models::bouquet::Provider;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Lazily initialized map from public Yandex model ids to the model names
/// used inside `gpt://` URIs.
static YANDEX_MODEL_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

fn yandex_model_map() -> &'static HashMap<&'static str, &'static str> {
    YANDEX_MODEL_MAP.get_or_init(|| {
        let mut m = HashMap::new();
        m.insert("yandexgpt-pro", "yandexgpt");
        m.insert("yandexgpt-pro-32k", "yandexgpt-32k");
        m
    })
}

/// Resolve the provider pathway for a text-model identifier. Model ids
/// carrying the Yandex prefix select the polled Yandex pathway, everything
/// else goes to OpenAI. This is the single place the prefix is inspected;
/// callers carry the resulting tag.
pub fn provider_for(text_model: &str) -> Provider {
    if text_model.starts_with("yandex") {
        Provider::Yandex
    } else {
        Provider::OpenAi
    }
}

/// Build the `gpt://` model URI for a Yandex completion call.
pub fn yandex_model_uri(folder_id: &str, model: &str) -> Result<String> {
    yandex_model_map()
        .get(model)
        .map(|name| format!("gpt://{folder_id}/{name}/latest"))
        .ok_or_else(|| {
            BouquetError::Validation(format!(
                "Unsupported YandexGPT model: {}. Supported models: {}",
                model,
                yandex_model_map().keys().copied().collect::<Vec<_>>().join(", ")
            ))
        })
}

/// Build the `art://` model URI for a Yandex ART image job.
pub fn yandex_art_uri(folder_id: &str) -> String {
    format!("art://{folder_id}/yandex-art/latest")
}
