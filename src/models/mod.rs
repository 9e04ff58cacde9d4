//! Data models for the bouquetly relay and generation client.
//!
//! This module contains the type definitions for:
//! - The bouquet domain (`bouquet`): requests, credentials, results
//! - The upstream OpenAI API (`openai`)
//! - The upstream Yandex Foundation Models API (`yandex`)
//! - Provider resolution and Yandex model URIs (`mapping`)

pub mod bouquet;
pub mod mapping;
pub mod openai;
pub mod yandex;

pub use bouquet::{
    Credentials, GeneratedBouquet, GenerationRequest, ImageRef, OperationStatus, PromptTemplates,
    Provider, Secret, SuggestionSet,
};
pub use mapping::{provider_for, yandex_art_uri, yandex_model_uri};
