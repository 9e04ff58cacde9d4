// bouquetly - AI bouquet generation relay for OpenAI and Yandex Foundation Models

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod server;
pub mod utils;
