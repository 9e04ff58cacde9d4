//! Configuration data structures for the bouquetly relay.
//!
//! This module defines the schema for the application settings: server
//! parameters, upstream API endpoints, generation client tuning, and
//! logging options.

use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, workers).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream provider API settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Generation client tuning (retry budget, poll ceiling).
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `5000`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads for the Axum server.
    /// Default: Number of logical CPU cores.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Settings for the upstream provider APIs the relay forwards to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL for the Yandex Foundation Models API.
    #[serde(default = "default_yandex_base_url")]
    pub yandex_base_url: String,

    /// Base URL for the OpenAI API.
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Timeout for completion forwards in seconds.
    /// Default: `60`
    #[serde(default = "default_completion_timeout")]
    pub completion_timeout_seconds: u64,

    /// Timeout for image-generation forwards in seconds.
    /// Default: `120`
    #[serde(default = "default_image_timeout")]
    pub image_timeout_seconds: u64,

    /// Timeout for light forwards (status checks, probes, image proxy)
    /// in seconds. Default: `30`
    #[serde(default = "default_light_timeout")]
    pub light_timeout_seconds: u64,
}

/// Tuning for the generation client (retry budget and operation polling).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Maximum number of retries after the first attempt of a provider
    /// call. Default: `3`
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between retry attempts in milliseconds.
    /// Default: `2000`
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Interval between operation status checks in milliseconds.
    /// Default: `1000`
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Maximum number of status checks before an image job is declared
    /// timed out. Every check, including failed ones, consumes one
    /// attempt. Default: `60`
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u32,

    /// Wall-clock timeout for primary completion calls in seconds.
    /// Default: `60`
    #[serde(default = "default_completion_timeout")]
    pub completion_timeout_seconds: u64,

    /// Wall-clock timeout for lighter calls (enhancement, job submission,
    /// status checks) in seconds. Default: `30`
    #[serde(default = "default_light_timeout")]
    pub light_timeout_seconds: u64,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Whether to mask API keys in logs.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub sanitize_keys: bool,
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            yandex_base_url: default_yandex_base_url(),
            openai_base_url: default_openai_base_url(),
            completion_timeout_seconds: default_completion_timeout(),
            image_timeout_seconds: default_image_timeout(),
            light_timeout_seconds: default_light_timeout(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
            poll_interval_ms: default_poll_interval(),
            poll_timeout_seconds: default_poll_timeout(),
            completion_timeout_seconds: default_completion_timeout(),
            light_timeout_seconds: default_light_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            sanitize_keys: true,
        }
    }
}

// Helper functions for serde defaults and shared constants
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_yandex_base_url() -> String {
    "https://llm.api.cloud.yandex.net".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_completion_timeout() -> u64 {
    60
}

fn default_image_timeout() -> u64 {
    120
}

fn default_light_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    2000
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_poll_timeout() -> u32 {
    60
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
