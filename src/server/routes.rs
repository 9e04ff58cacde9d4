// HTTP routes configuration

use super::handlers::{
    health_handler, openai_chat_handler, openai_images_handler, operation_handler,
    proxy_image_handler, yandex_completion_handler, yandex_image_handler, yandex_test_handler,
};
use super::middleware::request_id_layers;
use crate::config::AppConfig;
use crate::error::{BouquetError, Result};
use axum::http::{header, HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub http: reqwest::Client,
    pub started_at: Instant,
}

pub fn create_router(config: AppConfig) -> Result<Router> {
    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .tcp_nodelay(true)
        .use_rustls_tls()
        .build()
        .map_err(|e| BouquetError::Internal(format!("Failed to create HTTP client: {e}")))?;

    let state = AppState {
        config,
        http,
        started_at: Instant::now(),
    };

    let (set_request_id, propagate_request_id) = request_id_layers();

    // The wizard runs in a browser, so the relay answers cross-origin
    // preflights for its credential headers.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-folder-id"),
        ]);

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/yandex/v1/completion", post(yandex_completion_handler))
        .route("/api/yandex/v1/images/generations", post(yandex_image_handler))
        .route("/api/yandex/v1/test", post(yandex_test_handler))
        .route("/api/operations/:id", get(operation_handler))
        .route("/api/openai/v1/chat/completions", post(openai_chat_handler))
        .route("/api/openai/v1/images/generations", post(openai_images_handler))
        .route("/api/proxy-image", get(proxy_image_handler))
        .layer(tower_http::limit::RequestBodyLimitLayer::new(1024 * 1024))
        .layer(tower_http::compression::CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state);

    Ok(app)
}
