//! Axum-based HTTP relay for the bouquet wizard.
//!
//! This module sets up the HTTP server that browser clients talk to. It
//! forwards provider-shaped requests to the upstream OpenAI and Yandex
//! Foundation Models APIs, because those cannot be called from a browser
//! directly (CORS, secret handling, async image operations).
//!
//! # Components
//!
//! - `handlers`: Implementation of individual relay endpoints.
//! - `middleware`: Request ID tracking layers.
//! - `routes`: The main router configuration that ties everything together.

mod handlers;
mod middleware;
mod routes;

pub use handlers::proxy_image_query;
pub use routes::{create_router, AppState};
