// HTTP request handlers for the relay endpoints

use super::routes::AppState;
use crate::error::{BouquetError, Result};
use crate::utils::logging;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handler for /api/yandex/v1/completion.
///
/// Requires `Authorization` and `x-folder-id`; normalizes the completion
/// options (stream off, default temperature/maxTokens, maxTokens
/// stringified) and forwards to the upstream completion endpoint. Upstream
/// errors come back with their own status wrapped in the uniform envelope;
/// a 200 body missing `result` is treated as an upstream failure.
pub async fn yandex_completion_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response> {
    let auth = require_header(&headers, header::AUTHORIZATION.as_str())?;
    let folder_id = require_header(&headers, "x-folder-id")?;

    debug!(
        "Forwarding completion request: folder={}, auth={}",
        folder_id,
        logging::sanitize(&auth)
    );

    let url = format!(
        "{}/foundationModels/v1/completion",
        state.config.upstream.yandex_base_url
    );
    let transformed = normalize_completion_body(&body);

    let response = state
        .http
        .post(&url)
        .header(header::AUTHORIZATION, auth.as_str())
        .header("x-folder-id", folder_id.as_str())
        .json(&transformed)
        .timeout(Duration::from_secs(
            state.config.upstream.completion_timeout_seconds,
        ))
        .send()
        .await?;

    let status = response.status();
    let payload: Value = response.json().await.unwrap_or(Value::Null);

    if status != reqwest::StatusCode::OK {
        warn!("Upstream completion error: HTTP {}", status);
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("YandexGPT API error")
            .to_string();
        return Ok(error_envelope(
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
            &message,
            Some(payload),
        ));
    }

    if payload.get("result").is_none() {
        warn!("Upstream completion returned no result field");
        return Ok(error_envelope(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Invalid response format from YandexGPT API",
            Some(payload),
        ));
    }

    Ok(Json(payload).into_response())
}

/// Handler for /api/yandex/v1/images/generations.
///
/// Forwards the job to the async image-generation endpoint and returns the
/// upstream operation stub verbatim. The client polls the operation; the
/// relay does not wait.
pub async fn yandex_image_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response> {
    let auth = require_header(&headers, header::AUTHORIZATION.as_str())?;
    let folder_id = require_header(&headers, "x-folder-id")?;

    let url = format!(
        "{}/foundationModels/v1/imageGenerationAsync",
        state.config.upstream.yandex_base_url
    );

    let response = state
        .http
        .post(&url)
        .header(header::AUTHORIZATION, auth.as_str())
        .header("x-folder-id", folder_id.as_str())
        .json(&body)
        .timeout(Duration::from_secs(
            state.config.upstream.light_timeout_seconds,
        ))
        .send()
        .await?;

    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        warn!("Upstream image submission error: HTTP {}", status);
        return Ok(mirror_json(status, bytes));
    }

    let payload: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    if payload.get("id").and_then(Value::as_str).is_none() {
        warn!("Upstream image submission returned no operation id");
        return Ok(error_envelope(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Invalid response: missing operation ID",
            Some(payload),
        ));
    }

    Ok(mirror_json(status, bytes))
}

/// Handler for /api/operations/:id, the status checks the poller issues.
pub async fn operation_handler(
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let auth = require_header(&headers, header::AUTHORIZATION.as_str())?;

    let url = format!(
        "{}/operations/{}",
        state.config.upstream.yandex_base_url, operation_id
    );

    let mut request = state
        .http
        .get(&url)
        .header(header::AUTHORIZATION, auth.as_str())
        .timeout(Duration::from_secs(
            state.config.upstream.light_timeout_seconds,
        ));
    if let Some(folder_id) = headers.get("x-folder-id").and_then(|v| v.to_str().ok()) {
        request = request.header("x-folder-id", folder_id);
    }

    let response = request.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;
    Ok(mirror_json(status, bytes))
}

/// Handler for /api/openai/v1/chat/completions: provider-shaped
/// passthrough.
pub async fn openai_chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response> {
    let auth = require_header(&headers, header::AUTHORIZATION.as_str())?;

    let url = format!(
        "{}/v1/chat/completions",
        state.config.upstream.openai_base_url
    );
    forward_openai(
        &state,
        &url,
        &auth,
        &body,
        state.config.upstream.completion_timeout_seconds,
    )
    .await
}

/// Handler for /api/openai/v1/images/generations: provider-shaped
/// passthrough with a longer budget.
pub async fn openai_images_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response> {
    let auth = require_header(&headers, header::AUTHORIZATION.as_str())?;

    let url = format!(
        "{}/v1/images/generations",
        state.config.upstream.openai_base_url
    );
    forward_openai(
        &state,
        &url,
        &auth,
        &body,
        state.config.upstream.image_timeout_seconds,
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct ProxyImageParams {
    pub url: String,
}

/// Handler for /api/proxy-image: fetches a remote image with forwarded
/// credentials so the browser can download URL-based results.
pub async fn proxy_image_handler(
    State(state): State<AppState>,
    Query(params): Query<ProxyImageParams>,
    headers: HeaderMap,
) -> Result<Response> {
    if !params.url.starts_with("http://") && !params.url.starts_with("https://") {
        return Err(BouquetError::Validation(
            "url must be an http(s) URL".to_string(),
        ));
    }

    let mut request = state.http.get(&params.url).timeout(Duration::from_secs(
        state.config.upstream.light_timeout_seconds,
    ));
    if let Some(auth) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        request = request.header(header::AUTHORIZATION, auth);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(BouquetError::PermanentApi {
            status: status.as_u16(),
            message: format!("failed to fetch image: HTTP {}", status.as_u16()),
        });
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = response.bytes().await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        bytes,
    )
        .into_response())
}

/// Build the relay path for downloading a remote image through the proxy.
pub fn proxy_image_query(url: &str) -> String {
    format!("/api/proxy-image?url={}", urlencoding::encode(url))
}

/// Handler for /api/yandex/v1/test: a minimal completion to verify
/// credentials and upstream reachability.
pub async fn yandex_test_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    let auth = require_header(&headers, header::AUTHORIZATION.as_str())?;
    let folder_id = require_header(&headers, "x-folder-id")?;

    let url = format!(
        "{}/foundationModels/v1/completion",
        state.config.upstream.yandex_base_url
    );
    let body = json!({
        "modelUri": format!("gpt://{folder_id}/yandexgpt/latest"),
        "completionOptions": {
            "stream": false,
            "temperature": 0.7,
            "maxTokens": "100"
        },
        "messages": [
            { "role": "user", "text": "Say 'Hello, World!'" }
        ]
    });

    let response = state
        .http
        .post(&url)
        .header(header::AUTHORIZATION, auth.as_str())
        .header("x-folder-id", folder_id.as_str())
        .json(&body)
        .timeout(Duration::from_secs(
            state.config.upstream.light_timeout_seconds,
        ))
        .send()
        .await?;

    let status = response.status();
    let bytes = response.bytes().await?;
    Ok(mirror_json(status, bytes))
}

// Shared helpers

fn require_header(headers: &HeaderMap, name: &str) -> Result<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| BouquetError::Validation(format!("Missing {name} header")))
}

/// Apply the upstream defaults: stream always off, temperature 0.7,
/// maxTokens "2000"; both options may arrive nested or top-level, and
/// maxTokens goes out as a string either way.
fn normalize_completion_body(body: &Value) -> Value {
    let options = body.get("completionOptions");

    let temperature = options
        .and_then(|o| o.get("temperature"))
        .or_else(|| body.get("temperature"))
        .and_then(Value::as_f64)
        .unwrap_or(0.7);

    let max_tokens = options
        .and_then(|o| o.get("maxTokens"))
        .or_else(|| body.get("maxTokens"));
    let max_tokens = match max_tokens {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "2000".to_string(),
    };

    json!({
        "modelUri": body.get("modelUri"),
        "completionOptions": {
            "stream": false,
            "temperature": temperature,
            "maxTokens": max_tokens
        },
        "messages": body.get("messages")
    })
}

async fn forward_openai(
    state: &AppState,
    url: &str,
    auth: &str,
    body: &Value,
    timeout_seconds: u64,
) -> Result<Response> {
    let response = state
        .http
        .post(url)
        .header(header::AUTHORIZATION, auth)
        .json(body)
        .timeout(Duration::from_secs(timeout_seconds))
        .send()
        .await?;

    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        warn!("Upstream OpenAI error: HTTP {}", status);
    }
    Ok(mirror_json(status, bytes))
}

/// Mirror an upstream status and JSON body back to the caller verbatim.
fn mirror_json(status: reqwest::StatusCode, body: Bytes) -> Response {
    (
        StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

/// Uniform `{error:{message,type,details?}}` envelope with an explicit
/// status.
fn error_envelope(status: StatusCode, message: &str, details: Option<Value>) -> Response {
    let mut error = json!({
        "message": message,
        "type": "api_error"
    });
    if let Some(details) = details {
        if !details.is_null() {
            error["details"] = details;
        }
    }
    (status, Json(json!({ "error": error }))).into_response()
}
