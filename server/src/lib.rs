pub mod config;
pub mod error;
pub mod metrics;
pub mod validation;

use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Path, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::info;

use tts_pipeline::{StreamProcessor, VoiceParams, VoiceRegistry};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::validation::{validate_prosody, validate_synthesis_request};

#[derive(Clone)]
pub struct AppState {
    pub processor: StreamProcessor,
    pub request_count: Arc<AtomicU64>,
    pub config: ServerConfig,
}

#[derive(Deserialize)]
pub struct TtsRequest {
    text: String,
    voice: Option<String>,
    rate: Option<i32>,
    pitch: Option<i32>,
    volume: Option<i32>,
}

#[derive(Serialize)]
pub struct TtsResponse {
    audio_base64: String,
    duration_ms: u64,
    sample_rate: u32,
}

impl TtsRequest {
    fn voice_params(&self, default_voice: &str) -> VoiceParams {
        let voice = self.voice.as_deref().unwrap_or(default_voice);
        let mut params = VoiceParams::for_voice(voice);
        if let Some(rate) = self.rate {
            params.rate = rate.into();
        }
        if let Some(pitch) = self.pitch {
            params.pitch = pitch.into();
        }
        if let Some(volume) = self.volume {
            params.volume = volume.into();
        }
        params
    }
}

/// Build the application router. Middleware that needs runtime
/// configuration (rate limiting, timeouts, CORS) is layered on in `main`.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/voices", get(list_voices))
        .route("/voices/detail", get(list_voices_detail))
        .route("/tts", post(tts_endpoint))
        .route("/stream/{voice}/{text}", get(stream_endpoint))
        .route("/metrics", get(metrics_endpoint));

    Router::new()
        .merge(api.clone()) // root paths
        .nest("/api", api) // /api prefix
        .layer(axum::middleware::from_fn(add_request_id))
        .with_state(state)
}

/// Request ID middleware for tracing
async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    if let Ok(value) = axum::http::HeaderValue::from_str(&request_id) {
        request.headers_mut().insert("x-request-id", value.clone());
        let mut response = next.run(request).await;
        response.headers_mut().insert("x-request-id", value);
        return response;
    }
    next.run(request).await
}

pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> Json<metrics::MetricsResponse> {
    let request_count = state.request_count.load(Ordering::Relaxed);
    Json(metrics::snapshot(request_count))
}

pub async fn list_voices(State(state): State<AppState>) -> Json<Vec<&'static str>> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    Json(VoiceRegistry::global().languages().collect())
}

pub async fn list_voices_detail(
    State(state): State<AppState>,
) -> Json<Vec<tts_pipeline::voices::VoiceInfo>> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    Json(VoiceRegistry::global().all().cloned().collect())
}

pub async fn tts_endpoint(
    State(state): State<AppState>,
    Json(req): Json<TtsRequest>,
) -> Result<Json<TtsResponse>, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    validate_synthesis_request(&req.text, req.voice.as_deref())?;
    let params = req.voice_params(&state.config.default_voice);
    validate_prosody(&params)?;

    info!(
        voice = %params.voice,
        chars = req.text.chars().count(),
        "synthesis request received"
    );

    let joined = state
        .processor
        .process_to_single_file(&req.text, params)
        .await?
        .ok_or_else(|| {
            ApiError::InvalidInput("Text contained nothing speakable".to_string())
        })?;

    let audio_base64 = base64::engine::general_purpose::STANDARD.encode(&joined.bytes);

    Ok(Json(TtsResponse {
        audio_base64,
        duration_ms: joined.duration_ms,
        sample_rate: joined.sample_rate,
    }))
}

pub async fn stream_endpoint(
    State(state): State<AppState>,
    Path((voice, text)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    validate_synthesis_request(&text, Some(&voice))?;

    info!(voice = %voice, chars = text.chars().count(), "streaming request received");

    let params = VoiceParams::for_voice(voice);
    let frames = state
        .processor
        .process_stream(tokio_stream::once(text), params)
        .map(|frame| Ok::<_, Infallible>(Bytes::from(frame)));

    let response = Response::builder()
        .header(header::CONTENT_TYPE, "audio/wav")
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from_stream(frames))
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    Ok(response.into_response())
}
