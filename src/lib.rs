pub mod api;
pub mod config;
pub mod error;
pub mod frontend;
pub mod models;
pub mod services;

use crate::api::AppState;
use crate::config::Config;
use crate::services::{DeezerClient, GeminiClient, ResolutionPipeline, SongExtractor};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Wires the upstream clients and the pipeline from configuration.
pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let timeout = Duration::from_secs(config.http_timeout_secs);

    let deezer = Arc::new(DeezerClient::new(config.deezer_base_url.clone(), timeout)?);

    let gemini = match &config.gemini_api_key {
        Some(key) => Some(Arc::new(GeminiClient::new(
            key.clone(),
            config.gemini_model.clone(),
            config.gemini_base_url.clone(),
            config.gemini_requests_per_minute,
            timeout,
        )?)),
        None => {
            tracing::warn!("GEMINI_API_KEY not set, lyrics/mood/random modes disabled");
            None
        }
    };

    let extractor = gemini
        .clone()
        .map(|client| Arc::new(SongExtractor::new(client)));

    let resolver = Arc::new(ResolutionPipeline::new(
        deezer.clone(),
        config.resolve_concurrency,
    ));

    Ok(Arc::new(AppState {
        deezer,
        gemini,
        extractor,
        resolver,
    }))
}

pub fn build_router(state: Arc<AppState>, config: &Config) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(api::catalog_routes())
                .merge(api::ai_routes())
                .merge(api::discover_routes())
                .with_state(state),
        )
        // Frontend SPA - catch-all route (must be last)
        .fallback(get(frontend::serve_frontend))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(allowed)
}
