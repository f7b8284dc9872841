//! API Handlers
//!
//! HTTP request handlers for each endpoint.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{info, warn};

use crate::cache::{SharedCache, TtlCache};
use crate::config::Config;
use crate::enrichment::{EnrichmentOrchestrator, LookupCache};
use crate::error::{EnrichError, Result, TransportError};
use crate::http::{user_agent, ReqwestTransport, ResilientFetcher};
use crate::lookup::{AcousticBrainzClient, MusicBrainzResolver};
use crate::models::{ClearResponse, EnrichRequest, EnrichResponse, HealthResponse, StatsResponse};

/// Per-request limits applied by the enrich handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichSettings {
    pub max_tracks: usize,
    /// Default and ceiling for a request's concurrency
    pub concurrency: usize,
}

impl From<&Config> for EnrichSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_tracks: config.max_tracks,
            concurrency: config.concurrency,
        }
    }
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<EnrichmentOrchestrator>,
    /// Same cache the orchestrator reads through
    pub cache: LookupCache,
    pub settings: EnrichSettings,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(orchestrator: EnrichmentOrchestrator, settings: EnrichSettings) -> Self {
        Self {
            cache: orchestrator.cache().clone(),
            orchestrator: Arc::new(orchestrator),
            settings,
            started_at: Instant::now(),
        }
    }

    /// Wires the production collaborators from configuration.
    pub fn from_config(config: &Config) -> std::result::Result<Self, TransportError> {
        let transport = Arc::new(ReqwestTransport::new(&user_agent(&config.contact))?);
        let fetcher = Arc::new(ResilientFetcher::new(transport, config.retry_policy()));

        let resolver = MusicBrainzResolver::with_base_url(fetcher.clone(), &config.musicbrainz_url);
        let features = AcousticBrainzClient::with_base_url(fetcher, &config.acousticbrainz_url);
        let cache = SharedCache::new(TtlCache::new(config.cache_max_size, config.cache_ttl));

        let orchestrator = EnrichmentOrchestrator::new(cache, Arc::new(resolver), Arc::new(features));
        Ok(Self::new(orchestrator, EnrichSettings::from(config)))
    }
}

/// Handler for POST /api/enrich
///
/// Truncates the batch to the configured maximum, then enriches it.
pub async fn enrich_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EnrichRequest>, JsonRejection>,
) -> Result<Json<EnrichResponse>> {
    let Json(mut req) = payload.map_err(|e| EnrichError::InvalidRequest(e.body_text()))?;

    let dropped = req.truncate(state.settings.max_tracks);
    if dropped > 0 {
        warn!(dropped, max_tracks = state.settings.max_tracks, "truncated track list");
    }

    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(EnrichError::InvalidRequest(error_msg));
    }

    let ceiling = state.settings.concurrency.max(1);
    let concurrency = req.concurrency.unwrap_or(ceiling).clamp(1, ceiling);

    info!(tracks = req.tracks.len(), concurrency, "enrich request");
    let report = state.orchestrator.enrich(&req.tracks, concurrency).await?;

    Ok(Json(EnrichResponse::from(report)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let entries = state.cache.len().await;
    state.cache.clear().await;
    info!(entries, "lookup cache cleared");

    Json(ClearResponse::new(entries))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = state.started_at.elapsed().as_secs();
    Json(HealthResponse::ok(uptime, state.cache.stats().await))
}
