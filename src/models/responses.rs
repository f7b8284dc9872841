//! Response DTOs for the enrichment API

use serde::Serialize;

use crate::cache::CacheStats;
use crate::enrichment::{EnrichedTrack, EnrichmentReport, Summary};

/// Response body for `POST /api/enrich`: the summary fields at the top
/// level, followed by every track in request order.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichResponse {
    #[serde(flatten)]
    pub summary: Summary,
    pub tracks: Vec<EnrichedTrack>,
}

impl From<EnrichmentReport> for EnrichResponse {
    fn from(report: EnrichmentReport) -> Self {
        Self {
            summary: report.summary,
            tracks: report.enriched_tracks,
        }
    }
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub cache: CacheStats,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(cache: CacheStats) -> Self {
        Self {
            hit_rate: cache.hit_rate(),
            cache,
        }
    }
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub cache: CacheStats,
}

impl HealthResponse {
    pub fn ok(uptime_secs: u64, cache: CacheStats) -> Self {
        Self {
            status: "ok".to_string(),
            uptime_secs,
            timestamp: chrono::Utc::now().to_rfc3339(),
            cache,
        }
    }
}

/// Response body for `DELETE /cache`
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub entries_cleared: usize,
}

impl ClearResponse {
    pub fn new(entries_cleared: usize) -> Self {
        Self {
            message: "Cache cleared".to_string(),
            entries_cleared,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}
