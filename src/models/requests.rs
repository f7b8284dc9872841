//! Request DTOs for the enrichment API

use serde::Deserialize;

use crate::enrichment::TrackDescriptor;

/// Request body for `POST /api/enrich`
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichRequest {
    pub tracks: Vec<TrackDescriptor>,
    /// Lookup chains in flight; clamped to the configured ceiling
    #[serde(default)]
    pub concurrency: Option<usize>,
}

impl EnrichRequest {
    /// Drops tracks beyond `max_tracks`. Returns how many were dropped.
    pub fn truncate(&mut self, max_tracks: usize) -> usize {
        let dropped = self.tracks.len().saturating_sub(max_tracks);
        self.tracks.truncate(max_tracks);
        dropped
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.tracks.is_empty() {
            return Some("At least one track is required".to_string());
        }
        if let Some(index) = self
            .tracks
            .iter()
            .position(|t| t.name.trim().is_empty() || t.artist_name.trim().is_empty())
        {
            return Some(format!("Track {} is missing a name or artist", index));
        }
        if self.concurrency == Some(0) {
            return Some("Concurrency must be at least 1".to_string());
        }
        None
    }
}
