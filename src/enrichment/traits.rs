//! Collaborator traits used by the orchestrator.
//!
//! Production implementations live in [`crate::lookup`]; tests substitute
//! the mocks below.

use async_trait::async_trait;

use super::FeatureRecord;
use crate::error::LookupError;

/// Resolves a track to an external recording identifier.
#[async_trait]
pub trait IdentifierResolver: Send + Sync {
    /// `Ok(None)` means the service answered but knows no such track.
    async fn resolve(
        &self,
        name: &str,
        artist_name: &str,
        isrc: Option<&str>,
    ) -> Result<Option<String>, LookupError>;
}

/// Fetches acoustic features for a recording identifier.
#[async_trait]
pub trait FeatureSource: Send + Sync {
    async fn fetch_features(&self, recording_id: &str)
        -> Result<Option<FeatureRecord>, LookupError>;
}
