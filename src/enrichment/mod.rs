//! Enrichment Module
//!
//! Turns caller-supplied tracks into enriched tracks and a batch summary.

mod domain;
mod keys;
mod orchestrator;
mod summary;
mod traits;

pub use domain::{EnrichedTrack, FeatureCoverage, FeatureRecord, TrackDescriptor, TrackState};
pub use keys::{features_key, track_key};
pub use orchestrator::{CachedLookup, EnrichmentOrchestrator, EnrichmentReport, LookupCache};
pub use summary::{classify_mood, MoodLabel, Summary};
pub use traits::{FeatureSource, IdentifierResolver};

#[cfg(test)]
pub(crate) use traits::mocks;
