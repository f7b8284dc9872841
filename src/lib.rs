//! Mood Enricher - cache-through acoustic feature enrichment for music tracks
//!
//! Resolves tracks to MusicBrainz recordings, fetches their AcousticBrainz
//! features under a fixed concurrency ceiling, and summarizes the batch.
//! Lookups go through a TTL/LRU cache and a retrying HTTP client.

pub mod api;
pub mod cache;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod http;
pub mod lookup;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use enrichment::{EnrichmentOrchestrator, EnrichmentReport, TrackDescriptor};
pub use error::{EnrichError, FetchError, LookupError};
pub use tasks::spawn_cleanup_task;
