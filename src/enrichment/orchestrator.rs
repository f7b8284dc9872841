//! Enrichment Orchestrator
//!
//! Fans a batch of tracks out over a fixed number of concurrent lookup
//! chains, each going through the shared cache before touching the
//! network, then aggregates whatever came back.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, info_span, warn, Instrument};

use super::keys::{features_key, track_key};
use super::{
    EnrichedTrack, FeatureRecord, FeatureSource, IdentifierResolver, Summary, TrackDescriptor,
    TrackState,
};
use crate::cache::{with_cache, SharedCache};
use crate::error::{EnrichError, Result};

// == Cached Lookup ==
/// Values kept in the lookup cache. Keys are namespaced (`isrc:`, `track:`,
/// `features:`) so a key only ever holds one variant.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedLookup {
    RecordingId(String),
    Features(FeatureRecord),
}

pub type LookupCache = SharedCache<CachedLookup>;

// == Enrichment Report ==
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentReport {
    /// One entry per input track, in input order
    pub enriched_tracks: Vec<EnrichedTrack>,
    pub tracks_analyzed: usize,
    pub tracks_total: usize,
    pub summary: Summary,
}

// == Orchestrator ==
#[derive(Clone)]
pub struct EnrichmentOrchestrator {
    cache: LookupCache,
    resolver: Arc<dyn IdentifierResolver>,
    features: Arc<dyn FeatureSource>,
    /// Overrides the cache's default TTL when set
    ttl_seconds: Option<u64>,
}

impl EnrichmentOrchestrator {
    pub fn new(
        cache: LookupCache,
        resolver: Arc<dyn IdentifierResolver>,
        features: Arc<dyn FeatureSource>,
    ) -> Self {
        Self {
            cache,
            resolver,
            features,
            ttl_seconds: None,
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = Some(ttl_seconds);
        self
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    // == Enrich ==
    /// Enriches `tracks` with at most `concurrency` lookup chains in flight.
    ///
    /// Units are admitted in input order and may finish in any order; the
    /// report lists them in input order. A unit that fails or panics is
    /// recorded without features and never affects its siblings. Fails with
    /// [`EnrichError::NoAnalyzableTracks`] when no track produced features.
    pub async fn enrich(
        &self,
        tracks: &[TrackDescriptor],
        concurrency: usize,
    ) -> Result<EnrichmentReport> {
        let concurrency = concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut handles = Vec::with_capacity(tracks.len());

        info!(tracks = tracks.len(), concurrency, "starting enrichment");

        for (index, track) in tracks.iter().enumerate() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| EnrichError::Internal(e.to_string()))?;

            let orchestrator = self.clone();
            let track = track.clone();
            let span = info_span!("enrich_track", index, track = %track.name);

            handles.push(tokio::spawn(
                async move {
                    let _permit = permit;
                    orchestrator.enrich_track(&track).await
                }
                .instrument(span),
            ));
        }

        let mut enriched_tracks = Vec::with_capacity(tracks.len());
        for (track, handle) in tracks.iter().zip(handles) {
            let enriched = match handle.await {
                Ok(enriched) => enriched,
                Err(err) => {
                    warn!(track = %track.name, error = %err, "enrichment unit aborted");
                    EnrichedTrack::unmatched(track)
                }
            };
            enriched_tracks.push(enriched);
        }

        let records: Vec<FeatureRecord> = enriched_tracks
            .iter()
            .filter(|t| t.has_features)
            .filter_map(|t| t.features)
            .collect();

        let tracks_total = enriched_tracks.len();
        let summary = Summary::compute(&records, tracks_total)
            .ok_or(EnrichError::NoAnalyzableTracks { tracks_total })?;

        info!(
            analyzed = summary.tracks_analyzed,
            partial = summary.tracks_partial,
            total = tracks_total,
            mood = %summary.mood,
            "enrichment finished"
        );

        Ok(EnrichmentReport {
            tracks_analyzed: summary.tracks_analyzed,
            tracks_total,
            enriched_tracks,
            summary,
        })
    }

    // == Per-Track Unit ==
    async fn enrich_track(&self, track: &TrackDescriptor) -> EnrichedTrack {
        let mut state = TrackState::Pending;
        transition(&mut state, TrackState::ResolvingId);

        let Some(recording_id) = self.resolve_id(track).await else {
            transition(&mut state, TrackState::IdMiss);
            transition(&mut state, TrackState::Done);
            return EnrichedTrack::unmatched(track);
        };

        transition(&mut state, TrackState::IdFound);
        transition(&mut state, TrackState::FetchingFeatures);

        let enriched = match self.fetch_features(&recording_id).await {
            Some(features) => {
                transition(&mut state, TrackState::Featured);
                EnrichedTrack::featured(track, recording_id, features)
            }
            None => {
                transition(&mut state, TrackState::FeatureMiss);
                EnrichedTrack::identified(track, recording_id)
            }
        };
        transition(&mut state, TrackState::Done);
        enriched
    }

    async fn resolve_id(&self, track: &TrackDescriptor) -> Option<String> {
        let key = track_key(track);
        let resolver = &self.resolver;

        let lookup = with_cache(&self.cache, &key, self.ttl_seconds, move || async move {
            resolver
                .resolve(&track.name, &track.artist_name, track.isrc())
                .await
                .map(|id| id.map(CachedLookup::RecordingId))
        })
        .await;

        match lookup {
            Ok(Some(CachedLookup::RecordingId(id))) => Some(id),
            Ok(Some(other)) => {
                warn!(key = %key, cached = ?other, "unexpected cache entry for track key");
                None
            }
            Ok(None) => {
                debug!(key = %key, "no recording found");
                None
            }
            Err(err) => {
                warn!(key = %key, error = %err, "identifier lookup failed");
                None
            }
        }
    }

    async fn fetch_features(&self, recording_id: &str) -> Option<FeatureRecord> {
        let key = features_key(recording_id);
        let features = &self.features;

        let lookup = with_cache(&self.cache, &key, self.ttl_seconds, move || async move {
            features
                .fetch_features(recording_id)
                .await
                .map(|record| record.map(CachedLookup::Features))
        })
        .await;

        match lookup {
            Ok(Some(CachedLookup::Features(record))) => Some(record),
            Ok(Some(other)) => {
                warn!(key = %key, cached = ?other, "unexpected cache entry for features key");
                None
            }
            Ok(None) => {
                debug!(recording_id, "no features available");
                None
            }
            Err(err) => {
                warn!(recording_id, error = %err, "feature lookup failed");
                None
            }
        }
    }
}

impl std::fmt::Debug for EnrichmentOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentOrchestrator")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

fn transition(state: &mut TrackState, next: TrackState) {
    let from = *state;
    if state.advance(next) {
        debug!(?from, to = ?next, "track state");
    } else {
        warn!(?from, to = ?next, "ignored illegal track state transition");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::mocks::{InFlightGauge, MockFeatures, MockResolver};
    use std::time::Duration;

    fn sample_record() -> FeatureRecord {
        FeatureRecord::new(0.8, 0.75, 125.0, 0.6, 0.2)
    }

    fn orchestrator(resolver: Arc<MockResolver>, features: Arc<MockFeatures>) -> EnrichmentOrchestrator {
        EnrichmentOrchestrator::new(LookupCache::with_capacity(100, 3600), resolver, features)
    }

    fn tracks(names: &[&str]) -> Vec<TrackDescriptor> {
        names
            .iter()
            .map(|name| TrackDescriptor::new(*name, "Artist"))
            .collect()
    }

    #[tokio::test]
    async fn test_end_to_end_exact_averages() {
        let resolver = Arc::new(MockResolver::with_ids(&[("A", "mb-a"), ("B", "mb-b")]));
        let features = Arc::new(MockFeatures::always(sample_record()));
        let input = vec![
            TrackDescriptor::new("A", "Artist").with_isrc("US1"),
            TrackDescriptor::new("B", "Artist").with_isrc("US2"),
        ];

        let report = orchestrator(resolver, features).enrich(&input, 3).await.unwrap();

        assert_eq!(report.tracks_analyzed, 2);
        assert_eq!(report.tracks_total, 2);
        assert_eq!(report.summary.avg_danceability, 0.8);
        assert_eq!(report.summary.avg_mood, 0.75);
        assert_eq!(report.summary.avg_tempo, 125.0);
        assert_eq!(report.summary.avg_party, 0.6);
        assert_eq!(report.summary.avg_aggressive, 0.2);
        assert_eq!(report.summary.mood.as_str(), "Energetic & Happy");
    }

    #[tokio::test]
    async fn test_m_of_n_in_input_order() {
        let resolver = Arc::new(MockResolver::with_ids(&[("t1", "id1"), ("t3", "id3"), ("t4", "id4")]));
        let features = Arc::new(MockFeatures::only(sample_record(), &["id1", "id3"]));
        let input = tracks(&["t0", "t1", "t2", "t3", "t4"]);

        let report = orchestrator(resolver, features).enrich(&input, 2).await.unwrap();

        let names: Vec<_> = report.enriched_tracks.iter().map(|t| t.track_name.as_str()).collect();
        assert_eq!(names, ["t0", "t1", "t2", "t3", "t4"]);

        let flags: Vec<_> = report.enriched_tracks.iter().map(|t| t.has_features).collect();
        assert_eq!(flags, [false, true, false, true, false]);
        assert_eq!(report.tracks_analyzed, 2);
        assert_eq!(report.tracks_total, 5);

        // Identified but featureless keeps its id
        assert_eq!(report.enriched_tracks[4].external_id.as_deref(), Some("id4"));
        assert!(report.enriched_tracks[4].features.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_order_survives_out_of_order_completion() {
        let resolver = Arc::new(MockResolver {
            delay: Duration::from_millis(50),
            ..MockResolver::with_ids(&[("a", "1"), ("b", "2"), ("c", "3")])
        });
        let features = Arc::new(MockFeatures::always(sample_record()));

        let report = orchestrator(resolver, features)
            .enrich(&tracks(&["a", "b", "c"]), 3)
            .await
            .unwrap();

        let ids: Vec<_> = report
            .enriched_tracks
            .iter()
            .map(|t| t.external_id.clone().unwrap())
            .collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_no_analyzable_tracks() {
        let resolver = Arc::new(MockResolver::default());
        let features = Arc::new(MockFeatures::always(sample_record()));

        let err = orchestrator(resolver, features.clone())
            .enrich(&tracks(&["x", "y"]), 3)
            .await
            .unwrap_err();

        assert!(matches!(err, EnrichError::NoAnalyzableTracks { tracks_total: 2 }));
        assert_eq!(features.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_not_analyzable() {
        let resolver = Arc::new(MockResolver::default());
        let features = Arc::new(MockFeatures::always(sample_record()));

        let err = orchestrator(resolver, features).enrich(&[], 3).await.unwrap_err();

        assert!(matches!(err, EnrichError::NoAnalyzableTracks { tracks_total: 0 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_bound_covers_whole_lookup_chain() {
        let names: Vec<String> = (0..10).map(|i| format!("track{i}")).collect();
        let pairs: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), n.as_str())).collect();
        // Both phases report into one gauge, so a permit freed between the
        // identifier and feature calls would push the count past 3
        let gauge = Arc::new(InFlightGauge::default());
        let resolver = Arc::new(MockResolver {
            delay: Duration::from_millis(100),
            gauge: gauge.clone(),
            ..MockResolver::with_ids(&pairs)
        });
        let features = Arc::new(MockFeatures {
            delay: Duration::from_millis(100),
            gauge: gauge.clone(),
            ..MockFeatures::always(sample_record())
        });
        let input: Vec<_> = names.iter().map(|n| TrackDescriptor::new(n.clone(), "Artist")).collect();

        let report = orchestrator(resolver.clone(), features.clone())
            .enrich(&input, 3)
            .await
            .unwrap();

        assert_eq!(report.tracks_analyzed, 10);
        assert_eq!(resolver.calls(), 10);
        assert_eq!(features.calls(), 10);
        assert_eq!(gauge.max(), 3);
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_makes_progress() {
        let resolver = Arc::new(MockResolver::with_ids(&[("a", "1")]));
        let features = Arc::new(MockFeatures::always(sample_record()));

        let report = orchestrator(resolver, features)
            .enrich(&tracks(&["a"]), 0)
            .await
            .unwrap();

        assert_eq!(report.tracks_analyzed, 1);
    }

    #[tokio::test]
    async fn test_failures_and_panics_stay_local() {
        let resolver = Arc::new(MockResolver {
            failing: vec!["bad".into()],
            panicking: vec!["boom".into()],
            ..MockResolver::with_ids(&[("ok1", "1"), ("ok2", "2"), ("boom", "3")])
        });
        let features = Arc::new(MockFeatures::always(sample_record()));

        let report = orchestrator(resolver, features)
            .enrich(&tracks(&["ok1", "bad", "boom", "ok2"]), 2)
            .await
            .unwrap();

        let flags: Vec<_> = report.enriched_tracks.iter().map(|t| t.has_features).collect();
        assert_eq!(flags, [true, false, false, true]);
        assert_eq!(report.enriched_tracks[2].track_name, "boom");
        assert_eq!(report.tracks_analyzed, 2);
    }

    #[tokio::test]
    async fn test_cache_deduplicates_lookups() {
        let resolver = Arc::new(MockResolver::with_ids(&[("Song", "mb-1"), ("Song (Live)", "mb-1")]));
        let features = Arc::new(MockFeatures::always(sample_record()));
        let input = vec![
            TrackDescriptor::new("Song", "Artist").with_isrc("US1"),
            TrackDescriptor::new("Song", "Artist").with_isrc("us1"),
            TrackDescriptor::new("Song (Live)", "Artist"),
        ];
        let orchestrator = orchestrator(resolver.clone(), features.clone());

        let report = orchestrator.enrich(&input, 1).await.unwrap();

        assert_eq!(report.tracks_analyzed, 3);
        // Same ISRC shares one resolution, same recording shares one feature fetch
        assert_eq!(resolver.calls(), 2);
        assert_eq!(features.calls(), 1);

        orchestrator.enrich(&input, 1).await.unwrap();
        assert_eq!(resolver.calls(), 2);
        assert_eq!(features.calls(), 1);
    }

    #[tokio::test]
    async fn test_misses_are_not_cached() {
        let resolver = Arc::new(MockResolver::with_ids(&[("known", "1")]));
        let features = Arc::new(MockFeatures::always(sample_record()));
        let orchestrator = orchestrator(resolver.clone(), features);
        let input = tracks(&["known", "unknown"]);

        orchestrator.enrich(&input, 1).await.unwrap();
        orchestrator.enrich(&input, 1).await.unwrap();

        // "unknown" is asked again on the second batch
        assert_eq!(resolver.calls(), 3);
    }
}
