//! Domain types for the enrichment pipeline.
//!
//! These are the stable shapes the rest of the crate (and the HTTP surface)
//! works with. Lookup collaborators convert their wire formats into them.

use serde::{Deserialize, Serialize};

// == Track Descriptor ==
/// A track as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDescriptor {
    pub name: String,
    #[serde(alias = "artist_name")]
    pub artist_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
}

impl TrackDescriptor {
    pub fn new(name: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artist_name: artist_name.into(),
            isrc: None,
        }
    }

    pub fn with_isrc(mut self, isrc: impl Into<String>) -> Self {
        self.isrc = Some(isrc.into());
        self
    }

    /// The ISRC if one was given and is not blank.
    pub fn isrc(&self) -> Option<&str> {
        self.isrc
            .as_deref()
            .map(str::trim)
            .filter(|isrc| !isrc.is_empty())
    }
}

// == Feature Coverage ==
/// Which of the two feature sub-lookups contributed to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCoverage {
    Full,
    /// Tempo missing, reported as 0
    HighLevelOnly,
    /// Danceability, mood, party and aggressive missing, reported as 0
    LowLevelOnly,
}

// == Feature Record ==
/// Acoustic features for one recording. All values are in `0..=1` except
/// `tempo`, which is in BPM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub danceability: f64,
    pub mood: f64,
    pub tempo: f64,
    pub party: f64,
    pub aggressive: f64,
    pub coverage: FeatureCoverage,
}

impl FeatureRecord {
    pub fn new(danceability: f64, mood: f64, tempo: f64, party: f64, aggressive: f64) -> Self {
        Self {
            danceability,
            mood,
            tempo,
            party,
            aggressive,
            coverage: FeatureCoverage::Full,
        }
    }

    pub fn with_coverage(mut self, coverage: FeatureCoverage) -> Self {
        self.coverage = coverage;
        self
    }

    pub fn is_partial(&self) -> bool {
        self.coverage != FeatureCoverage::Full
    }
}

// == Enriched Track ==
/// Outcome for one input track. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTrack {
    pub track_name: String,
    pub artist_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
    /// MusicBrainz recording id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureRecord>,
    pub has_features: bool,
}

impl EnrichedTrack {
    /// No identifier was found for the track.
    pub fn unmatched(track: &TrackDescriptor) -> Self {
        Self {
            track_name: track.name.clone(),
            artist_name: track.artist_name.clone(),
            isrc: track.isrc.clone(),
            external_id: None,
            features: None,
            has_features: false,
        }
    }

    /// An identifier was found but no features were available for it.
    pub fn identified(track: &TrackDescriptor, external_id: String) -> Self {
        Self {
            external_id: Some(external_id),
            ..Self::unmatched(track)
        }
    }

    pub fn featured(track: &TrackDescriptor, external_id: String, features: FeatureRecord) -> Self {
        Self {
            external_id: Some(external_id),
            features: Some(features),
            has_features: true,
            ..Self::unmatched(track)
        }
    }
}

// == Track State ==
/// Progress of one unit of work.
///
/// ```text
/// Pending -> ResolvingId -> IdFound -> FetchingFeatures -> Featured    -> Done
///                                                       -> FeatureMiss -> Done
///                        -> IdMiss -> Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackState {
    Pending,
    ResolvingId,
    IdFound,
    IdMiss,
    FetchingFeatures,
    Featured,
    FeatureMiss,
    Done,
}

impl TrackState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: TrackState) -> bool {
        use TrackState::*;
        matches!(
            (self, next),
            (Pending, ResolvingId)
                | (ResolvingId, IdFound)
                | (ResolvingId, IdMiss)
                | (IdFound, FetchingFeatures)
                | (FetchingFeatures, Featured)
                | (FetchingFeatures, FeatureMiss)
                | (IdMiss, Done)
                | (Featured, Done)
                | (FeatureMiss, Done)
        )
    }

    /// Moves to `next` if the transition is legal. Returns whether it moved.
    pub fn advance(&mut self, next: TrackState) -> bool {
        if self.can_advance_to(next) {
            *self = next;
            true
        } else {
            false
        }
    }

    pub fn is_terminal(self) -> bool {
        self == TrackState::Done
    }
}
