//! Wire formats of the MusicBrainz and AcousticBrainz APIs.
//!
//! Only the fields the pipeline reads are modelled. These types stay inside
//! the lookup module; callers see [`FeatureRecord`](crate::enrichment::FeatureRecord).

use std::collections::HashMap;

use serde::Deserialize;

// == MusicBrainz ==
/// Response of `GET /ws/2/recording/?query=...`
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingSearch {
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recording {
    pub id: String,
}

// == AcousticBrainz ==
/// Response of `GET /{mbid}/high-level`
#[derive(Debug, Clone, Deserialize)]
pub struct HighLevelResponse {
    pub highlevel: HighLevel,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HighLevel {
    pub danceability: Option<Classifier>,
    pub mood_happy: Option<Classifier>,
    pub mood_party: Option<Classifier>,
    pub mood_aggressive: Option<Classifier>,
}

/// One classifier's output; `all` maps each class to its probability.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Classifier {
    #[serde(default)]
    pub all: HashMap<String, f64>,
}

impl HighLevel {
    pub fn danceable(&self) -> f64 {
        probability(&self.danceability, "danceable")
    }

    pub fn happy(&self) -> f64 {
        probability(&self.mood_happy, "happy")
    }

    pub fn party(&self) -> f64 {
        probability(&self.mood_party, "party")
    }

    pub fn aggressive(&self) -> f64 {
        probability(&self.mood_aggressive, "aggressive")
    }
}

/// Missing classifiers and classes count as 0.
fn probability(classifier: &Option<Classifier>, class: &str) -> f64 {
    classifier
        .as_ref()
        .and_then(|c| c.all.get(class).copied())
        .unwrap_or(0.0)
}

/// Response of `GET /{mbid}/low-level`
#[derive(Debug, Clone, Deserialize)]
pub struct LowLevelResponse {
    #[serde(default)]
    pub rhythm: Rhythm,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rhythm {
    pub bpm: Option<f64>,
}
