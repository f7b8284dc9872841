//! Batch aggregation and mood classification.

use std::fmt;

use serde::{Serialize, Serializer};

use super::FeatureRecord;

// == Mood Label ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodLabel {
    DarkIntense,
    HighVoltageParty,
    EnergeticHappy,
    SadMelancholic,
    FastIntense,
    GroovyLaidBack,
    ChillAtmospheric,
    CalmReflective,
    Unknown,
}

impl MoodLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodLabel::DarkIntense => "Dark & Intense",
            MoodLabel::HighVoltageParty => "High Voltage Party",
            MoodLabel::EnergeticHappy => "Energetic & Happy",
            MoodLabel::SadMelancholic => "Sad & Melancholic",
            MoodLabel::FastIntense => "Fast & Intense",
            MoodLabel::GroovyLaidBack => "Groovy & Laid Back",
            MoodLabel::ChillAtmospheric => "Chill & Atmospheric",
            MoodLabel::CalmReflective => "Calm & Reflective",
            MoodLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MoodLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// == Averages ==
#[derive(Debug, Clone, Copy, PartialEq)]
struct Averages {
    danceability: f64,
    mood: f64,
    tempo: f64,
    party: f64,
    aggressive: f64,
}

impl Averages {
    fn of(records: &[FeatureRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let n = records.len() as f64;
        let mean = |field: fn(&FeatureRecord) -> f64| records.iter().map(field).sum::<f64>() / n;

        Some(Self {
            danceability: mean(|r| r.danceability),
            mood: mean(|r| r.mood),
            tempo: mean(|r| r.tempo),
            party: mean(|r| r.party),
            aggressive: mean(|r| r.aggressive),
        })
    }

    /// First matching rule wins.
    fn classify(&self) -> MoodLabel {
        if self.aggressive > 0.65 {
            MoodLabel::DarkIntense
        } else if self.party > 0.70 {
            MoodLabel::HighVoltageParty
        } else if self.danceability > 0.65 && self.mood > 0.65 {
            MoodLabel::EnergeticHappy
        } else if self.mood < 0.35 {
            MoodLabel::SadMelancholic
        } else if self.tempo > 135.0 && self.aggressive > 0.3 {
            MoodLabel::FastIntense
        } else if self.danceability > 0.7 {
            MoodLabel::GroovyLaidBack
        } else if self.danceability < 0.4 && self.tempo < 100.0 {
            MoodLabel::ChillAtmospheric
        } else {
            MoodLabel::CalmReflective
        }
    }
}

/// Classifies a batch by its average features. An empty batch is
/// [`MoodLabel::Unknown`].
pub fn classify_mood(records: &[FeatureRecord]) -> MoodLabel {
    Averages::of(records)
        .map(|averages| averages.classify())
        .unwrap_or(MoodLabel::Unknown)
}

// == Summary ==
/// Means over the tracks that produced features.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub avg_danceability: f64,
    pub avg_mood: f64,
    pub avg_tempo: f64,
    pub avg_party: f64,
    pub avg_aggressive: f64,
    pub mood: MoodLabel,
    pub tracks_analyzed: usize,
    pub tracks_total: usize,
    /// Analyzed tracks whose record was zero-filled by a partial lookup
    pub tracks_partial: usize,
}

impl Summary {
    /// Aggregates `records`. Returns `None` when there is nothing to
    /// aggregate.
    pub fn compute(records: &[FeatureRecord], tracks_total: usize) -> Option<Self> {
        let averages = Averages::of(records)?;

        Some(Self {
            avg_danceability: averages.danceability,
            avg_mood: averages.mood,
            avg_tempo: averages.tempo,
            avg_party: averages.party,
            avg_aggressive: averages.aggressive,
            mood: averages.classify(),
            tracks_analyzed: records.len(),
            tracks_total,
            tracks_partial: records.iter().filter(|r| r.is_partial()).count(),
        })
    }
}
