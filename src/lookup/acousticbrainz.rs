//! AcousticBrainz feature lookup.
//!
//! Each recording needs two documents: `high-level` for the classifier
//! probabilities and `low-level` for the tempo. They are fetched together.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::dto::{HighLevel, HighLevelResponse, LowLevelResponse};
use super::fetch_json;
use crate::enrichment::{FeatureCoverage, FeatureRecord, FeatureSource};
use crate::error::LookupError;
use crate::http::ResilientFetcher;

pub const DEFAULT_ACOUSTICBRAINZ_URL: &str = "https://acousticbrainz.org/api/v1";

const SERVICE: &str = "acousticbrainz";

#[derive(Debug, Clone)]
pub struct AcousticBrainzClient {
    fetcher: Arc<ResilientFetcher>,
    base_url: String,
}

impl AcousticBrainzClient {
    pub fn new(fetcher: Arc<ResilientFetcher>) -> Self {
        Self::with_base_url(fetcher, DEFAULT_ACOUSTICBRAINZ_URL)
    }

    pub fn with_base_url(fetcher: Arc<ResilientFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn high_level(&self, recording_id: &str) -> Result<Option<HighLevel>, LookupError> {
        let url = format!("{}/{}/high-level", self.base_url, recording_id);
        let response: Option<HighLevelResponse> = fetch_json(&self.fetcher, SERVICE, &url).await?;
        Ok(response.map(|r| r.highlevel))
    }

    async fn tempo(&self, recording_id: &str) -> Result<Option<f64>, LookupError> {
        let url = format!("{}/{}/low-level", self.base_url, recording_id);
        let response: Option<LowLevelResponse> = fetch_json(&self.fetcher, SERVICE, &url).await?;
        Ok(response.and_then(|r| r.rhythm.bpm))
    }
}

fn record(high: Option<&HighLevel>, tempo: Option<f64>, coverage: FeatureCoverage) -> FeatureRecord {
    let high = high.cloned().unwrap_or_default();
    FeatureRecord::new(
        high.danceable(),
        high.happy(),
        tempo.unwrap_or(0.0),
        high.party(),
        high.aggressive(),
    )
    .with_coverage(coverage)
}

fn log_missing(recording_id: &str, part: &str, outcome: &Result<Option<impl Sized>, LookupError>) {
    match outcome {
        Err(err) => warn!(recording_id, part, error = %err, "feature document unavailable, zero-filling"),
        _ => warn!(recording_id, part, "feature document missing, zero-filling"),
    }
}

#[async_trait]
impl FeatureSource for AcousticBrainzClient {
    /// Combines both documents. When only one is available the fields of the
    /// other are 0 and the record's coverage says which half is real.
    /// Returns `None` only when neither document could be retrieved.
    async fn fetch_features(
        &self,
        recording_id: &str,
    ) -> Result<Option<FeatureRecord>, LookupError> {
        let (high, tempo) = tokio::join!(self.high_level(recording_id), self.tempo(recording_id));

        match (high, tempo) {
            (Ok(Some(high)), Ok(Some(bpm))) => {
                Ok(Some(record(Some(&high), Some(bpm), FeatureCoverage::Full)))
            }
            (Ok(Some(high)), tempo) => {
                log_missing(recording_id, "low-level", &tempo);
                Ok(Some(record(Some(&high), None, FeatureCoverage::HighLevelOnly)))
            }
            (high, Ok(Some(bpm))) => {
                log_missing(recording_id, "high-level", &high);
                Ok(Some(record(None, Some(bpm), FeatureCoverage::LowLevelOnly)))
            }
            (Err(err), _) | (_, Err(err)) => Err(err),
            (Ok(None), Ok(None)) => Ok(None),
        }
    }
}
