//! Lookup Module
//!
//! Production collaborators for the orchestrator, talking to MusicBrainz
//! and AcousticBrainz through the [`ResilientFetcher`].

mod acousticbrainz;
mod dto;
mod musicbrainz;

pub use acousticbrainz::{AcousticBrainzClient, DEFAULT_ACOUSTICBRAINZ_URL};
pub use musicbrainz::{MusicBrainzResolver, DEFAULT_MUSICBRAINZ_URL};

use serde::de::DeserializeOwned;

use crate::error::LookupError;
use crate::http::{HttpRequest, ResilientFetcher};

/// GETs `url` and decodes a JSON body.
///
/// A 404 means the service has no such resource and yields `Ok(None)`.
/// Any other non-2xx status left over after retries is an error.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    fetcher: &ResilientFetcher,
    service: &'static str,
    url: &str,
) -> Result<Option<T>, LookupError> {
    let request = HttpRequest::get(url).with_header("Accept", "application/json");
    let response = fetcher.fetch(&request).await?;

    if response.status == 404 {
        return Ok(None);
    }
    if !response.is_success() {
        return Err(LookupError::Status {
            service,
            status: response.status,
        });
    }

    response.json().map(Some).map_err(|e| LookupError::Parse {
        service,
        message: e.to_string(),
    })
}
