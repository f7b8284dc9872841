//! MusicBrainz recording search.
//!
//! See: https://musicbrainz.org/doc/MusicBrainz_API/Search
//!
//! MusicBrainz requires a descriptive User-Agent and asks clients to stay
//! near 1 req/sec; requests go through the fetcher, which backs off on 503.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use super::dto::RecordingSearch;
use super::fetch_json;
use crate::enrichment::IdentifierResolver;
use crate::error::LookupError;
use crate::http::ResilientFetcher;

pub const DEFAULT_MUSICBRAINZ_URL: &str = "https://musicbrainz.org/ws/2";

const SERVICE: &str = "musicbrainz";

/// Resolves tracks to MusicBrainz recording ids.
#[derive(Debug, Clone)]
pub struct MusicBrainzResolver {
    fetcher: Arc<ResilientFetcher>,
    base_url: String,
}

impl MusicBrainzResolver {
    pub fn new(fetcher: Arc<ResilientFetcher>) -> Self {
        Self::with_base_url(fetcher, DEFAULT_MUSICBRAINZ_URL)
    }

    pub fn with_base_url(fetcher: Arc<ResilientFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Builds the recording search URL for a Lucene `query`.
    fn search_url(&self, query: &str) -> Result<Url, LookupError> {
        let mut url = Url::parse(&format!("{}/recording/", self.base_url)).map_err(|e| {
            LookupError::InvalidUrl {
                service: SERVICE,
                message: e.to_string(),
            }
        })?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("fmt", "json")
            .append_pair("limit", "1");
        Ok(url)
    }

    /// Id of the first recording matching `query`.
    async fn search(&self, query: &str) -> Result<Option<String>, LookupError> {
        let url = self.search_url(query)?;
        let search: Option<RecordingSearch> = fetch_json(&self.fetcher, SERVICE, url.as_str()).await?;
        Ok(search.and_then(|s| s.recordings.into_iter().next().map(|r| r.id)))
    }
}

fn isrc_query(isrc: &str) -> String {
    format!("isrc:{}", isrc.to_uppercase())
}

fn name_query(name: &str, artist_name: &str) -> String {
    format!(
        "recording:\"{}\" AND artist:\"{}\"",
        escape_phrase(name),
        escape_phrase(artist_name)
    )
}

/// Escapes a value for use inside a quoted Lucene phrase.
fn escape_phrase(value: &str) -> String {
    value.trim().replace('\\', "\\\\").replace('"', "\\\"")
}

#[async_trait]
impl IdentifierResolver for MusicBrainzResolver {
    async fn resolve(
        &self,
        name: &str,
        artist_name: &str,
        isrc: Option<&str>,
    ) -> Result<Option<String>, LookupError> {
        // ISRC lookups are exact but MusicBrainz coverage is sparse, so a
        // miss falls through to the name/artist search
        let mut id = match isrc {
            Some(isrc) => self.search(&isrc_query(isrc)).await?,
            None => None,
        };
        if id.is_none() {
            id = self.search(&name_query(name, artist_name)).await?;
        }

        debug!(track = name, artist = artist_name, found = id.is_some(), "recording search finished");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RetryPolicy;
    use crate::lookup::test_support::RoutedTransport;

    fn resolver(transport: Arc<RoutedTransport>) -> MusicBrainzResolver {
        let policy = RetryPolicy {
            max_retries: 0,
            ..RetryPolicy::default()
        };
        let fetcher = Arc::new(ResilientFetcher::new(transport, policy));
        MusicBrainzResolver::with_base_url(fetcher, "http://mb.test/ws/2/")
    }

    #[tokio::test]
    async fn test_resolves_first_recording() {
        let transport = Arc::new(RoutedTransport::default().route(
            "/recording/",
            200,
            r#"{"count":2,"recordings":[{"id":"mb-first","score":100},{"id":"mb-second"}]}"#,
        ));

        let id = resolver(transport.clone())
            .resolve("Song", "Artist", None)
            .await
            .unwrap();

        assert_eq!(id.as_deref(), Some("mb-first"));
        assert_eq!(transport.seen().len(), 1);
    }

    fn query_of(url: &str) -> String {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "query")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[tokio::test]
    async fn test_isrc_query_preferred() {
        let transport = Arc::new(RoutedTransport::default().route(
            "isrc%3AUSRC1",
            200,
            r#"{"recordings":[{"id":"mb-by-isrc"}]}"#,
        ));

        let id = resolver(transport.clone())
            .resolve("Song", "Artist", Some("usrc1"))
            .await
            .unwrap();

        assert_eq!(id.as_deref(), Some("mb-by-isrc"));
        let seen = transport.seen();
        assert_eq!(seen.len(), 1);
        let url = Url::parse(&seen[0]).unwrap();
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(url.path(), "/ws/2/recording/");
        assert!(query.contains(&("query".into(), "isrc:USRC1".into())));
        assert!(query.contains(&("fmt".into(), "json".into())));
        assert!(query.contains(&("limit".into(), "1".into())));
    }

    #[tokio::test]
    async fn test_isrc_miss_falls_back_to_name_search() {
        let transport = Arc::new(
            RoutedTransport::default()
                .route("isrc%3AUSXX1", 200, r#"{"recordings":[]}"#)
                .route("recording%3A", 200, r#"{"recordings":[{"id":"mb-by-name"}]}"#),
        );

        let id = resolver(transport.clone())
            .resolve("Song", "Artist", Some("USXX1"))
            .await
            .unwrap();

        assert_eq!(id.as_deref(), Some("mb-by-name"));
        let queries: Vec<_> = transport.seen().iter().map(|url| query_of(url)).collect();
        assert_eq!(queries, ["isrc:USXX1", r#"recording:"Song" AND artist:"Artist""#]);
    }

    #[tokio::test]
    async fn test_isrc_not_found_falls_back_to_name_search() {
        let transport = Arc::new(
            RoutedTransport::default()
                .route("isrc%3A", 404, "")
                .route("recording%3A", 200, r#"{"recordings":[{"id":"mb-by-name"}]}"#),
        );

        let id = resolver(transport.clone())
            .resolve("Song", "Artist", Some("USXX1"))
            .await
            .unwrap();

        assert_eq!(id.as_deref(), Some("mb-by-name"));
        assert_eq!(transport.seen().len(), 2);
    }

    #[tokio::test]
    async fn test_isrc_error_does_not_fall_back() {
        let transport = Arc::new(
            RoutedTransport::default()
                .route("isrc%3A", 400, "bad query")
                .route("recording%3A", 200, r#"{"recordings":[{"id":"mb-by-name"}]}"#),
        );

        let err = resolver(transport.clone())
            .resolve("Song", "Artist", Some("USXX1"))
            .await
            .unwrap_err();

        assert!(matches!(err, LookupError::Status { status: 400, .. }));
        assert_eq!(transport.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_name_query_is_quoted() {
        let transport = Arc::new(RoutedTransport::default().route("/recording/", 200, "{}"));

        resolver(transport.clone())
            .resolve("Say \"Hi\"", "AC/DC", None)
            .await
            .unwrap();

        assert_eq!(
            query_of(&transport.seen()[0]),
            r#"recording:"Say \"Hi\"" AND artist:"AC/DC""#
        );
    }

    #[tokio::test]
    async fn test_not_found_is_none() {
        let transport = Arc::new(RoutedTransport::default().route("/recording/", 404, ""));
        let id = resolver(transport).resolve("Song", "Artist", None).await.unwrap();
        assert_eq!(id, None);
    }

    #[tokio::test]
    async fn test_client_error_is_status_error() {
        let transport = Arc::new(RoutedTransport::default().route("/recording/", 400, "bad query"));

        let err = resolver(transport).resolve("Song", "Artist", None).await.unwrap_err();

        assert!(matches!(err, LookupError::Status { service: "musicbrainz", status: 400 }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let transport = Arc::new(RoutedTransport::default().route("/recording/", 200, "<html>"));
        let err = resolver(transport).resolve("Song", "Artist", None).await.unwrap_err();
        assert!(matches!(err, LookupError::Parse { .. }));
    }

    #[test]
    fn test_default_base_url() {
        let transport = Arc::new(RoutedTransport::default());
        let fetcher = Arc::new(ResilientFetcher::new(transport, RetryPolicy::default()));
        assert_eq!(MusicBrainzResolver::new(fetcher).base_url, DEFAULT_MUSICBRAINZ_URL);
    }
}
