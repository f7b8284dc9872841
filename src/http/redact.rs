//! Credential scrubbing for logged URLs.

use reqwest::Url;

const SENSITIVE_PARAMS: &[&str] = &[
    "access_token",
    "key",
    "api_key",
    "apikey",
    "token",
    "client_secret",
];

fn is_sensitive(name: &str) -> bool {
    SENSITIVE_PARAMS
        .iter()
        .any(|param| param.eq_ignore_ascii_case(name))
}

/// Returns `raw` with credential-bearing query parameters removed.
///
/// Input that does not parse as a URL loses its whole query string.
pub fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.split('?').next().unwrap_or_default().to_string();
    };

    if url.query().is_none() {
        return url.to_string();
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| !is_sensitive(name))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept.iter());
    }
    url.to_string()
}
