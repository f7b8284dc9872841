//! Configuration Module
//!
//! Loads service settings from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::{DEFAULT_MAX_SIZE, DEFAULT_TTL_SECONDS};
use crate::http::RetryPolicy;
use crate::lookup::{DEFAULT_ACOUSTICBRAINZ_URL, DEFAULT_MUSICBRAINZ_URL};

/// Service configuration parameters.
///
/// Every value can be overridden through an environment variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum number of entries the lookup cache can hold
    pub cache_max_size: usize,
    /// Lifetime of cached lookups in seconds
    pub cache_ttl: u64,
    /// Lookup chains allowed in flight per request
    pub concurrency: usize,
    /// Tracks beyond this count are dropped from a request
    pub max_tracks: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    pub retry_max: u32,
    pub retry_base_delay_ms: u64,
    pub request_timeout_ms: u64,
    pub musicbrainz_url: String,
    pub acousticbrainz_url: String,
    /// Contact info (email or URL) put in the outbound User-Agent
    pub contact: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 5000)
    /// - `CACHE_TTL` - Cache TTL in seconds (default: 86400)
    /// - `API_CONCURRENCY` - Concurrent lookups per request (default: 3)
    /// - `MAX_TRACKS` - Tracks accepted per request (default: 50)
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `RETRY_MAX` - Retries after the first attempt (default: 3)
    /// - `RETRY_BASE_DELAY_MS` - Backoff base in milliseconds (default: 500)
    /// - `REQUEST_TIMEOUT_MS` - Per-attempt timeout in milliseconds (default: 10000)
    /// - `MUSICBRAINZ_URL` / `ACOUSTICBRAINZ_URL` - API base URLs
    /// - `MUSICBRAINZ_CONTACT` - Operator email or URL for the User-Agent (default: none)
    ///
    /// Unparseable values and zeros where zero is meaningless fall back to
    /// the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cache_max_size: parse_env("CACHE_MAX_SIZE", defaults.cache_max_size),
            cache_ttl: positive_env("CACHE_TTL", defaults.cache_ttl),
            concurrency: positive_env("API_CONCURRENCY", defaults.concurrency),
            max_tracks: positive_env("MAX_TRACKS", defaults.max_tracks),
            server_port: parse_env("SERVER_PORT", defaults.server_port),
            cleanup_interval: positive_env("CLEANUP_INTERVAL", defaults.cleanup_interval),
            retry_max: parse_env("RETRY_MAX", defaults.retry_max),
            retry_base_delay_ms: positive_env("RETRY_BASE_DELAY_MS", defaults.retry_base_delay_ms),
            request_timeout_ms: positive_env("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
            musicbrainz_url: env::var("MUSICBRAINZ_URL").unwrap_or(defaults.musicbrainz_url),
            acousticbrainz_url: env::var("ACOUSTICBRAINZ_URL").unwrap_or(defaults.acousticbrainz_url),
            contact: env::var("MUSICBRAINZ_CONTACT").unwrap_or(defaults.contact),
        }
    }

    /// Retry policy applied to every outbound request.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry_max,
            base_delay_ms: self.retry_base_delay_ms,
            timeout_ms: self.request_timeout_ms,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let retry = RetryPolicy::default();

        Self {
            cache_max_size: DEFAULT_MAX_SIZE,
            cache_ttl: DEFAULT_TTL_SECONDS,
            concurrency: 3,
            max_tracks: 50,
            server_port: 8000,
            cleanup_interval: 60,
            retry_max: retry.max_retries,
            retry_base_delay_ms: retry.base_delay_ms,
            request_timeout_ms: retry.timeout_ms,
            musicbrainz_url: DEFAULT_MUSICBRAINZ_URL.to_string(),
            acousticbrainz_url: DEFAULT_ACOUSTICBRAINZ_URL.to_string(),
            contact: String::new(),
        }
    }
}

fn parse_env<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Like [`parse_env`], but a zero also falls back to `default`.
fn positive_env<T: FromStr + PartialEq + Default + Copy>(name: &str, default: T) -> T {
    let value = parse_env(name, default);
    if value == T::default() {
        default
    } else {
        value
    }
}
