//! Error types for the enrichment service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::http::HttpResponse;
use crate::models::ErrorResponse;

// == Enrich Error Enum ==
/// Errors surfaced by the enrichment pipeline and its HTTP surface.
#[derive(Error, Debug)]
pub enum EnrichError {
    /// The batch finished but no track produced features
    #[error("No analyzable tracks found")]
    NoAnalyzableTracks { tracks_total: usize },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for EnrichError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            EnrichError::NoAnalyzableTracks { tracks_total } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::with_details(
                    self.to_string(),
                    format!(
                        "Could not retrieve acoustic features for any of the {} submitted tracks",
                        tracks_total
                    ),
                ),
            ),
            EnrichError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(msg.clone()))
            }
            EnrichError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(msg.clone()))
            }
        };

        (status, Json(body)).into_response()
    }
}

// == Transport Error ==
/// Failure of the underlying HTTP primitive before any response arrived.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

// == Fetch Error Enum ==
/// Final outcome of a request that the resilient fetcher could not complete.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The last attempt exceeded its per-attempt timeout
    #[error("request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The last attempt failed at the transport layer
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Every attempt got a retryable status; carries the last response
    #[error("giving up after {attempts} attempts, last status {}", .response.status)]
    RetriesExhausted {
        attempts: u32,
        response: Box<HttpResponse>,
    },
}

// == Lookup Error Enum ==
/// Errors raised by the identifier and feature collaborators.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Non-retryable status returned by the remote service
    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("failed to parse {service} response: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    #[error("invalid {service} url: {message}")]
    InvalidUrl {
        service: &'static str,
        message: String,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the enrichment service.
pub type Result<T> = std::result::Result<T, EnrichError>;
