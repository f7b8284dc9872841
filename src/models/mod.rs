//! Request and Response models for the enrichment API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::EnrichRequest;
pub use responses::{ClearResponse, EnrichResponse, ErrorResponse, HealthResponse, StatsResponse};
