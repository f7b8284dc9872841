//! API Module
//!
//! HTTP handlers and routing for the enrichment service.
//!
//! # Endpoints
//! - `POST /api/enrich` - Enrich a batch of tracks
//! - `GET /stats` - Lookup cache statistics
//! - `DELETE /cache` - Drop every cached lookup
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
