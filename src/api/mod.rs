//! API Module
//!
//! HTTP handlers and routing for the metadata server.
//!
//! # Endpoints
//! - `GET /nft/:id` - Rendered metadata for an identifier
//! - `GET /nft` - Missing identifier (`bad_id`)
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
