//! NFT metadata server
//!
//! Resolves short identifiers to stored metadata documents through strict
//! identifier validation, a TTL/LRU cache and a tolerant payload decoder.

pub mod api;
pub mod cache;
pub mod config;
pub mod decoder;
pub mod error;
pub mod identifier;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod render;

pub use api::{create_router, AppState};
pub use cache::MetadataCache;
pub use config::Config;
pub use identifier::Identifier;
pub use loader::{FsLoader, MetadataSource};
pub use pipeline::{MetadataPipeline, Outcome, Reason};
