//! Configuration Module
//!
//! Loads server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{DEFAULT_MAX_ITEMS, DEFAULT_TTL_SECS};

/// Default directory holding `{id}.meta` files
pub const DEFAULT_METADATA_DIR: &str = "nfts";

/// Default first path segment of the metadata route
pub const DEFAULT_RESOURCE_ROUTE: &str = "nft";

/// Default HTTP port
pub const DEFAULT_SERVER_PORT: u16 = 3001;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `{id}.meta` files
    pub metadata_dir: PathBuf,
    /// Maximum number of cached documents
    pub cache_max_items: usize,
    /// Cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// HTTP server port
    pub server_port: u16,
    /// First path segment of the metadata route, without slashes
    pub resource_route: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `METADATA_DIR` - Metadata directory (default: `nfts`)
    /// - `CACHE_MAX_ITEMS` - Cache capacity, at least 1 (default: 500)
    /// - `CACHE_TTL_SECS` - Cache TTL in seconds, at least 1 (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3001)
    /// - `RESOURCE_ROUTE` - Route segment (default: `nft`)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            metadata_dir: env::var("METADATA_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.metadata_dir),
            cache_max_items: parse_positive("CACHE_MAX_ITEMS").unwrap_or(defaults.cache_max_items),
            cache_ttl_secs: parse_positive("CACHE_TTL_SECS").unwrap_or(defaults.cache_ttl_secs),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            resource_route: env::var("RESOURCE_ROUTE")
                .ok()
                .map(|v| v.trim_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.resource_route),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metadata_dir: PathBuf::from(DEFAULT_METADATA_DIR),
            cache_max_items: DEFAULT_MAX_ITEMS,
            cache_ttl_secs: DEFAULT_TTL_SECS,
            server_port: DEFAULT_SERVER_PORT,
            resource_route: DEFAULT_RESOURCE_ROUTE.to_string(),
        }
    }
}

/// Parses a variable that must be a positive integer.
fn parse_positive<T>(name: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v > T::default())
}
