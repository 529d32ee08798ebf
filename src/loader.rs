//! Resource Loader
//!
//! Reads stored metadata payloads. The filesystem backend keeps one
//! `{id}.meta` file per identifier under a base directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::LoadError;
use crate::identifier::Identifier;

/// Suffix appended to an identifier to form its file name.
pub const METADATA_SUFFIX: &str = ".meta";

// == Metadata Source ==
/// A storage backend for raw metadata payloads.
///
/// Implementations only ever receive validated identifiers.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Reads the raw payload stored for `id`.
    async fn load(&self, id: &Identifier) -> Result<Vec<u8>, LoadError>;
}

// == Filesystem Loader ==
/// Reads `{base_dir}/{id}.meta`.
#[derive(Debug, Clone)]
pub struct FsLoader {
    base_dir: PathBuf,
}

impl FsLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Storage path for `id`. Only reachable with a validated identifier.
    pub fn path_for(&self, id: &Identifier) -> PathBuf {
        self.base_dir
            .join(format!("{}{}", id.as_str(), METADATA_SUFFIX))
    }
}

#[async_trait]
impl MetadataSource for FsLoader {
    async fn load(&self, id: &Identifier) -> Result<Vec<u8>, LoadError> {
        let path = self.path_for(id);

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(LoadError::NotFound(id.to_string()))
            }
            Err(source) => Err(LoadError::Io { path, source }),
        }
    }
}
