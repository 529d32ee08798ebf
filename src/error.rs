//! Error types for the metadata server
//!
//! Every pipeline stage reports a typed error. `ResolveError` aggregates them so
//! stages can use `?`, and the pipeline maps it to a client-facing [`Reason`].

use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::Reason;

// == Identifier Error ==
/// Rejection reasons for a raw identifier.
///
/// All variants surface to the client as `bad_id`; the detail is for logs only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier is {0} characters long")]
    TooLong(usize),

    #[error("identifier contains disallowed character {0:?}")]
    InvalidChar(char),
}

// == Load Error ==
/// Failures reading a metadata payload from storage.
#[derive(Error, Debug)]
pub enum LoadError {
    /// No stored resource exists for the identifier
    #[error("no metadata stored for {0}")]
    NotFound(String),

    /// Any other I/O failure (permissions, transient errors, ...)
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// == Decode Error ==
/// Failures turning stored bytes into a structured value.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// == Render Error ==
/// Failures producing an HTML view.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("view context could not be serialized: {0}")]
    Context(#[from] serde_json::Error),
}

// == Resolve Error ==
/// Unified error for a single pass through the request pipeline.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("undecodable payload: {0}")]
    Decode(#[from] DecodeError),
}

impl ResolveError {
    /// Maps the error to the outcome reported to the client.
    pub fn reason(&self) -> Reason {
        match self {
            ResolveError::InvalidIdentifier(_) => Reason::BadId,
            ResolveError::Load(LoadError::NotFound(_)) => Reason::NotFound,
            ResolveError::Load(LoadError::Io { .. }) => Reason::ServerError,
            ResolveError::Decode(_) => Reason::BadPayload,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the request pipeline.
pub type Result<T> = std::result::Result<T, ResolveError>;
