//! Request Pipeline
//!
//! One pass per request: validate the identifier, consult the cache, load and
//! decode on a miss, then store the decoded value. The pipeline is the only place
//! that maps stage errors to outcomes and the only place that catches unexpected
//! failures.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::http::StatusCode;
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::cache::MetadataCache;
use crate::decoder;
use crate::error::Result;
use crate::identifier::Identifier;
use crate::loader::MetadataSource;

// == Reason ==
/// The client-visible outcome discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Success,
    BadId,
    NotFound,
    BadPayload,
    ServerError,
}

impl Reason {
    pub fn status_code(self) -> StatusCode {
        match self {
            Reason::Success => StatusCode::OK,
            Reason::BadId => StatusCode::BAD_REQUEST,
            Reason::NotFound => StatusCode::NOT_FOUND,
            Reason::BadPayload => StatusCode::UNPROCESSABLE_ENTITY,
            Reason::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Reason::Success => "success",
            Reason::BadId => "bad_id",
            Reason::NotFound => "not_found",
            Reason::BadPayload => "bad_payload",
            Reason::ServerError => "server_error",
        }
    }

    /// Human-readable headline for the outcome page.
    pub fn message(self) -> &'static str {
        match self {
            Reason::Success => "OK",
            Reason::BadId => "Invalid identifier",
            Reason::NotFound => "Metadata not found",
            Reason::BadPayload => "Stored metadata could not be read",
            Reason::ServerError => "Something went wrong",
        }
    }

    /// Whether the error view may echo the submitted token.
    fn shows_token(self) -> bool {
        matches!(self, Reason::BadId | Reason::NotFound)
    }
}

// == Cache Status ==
/// Where a successful value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

// == Outcome ==
/// Terminal state of one pipeline pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success {
        id: Identifier,
        value: Arc<Value>,
        cache: CacheStatus,
    },
    Failure {
        reason: Reason,
        /// Submitted token, kept only for reasons that display it
        token: Option<String>,
    },
}

impl Outcome {
    fn failure(reason: Reason, token: Option<&str>) -> Self {
        let token = token
            .filter(|_| reason.shows_token())
            .map(str::to_string);
        Outcome::Failure { reason, token }
    }

    pub fn reason(&self) -> Reason {
        match self {
            Outcome::Success { .. } => Reason::Success,
            Outcome::Failure { reason, .. } => *reason,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.reason().status_code()
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Success { value, .. } => Some(value.as_ref()),
            Outcome::Failure { .. } => None,
        }
    }
}

struct Resolved {
    id: Identifier,
    value: Arc<Value>,
    cache: CacheStatus,
}

// == Metadata Pipeline ==
/// Resolves identifiers to decoded metadata through the shared cache.
pub struct MetadataPipeline {
    cache: Arc<RwLock<MetadataCache>>,
    source: Arc<dyn MetadataSource>,
}

impl MetadataPipeline {
    pub fn new(cache: MetadataCache, source: Arc<dyn MetadataSource>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            source,
        }
    }

    /// Shared handle to the cache, for statistics.
    pub fn cache(&self) -> &Arc<RwLock<MetadataCache>> {
        &self.cache
    }

    // == Resolve ==
    /// Runs one pass for a raw path segment.
    ///
    /// `None` means the route carried no identifier segment at all; it is a
    /// `bad_id` without running the validator.
    pub async fn resolve(&self, raw_id: Option<&str>) -> Outcome {
        let Some(raw) = raw_id else {
            debug!("request without identifier segment");
            return Outcome::failure(Reason::BadId, None);
        };

        match AssertUnwindSafe(self.run(raw)).catch_unwind().await {
            Ok(Ok(resolved)) => Outcome::Success {
                id: resolved.id,
                value: resolved.value,
                cache: resolved.cache,
            },
            Ok(Err(err)) => {
                let reason = err.reason();
                match reason {
                    Reason::ServerError => {
                        error!(token = %raw, error = %err, "metadata request failed")
                    }
                    Reason::BadPayload => {
                        warn!(token = %raw, error = %err, "stored metadata is undecodable")
                    }
                    _ => debug!(token = %raw, error = %err, "metadata request rejected"),
                }
                Outcome::failure(reason, Some(raw))
            }
            Err(panic) => {
                error!(
                    token = %raw,
                    panic = panic_message(panic.as_ref()),
                    "metadata request panicked"
                );
                Outcome::failure(Reason::ServerError, None)
            }
        }
    }

    async fn run(&self, raw: &str) -> Result<Resolved> {
        let id = Identifier::parse(raw)?;

        let cached = self.cache.write().await.get(id.as_str());
        if let Some(value) = cached {
            debug!(id = %id, "metadata cache hit");
            return Ok(Resolved {
                id,
                value,
                cache: CacheStatus::Hit,
            });
        }

        // No lock is held across the storage read, and concurrent misses for the
        // same id are not coalesced.
        debug!(id = %id, "metadata cache miss");
        let bytes = self.source.load(&id).await?;
        let value = Arc::new(decoder::decode(&bytes)?);

        self.cache
            .write()
            .await
            .set(id.as_str(), Arc::clone(&value));

        Ok(Resolved {
            id,
            value,
            cache: CacheStatus::Miss,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Barrier;

    /// In-memory source that counts reads.
    #[derive(Default)]
    struct MemorySource {
        files: HashMap<String, Vec<u8>>,
        reads: AtomicUsize,
        barrier: Option<Barrier>,
    }

    impl MemorySource {
        fn with(files: &[(&str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(id, body)| (id.to_string(), body.as_bytes().to_vec()))
                    .collect(),
                ..Default::default()
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MetadataSource for MemorySource {
        async fn load(&self, id: &Identifier) -> std::result::Result<Vec<u8>, LoadError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            self.files
                .get(id.as_str())
                .cloned()
                .ok_or_else(|| LoadError::NotFound(id.to_string()))
        }
    }

    struct FailingSource;

    #[async_trait]
    impl MetadataSource for FailingSource {
        async fn load(&self, id: &Identifier) -> std::result::Result<Vec<u8>, LoadError> {
            Err(LoadError::Io {
                path: format!("/secret/internal/{}.meta", id).into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }
    }

    struct PanickingSource;

    #[async_trait]
    impl MetadataSource for PanickingSource {
        async fn load(&self, _id: &Identifier) -> std::result::Result<Vec<u8>, LoadError> {
            panic!("storage backend exploded");
        }
    }

    fn pipeline(source: Arc<dyn MetadataSource>) -> MetadataPipeline {
        MetadataPipeline::new(MetadataCache::new(16, Duration::from_secs(300)), source)
    }

    #[tokio::test]
    async fn test_missing_segment_is_bad_id() {
        let source = Arc::new(MemorySource::default());
        let outcome = pipeline(source.clone()).resolve(None).await;

        assert_eq!(
            outcome,
            Outcome::Failure {
                reason: Reason::BadId,
                token: None
            }
        );
        assert_eq!(source.reads(), 0);
    }

    #[tokio::test]
    async fn test_traversal_rejected_before_storage() {
        let source = Arc::new(MemorySource::default());
        let outcome = pipeline(source.clone()).resolve(Some("../secret")).await;

        assert_eq!(outcome.reason(), Reason::BadId);
        assert_eq!(outcome.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            outcome,
            Outcome::Failure {
                reason: Reason::BadId,
                token: Some("../secret".to_string())
            }
        );
        assert_eq!(source.reads(), 0);
    }

    #[tokio::test]
    async fn test_not_found() {
        let source = Arc::new(MemorySource::default());
        let outcome = pipeline(source).resolve(Some("abc123")).await;

        assert_eq!(outcome.reason(), Reason::NotFound);
        assert_eq!(outcome.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_success_then_cache_hit() {
        let source = Arc::new(MemorySource::with(&[("ok1", r#"{"name":"x"}"#)]));
        let pipeline = pipeline(source.clone());

        let first = pipeline.resolve(Some("ok1")).await;
        assert_eq!(first.reason(), Reason::Success);
        assert_eq!(first.value(), Some(&json!({"name": "x"})));
        assert!(matches!(
            first,
            Outcome::Success { cache: CacheStatus::Miss, .. }
        ));

        let second = pipeline.resolve(Some("ok1")).await;
        assert_eq!(second.value(), first.value());
        assert!(matches!(
            second,
            Outcome::Success { cache: CacheStatus::Hit, .. }
        ));
        assert_eq!(source.reads(), 1);

        let stats = pipeline.cache().read().await.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_bad_payload_is_not_cached() {
        let source = Arc::new(MemorySource::with(&[("bad1", "not-json-not-b64!!")]));
        let pipeline = pipeline(source.clone());

        let outcome = pipeline.resolve(Some("bad1")).await;
        assert_eq!(
            outcome,
            Outcome::Failure {
                reason: Reason::BadPayload,
                token: None
            }
        );
        assert_eq!(outcome.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        pipeline.resolve(Some("bad1")).await;
        assert_eq!(source.reads(), 2);
        assert!(pipeline.cache().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_io_failure_is_server_error_without_detail() {
        let outcome = pipeline(Arc::new(FailingSource)).resolve(Some("abc")).await;

        assert_eq!(
            outcome,
            Outcome::Failure {
                reason: Reason::ServerError,
                token: None
            }
        );
        assert_eq!(outcome.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_panic_is_caught_at_boundary() {
        let pipeline = pipeline(Arc::new(PanickingSource));

        let outcome = pipeline.resolve(Some("abc")).await;
        assert_eq!(outcome.reason(), Reason::ServerError);

        // The cache lock is not poisoned by the panic.
        assert!(pipeline.cache().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_misses_are_not_coalesced() {
        let source = Arc::new(MemorySource {
            barrier: Some(Barrier::new(2)),
            ..MemorySource::with(&[("ok1", r#"{"name":"x"}"#)])
        });
        let pipeline = pipeline(source.clone());

        // Both requests must be inside the storage read at once to pass the barrier.
        let (a, b) = tokio::join!(pipeline.resolve(Some("ok1")), pipeline.resolve(Some("ok1")));

        assert!(matches!(
            a,
            Outcome::Success { cache: CacheStatus::Miss, .. }
        ));
        assert!(matches!(
            b,
            Outcome::Success { cache: CacheStatus::Miss, .. }
        ));
        assert_eq!(source.reads(), 2);
        assert_eq!(pipeline.cache().read().await.len(), 1);
    }

    #[test]
    fn test_reason_messages() {
        assert_eq!(Reason::Success.message(), "OK");
        assert_eq!(Reason::NotFound.message(), "Metadata not found");
        assert_eq!(Reason::ServerError.message(), "Something went wrong");
    }

    #[test]
    fn test_reason_strings_and_codes() {
        let cases = [
            (Reason::Success, "success", 200),
            (Reason::BadId, "bad_id", 400),
            (Reason::NotFound, "not_found", 404),
            (Reason::BadPayload, "bad_payload", 422),
            (Reason::ServerError, "server_error", 500),
        ];
        for (reason, name, code) in cases {
            assert_eq!(reason.as_str(), name);
            assert!(!reason.message().is_empty());
            assert_eq!(reason.status_code().as_u16(), code);
            assert_eq!(serde_json::to_value(reason).unwrap(), json!(name));
        }
    }
}
