//! API Handlers
//!
//! HTTP request handlers for the metadata server.

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

use crate::cache::MetadataCache;
use crate::config::Config;
use crate::error::RenderError;
use crate::loader::FsLoader;
use crate::models::{ErrorView, HealthResponse, MetadataView, StatsResponse};
use crate::pipeline::{MetadataPipeline, Outcome, Reason};
use crate::render::{render_view, TeraRenderer, View, ViewRenderer};

/// `Cache-Control` sent with every successful metadata page
pub const CLIENT_CACHE_CONTROL: &str = "public, max-age=60";

/// Reports whether a metadata page was served from the in-memory cache
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<MetadataPipeline>,
    pub renderer: Arc<dyn ViewRenderer>,
}

impl AppState {
    pub fn new(pipeline: MetadataPipeline, renderer: Arc<dyn ViewRenderer>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            renderer,
        }
    }

    /// Builds the filesystem-backed pipeline and the embedded-template renderer.
    pub fn from_config(config: &Config) -> Result<Self, RenderError> {
        let cache = MetadataCache::new(config.cache_max_items, config.cache_ttl());
        let source = Arc::new(FsLoader::new(&config.metadata_dir));
        let renderer = Arc::new(TeraRenderer::new()?);

        Ok(Self::new(MetadataPipeline::new(cache, source), renderer))
    }
}

/// Handler for GET /{resource}/:id
pub async fn metadata_handler(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let raw = match &id {
        Ok(Path(raw)) => Some(raw.as_str()),
        Err(rejection) => {
            debug!(%rejection, "unusable identifier segment");
            None
        }
    };

    let outcome = state.pipeline.resolve(raw).await;
    respond(state.renderer.as_ref(), &outcome)
}

/// Handler for GET /{resource} with no identifier segment
pub async fn missing_id_handler(State(state): State<AppState>) -> Response {
    let outcome = state.pipeline.resolve(None).await;
    respond(state.renderer.as_ref(), &outcome)
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.pipeline.cache().read().await;

    Json(StatsResponse::new(
        &cache.stats(),
        cache.capacity(),
        cache.ttl().as_secs(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Response Mapping ==
/// Renders the view for `outcome` and attaches its status and headers.
///
/// A rendering failure turns into the `server_error` page, and if that page
/// cannot be rendered either, into a plain-text 500.
pub fn respond(renderer: &dyn ViewRenderer, outcome: &Outcome) -> Response {
    let rendered = match outcome {
        Outcome::Success { id, value, .. } => MetadataView::new(id, value)
            .map_err(RenderError::from)
            .and_then(|view| render_view(renderer, View::Metadata, &view)),
        Outcome::Failure { reason, token } => render_view(
            renderer,
            View::Error,
            &ErrorView::new(*reason, token.as_deref()),
        ),
    };

    let html = match rendered {
        Ok(html) => html,
        Err(err) => {
            error!(reason = outcome.reason().as_str(), error = %err, "failed to render view");
            return server_error_response(renderer);
        }
    };

    let mut response = (outcome.status_code(), Html(html)).into_response();
    if let Outcome::Success { cache, .. } = outcome {
        let headers = response.headers_mut();
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(CLIENT_CACHE_CONTROL),
        );
        headers.insert(X_CACHE, HeaderValue::from_static(cache.as_str()));
    }
    response
}

fn server_error_response(renderer: &dyn ViewRenderer) -> Response {
    let view = ErrorView::new(Reason::ServerError, None);

    match render_view(renderer, View::Error, &view) {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        Err(err) => {
            error!(error = %err, "failed to render server error view");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
