//! View Rendering
//!
//! The presentation sink: takes a named view and a data object and returns
//! HTML. Templates are embedded in the binary and rendered with Tera, which
//! autoescapes `.html` templates.

use serde::Serialize;
use serde_json::Value;
use tera::{Context, Tera};

use crate::error::RenderError;

// == View ==
/// The views this server renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// A decoded metadata document
    Metadata,
    /// Any non-success outcome
    Error,
}

impl View {
    pub fn template_name(self) -> &'static str {
        match self {
            View::Metadata => "metadata.html",
            View::Error => "metadata_error.html",
        }
    }
}

// == View Renderer ==
/// Renders a named view from a JSON object context.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: View, context: &Value) -> Result<String, RenderError>;
}

/// Serializes `context` and renders it with `renderer`.
pub fn render_view<T: Serialize>(
    renderer: &dyn ViewRenderer,
    view: View,
    context: &T,
) -> Result<String, RenderError> {
    let context = serde_json::to_value(context)?;
    renderer.render(view, &context)
}

// == Tera Renderer ==
/// Renders the embedded templates.
#[derive(Debug)]
pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("metadata.html", include_str!("../templates/metadata.html")),
            (
                "metadata_error.html",
                include_str!("../templates/metadata_error.html"),
            ),
        ])?;
        Ok(Self { tera })
    }
}

impl ViewRenderer for TeraRenderer {
    fn render(&self, view: View, context: &Value) -> Result<String, RenderError> {
        let context = Context::from_value(context.clone())?;
        Ok(self.tera.render(view.template_name(), &context)?)
    }
}
