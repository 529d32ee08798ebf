//! View contexts
//!
//! Data objects handed to the renderer for each view.

use serde::Serialize;
use serde_json::Value;

use crate::identifier::Identifier;
use crate::pipeline::Reason;

/// Longest token echoed back on an error page, in characters
pub const MAX_TOKEN_DISPLAY: usize = 80;

// == Metadata View ==
/// Context for the metadata page.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataView<'a> {
    pub id: &'a str,
    /// The document's `name`, when it is a string
    pub title: Option<&'a str>,
    /// The document's `description`, when it is a string
    pub description: Option<&'a str>,
    /// The decoded document, verbatim
    pub json: &'a Value,
    pub json_pretty: String,
}

impl<'a> MetadataView<'a> {
    pub fn new(id: &'a Identifier, json: &'a Value) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: id.as_str(),
            title: json.get("name").and_then(Value::as_str),
            description: json.get("description").and_then(Value::as_str),
            json,
            json_pretty: serde_json::to_string_pretty(json)?,
        })
    }
}

// == Error View ==
/// Context for the error page.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorView {
    pub status: u16,
    pub reason: Reason,
    pub message: &'static str,
    /// The submitted token, truncated for display
    pub token: Option<String>,
}

impl ErrorView {
    pub fn new(reason: Reason, token: Option<&str>) -> Self {
        Self {
            status: reason.status_code().as_u16(),
            reason,
            message: reason.message(),
            token: token.map(truncate_token),
        }
    }
}

fn truncate_token(token: &str) -> String {
    if token.chars().count() <= MAX_TOKEN_DISPLAY {
        return token.to_string();
    }
    let mut shown: String = token.chars().take(MAX_TOKEN_DISPLAY).collect();
    shown.push('…');
    shown
}
