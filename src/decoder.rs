//! Payload Decoder
//!
//! Stored metadata is either raw JSON text or base64-wrapped JSON, optionally
//! behind a `data:application/json;base64,` (or `text/json`) prefix. Formats are
//! tried in a fixed order and the first one that applies decides the result.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use serde_json::Value;
use tracing::debug;

use crate::error::DecodeError;

/// Data-URI prefixes stripped before decoding.
pub const DATA_URI_PREFIXES: [&str; 2] = [
    "data:application/json;base64,",
    "data:text/json;base64,",
];

const BYTE_ORDER_MARK: char = '\u{feff}';

// Stored files may be hand-edited: accept missing padding and stray trailing bits.
const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

// == Payload Format ==
/// A stored payload encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// Text that starts with `{` or `[`
    RawJson,
    /// Base64 text wrapping UTF-8 JSON
    Base64Json,
}

impl PayloadFormat {
    /// Formats in the order they are tried.
    pub const ORDER: [PayloadFormat; 2] = [PayloadFormat::RawJson, PayloadFormat::Base64Json];

    /// Whether this format claims `text` (already prefix-stripped and trimmed).
    pub fn applies_to(self, text: &str) -> bool {
        match self {
            PayloadFormat::RawJson => text.starts_with('{') || text.starts_with('['),
            PayloadFormat::Base64Json => true,
        }
    }

    /// Decodes `text` under this format.
    pub fn decode(self, text: &str) -> Result<Value, DecodeError> {
        match self {
            PayloadFormat::RawJson => Ok(serde_json::from_str(text)?),
            PayloadFormat::Base64Json => {
                let bytes = decode_base64(text)?;
                let json = std::str::from_utf8(&bytes)?;
                Ok(serde_json::from_str(json)?)
            }
        }
    }
}

// == Decode ==
/// Decodes stored bytes into a structured value.
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    decode_with_format(bytes).map(|(value, _)| value)
}

/// Decodes stored bytes and reports which format matched.
pub fn decode_with_format(bytes: &[u8]) -> Result<(Value, PayloadFormat), DecodeError> {
    // Stray invalid bytes become U+FFFD; only the base64 body is held to strict UTF-8.
    let text = String::from_utf8_lossy(bytes);
    let body = strip_data_uri(&text).trim_matches(is_padding);

    // No fallback once a format has claimed the text.
    let format = PayloadFormat::ORDER
        .into_iter()
        .find(|format| format.applies_to(body))
        .unwrap_or(PayloadFormat::Base64Json);

    let value = format.decode(body)?;
    debug!(?format, "decoded metadata payload");
    Ok((value, format))
}

/// Removes a leading JSON data-URI marker, if present.
pub fn strip_data_uri(text: &str) -> &str {
    DATA_URI_PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(text)
}

// Surrounding whitespace, plus a byte-order mark left by some editors.
fn is_padding(c: char) -> bool {
    c.is_whitespace() || c == BYTE_ORDER_MARK
}

fn decode_base64(text: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    match STANDARD_LENIENT.decode(&compact) {
        Ok(bytes) => Ok(bytes),
        Err(err) => URL_SAFE_LENIENT
            .decode(&compact)
            .map_err(|_| DecodeError::Base64(err)),
    }
}
