//! Identifier Module
//!
//! Strict validation of the path segment that names a metadata document.
//! An [`Identifier`] can only be built through [`Identifier::parse`], so storage
//! code that takes one never sees separator or traversal characters.

use std::fmt;

use crate::error::IdentifierError;

// == Public Constants ==
/// Maximum identifier length in characters
pub const MAX_ID_LENGTH: usize = 64;

// == Identifier ==
/// A validated identifier matching `^[A-Za-z0-9_-]{1,64}$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    // == Parse ==
    /// Validates `input` as a whole-string match against the identifier syntax.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        if input.is_empty() {
            return Err(IdentifierError::Empty);
        }

        if let Some(bad) = input.chars().find(|c| !is_id_char(*c)) {
            return Err(IdentifierError::InvalidChar(bad));
        }

        // Every accepted char is ASCII, so bytes == chars here.
        if input.len() > MAX_ID_LENGTH {
            return Err(IdentifierError::TooLong(input.len()));
        }

        Ok(Self(input.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validates a raw identifier.
pub fn validate(input: &str) -> Result<Identifier, IdentifierError> {
    Identifier::parse(input)
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
