//! Input validation utilities.
//!
//! Collection ids and filenames arrive straight from the request path and are used as
//! directory and file names under the storage root. [`PathSegment`] guarantees that a value
//! names exactly one entry directly below its parent, so it can never address anything
//! outside the destination root.

use crate::constants::MAX_SEGMENT_LEN;
use crate::error::ValidationError;

/// A single validated path component.
///
/// Construction rejects:
/// - empty or whitespace-only values
/// - `.` and `..`
/// - `/` and `\` anywhere in the value
/// - NUL and other control characters
/// - values longer than [`MAX_SEGMENT_LEN`] bytes
///
/// Values are not trimmed or rewritten; a value is either accepted verbatim or rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment(String);

impl PathSegment {
    /// Validate a collection identifier.
    pub fn collection_id(input: impl AsRef<str>) -> Result<Self, ValidationError> {
        Self::parse("collection id", input.as_ref())
    }

    /// Validate a filename.
    pub fn filename(input: impl AsRef<str>) -> Result<Self, ValidationError> {
        Self::parse("filename", input.as_ref())
    }

    fn parse(kind: &'static str, value: &str) -> Result<Self, ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { kind });
        }

        if value.len() > MAX_SEGMENT_LEN {
            return Err(ValidationError::TooLong {
                kind,
                max: MAX_SEGMENT_LEN,
            });
        }

        if value == "." || value == ".." {
            return Err(ValidationError::RelativeComponent {
                kind,
                value: value.to_owned(),
            });
        }

        if value.contains(['/', '\\']) {
            return Err(ValidationError::Separator {
                kind,
                value: value.to_owned(),
            });
        }

        if value.chars().any(char::is_control) {
            return Err(ValidationError::ControlCharacter { kind });
        }

        Ok(Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PathSegment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for PathSegment {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}
