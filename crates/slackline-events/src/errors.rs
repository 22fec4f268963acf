//! Decode error types.

use thiserror::Error;

/// Longest excerpt of a frame carried in a [`DecodeError`].
pub const SNIPPET_LEN: usize = 120;

/// A frame that could not be turned into a typed event.
///
/// Every variant carries a short excerpt of the offending frame for logs.
/// Unknown discriminators are not errors; they decode to the fallback.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame is not a well-formed document.
    #[error("malformed frame at line {line} column {column}: {message}")]
    MalformedFrame {
        /// 1-based line of the syntax error.
        line: usize,
        /// 1-based column of the syntax error.
        column: usize,
        /// Parser message.
        message: String,
        /// Excerpt of the raw frame.
        snippet: String,
    },

    /// The document has no string `type` field.
    #[error("frame has no discriminator")]
    MissingDiscriminator {
        /// Excerpt of the document.
        snippet: String,
    },

    /// The document does not fit the shape registered for its discriminator.
    #[error("{discriminator}: {message}")]
    ShapeMismatch {
        /// Discriminator whose shape was tried.
        discriminator: String,
        /// Decoder message, with line and column when known.
        message: String,
        /// Excerpt of the document.
        snippet: String,
    },
}

impl DecodeError {
    /// Discriminator the error is tagged with, when one was found.
    #[must_use]
    pub fn discriminator(&self) -> Option<&str> {
        match self {
            Self::ShapeMismatch { discriminator, .. } => Some(discriminator),
            Self::MalformedFrame { .. } | Self::MissingDiscriminator { .. } => None,
        }
    }

    /// Excerpt of the frame that failed.
    #[must_use]
    pub fn snippet(&self) -> &str {
        match self {
            Self::MalformedFrame { snippet, .. }
            | Self::MissingDiscriminator { snippet }
            | Self::ShapeMismatch { snippet, .. } => snippet,
        }
    }

    /// Stable short name for metrics labels.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MalformedFrame { .. } => "malformed",
            Self::MissingDiscriminator { .. } => "missing_discriminator",
            Self::ShapeMismatch { .. } => "shape_mismatch",
        }
    }
}

/// Cut `text` to at most [`SNIPPET_LEN`] bytes on a char boundary.
pub(crate) fn snippet(text: &str) -> String {
    if text.len() <= SNIPPET_LEN {
        return text.to_owned();
    }
    let mut end = SNIPPET_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = text[..end].to_owned();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_snippet_untouched() {
        assert_eq!(snippet("{\"type\":1}"), "{\"type\":1}");
    }

    #[test]
    fn long_snippet_truncated() {
        let long = "x".repeat(500);
        let s = snippet(&long);
        assert_eq!(s.chars().filter(|c| *c == 'x').count(), SNIPPET_LEN);
        assert!(s.ends_with('…'));
    }

    #[test]
    fn snippet_respects_char_boundary() {
        let text = format!("{}é{}", "a".repeat(SNIPPET_LEN - 1), "b".repeat(10));
        let s = snippet(&text);
        assert!(s.starts_with(&"a".repeat(SNIPPET_LEN - 1)));
        assert!(!s.contains('b'));
    }

    #[test]
    fn display_and_accessors() {
        let err = DecodeError::ShapeMismatch {
            discriminator: "reaction_added".into(),
            message: "invalid type: integer `5`, expected a string".into(),
            snippet: "{}".into(),
        };
        assert_eq!(err.discriminator(), Some("reaction_added"));
        assert_eq!(err.reason(), "shape_mismatch");
        assert!(err.to_string().starts_with("reaction_added: invalid type"));

        let err = DecodeError::MalformedFrame {
            line: 1,
            column: 7,
            message: "EOF while parsing".into(),
            snippet: "{\"type\"".into(),
        };
        assert_eq!(err.discriminator(), None);
        assert_eq!(err.snippet(), "{\"type\"");
        assert_eq!(
            err.to_string(),
            "malformed frame at line 1 column 7: EOF while parsing"
        );
    }
}
