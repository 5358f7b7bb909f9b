use thiserror::Error;

/// A single structured parse failure.
///
/// `position` is the byte offset into the query string of the furthest
/// point the grammar reached before failing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("at position {position}: {message}")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}

/// Crate-level error for callers that want a single `std::error::Error`
/// value instead of the structured list returned by [`crate::parse`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextPathError {
    #[error("TextPath parse error in '{0}': {1}")]
    Parse(String, String),
}

impl TextPathError {
    /// Wraps a failed [`crate::parse`] result, keeping the most informative
    /// (furthest) failure as the displayed detail.
    pub fn from_parse_errors(query: &str, errors: &[ParseError]) -> Self {
        let detail = errors
            .first()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown error".to_string());
        TextPathError::Parse(query.to_string(), detail)
    }
}
