// src/error.rs

use std::io;
use thiserror::Error;

/// Result type alias for picklist operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the extraction pipeline, the exporters and the config layer.
///
/// Layout mismatches are never errors: a field or item line that does not
/// match its rule is simply left out of the result.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input or writing outputs.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input bytes could not be opened as a PDF document.
    #[error("PDF parsing error: {0}")]
    Pdf(String),

    /// Writing the picking sheet failed.
    #[error("PDF rendering error: {0}")]
    Render(String),

    /// CSV export or import failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A built-in extraction rule failed to compile.
    #[error("invalid pattern for rule `{rule}`: {source}")]
    Pattern {
        rule: &'static str,
        #[source]
        source: regex::Error,
    },

    /// Item font size outside the accepted range.
    #[error("item font size {0} is out of range ({min}..={max})", min = crate::config::MIN_FONT_SIZE, max = crate::config::MAX_FONT_SIZE)]
    FontSize(u32),

    /// The configuration file is not valid TOML for our schema.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Pdf(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Pdf("missing xref".to_string());
        assert_eq!(err.to_string(), "PDF parsing error: missing xref");

        let err = Error::FontSize(40);
        assert_eq!(err.to_string(), "item font size 40 is out of range (10..=22)");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
