//! Crate-wide error types

use thiserror::Error;

/// Errors produced by the guesser data utilities
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for all fallible operations in this crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("a vocab is needed".to_string());
        assert!(format!("{err}").contains("configuration error"));

        let err = Error::Validation("mismatched lengths".to_string());
        assert!(format!("{err}").contains("validation error"));

        let err = Error::Parse("bad float".to_string());
        assert!(format!("{err}").contains("parse error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
