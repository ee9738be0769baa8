//! Error types for the keyframe codecs.
//!
//! Only structural failures surface as [`Error`]. Field-level problems (a
//! missing key, an unparseable number, a corrupt sub-entity payload) are
//! recovered where they occur and substituted with defaults.

pub type Result<T> = core::result::Result<T, Error>;

/// Structural failure while reading or writing a document or packet.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The underlying stream failed or ended early.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A length-prefixed string was not valid UTF-8.
    #[error("Invalid string payload: {reason}")]
    InvalidString { reason: String },

    /// A declared length or count exceeded the configured limit.
    #[error("{what} length {len} exceeds limit {limit}")]
    LengthOutOfRange {
        what: &'static str,
        len: usize,
        limit: usize,
    },

    /// The text document could not be parsed at all.
    #[error("JSON error: {reason}")]
    Json { reason: String },
}

impl Error {
    /// Whether the error was caused by the stream ending before the framing was complete.
    #[inline]
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == std::io::ErrorKind::UnexpectedEof)
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::InvalidString { .. } | Self::LengthOutOfRange { .. } => "packet",
            Self::Json { .. } => "text",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            reason: err.to_string(),
        }
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::InvalidString {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_is_detected_from_io_kind() {
        let err = Error::from(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
        assert!(err.is_truncation());
        assert_eq!(err.category(), "io");

        let other = Error::LengthOutOfRange {
            what: "string",
            len: 10,
            limit: 4,
        };
        assert!(!other.is_truncation());
        assert_eq!(other.category(), "packet");
    }

    #[test]
    fn json_errors_convert() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = parse.into();
        assert_eq!(err.category(), "text");
    }
}
