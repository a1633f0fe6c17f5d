//! Error types for JSONL operations.

use crate::options::OpenMode;
use std::fmt::Display;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for JSONL operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying handle could not be acquired.
    #[error("failed to open {} (mode {mode}): {source}", path.display())]
    Open {
        /// Path that was being opened.
        path: PathBuf,
        /// Mode requested by the caller.
        mode: OpenMode,
        /// Error reported by the operating system.
        #[source]
        source: io::Error,
    },

    /// A line could not be decoded as JSON of the requested type.
    #[error("line {line_number}: invalid JSON: {source} (content: {content:?})")]
    Decode {
        /// 1-based number of the offending line, counted from where reading began.
        line_number: usize,
        /// The offending line without its terminator, invalid UTF-8 replaced by U+FFFD.
        content: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be represented as JSON.
    #[error("{}", encode_message(*index, message))]
    Encode {
        /// Position of the element within a bulk input, if any.
        index: Option<usize>,
        /// What the encoder rejected.
        message: String,
    },

    /// Bulk generation was handed something other than a sequence.
    #[error("can't generate from {actual}")]
    TypeMismatch {
        /// Shape of the value that was actually supplied.
        actual: &'static str,
    },

    /// An option or mode is not supported in this combination.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// The stream has already been released.
    #[error("stream is closed")]
    Closed,

    /// IO error occurred while reading or writing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn encode_message(index: Option<usize>, message: &str) -> String {
    match index {
        Some(index) => format!("cannot encode element {index}: {message}"),
        None => format!("cannot encode value: {message}"),
    }
}

impl Error {
    pub(crate) fn encode(message: impl Display) -> Self {
        Self::Encode {
            index: None,
            message: message.to_string(),
        }
    }

    /// Attaches a bulk element position to an encode error.
    pub(crate) fn at_index(self, position: usize) -> Self {
        match self {
            Self::Encode { message, .. } => Self::Encode {
                index: Some(position),
                message,
            },
            other => other,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Self::encode(msg)
    }
}

/// A specialized Result type for JSONL operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_names_actual_type() {
        let err = Error::TypeMismatch { actual: "string" };
        assert_eq!(err.to_string(), "can't generate from string");
    }

    #[test]
    fn at_index_only_touches_encode_errors() {
        let err = Error::encode("NaN is not valid JSON").at_index(3);
        assert!(matches!(err, Error::Encode { index: Some(3), .. }));
        assert_eq!(
            err.to_string(),
            "cannot encode element 3: NaN is not valid JSON"
        );

        let err = Error::Closed.at_index(3);
        assert!(matches!(err, Error::Closed));
    }

    #[test]
    fn decode_error_shows_line_and_content() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = Error::Decode {
            line_number: 7,
            content: "{oops".to_string(),
            source,
        };
        let message = err.to_string();
        assert!(message.starts_with("line 7: invalid JSON"));
        assert!(message.contains("\"{oops\""));
    }
}
