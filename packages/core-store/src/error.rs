//! Error types for the core layer.

use pathdb_ll_store::LLError;

use crate::path::{Path, PathError};

/// Coarse classification of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Nothing is stored under the requested root. Not transient.
    NotFound,
    /// The underlying store failed. May be transient; retrying is up to the caller.
    Store,
    /// Malformed input: a bad path, operation, key or leaf encoding.
    Validation,
}

/// Errors at the core layer.
///
/// These include semantic errors (missing subtrees, invalid paths, codec
/// failures) in addition to the store errors from the LL layer, which are
/// carried unchanged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No leaf is stored under the path.
    #[error("path not found: [{path}]")]
    NotFound { path: Path },

    /// Error from the ordered store, reported verbatim.
    #[error("store error: {0}")]
    Store(#[from] LLError),

    /// Malformed input rejected before touching the store.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Path parsing error.
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// A codec failed to decode a stored leaf.
    #[error("decode error ({codec}): {message}")]
    Decode {
        codec: &'static str,
        message: String,
    },

    /// A codec failed to encode a leaf.
    #[error("encode error ({codec}): {message}")]
    Encode {
        codec: &'static str,
        message: String,
    },
}

impl Error {
    /// Create a not-found error for a path.
    pub fn not_found(path: &Path) -> Self {
        Error::NotFound { path: path.clone() }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(codec: &'static str, message: impl Into<String>) -> Self {
        Error::Decode {
            codec,
            message: message.into(),
        }
    }

    /// Create an encode error.
    pub fn encode(codec: &'static str, message: impl Into<String>) -> Self {
        Error::Encode {
            codec,
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Store(_) => ErrorKind::Store,
            Error::Validation { .. }
            | Error::Path(_)
            | Error::Decode { .. }
            | Error::Encode { .. } => ErrorKind::Validation,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use std::error::Error as StdError;

    #[test]
    fn not_found_display() {
        let e = Error::not_found(&path!["people", 0]);
        assert_eq!(e.to_string(), "path not found: [people/0]");
        assert!(e.is_not_found());
        assert_eq!(e.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn store_error_is_verbatim() {
        let e: Error = LLError::ResourceExhausted.into();
        assert_eq!(e.kind(), ErrorKind::Store);
        assert!(e.to_string().contains("resource exhausted"));
        assert!(StdError::source(&e).is_some());
        assert!(matches!(e, Error::Store(LLError::ResourceExhausted)));
    }

    #[test]
    fn validation_kinds() {
        assert_eq!(Error::validation("bad").kind(), ErrorKind::Validation);
        assert_eq!(Error::decode("json", "eof").kind(), ErrorKind::Validation);
        assert_eq!(Error::encode("json", "nan").kind(), ErrorKind::Validation);

        let path_err = PathError::NegativeIndex {
            component: "-1".to_string(),
            position: 0,
        };
        let e: Error = path_err.into();
        assert_eq!(e.kind(), ErrorKind::Validation);
        assert!(!e.is_not_found());
    }

    #[test]
    fn codec_errors_name_the_codec() {
        let display = Error::decode("json", "unexpected token").to_string();
        assert!(display.contains("decode error"));
        assert!(display.contains("json"));
        assert!(display.contains("unexpected token"));
    }
}
