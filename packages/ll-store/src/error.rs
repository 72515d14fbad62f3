//! Failures reported by an ordered store.
//!
//! Only the store's own failures live here. Paths, documents and leaf
//! encodings mean nothing at this level, so their errors are raised above.

use bytes::Bytes;

/// A failed scan, write or listener call on an [`OrderedStore`](crate::OrderedStore).
///
/// The engine hands these to its callers untouched.
#[derive(Debug)]
pub enum LLError {
    /// The medium under the store failed: a disk, a socket, a worker thread.
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The store is out of room or handles.
    ResourceExhausted,

    /// A thread panicked while holding the store's lock.
    Poisoned,

    /// A failure the backend reports with its own code.
    Backend {
        /// Backend-defined code.
        code: u32,
        /// Message or payload, usually UTF-8.
        detail: Bytes,
    },
}

impl std::fmt::Display for LLError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLError::Transport(e) => write!(f, "store transport failed: {}", e),
            LLError::ResourceExhausted => write!(f, "store resources exhausted"),
            LLError::Poisoned => write!(f, "store lock poisoned"),
            LLError::Backend { code, detail } if detail.is_empty() => {
                write!(f, "backend error {}", code)
            }
            LLError::Backend { code, detail } => match std::str::from_utf8(detail) {
                Ok(text) => write!(f, "backend error {}: {}", code, text),
                Err(_) => write!(f, "backend error {}: {:?}", code, detail),
            },
        }
    }
}

impl std::error::Error for LLError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LLError::Transport(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LLError {
    fn from(e: std::io::Error) -> Self {
        LLError::Transport(Box::new(e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for LLError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        LLError::Poisoned
    }
}
