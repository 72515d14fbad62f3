//! pathdb LL layer: the ordered key-value store contract.
//!
//! This is the narrow waist of the pathdb stack. Everything at this level is
//! pure bytes - keys are opaque byte strings compared lexicographically, values
//! are opaque payloads. No path semantics, no value parsing.
//!
//! A store at this level provides three things:
//! - Ordered range scans over a half-open `[start, end)` key range
//! - Atomic multi-operation batch commits
//! - A commit hook, fired once per committed batch for every registered listener
//!
//! # Example
//!
//! ```rust
//! use pathdb_ll_store::{BatchOp, KeyRange, MemoryStore, OrderedStore};
//! use bytes::Bytes;
//!
//! let store = MemoryStore::new();
//! store
//!     .write_batch(vec![BatchOp::put(&b"a1"[..], &b"x"[..]), BatchOp::put(&b"b1"[..], &b"y"[..])])
//!     .unwrap();
//!
//! let range = KeyRange::new(&b"a"[..], &b"b"[..]);
//! let keys = store.scan_keys(&range).unwrap();
//! assert_eq!(keys, vec![Bytes::from_static(b"a1")]);
//! ```

pub use bytes::Bytes;

mod error;
mod memory;
mod traits;

pub use error::LLError;
pub use memory::MemoryStore;
pub use traits::{BatchOp, CommitListener, Entry, KeyRange, ListenerId, OrderedStore};
