//! pathdb core: the document side of the path-tree engine.
//!
//! This layer gives meaning to the raw bytes of the LL layer:
//! - `Path`: a sequence of key/index segments addressing a node in a document
//! - `Value`: the document tree itself
//! - `keys`: the order-preserving encoding of paths into store keys
//! - `flatten` / `build`: decomposing documents into leaves and back
//! - `diff` / `apply`: leaf-level changesets between documents
//! - `Leaves`: a document held as its leaves, for exact changeset replay
//! - `Codec`: turning leaf values into stored bytes
//!
//! # Example
//!
//! ```rust
//! use pathdb_core::{build, flatten, keys, path, Value};
//!
//! let doc = Value::from(vec!["a", "b"]);
//! let leaves = flatten(&doc);
//!
//! let range = keys::key_range(&path![]);
//! assert!(leaves.iter().all(|(p, _)| range.contains(&keys::encode(p))));
//! assert_eq!(build(leaves), doc);
//! ```

pub use bytes::Bytes;

mod changeset;
mod error;
mod flatten;
pub mod keys;
mod leaves;
mod path;
mod traits;
mod value;

pub use changeset::{apply, diff, Op};
pub use error::{Error, ErrorKind};
pub use flatten::{build, flatten};
pub use leaves::Leaves;
pub use path::{Path, PathError, Segment};
pub use traits::Codec;
pub use value::Value;

// Re-export LL types for convenience
pub use pathdb_ll_store::{
    BatchOp, CommitListener, Entry, KeyRange, LLError, ListenerId, MemoryStore, OrderedStore,
};
