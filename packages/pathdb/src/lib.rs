//! pathdb: nested documents over an ordered key-value store.
//!
//! A document is decomposed into leaves (scalars and empty containers), each
//! stored under the order-preserving encoding of its path. Because a subtree
//! is a contiguous key range, the engine can:
//! - read a subtree with one range scan (`get`)
//! - replace a subtree atomically in one batch (`put`, `del`)
//! - apply relative leaf operations under a root (`batch`)
//! - stream changes under a root as relative changesets (`watch`)
//!
//! # Example
//!
//! ```rust
//! use pathdb::{apply, path, MemoryStore, PathDb, Value, WatchEvent};
//!
//! let db = PathDb::new(MemoryStore::new());
//! let mut sub = db.watch(&path!["people"], Some(Value::map()));
//!
//! db.put(&path!["people", 0], &Value::from(vec!["a", "b"])).unwrap();
//!
//! let Some(WatchEvent::Initial(Some(mut doc))) = sub.try_recv().ok() else { panic!() };
//! while let Ok(WatchEvent::Changeset(ops)) = sub.try_recv() {
//!     doc = apply(&ops, &doc);
//! }
//! assert_eq!(doc, db.get(&path!["people"]).unwrap());
//!
//! // The subscription replays the same changesets on its own leaves, which
//! // stays exact even when an array has holes.
//! assert_eq!(sub.document(), Some(doc));
//! ```

mod db;
mod options;
mod typed;
mod watch;

#[cfg(feature = "async")]
mod async_db;

pub use db::PathDb;
pub use options::{DbOptions, WatchOptions};
pub use watch::{Subscription, WatchEvent};

#[cfg(feature = "async")]
pub use async_db::{AsyncPathDb, AsyncPathStore};

pub use tokio::sync::mpsc::error::TryRecvError;

// Re-export the layers below for convenience
pub use bytes::Bytes;
pub use pathdb_core::{
    apply, build, diff, flatten, keys, path, BatchOp, Codec, CommitListener, Entry, Error,
    ErrorKind, KeyRange, LLError, Leaves, ListenerId, MemoryStore, Op, OrderedStore, Path, PathError,
    Segment, Value,
};
pub use pathdb_serde::JsonCodec;
