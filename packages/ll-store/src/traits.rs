//! Core traits and types for the LL layer.

use std::sync::Arc;

use bytes::Bytes;

use crate::LLError;

/// A single write inside an atomic batch.
///
/// Keys and values are opaque bytes. Within one batch, operations are applied
/// in order, so a later `Put` for a key supersedes an earlier `Delete`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    /// Store `value` under `key`, replacing any previous value.
    Put { key: Bytes, value: Bytes },
    /// Remove `key`. Deleting a missing key is not an error.
    Delete { key: Bytes },
}

impl BatchOp {
    /// Create a put operation.
    pub fn put(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        BatchOp::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a delete operation.
    pub fn delete(key: impl Into<Bytes>) -> Self {
        BatchOp::Delete { key: key.into() }
    }

    /// The key this operation targets.
    pub fn key(&self) -> &Bytes {
        match self {
            BatchOp::Put { key, .. } | BatchOp::Delete { key } => key,
        }
    }

    /// Check if this is a put.
    pub fn is_put(&self) -> bool {
        matches!(self, BatchOp::Put { .. })
    }
}

/// A half-open key range `[start, end)` in byte order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyRange {
    /// Inclusive lower bound.
    pub start: Bytes,
    /// Exclusive upper bound.
    pub end: Bytes,
}

impl KeyRange {
    pub fn new(start: impl Into<Bytes>, end: impl Into<Bytes>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Check whether `key` falls inside the range.
    pub fn contains(&self, key: &[u8]) -> bool {
        key >= &self.start[..] && key < &self.end[..]
    }

    /// Check whether the range can hold any key at all.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A key/value pair returned by a scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: Bytes,
    pub value: Bytes,
}

/// Identifies a registered commit listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Callback fired once per committed batch with the batch's exact operations.
///
/// The slice is shared between all listeners of a store and is only borrowed
/// for the duration of the call. Listeners that keep operations must copy them.
/// Listeners must not call back into the store that invoked them.
pub type CommitListener = Box<dyn Fn(&[BatchOp]) + Send + Sync>;

/// An ordered byte-keyed store with atomic batches and commit notifications.
///
/// Methods take `&self`: a store is shared between the engine, its writers and
/// every live watcher, so implementations provide their own interior locking.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn OrderedStore>`.
pub trait OrderedStore: Send + Sync {
    /// Return every entry in `range`, in ascending key order.
    fn scan(&self, range: &KeyRange) -> Result<Vec<Entry>, LLError>;

    /// Return every key in `range`, in ascending key order.
    ///
    /// Stores that can skip reading values should override this.
    fn scan_keys(&self, range: &KeyRange) -> Result<Vec<Bytes>, LLError> {
        Ok(self.scan(range)?.into_iter().map(|e| e.key).collect())
    }

    /// Apply all operations atomically, in order.
    ///
    /// Either every operation becomes visible or none does. After a successful
    /// commit every registered listener is invoked once with `ops`, and the
    /// invocations for successive commits happen in commit order.
    fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), LLError>;

    /// Register a commit listener.
    fn listen(&self, listener: CommitListener) -> Result<ListenerId, LLError>;

    /// Remove a commit listener. Returns `false` if it was not registered.
    fn unlisten(&self, id: ListenerId) -> Result<bool, LLError>;
}

// Blanket implementations for shared pointers and boxes

impl<T: OrderedStore + ?Sized> OrderedStore for Arc<T> {
    fn scan(&self, range: &KeyRange) -> Result<Vec<Entry>, LLError> {
        self.as_ref().scan(range)
    }

    fn scan_keys(&self, range: &KeyRange) -> Result<Vec<Bytes>, LLError> {
        self.as_ref().scan_keys(range)
    }

    fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), LLError> {
        self.as_ref().write_batch(ops)
    }

    fn listen(&self, listener: CommitListener) -> Result<ListenerId, LLError> {
        self.as_ref().listen(listener)
    }

    fn unlisten(&self, id: ListenerId) -> Result<bool, LLError> {
        self.as_ref().unlisten(id)
    }
}

impl<T: OrderedStore + ?Sized> OrderedStore for Box<T> {
    fn scan(&self, range: &KeyRange) -> Result<Vec<Entry>, LLError> {
        self.as_ref().scan(range)
    }

    fn scan_keys(&self, range: &KeyRange) -> Result<Vec<Bytes>, LLError> {
        self.as_ref().scan_keys(range)
    }

    fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), LLError> {
        self.as_ref().write_batch(ops)
    }

    fn listen(&self, listener: CommitListener) -> Result<ListenerId, LLError> {
        self.as_ref().listen(listener)
    }

    fn unlisten(&self, id: ListenerId) -> Result<bool, LLError> {
        self.as_ref().unlisten(id)
    }
}
