//! In-memory ordered store backed by a `BTreeMap`.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use bytes::Bytes;

use crate::{BatchOp, CommitListener, Entry, KeyRange, LLError, ListenerId, OrderedStore};

/// An in-memory ordered store.
///
/// Batches are applied under the data write lock, and listeners are invoked
/// before that lock is released. Every listener therefore observes batches in
/// exactly the order they were committed.
///
/// # Example
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use pathdb_ll_store::{BatchOp, MemoryStore, OrderedStore};
///
/// let store = MemoryStore::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// store
///     .listen(Box::new(move |ops: &[BatchOp]| sink.lock().unwrap().push(ops.len())))
///     .unwrap();
///
/// store.write_batch(vec![BatchOp::put(&b"k"[..], &b"v"[..])]).unwrap();
/// assert_eq!(*seen.lock().unwrap(), vec![1]);
/// ```
pub struct MemoryStore {
    data: RwLock<BTreeMap<Bytes, Bytes>>,
    listeners: RwLock<Vec<(ListenerId, CommitListener)>>,
    next_listener: AtomicU64,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicU64::new(0),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> Result<usize, LLError> {
        Ok(self.data.read()?.len())
    }

    /// Check if the store holds no entries.
    pub fn is_empty(&self) -> Result<bool, LLError> {
        Ok(self.data.read()?.is_empty())
    }

    /// Number of registered commit listeners.
    pub fn listener_count(&self) -> Result<usize, LLError> {
        Ok(self.listeners.read()?.len())
    }

    /// Read a single key.
    pub fn get(&self, key: &[u8]) -> Result<Option<Bytes>, LLError> {
        Ok(self.data.read()?.get(key).cloned())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedStore for MemoryStore {
    fn scan(&self, range: &KeyRange) -> Result<Vec<Entry>, LLError> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let data = self.data.read()?;
        let bounds = (
            Bound::Included(range.start.clone()),
            Bound::Excluded(range.end.clone()),
        );
        Ok(data
            .range(bounds)
            .map(|(key, value)| Entry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }

    fn scan_keys(&self, range: &KeyRange) -> Result<Vec<Bytes>, LLError> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let data = self.data.read()?;
        let bounds = (
            Bound::Included(range.start.clone()),
            Bound::Excluded(range.end.clone()),
        );
        Ok(data.range(bounds).map(|(key, _)| key.clone()).collect())
    }

    fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), LLError> {
        if ops.is_empty() {
            return Ok(());
        }

        let mut data = self.data.write()?;
        for op in &ops {
            match op {
                BatchOp::Put { key, value } => {
                    data.insert(key.clone(), value.clone());
                }
                BatchOp::Delete { key } => {
                    data.remove(key);
                }
            }
        }
        tracing::trace!(ops = ops.len(), entries = data.len(), "committed batch");

        // Notify while still holding the data lock so commit order is
        // notification order.
        let listeners = self.listeners.read()?;
        for (_, listener) in listeners.iter() {
            listener(&ops);
        }
        Ok(())
    }

    fn listen(&self, listener: CommitListener) -> Result<ListenerId, LLError> {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.write()?.push((id, listener));
        Ok(id)
    }

    fn unlisten(&self, id: ListenerId) -> Result<bool, LLError> {
        let mut listeners = self.listeners.write()?;
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        Ok(listeners.len() != before)
    }
}
