//! The path-tree engine: subtree reads, writes, deletes and scoped batches.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use pathdb_core::{flatten, keys, BatchOp, Codec, Error, LLError, Leaves, Op, OrderedStore, Path, Value};
use pathdb_serde::JsonCodec;
use tracing::{debug, trace};

use crate::options::DbOptions;

/// A document database layered over an ordered key-value store.
///
/// Every leaf of a document (a scalar or an empty container) is stored under
/// its own key, the order-preserving encoding of the leaf's path. A subtree is
/// therefore one contiguous key range, which makes reading, replacing and
/// watching a subtree a matter of range scans and atomic batches.
///
/// Handles are cheap to clone. Clones share the store, the codec and the
/// writer lock that serializes `put`, `del` and `batch`.
///
/// # Example
///
/// ```rust
/// use pathdb::{path, MemoryStore, PathDb, Value};
///
/// let db = PathDb::new(MemoryStore::new());
/// db.put(&path!["people", 0], &Value::from(vec!["a", "b"])).unwrap();
///
/// assert!(db.get(&path!["people", 0, 1]).unwrap_err().is_not_found());
/// assert_eq!(db.get(&path!["people"]).unwrap(), Value::from(vec![Value::from(vec!["a", "b"])]));
/// ```
pub struct PathDb<S, C = JsonCodec> {
    pub(crate) store: Arc<S>,
    pub(crate) codec: Arc<C>,
    pub(crate) writer: Arc<Mutex<()>>,
    pub(crate) options: DbOptions,
}

impl<S> PathDb<S, JsonCodec> {
    /// Create a database storing leaves as JSON.
    pub fn new(store: S) -> Self {
        Self::with_codec(store, JsonCodec)
    }
}

impl<S, C> PathDb<S, C> {
    /// Create a database with a custom leaf codec.
    pub fn with_codec(store: S, codec: C) -> Self {
        Self::from_shared(Arc::new(store), codec)
    }

    /// Create a database over a store that is shared with other owners.
    pub fn from_shared(store: Arc<S>, codec: C) -> Self {
        Self {
            store,
            codec: Arc::new(codec),
            writer: Arc::new(Mutex::new(())),
            options: DbOptions::default(),
        }
    }

    /// Replace the handle's options.
    pub fn with_options(mut self, options: DbOptions) -> Self {
        self.options = options;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The leaf codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn options(&self) -> &DbOptions {
        &self.options
    }
}

impl<S, C> Clone for PathDb<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: Arc::clone(&self.codec),
            writer: Arc::clone(&self.writer),
            options: self.options,
        }
    }
}

impl<S: OrderedStore, C: Codec> PathDb<S, C> {
    /// Read the document stored under `root`.
    ///
    /// Fails with [`Error::NotFound`] when no leaf is stored under `root`,
    /// which is distinct from an empty document.
    pub fn get(&self, root: &Path) -> Result<Value, Error> {
        let leaves = self.leaves(root)?;
        if leaves.is_empty() {
            return Err(Error::not_found(root));
        }
        Ok(leaves.into_value())
    }

    /// Read the leaves stored under `root`, with paths relative to `root`.
    ///
    /// Unlike [`get`](Self::get) this does not rebuild a document, so sparse
    /// indexes and markers under children come back as stored. An empty
    /// subtree yields no leaves rather than an error.
    pub fn leaves(&self, root: &Path) -> Result<Leaves, Error> {
        let entries = self.store.scan(&keys::key_range(root))?;
        trace!(root = %root, entries = entries.len(), "scanned subtree");

        entries
            .iter()
            .map(|entry| -> Result<(Path, Value), Error> {
                let path = keys::decode(&entry.key)?;
                let relative = path.strip_prefix(root).ok_or_else(|| {
                    Error::validation(format!("key for [{}] is outside [{}]", path, root))
                })?;
                Ok((relative, self.codec.decode(&entry.value)?))
            })
            .collect()
    }

    /// Atomically replace the subtree under `root` with `value`.
    ///
    /// Every leaf previously stored under `root` that `value` does not
    /// contain is deleted in the same batch that writes the new leaves.
    /// Putting an empty map or array clears the subtree. Scalars cannot be
    /// put: the root of a write is always an interior node.
    pub fn put(&self, root: &Path, value: &Value) -> Result<(), Error> {
        if value.is_scalar() {
            return Err(Error::validation(format!(
                "cannot put a scalar at [{}]: only maps and arrays can be written as subtrees",
                root
            )));
        }

        // Encode before touching the store so codec errors leave it untouched.
        let puts = flatten(value)
            .into_iter()
            .map(|(relative, leaf)| self.encode_leaf(&root.join(&relative), &leaf))
            .collect::<Result<Vec<_>, Error>>()?;

        let _writer = self.lock_writer()?;
        let existing = self.store.scan_keys(&keys::key_range(root))?;
        trace!(root = %root, keys = existing.len(), "scanned subtree keys");

        let rewritten: HashSet<&Bytes> = puts.iter().map(|(key, _)| key).collect();
        let mut ops: Vec<BatchOp> = existing
            .iter()
            .filter(|key| !rewritten.contains(key))
            .cloned()
            .map(BatchOp::delete)
            .collect();
        ops.extend(puts.into_iter().map(|(key, value)| BatchOp::put(key, value)));

        self.submit(root, ops)
    }

    /// Delete every leaf under `root`. Deleting a missing subtree succeeds.
    pub fn del(&self, root: &Path) -> Result<(), Error> {
        let _writer = self.lock_writer()?;
        let existing = self.store.scan_keys(&keys::key_range(root))?;
        let ops = existing.into_iter().map(BatchOp::delete).collect();
        self.submit(root, ops)
    }

    /// Apply leaf operations relative to `root` as one atomic batch.
    ///
    /// Operations are validated before anything is written: each path must be
    /// non-empty and each put must carry a leaf (a scalar or an empty
    /// container). No read happens before the write.
    pub fn batch(&self, root: &Path, ops: Vec<Op>) -> Result<(), Error> {
        for op in &ops {
            if op.path().is_empty() {
                return Err(Error::validation(format!(
                    "batch under [{}] has an operation with an empty path",
                    root
                )));
            }
            if let Op::Put { path, value } = op {
                if !value.is_leaf() {
                    return Err(Error::validation(format!(
                        "batch put at [{}] under [{}] is not a leaf",
                        path, root
                    )));
                }
            }
        }

        let ops = ops
            .into_iter()
            .map(|op| match op.relocate(root) {
                Op::Put { path, value } => {
                    let (key, value) = self.encode_leaf(&path, &value)?;
                    Ok(BatchOp::put(key, value))
                }
                Op::Del { path } => Ok(BatchOp::delete(keys::encode(&path))),
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let _writer = self.lock_writer()?;
        self.submit(root, ops)
    }

    fn encode_leaf(&self, path: &Path, leaf: &Value) -> Result<(Bytes, Bytes), Error> {
        Ok((keys::encode(path), self.codec.encode(leaf)?))
    }

    fn lock_writer(&self) -> Result<MutexGuard<'_, ()>, Error> {
        Ok(self.writer.lock().map_err(LLError::from)?)
    }

    fn submit(&self, root: &Path, ops: Vec<BatchOp>) -> Result<(), Error> {
        if ops.is_empty() {
            trace!(root = %root, "nothing to submit");
            return Ok(());
        }

        let puts = ops.iter().filter(|op| op.is_put()).count();
        debug!(
            root = %root,
            deletes = ops.len() - puts,
            puts,
            "submitting batch"
        );
        self.store.write_batch(ops)?;
        Ok(())
    }
}
