//! Async access to a `PathDb`.
//!
//! Enable the `async` feature to use this module:
//!
//! ```toml
//! [dependencies]
//! pathdb = { version = "0.1", features = ["async"] }
//! ```

use async_trait::async_trait;

use pathdb_core::{Codec, Error, LLError, Op, OrderedStore, Path, Value};
use pathdb_serde::JsonCodec;

use crate::db::PathDb;
use crate::watch::Subscription;

/// Async version of the subtree operations.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn AsyncPathStore>`.
///
/// # Example
///
/// ```rust,ignore
/// use pathdb::{path, AsyncPathStore, Error, Value};
///
/// async fn read_people(store: &dyn AsyncPathStore) -> Result<Value, Error> {
///     store.get(&path!["people"]).await
/// }
/// ```
#[async_trait]
pub trait AsyncPathStore: Send + Sync {
    /// Read the document under `root`.
    async fn get(&self, root: &Path) -> Result<Value, Error>;

    /// Replace the subtree under `root` with `value`.
    async fn put(&self, root: &Path, value: &Value) -> Result<(), Error>;

    /// Delete the subtree under `root`.
    async fn del(&self, root: &Path) -> Result<(), Error>;

    /// Apply leaf operations relative to `root` atomically.
    async fn batch(&self, root: &Path, ops: Vec<Op>) -> Result<(), Error>;
}

/// Adapter running a synchronous `PathDb` on Tokio's blocking pool.
///
/// Every call clones the handle (which shares the store and writer lock) and
/// moves the work onto `spawn_blocking`, so store scans and batch commits
/// never block a runtime worker.
pub struct AsyncPathDb<S, C = JsonCodec> {
    inner: PathDb<S, C>,
}

impl<S, C> AsyncPathDb<S, C> {
    pub fn new(inner: PathDb<S, C>) -> Self {
        Self { inner }
    }

    /// The wrapped synchronous handle.
    pub fn inner(&self) -> &PathDb<S, C> {
        &self.inner
    }

    pub fn into_inner(self) -> PathDb<S, C> {
        self.inner
    }
}

impl<S, C> Clone for AsyncPathDb<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S, C> AsyncPathDb<S, C>
where
    S: OrderedStore + 'static,
    C: Codec + 'static,
{
    async fn run<T, F>(&self, work: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(PathDb<S, C>) -> Result<T, Error> + Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || work(db))
            .await
            .map_err(|e| Error::Store(LLError::Transport(Box::new(e))))?
    }

    /// Watch the subtree under `root`. The initial read runs on the blocking
    /// pool; events are received with `Subscription::recv`.
    pub async fn watch(&self, root: &Path, default: Option<Value>) -> Result<Subscription, Error> {
        let root = root.clone();
        self.run(move |db| Ok(db.watch(&root, default))).await
    }
}

#[async_trait]
impl<S, C> AsyncPathStore for AsyncPathDb<S, C>
where
    S: OrderedStore + 'static,
    C: Codec + 'static,
{
    async fn get(&self, root: &Path) -> Result<Value, Error> {
        let root = root.clone();
        self.run(move |db| db.get(&root)).await
    }

    async fn put(&self, root: &Path, value: &Value) -> Result<(), Error> {
        let root = root.clone();
        let value = value.clone();
        self.run(move |db| db.put(&root, &value)).await
    }

    async fn del(&self, root: &Path) -> Result<(), Error> {
        let root = root.clone();
        self.run(move |db| db.del(&root)).await
    }

    async fn batch(&self, root: &Path, ops: Vec<Op>) -> Result<(), Error> {
        let root = root.clone();
        self.run(move |db| db.batch(&root, ops)).await
    }
}
