//! Live subscriptions to a subtree.
//!
//! A watcher registers a commit listener on the store, reads the current
//! document under its root, and then turns every committed batch into a
//! changeset relative to that root:
//!
//! ```text
//!   listen ──> Initializing ──(initial read ok / NotFound)──> Active
//!                   │                                            │
//!                   └──(initial read failed)──> Inert <──(unsubscribe)
//! ```
//!
//! Changesets committed while the watcher is initializing are buffered and
//! replayed right after the initial event. Replaying leaf puts and deletes
//! over a snapshot that already contains them is idempotent, so replaying
//! every changeset over the initial leaves converges on the store. Each
//! subscription keeps such a leaf replica; [`Subscription::document`] builds
//! it.

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pathdb_core::{
    keys, BatchOp, Codec, Error, KeyRange, Leaves, ListenerId, Op, OrderedStore, Path, Value,
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, warn};

use crate::db::PathDb;
use crate::options::WatchOptions;

/// An event delivered to a watcher.
#[derive(Debug)]
pub enum WatchEvent {
    /// The document under the root when the watcher started, or the
    /// watcher's default when nothing was stored there. Always first.
    Initial(Option<Value>),
    /// The operations of one committed batch that fell under the root, with
    /// paths relative to the root.
    Changeset(Vec<Op>),
    /// The initial read failed. No further events follow.
    Error(Error),
}

/// What travels over the channel. The initial delivery also carries the
/// leaves the subscription seeds its replica with.
enum Delivery {
    Initial { value: Option<Value>, leaves: Leaves },
    Changeset(Vec<Op>),
    Error(Error),
}

enum Phase {
    Initializing(Vec<Vec<Op>>),
    Active,
    Inert,
}

struct WatchState {
    phase: Phase,
    events: Option<mpsc::UnboundedSender<Delivery>>,
    emit_empty: bool,
}

impl WatchState {
    fn send(&self, delivery: Delivery) {
        if let Some(events) = &self.events {
            // A closed receiver means the subscription is going away.
            let _ = events.send(delivery);
        }
    }

    fn emit(&self, changeset: Vec<Op>) {
        if changeset.is_empty() && !self.emit_empty {
            return;
        }
        self.send(Delivery::Changeset(changeset));
    }

    fn on_commit(&mut self, changeset: Vec<Op>) {
        if let Phase::Initializing(buffered) = &mut self.phase {
            buffered.push(changeset);
        } else if matches!(self.phase, Phase::Active) {
            self.emit(changeset);
        }
    }

    fn stop(&mut self) {
        self.phase = Phase::Inert;
        self.events = None;
    }
}

fn lock(state: &Mutex<WatchState>) -> MutexGuard<'_, WatchState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Copy the operations of a committed batch that fall under `range`, with
/// their paths made relative to `root`.
fn relative_changeset(root: &Path, range: &KeyRange, codec: &dyn Codec, ops: &[BatchOp]) -> Vec<Op> {
    let mut changeset = Vec::new();
    for op in ops.iter().filter(|op| range.contains(op.key())) {
        let path = match keys::decode(op.key()) {
            Ok(path) => path,
            Err(err) => {
                warn!(root = %root, key = ?op.key(), error = %err, "skipping undecodable key");
                continue;
            }
        };
        let Some(relative) = path.strip_prefix(root) else {
            continue;
        };
        match op {
            BatchOp::Put { value, .. } => match codec.decode(value) {
                Ok(value) => changeset.push(Op::Put {
                    path: relative,
                    value,
                }),
                Err(err) => {
                    warn!(root = %root, path = %relative, error = %err, "skipping undecodable leaf");
                }
            },
            BatchOp::Delete { .. } => changeset.push(Op::Del { path: relative }),
        }
    }
    changeset
}

struct Registration {
    store: Arc<dyn OrderedStore>,
    id: ListenerId,
    state: Arc<Mutex<WatchState>>,
}

impl Registration {
    fn detach(self, root: &Path) -> Result<bool, Error> {
        lock(&self.state).stop();
        let removed = self.store.unlisten(self.id)?;
        debug!(root = %root, listener = self.id.0, "watcher unsubscribed");
        Ok(removed)
    }
}

/// A live watch on a subtree.
///
/// Events arrive in order: one `Initial` (or one `Error`), then a
/// `Changeset` per committed batch touching the root. Dropping the
/// subscription unsubscribes it.
///
/// Every received changeset is also applied to the subscription's own copy
/// of the leaves under the root, so [`document`](Self::document) always
/// matches what the events received so far describe.
pub struct Subscription {
    root: Path,
    events: mpsc::UnboundedReceiver<Delivery>,
    registration: Option<Registration>,
    replica: Option<Leaves>,
}

impl Subscription {
    /// The watched root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the watcher is still registered with the store.
    pub fn is_active(&self) -> bool {
        self.registration.is_some()
    }

    /// The initial document with every changeset received so far applied.
    ///
    /// `None` until the initial event has been received, and for a watcher
    /// whose initial read failed. When the initial event carried the
    /// default, the default is the starting point. An empty subtree builds
    /// as an empty map.
    pub fn document(&self) -> Option<Value> {
        self.replica.as_ref().map(Leaves::to_value)
    }

    /// The leaves behind [`document`](Self::document).
    pub fn leaves(&self) -> Option<&Leaves> {
        self.replica.as_ref()
    }

    /// Wait for the next event. Returns `None` once the subscription has
    /// ended and every queued event has been received.
    pub async fn recv(&mut self) -> Option<WatchEvent> {
        let delivery = self.events.recv().await?;
        Some(self.receive(delivery))
    }

    /// Take the next event if one is queued.
    pub fn try_recv(&mut self) -> Result<WatchEvent, TryRecvError> {
        let delivery = self.events.try_recv()?;
        Ok(self.receive(delivery))
    }

    /// Block the current thread until the next event arrives.
    ///
    /// Panics if called from within an async runtime, like
    /// [`mpsc::UnboundedReceiver::blocking_recv`].
    pub fn blocking_recv(&mut self) -> Option<WatchEvent> {
        let delivery = self.events.blocking_recv()?;
        Some(self.receive(delivery))
    }

    fn receive(&mut self, delivery: Delivery) -> WatchEvent {
        match delivery {
            Delivery::Initial { value, leaves } => {
                self.replica = Some(leaves);
                WatchEvent::Initial(value)
            }
            Delivery::Changeset(ops) => {
                if let Some(replica) = &mut self.replica {
                    replica.apply(&ops);
                }
                WatchEvent::Changeset(ops)
            }
            Delivery::Error(err) => WatchEvent::Error(err),
        }
    }

    /// Stop the watcher.
    ///
    /// Deregisters the listener and discards any queued events; afterwards
    /// every receive method reports the end of the stream. Returns `false` if
    /// the watcher was already stopped.
    pub fn unsubscribe(&mut self) -> Result<bool, Error> {
        let Some(registration) = self.registration.take() else {
            return Ok(false);
        };
        let detached = registration.detach(&self.root);
        self.events.close();
        while self.events.try_recv().is_ok() {}
        detached
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registration) = self.registration.take() {
            if let Err(err) = registration.detach(&self.root) {
                warn!(root = %self.root, error = %err, "failed to unsubscribe dropped watcher");
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("root", &self.root)
            .field("active", &self.is_active())
            .finish()
    }
}

impl<S, C> PathDb<S, C>
where
    S: OrderedStore + 'static,
    C: Codec + 'static,
{
    /// Watch the subtree under `root` with the handle's default options.
    ///
    /// The first event is `Initial(Some(doc))` when something is stored under
    /// `root`, and `Initial(default)` when the read reports `NotFound`.
    pub fn watch(&self, root: &Path, default: Option<Value>) -> Subscription {
        self.watch_with(root, default, self.options.watch)
    }

    /// Watch the subtree under `root` with explicit options.
    pub fn watch_with(&self, root: &Path, default: Option<Value>, options: WatchOptions) -> Subscription {
        let (sender, events) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(WatchState {
            phase: Phase::Initializing(Vec::new()),
            events: Some(sender),
            emit_empty: options.emit_empty,
        }));

        let listener = {
            let root = root.clone();
            let range = keys::key_range(&root);
            let codec = Arc::clone(&self.codec);
            let state = Arc::clone(&state);
            move |ops: &[BatchOp]| {
                let changeset = relative_changeset(&root, &range, &*codec, ops);
                lock(&state).on_commit(changeset);
            }
        };

        let mut subscription = Subscription {
            root: root.clone(),
            events,
            registration: None,
            replica: None,
        };

        let id = match self.store.listen(Box::new(listener)) {
            Ok(id) => id,
            Err(err) => {
                warn!(root = %root, error = %err, "failed to register watcher");
                let mut state = lock(&state);
                state.send(Delivery::Error(err.into()));
                state.stop();
                return subscription;
            }
        };
        debug!(root = %root, listener = id.0, "watcher registered");

        let initial = self.leaves(root).map(|leaves| {
            if !leaves.is_empty() {
                (Some(leaves.to_value()), leaves)
            } else if let Some(default) = default {
                let leaves = Leaves::from_doc(&default);
                (Some(default), leaves)
            } else {
                (None, leaves)
            }
        });

        let store: Arc<dyn OrderedStore> = self.store.clone();
        let registration = Registration {
            store,
            id,
            state: Arc::clone(&state),
        };

        let mut guard = lock(&state);
        match initial {
            Ok((value, leaves)) => {
                guard.send(Delivery::Initial { value, leaves });
                let buffered = match mem::replace(&mut guard.phase, Phase::Active) {
                    Phase::Initializing(buffered) => buffered,
                    _ => Vec::new(),
                };
                debug!(root = %root, replayed = buffered.len(), "initial value emitted");
                for changeset in buffered {
                    guard.emit(changeset);
                }
                drop(guard);
                subscription.registration = Some(registration);
            }
            Err(err) => {
                warn!(root = %root, error = %err, "initial read failed");
                guard.send(Delivery::Error(err));
                drop(guard);
                // Listener callbacks take the state lock, so it must be free here.
                if let Err(err) = registration.detach(root) {
                    warn!(root = %root, error = %err, "failed to unsubscribe failed watcher");
                }
            }
        }
        subscription
    }
}
