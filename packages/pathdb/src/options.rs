//! Per-handle and per-watcher configuration.

/// Configuration for a single watcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WatchOptions {
    /// Deliver a `Changeset` event even when a committed batch touched
    /// nothing under the watched root.
    pub emit_empty: bool,
}

impl WatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether empty changesets are delivered.
    pub fn emit_empty(mut self, emit_empty: bool) -> Self {
        self.emit_empty = emit_empty;
        self
    }
}

/// Configuration for a `PathDb` handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DbOptions {
    /// Options used by `PathDb::watch`.
    pub watch: WatchOptions,
}

impl DbOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default watcher options.
    pub fn watch(mut self, watch: WatchOptions) -> Self {
        self.watch = watch;
        self
    }
}
