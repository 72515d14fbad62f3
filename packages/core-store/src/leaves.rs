//! A document held as its stored leaves.
//!
//! [`build`] is not injective: a sparse array rebuilds as a map with string
//! keys, and a marker leaf under a node with children is hidden. Flattening
//! such a document again does not give back the leaves that produced it, so
//! a replica that must track the store exactly keeps leaves, not a document.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::{build, flatten, Op, Path, Value};

/// The leaves of a document, keyed by path in store order.
///
/// Applying a changeset here is exactly what the store does with the same
/// operations, so a `Leaves` seeded from a read and fed every later
/// changeset under the same root always builds what a fresh read returns.
///
/// # Example
///
/// ```rust
/// use pathdb_core::{path, Leaves, Op, Value};
///
/// let mut leaves = Leaves::from_doc(&Value::from(vec!["a", "b", "c"]));
/// leaves.apply(&[Op::del(path![1]), Op::del(path![2])]);
///
/// assert_eq!(leaves.to_value(), Value::from(vec!["a"]));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Leaves {
    leaves: BTreeMap<Path, Value>,
}

impl Leaves {
    pub fn new() -> Self {
        Self::default()
    }

    /// The leaves of `doc`.
    pub fn from_doc(doc: &Value) -> Self {
        flatten(doc).into_iter().collect()
    }

    /// Replay operations in order.
    pub fn apply<'a>(&mut self, ops: impl IntoIterator<Item = &'a Op>) {
        for op in ops {
            match op {
                Op::Put { path, value } => {
                    self.leaves.insert(path.clone(), value.clone());
                }
                Op::Del { path } => {
                    self.leaves.remove(path);
                }
            }
        }
    }

    pub fn get(&self, path: &Path) -> Option<&Value> {
        self.leaves.get(path)
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Iterate over `(path, leaf)` pairs in path order.
    pub fn iter(&self) -> btree_map::Iter<'_, Path, Value> {
        self.leaves.iter()
    }

    /// Rebuild the document.
    pub fn to_value(&self) -> Value {
        build(self.leaves.iter().map(|(path, leaf)| (path.clone(), leaf.clone())))
    }

    pub fn into_value(self) -> Value {
        build(self.leaves)
    }
}

impl FromIterator<(Path, Value)> for Leaves {
    fn from_iter<I: IntoIterator<Item = (Path, Value)>>(iter: I) -> Self {
        Self {
            leaves: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Leaves {
    type Item = (Path, Value);
    type IntoIter = btree_map::IntoIter<Path, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.leaves.into_iter()
    }
}
