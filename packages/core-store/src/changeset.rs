//! Leaf-level changesets: computing and replaying deltas between documents.
//!
//! A changeset is an ordered list of [`Op`]s, each targeting one leaf path.
//! This is the shape a watcher emits and the shape `PathDb::batch` accepts.

use std::collections::BTreeMap;

use crate::{flatten, Leaves, Path, Value};

/// A single leaf write, addressed by path.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    /// Store `value` as the leaf at `path`.
    Put { path: Path, value: Value },
    /// Remove the leaf at `path`.
    Del { path: Path },
}

impl Op {
    /// Create a put.
    pub fn put(path: Path, value: impl Into<Value>) -> Self {
        Op::Put {
            path,
            value: value.into(),
        }
    }

    /// Create a delete.
    pub fn del(path: Path) -> Self {
        Op::Del { path }
    }

    /// The leaf path this operation targets.
    pub fn path(&self) -> &Path {
        match self {
            Op::Put { path, .. } | Op::Del { path } => path,
        }
    }

    /// Check if this is a put.
    pub fn is_put(&self) -> bool {
        matches!(self, Op::Put { .. })
    }

    /// Prefix this operation's path with `root`.
    #[must_use]
    pub fn relocate(self, root: &Path) -> Op {
        match self {
            Op::Put { path, value } => Op::Put {
                path: root.join(&path),
                value,
            },
            Op::Del { path } => Op::Del {
                path: root.join(&path),
            },
        }
    }

    /// Make this operation's path relative to `root`.
    ///
    /// Returns `None` if the path is not under `root`.
    #[must_use]
    pub fn strip(self, root: &Path) -> Option<Op> {
        Some(match self {
            Op::Put { path, value } => Op::Put {
                path: path.strip_prefix(root)?,
                value,
            },
            Op::Del { path } => Op::Del {
                path: path.strip_prefix(root)?,
            },
        })
    }
}

/// Compute the leaf operations that turn `old` into `new`.
///
/// Operations come out in path order. Leaves only in `old` are deleted;
/// leaves that are new or changed in `new` are put. Unchanged leaves produce
/// nothing.
///
/// # Example
///
/// ```rust
/// use pathdb_core::{diff, path, Op, Value};
/// use std::collections::BTreeMap;
///
/// let old = Value::Map(BTreeMap::from([("old".to_string(), Value::from("data"))]));
/// let new = Value::Map(BTreeMap::from([("new".to_string(), Value::from("x"))]));
///
/// assert_eq!(
///     diff(&old, &new),
///     vec![Op::put(path!["new"], "x"), Op::del(path!["old"])]
/// );
/// ```
pub fn diff(old: &Value, new: &Value) -> Vec<Op> {
    let mut old_leaves: BTreeMap<Path, Value> = flatten(old).into_iter().collect();
    let mut ops: BTreeMap<Path, Op> = BTreeMap::new();

    for (path, value) in flatten(new) {
        match old_leaves.remove(&path) {
            Some(previous) if previous == value => {}
            _ => {
                ops.insert(path.clone(), Op::Put { path, value });
            }
        }
    }
    for (path, _) in old_leaves {
        ops.insert(path.clone(), Op::Del { path });
    }

    ops.into_values().collect()
}

/// Replay operations on a document, returning the result.
///
/// The document is flattened, the operations are applied to its leaves in
/// order, and the result is rebuilt. The round trip through a document is
/// only exact when the document's leaves survive [`build`](crate::build) then [`flatten`]:
/// a sparse array comes back as a map with string keys and a marker shadowed
/// by children disappears. Keep a [`Leaves`] to replay changesets across
/// those shapes.
pub fn apply<'a>(ops: impl IntoIterator<Item = &'a Op>, doc: &Value) -> Value {
    let mut leaves = Leaves::from_doc(doc);
    leaves.apply(ops);
    leaves.into_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use collection_literals::btree;

    fn doc(entries: Vec<(&str, Value)>) -> Value {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    #[test]
    fn diff_of_equal_documents_is_empty() {
        let d = doc(vec![("a", Value::from(1)), ("b", Value::from(vec!["x"]))]);
        assert!(diff(&d, &d).is_empty());
    }

    #[test]
    fn diff_then_apply_reaches_target() {
        let old = doc(vec![
            ("name", Value::from("Eugene")),
            ("tags", Value::from(vec!["a", "b", "c"])),
            ("gone", Value::from(true)),
        ]);
        let new = doc(vec![
            ("name", Value::from("Eugene")),
            ("tags", Value::from(vec!["a", "z"])),
            ("added", Value::Map(btree! { "deep".to_string() => Value::Null, })),
        ]);

        let ops = diff(&old, &new);
        assert_eq!(
            ops,
            vec![
                Op::put(path!["added", "deep"], Value::Null),
                Op::del(path!["gone"]),
                Op::put(path!["tags", 1], "z"),
                Op::del(path!["tags", 2]),
            ]
        );
        assert_eq!(apply(&ops, &old), new);
    }

    #[test]
    fn apply_on_empty_document() {
        let ops = vec![Op::put(path!["a", 0], 1), Op::put(path!["a", 1], 2)];
        assert_eq!(
            apply(&ops, &Value::map()),
            doc(vec![("a", Value::from(vec![1, 2]))])
        );
    }

    #[test]
    fn apply_delete_then_put_same_path() {
        let start = doc(vec![("k", Value::from("old"))]);
        let ops = vec![Op::del(path!["k"]), Op::put(path!["k"], "new")];
        assert_eq!(apply(&ops, &start), doc(vec![("k", Value::from("new"))]));
    }

    #[test]
    fn deleting_middle_index_leaves_sparse_map() {
        let start = doc(vec![("l", Value::from(vec!["a", "b", "c"]))]);
        let result = apply(&[Op::del(path!["l", 1])], &start);
        assert_eq!(
            result,
            doc(vec![(
                "l",
                doc(vec![("0", Value::from("a")), ("2", Value::from("c"))])
            )])
        );
    }

    #[test]
    fn relocate_and_strip() {
        let op = Op::put(path!["make"], "Toyota");
        let moved = op.clone().relocate(&path!["cars", 0]);
        assert_eq!(moved.path(), &path!["cars", 0, "make"]);
        assert_eq!(moved.clone().strip(&path!["cars", 0]), Some(op));
        assert_eq!(moved.strip(&path!["bikes"]), None);
        assert!(!Op::del(path!["x"]).is_put());
    }
}
