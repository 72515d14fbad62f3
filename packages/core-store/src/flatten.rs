//! Decomposing documents into leaves and rebuilding them.
//!
//! [`flatten`] walks a document depth-first and yields one `(path, leaf)`
//! pair per leaf; [`build`] is its inverse. Both are total.
//!
//! # Leaves
//!
//! Scalars are leaves. Empty maps and arrays below the root are leaves too,
//! holding the empty container, so `{"a": {}}` survives a round trip. An
//! empty container at the root has no leaves at all.
//!
//! # Shape inference
//!
//! [`build`] decides per interior node: if every child segment is an index
//! and the indexes are exactly `0..n`, the node is an array. Otherwise it is
//! a map, and index children are keyed by their decimal string, so a sparse
//! array `{0, 2}` rebuilds as `{"0": .., "2": ..}`. If a stringified index
//! collides with a key child, the key child wins. A node that holds both a
//! direct leaf and children keeps the children.

use std::collections::BTreeMap;

use tracing::trace;

use crate::{Path, Segment, Value};

/// Flatten a document into `(path, leaf)` pairs in depth-first key order.
///
/// # Example
///
/// ```rust
/// use pathdb_core::{flatten, path, Value};
///
/// let doc = Value::from(vec!["x", "y"]);
/// let leaves = flatten(&doc);
/// assert_eq!(leaves[1], (path![1], Value::from("y")));
/// ```
pub fn flatten(value: &Value) -> Vec<(Path, Value)> {
    let mut out = Vec::new();
    let mut prefix = Vec::new();
    match value {
        Value::Map(map) => map_children(map, &mut prefix, &mut out),
        Value::Array(arr) => array_children(arr, &mut prefix, &mut out),
        scalar => out.push((Path::root(), scalar.clone())),
    }
    out
}

fn walk(value: &Value, prefix: &mut Vec<Segment>, out: &mut Vec<(Path, Value)>) {
    match value {
        Value::Map(map) if !map.is_empty() => map_children(map, prefix, out),
        Value::Array(arr) if !arr.is_empty() => array_children(arr, prefix, out),
        leaf => out.push((Path::from(prefix.clone()), leaf.clone())),
    }
}

fn map_children(
    map: &BTreeMap<String, Value>,
    prefix: &mut Vec<Segment>,
    out: &mut Vec<(Path, Value)>,
) {
    for (key, child) in map {
        prefix.push(Segment::Key(key.clone()));
        walk(child, prefix, out);
        prefix.pop();
    }
}

fn array_children(arr: &[Value], prefix: &mut Vec<Segment>, out: &mut Vec<(Path, Value)>) {
    for (index, child) in arr.iter().enumerate() {
        prefix.push(Segment::Index(index as u64));
        walk(child, prefix, out);
        prefix.pop();
    }
}

/// Intermediate tree used while rebuilding.
#[derive(Default)]
struct Node {
    leaf: Option<Value>,
    children: BTreeMap<Segment, Node>,
}

impl Node {
    fn insert(&mut self, segments: &[Segment], value: Value) {
        match segments.split_first() {
            None => self.leaf = Some(value),
            Some((head, rest)) => self
                .children
                .entry(head.clone())
                .or_default()
                .insert(rest, value),
        }
    }

    fn into_value(self) -> Value {
        if self.children.is_empty() {
            return self.leaf.unwrap_or_else(Value::map);
        }
        if self.leaf.is_some() {
            trace!(children = self.children.len(), "direct leaf shadowed by children");
        }

        let is_dense_array = self
            .children
            .keys()
            .enumerate()
            .all(|(i, segment)| segment.as_index() == Some(i as u64));

        if is_dense_array {
            Value::Array(self.children.into_values().map(Node::into_value).collect())
        } else {
            // Index segments sort before key segments, so key children are
            // inserted last and win any collision.
            let mut map = BTreeMap::new();
            for (segment, node) in self.children {
                if map.insert(segment.to_string(), node.into_value()).is_some() {
                    trace!(key = %segment, "index child shadowed by key child");
                }
            }
            Value::Map(map)
        }
    }
}

/// Rebuild a document from `(path, leaf)` pairs.
///
/// Pairs may arrive in any order; later pairs for the same path replace
/// earlier ones. No pairs at all rebuild as an empty map.
///
/// # Example
///
/// ```rust
/// use pathdb_core::{build, path, Value};
///
/// let doc = build(vec![(path!["tags", 0], Value::from("a")), (path!["tags", 1], Value::from("b"))]);
/// assert_eq!(doc.get(&path!["tags"]), Some(&Value::from(vec!["a", "b"])));
/// ```
pub fn build(leaves: impl IntoIterator<Item = (Path, Value)>) -> Value {
    let mut root = Node::default();
    for (path, value) in leaves {
        root.insert(&path.segments, value);
    }
    root.into_value()
}
