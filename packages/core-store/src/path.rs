//! Path type with typed key/index segments.

use std::fmt;

/// Errors related to path parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// A component looked like an array index but was negative.
    #[error("negative array index '{component}' at position {position}")]
    NegativeIndex { component: String, position: usize },

    /// A numeric component does not fit in an index.
    #[error("array index '{component}' at position {position} is out of range")]
    IndexOverflow { component: String, position: usize },
}

/// One step in a path: an object key or an array index.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Segment {
    /// Array index. Sorts before every key, like numbers before strings.
    Index(u64),
    /// Object key.
    Key(String),
}

impl Segment {
    /// Check if this segment is an array index.
    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }

    /// The index, if this is an index segment.
    pub fn as_index(&self) -> Option<u64> {
        match self {
            Segment::Index(i) => Some(*i),
            Segment::Key(_) => None,
        }
    }

    /// The key, if this is a key segment.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(k) => Some(k),
            Segment::Index(_) => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(i) => write!(f, "{}", i),
            Segment::Key(k) => write!(f, "{}", k),
        }
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment::Key(s.to_string())
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Segment::Key(s)
    }
}

impl From<u64> for Segment {
    fn from(i: u64) -> Self {
        Segment::Index(i)
    }
}

impl From<u32> for Segment {
    fn from(i: u32) -> Self {
        Segment::Index(i as u64)
    }
}

impl From<usize> for Segment {
    fn from(i: usize) -> Self {
        Segment::Index(i as u64)
    }
}

impl From<i32> for Segment {
    /// Integer literals in `path![]` default to `i32`.
    ///
    /// # Panics
    ///
    /// Panics on a negative value. Use `Path::parse` for untrusted input.
    fn from(i: i32) -> Self {
        let index = u64::try_from(i).expect("negative array index");
        Segment::Index(index)
    }
}

/// A path into a document: an ordered sequence of segments.
///
/// The empty path is the document root. Paths are plain values; two paths are
/// equal iff their segments are equal element-wise.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    pub segments: Vec<Segment>,
}

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Path {
            segments: Vec::new(),
        }
    }

    /// Parse a `/`-separated path string.
    ///
    /// # Path Syntax
    ///
    /// - Components are separated by `/`
    /// - Empty components are ignored (normalizes `//` and trailing `/`)
    /// - Components made only of ASCII digits are array indexes
    /// - `-` followed by digits is rejected as a negative index
    /// - Anything else is an object key
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pathdb_core::{Path, Segment};
    ///
    /// let path = Path::parse("cars/1/make").unwrap();
    /// assert_eq!(path.len(), 3);
    /// assert_eq!(path[1], Segment::Index(1));
    ///
    /// assert!(Path::parse("cars/-1").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        for (position, component) in s.split('/').filter(|c| !c.is_empty()).enumerate() {
            segments.push(Self::parse_component(component, position)?);
        }
        Ok(Path { segments })
    }

    fn parse_component(component: &str, position: usize) -> Result<Segment, PathError> {
        let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

        if let Some(rest) = component.strip_prefix('-') {
            if is_digits(rest) {
                return Err(PathError::NegativeIndex {
                    component: component.to_string(),
                    position,
                });
            }
        }

        if is_digits(component) {
            let index = component
                .parse::<u64>()
                .map_err(|_| PathError::IndexOverflow {
                    component: component.to_string(),
                    position,
                })?;
            return Ok(Segment::Index(index));
        }

        Ok(Segment::Key(component.to_string()))
    }

    /// Check if this is the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Iterate over segments.
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// The path without its last segment. The root's parent is `None`.
    pub fn parent(&self) -> Option<Path> {
        if self.is_empty() {
            return None;
        }
        Some(Path {
            segments: self.segments[..self.len() - 1].to_vec(),
        })
    }

    /// Append a segment, returning a new path.
    #[must_use]
    pub fn child(&self, segment: impl Into<Segment>) -> Path {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Path { segments }
    }

    /// Join this path with another.
    #[must_use]
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = Vec::with_capacity(self.len() + other.len());
        segments.extend(self.segments.iter().cloned());
        segments.extend(other.segments.iter().cloned());
        Path { segments }
    }

    /// Check if this path has the given prefix (segment-wise).
    pub fn has_prefix(&self, prefix: &Path) -> bool {
        prefix.len() <= self.len() && prefix.segments[..] == self.segments[..prefix.len()]
    }

    /// Strip a prefix from this path.
    ///
    /// Returns `None` if the prefix doesn't match.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &Path) -> Option<Path> {
        if self.has_prefix(prefix) {
            Some(Path {
                segments: self.segments[prefix.len()..].to_vec(),
            })
        } else {
            None
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Segment;

    fn index(&self, i: usize) -> &Self::Output {
        &self.segments[i]
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Path { segments }
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Path {
            segments: iter.into_iter().collect(),
        }
    }
}

impl std::str::FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

/// Macro for building paths from mixed key and index literals.
///
/// # Example
///
/// ```rust
/// use pathdb_core::{path, Segment};
///
/// let p = path!["cars", 1, "make"];
/// assert_eq!(p.len(), 3);
/// assert_eq!(p[1], Segment::Index(1));
/// assert!(path![].is_empty());
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($segment:expr),+ $(,)?) => {
        $crate::Path::from(vec![$($crate::Segment::from($segment)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_paths() {
        assert_eq!(Path::parse("").unwrap().len(), 0);
        assert_eq!(Path::parse("foo").unwrap().len(), 1);
        assert_eq!(Path::parse("foo/bar").unwrap().len(), 2);
        assert_eq!(Path::parse("foo/0/baz").unwrap(), path!["foo", 0, "baz"]);
    }

    #[test]
    fn normalize_slashes() {
        assert_eq!(Path::parse("foo/bar/").unwrap(), path!["foo", "bar"]);
        assert_eq!(Path::parse("foo//bar").unwrap(), path!["foo", "bar"]);
        assert_eq!(Path::parse("/foo/bar").unwrap(), path!["foo", "bar"]);
    }

    #[test]
    fn keys_may_contain_anything_but_slash() {
        let p = Path::parse("my key/a-b/.hidden/12ab").unwrap();
        assert_eq!(p.len(), 4);
        assert!(p.iter().all(|s| !s.is_index()));
    }

    #[test]
    fn negative_index_rejected() {
        let err = Path::parse("cars/-1").unwrap_err();
        assert_eq!(
            err,
            PathError::NegativeIndex {
                component: "-1".to_string(),
                position: 1
            }
        );
        assert!(err.to_string().contains("negative"));
        // A lone dash or dash-prefixed word is an ordinary key
        assert_eq!(Path::parse("-").unwrap(), path!["-"]);
        assert_eq!(Path::parse("-x").unwrap(), path!["-x"]);
    }

    #[test]
    fn oversized_index_rejected() {
        let err = Path::parse("99999999999999999999999").unwrap_err();
        assert!(matches!(err, PathError::IndexOverflow { .. }));
    }

    #[test]
    fn has_prefix_works() {
        let p = path!["foo", "bar", 2];
        assert!(p.has_prefix(&path![]));
        assert!(p.has_prefix(&path!["foo"]));
        assert!(p.has_prefix(&path!["foo", "bar"]));
        assert!(p.has_prefix(&path!["foo", "bar", 2]));
        assert!(!p.has_prefix(&path!["fo"]));
        assert!(!p.has_prefix(&path!["foo", "bar", "2"]));
        assert!(!p.has_prefix(&path!["foo", "bar", 2, "x"]));
    }

    #[test]
    fn strip_prefix_works() {
        let p = path!["foo", "bar", "baz"];
        assert_eq!(p.strip_prefix(&path!["foo"]), Some(path!["bar", "baz"]));
        assert_eq!(p.strip_prefix(&p), Some(path![]));
        assert_eq!(p.strip_prefix(&path!["other"]), None);
    }

    #[test]
    fn join_and_child() {
        let p = path!["a"].join(&path![1, "b"]);
        assert_eq!(p, path!["a", 1, "b"]);
        assert_eq!(path![].join(&path!["x"]), path!["x"]);
        assert_eq!(path!["a"].child(3usize), path!["a", 3]);
    }

    #[test]
    fn parent_and_last() {
        let p = path!["a", 0];
        assert_eq!(p.parent(), Some(path!["a"]));
        assert_eq!(p.last(), Some(&Segment::Index(0)));
        assert_eq!(path![].parent(), None);
    }

    #[test]
    fn display_roundtrips_through_parse() {
        let p = path!["cars", 1, "make"];
        assert_eq!(p.to_string(), "cars/1/make");
        assert_eq!(Path::parse(&p.to_string()).unwrap(), p);
        assert_eq!(path![].to_string(), "");
    }

    #[test]
    fn index_sorts_before_key() {
        assert!(Segment::Index(99) < Segment::Key("0".to_string()));
        assert!(path!["a", 1] < path!["a", 2]);
    }

    #[test]
    #[should_panic(expected = "negative array index")]
    fn negative_literal_panics() {
        let _ = path!["a", -1];
    }
}
