//! Order-preserving key encoding for paths.
//!
//! Every stored leaf lives under the encoding of its full path. The encoding
//! is chosen so that byte order of keys equals depth-first document order:
//!
//! - `Index(n)` encodes as `0x10` followed by `n` in 8 big-endian bytes
//! - `Key(s)` encodes as `0x20`, the bytes of `s` with `0x00` escaped as
//!   `0x00 0xFF`, then a `0x00` terminator
//! - a path is the concatenation of its segment encodings
//!
//! Segment encodings are self-delimiting and every tag lies strictly between
//! `0x00` and `0xFF`, so `encode(p) ++ [0x00]` sorts below every descendant of
//! `p` and `encode(p) ++ [0xFF]` sorts above all of them. Those two sentinels
//! are the bounds of a subtree scan.

use bytes::{BufMut, Bytes, BytesMut};
use pathdb_ll_store::KeyRange;

use crate::{Error, Path, Segment};

const TAG_INDEX: u8 = 0x10;
const TAG_KEY: u8 = 0x20;
const LOW: u8 = 0x00;
const HIGH: u8 = 0xFF;
const ESCAPE: u8 = 0xFF;

/// Encode a path into a byte-comparable key.
pub fn encode(path: &Path) -> Bytes {
    let mut buf = BytesMut::with_capacity(encoded_len_hint(path) + 1);
    encode_into(path, &mut buf);
    buf.freeze()
}

fn encoded_len_hint(path: &Path) -> usize {
    path.iter()
        .map(|segment| match segment {
            Segment::Index(_) => 9,
            Segment::Key(k) => k.len() + 2,
        })
        .sum()
}

fn encode_into(path: &Path, buf: &mut BytesMut) {
    for segment in path.iter() {
        match segment {
            Segment::Index(i) => {
                buf.put_u8(TAG_INDEX);
                buf.put_u64(*i);
            }
            Segment::Key(k) => {
                buf.put_u8(TAG_KEY);
                for &b in k.as_bytes() {
                    buf.put_u8(b);
                    if b == 0x00 {
                        buf.put_u8(ESCAPE);
                    }
                }
                buf.put_u8(0x00);
            }
        }
    }
}

/// Decode a key produced by [`encode`].
///
/// # Errors
///
/// Returns a validation error for bytes that no path encodes to.
pub fn decode(key: &[u8]) -> Result<Path, Error> {
    let mut segments = Vec::new();
    let mut pos = 0;

    while pos < key.len() {
        let tag = key[pos];
        pos += 1;
        match tag {
            TAG_INDEX => {
                let raw: [u8; 8] = key
                    .get(pos..pos + 8)
                    .and_then(|s| s.try_into().ok())
                    .ok_or_else(|| malformed(key, "truncated index segment"))?;
                segments.push(Segment::Index(u64::from_be_bytes(raw)));
                pos += 8;
            }
            TAG_KEY => {
                let mut bytes = Vec::new();
                loop {
                    let b = *key
                        .get(pos)
                        .ok_or_else(|| malformed(key, "unterminated key segment"))?;
                    pos += 1;
                    if b != 0x00 {
                        bytes.push(b);
                        continue;
                    }
                    if key.get(pos) == Some(&ESCAPE) {
                        bytes.push(0x00);
                        pos += 1;
                        continue;
                    }
                    break;
                }
                let s = String::from_utf8(bytes)
                    .map_err(|_| malformed(key, "key segment is not valid UTF-8"))?;
                segments.push(Segment::Key(s));
            }
            other => {
                return Err(malformed(key, &format!("unknown segment tag {:#04x}", other)));
            }
        }
    }

    Ok(Path::from(segments))
}

fn malformed(key: &[u8], reason: &str) -> Error {
    Error::validation(format!("malformed key {:02x?}: {}", key, reason))
}

/// Inclusive lower bound of the subtree rooted at `path`.
///
/// Sorts above the root's own key and below every descendant key.
pub fn lower_bound(path: &Path) -> Bytes {
    bound(path, LOW)
}

/// Exclusive upper bound of the subtree rooted at `path`.
///
/// Sorts above every descendant key and below the next sibling's key.
pub fn upper_bound(path: &Path) -> Bytes {
    bound(path, HIGH)
}

fn bound(path: &Path, sentinel: u8) -> Bytes {
    let mut buf = BytesMut::with_capacity(encoded_len_hint(path) + 1);
    encode_into(path, &mut buf);
    buf.put_u8(sentinel);
    buf.freeze()
}

/// The half-open scan range covering exactly the subtree rooted at `path`.
///
/// For the root path this is `[0x00, 0xFF)`, the whole engine keyspace.
pub fn key_range(path: &Path) -> KeyRange {
    KeyRange::new(lower_bound(path), upper_bound(path))
}
