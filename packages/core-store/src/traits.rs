//! Core traits: Codec.

use bytes::Bytes;

use crate::{Error, Value};

/// Codec for converting leaf values to and from stored bytes.
///
/// The engine calls `encode` once per leaf it writes and `decode` once per
/// entry it reads or observes. Only leaves pass through a codec: scalars and
/// empty containers.
///
/// # Implementing Custom Codecs
///
/// ```rust
/// use pathdb_core::{Codec, Error, Value};
/// use bytes::Bytes;
///
/// /// Stores only strings, as raw UTF-8.
/// struct Utf8Codec;
///
/// impl Codec for Utf8Codec {
///     fn name(&self) -> &'static str {
///         "utf8"
///     }
///
///     fn encode(&self, value: &Value) -> Result<Bytes, Error> {
///         match value {
///             Value::String(s) => Ok(Bytes::copy_from_slice(s.as_bytes())),
///             _ => Err(Error::encode(self.name(), "only strings are supported")),
///         }
///     }
///
///     fn decode(&self, bytes: &Bytes) -> Result<Value, Error> {
///         std::str::from_utf8(bytes)
///             .map(Value::from)
///             .map_err(|e| Error::decode(self.name(), e.to_string()))
///     }
/// }
/// ```
pub trait Codec: Send + Sync {
    /// Short name used in error messages.
    fn name(&self) -> &'static str;

    /// Encode a leaf value into bytes.
    fn encode(&self, value: &Value) -> Result<Bytes, Error>;

    /// Decode bytes back into a leaf value.
    fn decode(&self, bytes: &Bytes) -> Result<Value, Error>;
}

// Blanket implementations for references and boxes

impl<T: Codec + ?Sized> Codec for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn encode(&self, value: &Value) -> Result<Bytes, Error> {
        (**self).encode(value)
    }

    fn decode(&self, bytes: &Bytes) -> Result<Value, Error> {
        (**self).decode(bytes)
    }
}

impl<T: Codec + ?Sized> Codec for Box<T> {
    fn name(&self) -> &'static str {
        self.as_ref().name()
    }

    fn encode(&self, value: &Value) -> Result<Bytes, Error> {
        self.as_ref().encode(value)
    }

    fn decode(&self, bytes: &Bytes) -> Result<Value, Error> {
        self.as_ref().decode(bytes)
    }
}
