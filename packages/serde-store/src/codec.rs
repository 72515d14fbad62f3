//! JSON leaf codec implementation.

use bytes::Bytes;
use pathdb_core::{Codec, Error, Value};

use crate::convert::{json_to_value, value_to_json};

/// A codec that stores each leaf as a JSON document.
///
/// This is the default codec for `PathDb`. A leaf `"Toyota"` is stored as the
/// bytes `"Toyota"` (with quotes), `42` as `42`, an empty map as `{}`.
///
/// # Example
///
/// ```rust
/// use pathdb_serde::JsonCodec;
/// use pathdb_core::{Codec, Value};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Value::from("hello")).unwrap();
/// assert_eq!(&bytes[..], b"\"hello\"");
/// assert_eq!(codec.decode(&bytes).unwrap(), Value::from("hello"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, value: &Value) -> Result<Bytes, Error> {
        if let Value::Float(f) = value {
            if !f.is_finite() {
                return Err(Error::encode(
                    self.name(),
                    format!("non-finite float {} has no JSON form", f),
                ));
            }
        }

        let json = value_to_json(value.clone());
        let bytes = serde_json::to_vec(&json).map_err(|e| Error::encode(self.name(), e.to_string()))?;
        Ok(Bytes::from(bytes))
    }

    fn decode(&self, bytes: &Bytes) -> Result<Value, Error> {
        let json: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| Error::decode(self.name(), e.to_string()))?;
        Ok(json_to_value(json))
    }
}
