//! Serde Integration for pathdb
//!
//! This layer connects pathdb documents to serde. It adds:
//! - `JsonCodec`: the default leaf codec, storing each leaf as JSON
//! - Value <-> serde conversions, used for typed reads and writes
//!
//! # Example
//!
//! ```rust
//! use pathdb_serde::{from_value, to_value};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Car {
//!     make: String,
//!     model: String,
//! }
//!
//! let car = Car { make: "Toyota".into(), model: "Camry".into() };
//! let value = to_value(&car).unwrap();
//! let back: Car = from_value(value).unwrap();
//! assert_eq!(back, car);
//! ```

pub use bytes::Bytes;

mod codec;
mod convert;

pub use codec::JsonCodec;
pub use convert::{from_value, json_to_value, to_value, value_to_json};

// Re-export core types for convenience
pub use pathdb_core::{Codec, Error, Path, Value};
