//! # pathdb-cli
//!
//! Command-line tools for looking at pathdb's storage layout without a
//! persistent store. Every command loads JSON files into a fresh in-memory
//! store.
//!
//! ## Usage
//!
//! ```bash
//! # Every stored key, in key order
//! pathdb keys person.json --root people/0
//!
//! # Read a subtree back
//! pathdb get person.json cars/1
//!
//! # The leaf operations turning one document into another
//! pathdb diff old.json new.json
//! ```

pub mod commands;

pub use commands::{run, CliError, Command};
