//! CLI command definitions and execution.
//!
//! Commands:
//! - `keys <file> [--root PATH]` - Store a document and list every stored key
//! - `get <file> <PATH>` - Store a document at the root and read a subtree back
//! - `diff <old> <new>` - Print the leaf operations turning one document into another
//!
//! Paths use the `/`-separated syntax of `Path::parse`: `cars/1/make`.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Subcommand;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use pathdb::{diff, keys, MemoryStore, Op, OrderedStore, Path, PathDb, PathError, Segment, Value};
use pathdb_serde::{json_to_value, value_to_json};

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot render output: {0}")]
    Render(#[source] serde_json::Error),

    #[error(transparent)]
    Db(#[from] pathdb::Error),
}

/// A pathdb CLI command.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Store a JSON document and print every key in key order
    Keys {
        /// JSON document to store
        file: PathBuf,
        /// Path to store the document under
        #[arg(long, value_parser = parse_path, default_value = "")]
        root: Path,
    },
    /// Store a JSON document at the root and print the subtree at PATH
    Get {
        /// JSON document to store
        file: PathBuf,
        /// Subtree to read back
        #[arg(value_parser = parse_path)]
        path: Path,
    },
    /// Print the changeset between two JSON documents, one operation per line
    Diff {
        old: PathBuf,
        new: PathBuf,
    },
}

fn parse_path(s: &str) -> Result<Path, PathError> {
    Path::parse(s)
}

/// Execute a command and return what it prints.
pub fn run(command: &Command) -> Result<String, CliError> {
    match command {
        Command::Keys { file, root } => keys_command(&load(file)?, root),
        Command::Get { file, path } => get_command(&load(file)?, path),
        Command::Diff { old, new } => Ok(diff_command(&load(old)?, &load(new)?)),
    }
}

fn load(file: &PathBuf) -> Result<Value, CliError> {
    let text = std::fs::read_to_string(file).map_err(|source| CliError::Io {
        path: file.clone(),
        source,
    })?;
    let json: JsonValue = serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: file.clone(),
        source,
    })?;
    Ok(json_to_value(json))
}

/// One line per stored leaf: hex key, path, stored JSON.
pub fn keys_command(doc: &Value, root: &Path) -> Result<String, CliError> {
    let db = PathDb::new(MemoryStore::new());
    db.put(root, doc)?;

    let entries = db
        .store()
        .scan(&keys::key_range(&Path::root()))
        .map_err(pathdb::Error::from)?;

    let mut output = String::new();
    for entry in entries {
        let path = keys::decode(&entry.key)?;
        let hex: String = entry.key.iter().map(|b| format!("{:02x}", b)).collect();
        let _ = writeln!(
            output,
            "{}  [{}]  {}",
            hex,
            path,
            String::from_utf8_lossy(&entry.value)
        );
    }
    Ok(output)
}

/// Pretty JSON of the subtree at `path`.
pub fn get_command(doc: &Value, path: &Path) -> Result<String, CliError> {
    let db = PathDb::new(MemoryStore::new());
    db.put(&Path::root(), doc)?;
    let value = db.get(path)?;
    Ok(format!("{}\n", render(&value_to_json(value))?))
}

fn render<T: Serialize + ?Sized>(output: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(output).map_err(CliError::Render)
}

/// One JSON object per operation, `{"type": "put"|"del", "key": [...], "value": ...}`.
pub fn diff_command(old: &Value, new: &Value) -> String {
    let mut output = String::new();
    for op in diff(old, new) {
        let _ = writeln!(output, "{}", op_to_json(&op));
    }
    output
}

fn op_to_json(op: &Op) -> JsonValue {
    let key: Vec<JsonValue> = op
        .path()
        .iter()
        .map(|segment| match segment {
            Segment::Index(i) => json!(i),
            Segment::Key(k) => json!(k),
        })
        .collect();
    match op {
        Op::Put { value, .. } => json!({"type": "put", "key": key, "value": value_to_json(value.clone())}),
        Op::Del { .. } => json!({"type": "del", "key": key}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn doc(json: JsonValue) -> Value {
        json_to_value(json)
    }

    fn person() -> Value {
        doc(json!({
            "name": "Eugene",
            "cars": [{"make": "Toyota", "model": "Camry"}]
        }))
    }

    #[test]
    fn keys_lists_leaves_in_key_order() {
        let output = keys_command(&person(), &Path::parse("people/0").unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("[people/0/cars/0/make]  \"Toyota\""));
        assert!(lines[1].contains("[people/0/cars/0/model]  \"Camry\""));
        assert!(lines[2].contains("[people/0/name]  \"Eugene\""));
        // 0x20 "people" 0x00, then index 0
        assert!(lines[0].starts_with("2070656f706c6500100000000000000000"));
    }

    #[test]
    fn keys_rejects_scalar_documents() {
        let err = keys_command(&Value::from(1), &Path::root()).unwrap_err();
        assert!(matches!(err, CliError::Db(e) if e.kind() == pathdb::ErrorKind::Validation));
    }

    #[test]
    fn get_prints_subtree() {
        let output = get_command(&person(), &Path::parse("cars/0").unwrap()).unwrap();
        let parsed: JsonValue = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!({"make": "Toyota", "model": "Camry"}));
    }

    #[test]
    fn get_missing_path_fails() {
        let err = get_command(&person(), &Path::parse("people").unwrap()).unwrap_err();
        assert!(matches!(err, CliError::Db(e) if e.is_not_found()));
    }

    #[test]
    fn unrenderable_output_is_an_error() {
        use std::collections::BTreeMap;

        let by_pair: BTreeMap<(u8, u8), &str> = BTreeMap::from([((0, 1), "edge")]);
        let err = render(&by_pair).unwrap_err();
        assert!(matches!(err, CliError::Render(_)));
        assert!(err.to_string().starts_with("cannot render output: "));
    }

    #[test]
    fn diff_prints_one_op_per_line() {
        let output = diff_command(&doc(json!({"old": "data"})), &doc(json!({"new": [1]})));
        let ops: Vec<JsonValue> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(
            ops,
            vec![
                json!({"type": "put", "key": ["new", 0], "value": 1}),
                json!({"type": "del", "key": ["old"]}),
            ]
        );
    }

    #[test]
    fn run_reads_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"tags": ["a", "b"]}}"#).unwrap();

        let command = Command::Get {
            file: file.path().to_path_buf(),
            path: Path::parse("tags").unwrap(),
        };
        let parsed: JsonValue = serde_json::from_str(&run(&command).unwrap()).unwrap();
        assert_eq!(parsed, json!(["a", "b"]));
    }

    #[test]
    fn run_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{nope").unwrap();

        let command = Command::Diff {
            old: file.path().to_path_buf(),
            new: file.path().to_path_buf(),
        };
        assert!(matches!(run(&command), Err(CliError::Json { .. })));
    }
}
