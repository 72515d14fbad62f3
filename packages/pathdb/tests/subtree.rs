//! Reads, writes, deletes and batches against the in-memory store.

use std::sync::atomic::{AtomicBool, Ordering};

use pathdb::{
    keys, path, BatchOp, Entry, ErrorKind, KeyRange, LLError, ListenerId, MemoryStore, Op,
    OrderedStore, PathDb, Value,
};
use pathdb::{CommitListener, Bytes};
use serde_json::json;

fn doc(json: serde_json::Value) -> Value {
    pathdb_serde::json_to_value(json)
}

fn person() -> Value {
    doc(json!({
        "name": "Eugene",
        "number": 42,
        "tags": ["tag1", "tag2", "tag3"],
        "cars": [
            {"make": "Toyota", "model": "Camry"},
            {"make": "Toyota", "model": "Corolla"}
        ]
    }))
}

#[test]
fn whole_document_roundtrip() {
    let db = PathDb::new(MemoryStore::new());
    db.put(&path![], &person()).unwrap();
    assert_eq!(db.get(&path![]).unwrap(), person());
}

#[test]
fn query_subtrees() {
    let db = PathDb::new(MemoryStore::new());
    db.put(&path!["my", "people"], &person()).unwrap();

    assert_eq!(
        db.get(&path!["my", "people", "cars"]).unwrap(),
        doc(json!([
            {"make": "Toyota", "model": "Camry"},
            {"make": "Toyota", "model": "Corolla"}
        ]))
    );
    assert_eq!(
        db.get(&path!["my", "people", "cars", 1]).unwrap(),
        doc(json!({"make": "Toyota", "model": "Corolla"}))
    );
    // A single leaf is not a subtree of itself.
    assert!(db.get(&path!["my", "people", "cars", 1, "make"]).unwrap_err().is_not_found());
}

#[test]
fn leaves_are_stored_under_encoded_paths() {
    let db = PathDb::new(MemoryStore::new());
    db.put(&path!["my", "people"], &person()).unwrap();

    let stored = db
        .store()
        .get(&keys::encode(&path!["my", "people", "cars", 1, "make"]))
        .unwrap()
        .unwrap();
    assert_eq!(&stored[..], b"\"Toyota\"");
}

#[test]
fn subtrees_are_isolated() {
    let db = PathDb::new(MemoryStore::new());
    db.put(&path!["a"], &doc(json!({"x": 1}))).unwrap();
    db.put(&path!["b"], &doc(json!({"y": 2}))).unwrap();

    db.put(&path!["a"], &doc(json!({"z": 3}))).unwrap();
    db.del(&path!["a"]).unwrap();

    assert!(db.get(&path!["a"]).unwrap_err().is_not_found());
    assert_eq!(db.get(&path!["b"]).unwrap(), doc(json!({"y": 2})));
}

#[test]
fn sibling_prefixes_do_not_collide() {
    let db = PathDb::new(MemoryStore::new());
    db.put(&path!["a"], &doc(json!({"v": 1}))).unwrap();
    db.put(&path!["ab"], &doc(json!({"v": 2}))).unwrap();
    db.put(&path!["a\u{0}"], &doc(json!({"v": 3}))).unwrap();

    assert_eq!(db.get(&path!["a"]).unwrap(), doc(json!({"v": 1})));
    db.del(&path!["a"]).unwrap();
    assert_eq!(db.get(&path!["ab"]).unwrap(), doc(json!({"v": 2})));
    assert_eq!(db.get(&path!["a\u{0}"]).unwrap(), doc(json!({"v": 3})));
}

#[test]
fn delete_is_idempotent_and_final() {
    let db = PathDb::new(MemoryStore::new());
    db.put(&path!["people"], &person()).unwrap();
    db.del(&path!["people"]).unwrap();
    let err = db.get(&path!["people"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "path not found: [people]");

    db.del(&path!["people"]).unwrap();
    db.del(&path!["nobody"]).unwrap();
    assert!(db.store().is_empty().unwrap());
}

#[test]
fn replace_leaves_no_stale_leaves() {
    let db = PathDb::new(MemoryStore::new());
    db.put(&path!["people"], &doc(json!({"old": "data"}))).unwrap();
    db.put(&path!["people"], &person()).unwrap();
    assert_eq!(db.get(&path!["people"]).unwrap(), person());

    db.put(&path!["people"], &doc(json!({"tags": ["only"]}))).unwrap();
    assert_eq!(db.get(&path!["people"]).unwrap(), doc(json!({"tags": ["only"]})));
    assert_eq!(db.store().len().unwrap(), 1);
}

#[test]
fn nested_empty_containers_roundtrip() {
    let db = PathDb::new(MemoryStore::new());
    let value = doc(json!({"a": {}, "b": [], "c": [{}, []]}));
    db.put(&path!["x"], &value).unwrap();
    assert_eq!(db.get(&path!["x"]).unwrap(), value);
}

#[test]
fn sparse_indexes_read_back_as_maps() {
    let db = PathDb::new(MemoryStore::new());
    db.batch(
        &path!["list"],
        vec![Op::put(path![0], "a"), Op::put(path![2], "c")],
    )
    .unwrap();
    assert_eq!(db.get(&path!["list"]).unwrap(), doc(json!({"0": "a", "2": "c"})));
}

#[test]
fn batch_updates_under_a_root() {
    let db = PathDb::new(MemoryStore::new());
    db.put(&path!["people"], &doc(json!({"old": "data", "smelly": "socks"})))
        .unwrap();
    db.batch(
        &path!["people"],
        vec![
            Op::del(path!["smelly"]),
            Op::put(path!["my", "new"], "data"),
            Op::put(path!["my", "extra"], "data"),
        ],
    )
    .unwrap();

    assert_eq!(
        db.get(&path!["people"]).unwrap(),
        doc(json!({"my": {"extra": "data", "new": "data"}, "old": "data"}))
    );
}

#[test]
fn batch_applies_a_diff() {
    let db = PathDb::new(MemoryStore::new());
    let old = doc(json!({"old": "data", "list": [1, 2, 3]}));
    db.put(&path!["people"], &old).unwrap();

    db.batch(&path!["people"], pathdb::diff(&old, &person())).unwrap();
    assert_eq!(db.get(&path!["people"]).unwrap(), person());
}

#[test]
fn empty_writes_submit_nothing() {
    let db = PathDb::new(MemoryStore::new());
    let mut sub = db.watch(&path![], None);
    sub.try_recv().unwrap();

    db.batch(&path!["a"], Vec::new()).unwrap();
    db.put(&path!["a"], &Value::map()).unwrap();
    db.del(&path!["a"]).unwrap();
    assert!(sub.try_recv().is_err());
}

/// Store wrapper whose batches fail while `failing` is set.
struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: AtomicBool::new(false),
        }
    }

    fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), LLError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(LLError::Backend {
                code: 503,
                detail: Bytes::from_static(b"disk on fire"),
            })
        } else {
            Ok(())
        }
    }
}

impl OrderedStore for FlakyStore {
    fn scan(&self, range: &KeyRange) -> Result<Vec<Entry>, LLError> {
        self.inner.scan(range)
    }

    fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), LLError> {
        self.check()?;
        self.inner.write_batch(ops)
    }

    fn listen(&self, listener: CommitListener) -> Result<ListenerId, LLError> {
        self.inner.listen(listener)
    }

    fn unlisten(&self, id: ListenerId) -> Result<bool, LLError> {
        self.inner.unlisten(id)
    }
}

#[test]
fn store_errors_surface_verbatim_and_leave_prior_state() {
    let db = PathDb::new(FlakyStore::new());
    db.put(&path!["people"], &doc(json!({"old": "data"}))).unwrap();

    db.store().fail(true);
    let err = db.put(&path!["people"], &person()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(matches!(
        err,
        pathdb::Error::Store(LLError::Backend { code: 503, .. })
    ));
    assert!(err.to_string().contains("disk on fire"));

    assert_eq!(db.del(&path!["people"]).unwrap_err().kind(), ErrorKind::Store);
    db.store().fail(false);

    assert_eq!(db.get(&path!["people"]).unwrap(), doc(json!({"old": "data"})));
}

#[test]
fn typed_access() {
    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Car {
        make: String,
        model: String,
    }

    let db = PathDb::new(MemoryStore::new());
    db.put(&path!["people"], &person()).unwrap();
    let cars: Vec<Car> = db.get_as(&path!["people", "cars"]).unwrap();
    assert_eq!(cars.len(), 2);
    assert_eq!(cars[1].model, "Corolla");
}
