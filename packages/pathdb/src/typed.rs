//! Typed reads and writes through serde.

use serde::de::DeserializeOwned;
use serde::Serialize;

use pathdb_core::{Codec, Error, OrderedStore, Path};
use pathdb_serde::{from_value, to_value};

use crate::db::PathDb;

impl<S: OrderedStore, C: Codec> PathDb<S, C> {
    /// Read the document under `root` and deserialize it into `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pathdb::{path, MemoryStore, PathDb};
    /// use serde::{Deserialize, Serialize};
    ///
    /// #[derive(Serialize, Deserialize, PartialEq, Debug)]
    /// struct Car {
    ///     make: String,
    ///     model: String,
    /// }
    ///
    /// let db = PathDb::new(MemoryStore::new());
    /// let car = Car { make: "Toyota".into(), model: "Camry".into() };
    /// db.put_as(&path!["cars", 0], &car).unwrap();
    /// assert_eq!(db.get_as::<Car>(&path!["cars", 0]).unwrap(), car);
    /// ```
    pub fn get_as<T: DeserializeOwned>(&self, root: &Path) -> Result<T, Error> {
        from_value(self.get(root)?)
    }

    /// Serialize `data` and replace the subtree under `root` with it.
    ///
    /// Types that serialize to a scalar are rejected like scalar values are.
    pub fn put_as<T: Serialize>(&self, root: &Path, data: &T) -> Result<(), Error> {
        self.put(root, &to_value(data)?)
    }
}
