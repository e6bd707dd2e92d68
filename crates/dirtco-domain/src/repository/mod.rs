//! Repository trait definitions for data persistence

use serde::de::DeserializeOwned;
use serde::Serialize;

use dirtco_types::Error;

/// A record kept by a [`RecordRepository`], keyed by a string id
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Collection name, used as the storage file stem
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Keyed storage for one record type
pub trait RecordRepository<T: Record> {
    /// Insert a new record, failing if the id is already taken
    fn create(&self, record: &T) -> Result<(), Error>;

    fn find_by_id(&self, id: &str) -> Result<Option<T>, Error>;

    /// All records, in insertion order
    fn find_all(&self) -> Result<Vec<T>, Error>;

    /// Replace an existing record. Returns false if no record has that id.
    fn update(&self, record: &T) -> Result<bool, Error>;

    /// Returns false if no record has that id
    fn delete(&self, id: &str) -> Result<bool, Error>;
}
