//! File-based record repository
//!
//! Each collection lives in `<store_dir>/<collection>.json` as a JSON
//! array. The whole collection is rewritten after every mutation.

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use dirtco_domain::repository::{Record, RecordRepository};
use dirtco_types::{Error, Result};
use tracing::{debug, warn};

pub struct FileRecordRepository<T: Record> {
    store_path: PathBuf,
    records: RefCell<Vec<T>>,
}

impl<T: Record> FileRecordRepository<T> {
    /// Create or load the collection for `T` under `store_dir`
    pub fn open(store_dir: &Path) -> Result<Self> {
        fs::create_dir_all(store_dir)?;
        let store_path = store_dir.join(format!("{}.json", T::COLLECTION));

        let records = if store_path.exists() {
            let file = File::open(&store_path)?;
            let reader = BufReader::new(file);
            match serde_json::from_reader(reader) {
                Ok(records) => records,
                Err(e) => {
                    // Keep the unreadable file aside so the next write cannot clobber it
                    let backup_path = store_dir.join(format!("{}.json.bak", T::COLLECTION));
                    fs::rename(&store_path, &backup_path)?;
                    warn!(
                        path = %store_path.display(),
                        backup = %backup_path.display(),
                        error = %e,
                        "unreadable store file moved aside, starting empty"
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        debug!(
            collection = T::COLLECTION,
            count = records.len(),
            "opened record store"
        );
        Ok(Self {
            store_path,
            records: RefCell::new(records),
        })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Save store to disk
    fn persist(&self) -> Result<()> {
        let file = File::create(&self.store_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &*self.records.borrow())?;
        Ok(())
    }
}

impl<T: Record> RecordRepository<T> for FileRecordRepository<T> {
    fn create(&self, record: &T) -> std::result::Result<(), Error> {
        {
            let mut records = self.records.borrow_mut();
            if records.iter().any(|r| r.id() == record.id()) {
                return Err(Error::Duplicate(record.id().to_string()));
            }
            records.push(record.clone());
        }
        self.persist()
    }

    fn find_by_id(&self, id: &str) -> std::result::Result<Option<T>, Error> {
        Ok(self.records.borrow().iter().find(|r| r.id() == id).cloned())
    }

    fn find_all(&self) -> std::result::Result<Vec<T>, Error> {
        Ok(self.records.borrow().clone())
    }

    fn update(&self, record: &T) -> std::result::Result<bool, Error> {
        {
            let mut records = self.records.borrow_mut();
            match records.iter_mut().find(|r| r.id() == record.id()) {
                Some(slot) => *slot = record.clone(),
                None => return Ok(false),
            }
        }
        self.persist()?;
        Ok(true)
    }

    fn delete(&self, id: &str) -> std::result::Result<bool, Error> {
        {
            let mut records = self.records.borrow_mut();
            let before = records.len();
            records.retain(|r| r.id() != id);
            if records.len() == before {
                return Ok(false);
            }
        }
        self.persist()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirtco_domain::model::Customer;
    use tempfile::TempDir;

    fn customer(name: &str) -> Customer {
        Customer::new(name.to_string(), format!("{}@example.com", name), "555-0100".to_string())
    }

    #[test]
    fn test_create_and_reload() {
        let dir = TempDir::new().unwrap();
        let first = customer("ana");
        {
            let repo = FileRecordRepository::<Customer>::open(dir.path()).unwrap();
            repo.create(&first).unwrap();
            repo.create(&customer("ben")).unwrap();
        }
        let repo = FileRecordRepository::<Customer>::open(dir.path()).unwrap();
        let all = repo.find_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "ana");
        assert_eq!(repo.find_by_id(&first.id).unwrap(), Some(first));
        assert!(repo.store_path().ends_with("customers.json"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let dir = TempDir::new().unwrap();
        let repo = FileRecordRepository::<Customer>::open(dir.path()).unwrap();
        let c = customer("ana");
        repo.create(&c).unwrap();
        assert!(matches!(repo.create(&c), Err(Error::Duplicate(_))));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_update_and_delete() {
        let dir = TempDir::new().unwrap();
        let repo = FileRecordRepository::<Customer>::open(dir.path()).unwrap();
        let mut c = customer("ana");
        repo.create(&c).unwrap();

        c.phone = "555-0199".to_string();
        assert!(repo.update(&c).unwrap());
        assert_eq!(repo.find_by_id(&c.id).unwrap().unwrap().phone, "555-0199");

        assert!(!repo.update(&customer("ghost")).unwrap());
        assert!(repo.delete(&c.id).unwrap());
        assert!(!repo.delete(&c.id).unwrap());
        assert!(repo.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_kept_as_backup() {
        let dir = TempDir::new().unwrap();
        {
            let repo = FileRecordRepository::<Customer>::open(dir.path()).unwrap();
            for name in ["Ana", "Ben", "Cruz"] {
                repo.create(&customer(name)).unwrap();
            }
        }
        let store_path = dir.path().join("customers.json");
        let mut damaged = fs::read_to_string(&store_path).unwrap();
        damaged.push('x');
        fs::write(&store_path, &damaged).unwrap();

        let repo = FileRecordRepository::<Customer>::open(dir.path()).unwrap();
        assert!(repo.is_empty());
        repo.create(&customer("Dee")).unwrap();

        let backup = fs::read_to_string(dir.path().join("customers.json.bak")).unwrap();
        assert_eq!(backup, damaged);
        assert_eq!(repo.find_all().unwrap().len(), 1);
    }
}
