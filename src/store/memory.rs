//! In-memory [`ObjectStore`] used by the unit tests.
//!
//! Objects live in a `BTreeMap`; every call is recorded so tests can assert
//! which remote operations a command did (or did not) perform.

use std::{cell::RefCell, collections::BTreeMap, fs, path::Path};

use super::{ObjectStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Put(String),
    Get(String),
    Delete(String),
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RefCell<BTreeMap<String, Vec<u8>>>,
    calls: RefCell<Vec<Call>>,
    fail_uploads: bool,
}

impl MemoryStore {
    /// A store pre-populated with empty objects at `keys`.
    pub fn with_keys(keys: &[&str]) -> Self {
        let store = Self::default();
        store
            .objects
            .borrow_mut()
            .extend(keys.iter().map(|k| ((*k).to_owned(), Vec::new())));
        store
    }

    /// A store whose uploads always fail, as if the bucket were unreachable.
    pub fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.borrow().keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// True if any put or delete reached the store.
    pub fn mutated(&self) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|c| matches!(c, Call::Put(_) | Call::Delete(_)))
    }

    pub fn deleted(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Delete(key) => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl ObjectStore for MemoryStore {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.record(Call::List(prefix.to_owned()));
        Ok(self
            .objects
            .borrow()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn put_file(&self, key: &str, source: &Path) -> Result<(), StoreError> {
        self.record(Call::Put(key.to_owned()));
        if self.fail_uploads {
            return Err(StoreError::Upload {
                key: key.to_owned(),
                reason: "simulated network failure".into(),
            });
        }
        let data = fs::read(source).map_err(|source_err| StoreError::Io {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        self.objects.borrow_mut().insert(key.to_owned(), data);
        Ok(())
    }

    fn get_file(&self, key: &str, dest: &Path) -> Result<(), StoreError> {
        self.record(Call::Get(key.to_owned()));
        let objects = self.objects.borrow();
        let data = objects.get(key).ok_or_else(|| StoreError::NotFound {
            key: key.to_owned(),
        })?;
        fs::write(dest, data).map_err(|source| StoreError::Io {
            path: dest.to_path_buf(),
            source,
        })
    }

    fn delete_key(&self, key: &str) -> Result<(), StoreError> {
        self.record(Call::Delete(key.to_owned()));
        self.objects.borrow_mut().remove(key);
        Ok(())
    }
}
