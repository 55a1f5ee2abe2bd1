//! Where entity records go when they change.
//!
//! The store hands the backend already-encoded records keyed by
//! `(kind, id)`. Backends are durable and ordered per record, but make no
//! promise across records: writing two rooms is two independent saves.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use warren_protocol::EntityKind;

use crate::StoreError;

/// A storage backend for encoded entity records.
///
/// Calls happen while the entity's write lock is held, so implementations
/// should be quick and must not call back into the store.
pub trait Persistence: Send + Sync + 'static {
    /// Loads one record, or `None` if it was never saved.
    fn load(&self, kind: EntityKind, id: u64)
        -> Result<Option<Vec<u8>>, StoreError>;

    /// Loads every record of a kind, in no particular order.
    fn load_all(&self, kind: EntityKind) -> Result<Vec<Vec<u8>>, StoreError>;

    /// Creates or replaces a record.
    fn save(&self, kind: EntityKind, id: u64, record: &[u8])
        -> Result<(), StoreError>;

    /// Deletes a record. Deleting a missing record is not an error.
    fn delete(&self, kind: EntityKind, id: u64) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryPersistence
// ---------------------------------------------------------------------------

/// Keeps records in a map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    records: Mutex<HashMap<(EntityKind, u64), Vec<u8>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all kinds.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl Persistence for MemoryPersistence {
    fn load(
        &self,
        kind: EntityKind,
        id: u64,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.records.lock().get(&(kind, id)).cloned())
    }

    fn load_all(&self, kind: EntityKind) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn save(
        &self,
        kind: EntityKind,
        id: u64,
        record: &[u8],
    ) -> Result<(), StoreError> {
        self.records.lock().insert((kind, id), record.to_vec());
        Ok(())
    }

    fn delete(&self, kind: EntityKind, id: u64) -> Result<(), StoreError> {
        self.records.lock().remove(&(kind, id));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonFilePersistence
// ---------------------------------------------------------------------------

/// One JSON file per entity: `<root>/<kind>/<id>.json`.
///
/// Saves write a sibling `.json.tmp` file and rename it over the target,
/// so a crash mid-save leaves either the old record or the new one.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    root: PathBuf,
}

impl JsonFilePersistence {
    /// Opens (creating if needed) a data directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        for kind in EntityKind::ALL {
            fs::create_dir_all(root.join(kind.as_str()))?;
        }
        tracing::info!(root = %root.display(), "opened data directory");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, kind: EntityKind, id: u64) -> PathBuf {
        self.root.join(kind.as_str()).join(format!("{id}.json"))
    }
}

impl Persistence for JsonFilePersistence {
    fn load(
        &self,
        kind: EntityKind,
        id: u64,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path(kind, id)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn load_all(&self, kind: EntityKind) -> Result<Vec<Vec<u8>>, StoreError> {
        let mut records = Vec::new();
        for entry in fs::read_dir(self.root.join(kind.as_str()))? {
            let path = entry?.path();
            // Skips leftover `.json.tmp` files from an interrupted save.
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            records.push(fs::read(&path)?);
        }
        Ok(records)
    }

    fn save(
        &self,
        kind: EntityKind,
        id: u64,
        record: &[u8],
    ) -> Result<(), StoreError> {
        let path = self.path(kind, id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, record)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, kind: EntityKind, id: u64) -> Result<(), StoreError> {
        match fs::remove_file(self.path(kind, id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
