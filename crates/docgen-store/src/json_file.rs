//! # JSON File Repository
//!
//! The whole database lives in one JSON document:
//!
//! ```json
//! {
//!   "pessoas": {
//!     "<uuid>": { "id": "<uuid>", "created_at": "...", "updated_at": "...", "dados": { ... } }
//!   }
//! }
//! ```
//!
//! Every operation reads the file; every mutation rewrites it through a
//! temporary sibling file and a rename. A missing file is an empty database.
//! The engine is meant for one process at a time.

use std::path::{Path, PathBuf};

use docgen_core::{PersonalRecord, TaxpayerId};

use crate::error::StoreError;
use crate::repository::{BatchInsert, Repository, StoredRecord, Tables};

#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    /// Open the database at `path`. The file is not touched until the first
    /// operation.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every table from disk.
    pub fn load(&self) -> Result<Tables, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "database file absent, starting empty");
                return Ok(Tables::default());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        if content.trim().is_empty() {
            return Ok(Tables::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, tables: &Tables) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(tables)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| StoreError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }

    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut tables = self.load()?;
        let result = f(&mut tables)?;
        self.save(&tables)?;
        Ok(result)
    }
}

impl Repository for JsonFileRepository {
    fn insert(&self, table: &str, record: &PersonalRecord) -> Result<StoredRecord, StoreError> {
        let stored = self.mutate(|tables| tables.insert(table, record))?;
        tracing::info!(
            path = %self.path.display(),
            table,
            id = %stored.id,
            cpf = stored.cpf(),
            "inserted record"
        );
        Ok(stored)
    }

    /// One read and one write for the whole batch.
    fn insert_batch(
        &self,
        table: &str,
        records: &[PersonalRecord],
    ) -> Result<BatchInsert, StoreError> {
        let batch = self.mutate(|tables| tables.insert_batch(table, records))?;
        tracing::info!(
            path = %self.path.display(),
            table,
            inserted = batch.stored.len(),
            skipped = batch.skipped.len(),
            "inserted batch"
        );
        Ok(batch)
    }

    fn get(&self, table: &str, cpf: &TaxpayerId) -> Result<Option<StoredRecord>, StoreError> {
        Ok(self.load()?.get(table, cpf))
    }

    fn list(&self, table: &str) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self.load()?.list(table))
    }

    fn replace(&self, table: &str, record: &PersonalRecord) -> Result<StoredRecord, StoreError> {
        let stored = self.mutate(|tables| tables.replace(table, record))?;
        tracing::info!(
            path = %self.path.display(),
            table,
            id = %stored.id,
            cpf = stored.cpf(),
            "replaced record"
        );
        Ok(stored)
    }

    fn remove(&self, table: &str, cpf: &TaxpayerId) -> Result<bool, StoreError> {
        let removed = self.mutate(|tables| Ok(tables.remove(table, cpf)))?;
        if removed {
            tracing::info!(path = %self.path.display(), table, cpf = cpf.as_str(), "removed record");
        } else {
            tracing::warn!(path = %self.path.display(), table, cpf = cpf.as_str(), "no record to remove");
        }
        Ok(removed)
    }
}
