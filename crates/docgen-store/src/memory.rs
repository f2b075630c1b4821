//! # In-Memory Repository
//!
//! Cloneable, thread-safe store used by tests and by `memory://` URIs.
//! Clones share the same tables. Nothing survives the process.

use std::sync::Arc;

use docgen_core::{PersonalRecord, TaxpayerId};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::repository::{BatchInsert, Repository, StoredRecord, Tables};

/// Repository holding its tables behind an `Arc<RwLock<_>>`.
///
/// The lock is `parking_lot`, so a panicking writer does not poison it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the current tables.
    pub fn snapshot(&self) -> Tables {
        self.tables.read().clone()
    }
}

impl Repository for InMemoryRepository {
    fn insert(&self, table: &str, record: &PersonalRecord) -> Result<StoredRecord, StoreError> {
        let stored = self.tables.write().insert(table, record)?;
        tracing::debug!(table, id = %stored.id, cpf = stored.cpf(), "inserted record");
        Ok(stored)
    }

    fn insert_batch(
        &self,
        table: &str,
        records: &[PersonalRecord],
    ) -> Result<BatchInsert, StoreError> {
        let batch = self.tables.write().insert_batch(table, records)?;
        tracing::debug!(
            table,
            inserted = batch.stored.len(),
            skipped = batch.skipped.len(),
            "inserted batch"
        );
        Ok(batch)
    }

    fn get(&self, table: &str, cpf: &TaxpayerId) -> Result<Option<StoredRecord>, StoreError> {
        Ok(self.tables.read().get(table, cpf))
    }

    fn list(&self, table: &str) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self.tables.read().list(table))
    }

    fn replace(&self, table: &str, record: &PersonalRecord) -> Result<StoredRecord, StoreError> {
        let stored = self.tables.write().replace(table, record)?;
        tracing::debug!(table, id = %stored.id, cpf = stored.cpf(), "replaced record");
        Ok(stored)
    }

    fn remove(&self, table: &str, cpf: &TaxpayerId) -> Result<bool, StoreError> {
        let removed = self.tables.write().remove(table, cpf);
        tracing::debug!(table, cpf = cpf.as_str(), removed, "remove record");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgen_core::{AddressInput, StateId};

    fn record() -> PersonalRecord {
        PersonalRecord::new(
            "Ana Souza",
            TaxpayerId::new("52998224725").unwrap(),
            StateId::new("7654321", "SDS", "PE").unwrap(),
            "F",
            "solteiro",
            "Pescadora",
            AddressInput::default(),
        )
        .unwrap()
    }

    #[test]
    fn clones_share_tables() {
        let repo = InMemoryRepository::new();
        let other = repo.clone();
        repo.insert("pessoas", &record()).unwrap();

        let cpf = TaxpayerId::new("52998224725").unwrap();
        let found = other.get("pessoas", &cpf).unwrap().unwrap();
        assert_eq!(found.record().unwrap(), record());
        assert_eq!(other.snapshot().table_names().count(), 1);
    }

    #[test]
    fn concurrent_inserts_of_distinct_records() {
        let repo = InMemoryRepository::new();
        let handles: Vec<_> = ["pessoas", "arquivo", "backup"]
            .into_iter()
            .map(|table| {
                let repo = repo.clone();
                std::thread::spawn(move || repo.insert(table, &record()).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(repo.snapshot().table_names().count(), 3);
    }
}
