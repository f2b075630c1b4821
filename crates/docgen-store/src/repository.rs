//! # Repository Contract
//!
//! [`Repository`] is the seam between the CLI and a storage engine. Records
//! are stored as their export ([`PersonalRecordDocument`]) inside a
//! [`StoredRecord`] envelope, grouped into named tables, and are unique per
//! table by CPF.
//!
//! [`Tables`] holds the table logic shared by every engine; an engine only
//! decides where the tables live and how access to them is serialized.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use docgen_core::{PersonalRecord, PersonalRecordDocument, TaxpayerId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Table used when the caller does not name one.
pub const DEFAULT_TABLE: &str = "pessoas";

/// A personal record as persisted, with its storage metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub dados: PersonalRecordDocument,
}

impl StoredRecord {
    fn new(record: &PersonalRecord) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            dados: record.export(),
        }
    }

    /// CPF of the stored record, as written in the database.
    pub fn cpf(&self) -> &str {
        &self.dados.cpf.numero
    }

    /// Whether this record belongs to `cpf` (formatted). A stored number
    /// written without punctuation still matches.
    fn has_cpf(&self, cpf: &str) -> bool {
        let stored = self.cpf();
        stored == cpf || TaxpayerId::from_formatted(stored).is_ok_and(|id| id.as_str() == cpf)
    }

    /// Rebuild the validated record.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] if the stored document was edited into an
    /// invalid state outside this crate.
    pub fn record(&self) -> Result<PersonalRecord, StoreError> {
        Ok(PersonalRecord::try_from(self.dados.clone())?)
    }
}

/// Outcome of [`Repository::insert_batch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchInsert {
    pub stored: Vec<StoredRecord>,
    /// Formatted CPFs that were already in the table.
    pub skipped: Vec<String>,
}

/// Storage engine for personal records.
pub trait Repository: Send + Sync {
    /// Store a new record.
    ///
    /// # Errors
    ///
    /// [`StoreError::Duplicate`] if the table already holds this CPF.
    fn insert(&self, table: &str, record: &PersonalRecord) -> Result<StoredRecord, StoreError>;

    /// Store several records, skipping those whose CPF the table already
    /// holds (including one earlier in the same batch).
    ///
    /// Engines that persist should write the batch once, so that a failed
    /// write leaves none of it stored.
    fn insert_batch(
        &self,
        table: &str,
        records: &[PersonalRecord],
    ) -> Result<BatchInsert, StoreError> {
        let mut batch = BatchInsert::default();
        for record in records {
            match self.insert(table, record) {
                Ok(stored) => batch.stored.push(stored),
                Err(StoreError::Duplicate { cpf, .. }) => batch.skipped.push(cpf),
                Err(e) => return Err(e),
            }
        }
        Ok(batch)
    }

    /// Look a record up by CPF.
    fn get(&self, table: &str, cpf: &TaxpayerId) -> Result<Option<StoredRecord>, StoreError>;

    /// Every record of the table, oldest first.
    fn list(&self, table: &str) -> Result<Vec<StoredRecord>, StoreError>;

    /// Replace the stored record that has the same CPF, keeping its id and
    /// creation time.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the table has no record with this CPF.
    fn replace(&self, table: &str, record: &PersonalRecord) -> Result<StoredRecord, StoreError>;

    /// Delete the record with this CPF. Returns whether one was deleted.
    fn remove(&self, table: &str, cpf: &TaxpayerId) -> Result<bool, StoreError>;
}

/// Tables of a database, keyed by table name then by record id.
///
/// This is also the on-disk layout of the JSON file engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tables(BTreeMap<String, BTreeMap<String, StoredRecord>>);

impl Tables {
    fn find(&self, table: &str, cpf: &str) -> Option<&StoredRecord> {
        self.0
            .get(table)
            .and_then(|rows| rows.values().find(|row| row.has_cpf(cpf)))
    }

    pub(crate) fn insert(
        &mut self,
        table: &str,
        record: &PersonalRecord,
    ) -> Result<StoredRecord, StoreError> {
        let cpf = record.taxpayer_number();
        if self.find(table, cpf).is_some() {
            return Err(StoreError::Duplicate {
                table: table.to_string(),
                cpf: cpf.to_string(),
            });
        }
        let stored = StoredRecord::new(record);
        self.0
            .entry(table.to_string())
            .or_default()
            .insert(stored.id.to_string(), stored.clone());
        Ok(stored)
    }

    pub(crate) fn insert_batch(
        &mut self,
        table: &str,
        records: &[PersonalRecord],
    ) -> Result<BatchInsert, StoreError> {
        let mut batch = BatchInsert::default();
        for record in records {
            match self.insert(table, record) {
                Ok(stored) => batch.stored.push(stored),
                Err(StoreError::Duplicate { cpf, .. }) => batch.skipped.push(cpf),
                Err(e) => return Err(e),
            }
        }
        Ok(batch)
    }

    pub(crate) fn get(&self, table: &str, cpf: &TaxpayerId) -> Option<StoredRecord> {
        self.find(table, cpf.as_str()).cloned()
    }

    pub(crate) fn list(&self, table: &str) -> Vec<StoredRecord> {
        let mut rows: Vec<StoredRecord> = self
            .0
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        rows
    }

    pub(crate) fn replace(
        &mut self,
        table: &str,
        record: &PersonalRecord,
    ) -> Result<StoredRecord, StoreError> {
        let cpf = record.taxpayer_number();
        let row = self
            .0
            .get_mut(table)
            .and_then(|rows| rows.values_mut().find(|row| row.has_cpf(cpf)))
            .ok_or_else(|| StoreError::NotFound {
                table: table.to_string(),
                cpf: cpf.to_string(),
            })?;
        row.dados = record.export();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    pub(crate) fn remove(&mut self, table: &str, cpf: &TaxpayerId) -> bool {
        let Some(rows) = self.0.get_mut(table) else {
            return false;
        };
        let before = rows.len();
        rows.retain(|_, row| !row.has_cpf(cpf.as_str()));
        rows.len() != before
    }

    /// Names of the tables present.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
