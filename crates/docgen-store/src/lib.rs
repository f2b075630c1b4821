//! # docgen-store: Personal Record Persistence
//!
//! Storage engines for validated personal records, all behind the
//! [`Repository`] trait:
//!
//! - [`JsonFileRepository`]: one JSON file holding every table, compatible
//!   with the TinyDB layout the office's existing database uses.
//! - [`InMemoryRepository`]: shared in-process tables for tests and dry runs.
//!
//! [`open_repository`] picks an engine from a database URI.
//!
//! Records go in as [`docgen_core::PersonalRecord`] and are stored as their
//! export; reading one back with [`StoredRecord::record`] re-runs every
//! validation, so a hand-edited database file cannot smuggle an invalid
//! record into a document.

pub mod error;
pub mod json_file;
pub mod memory;
pub mod repository;

use std::path::PathBuf;

pub use error::StoreError;
pub use json_file::JsonFileRepository;
pub use memory::InMemoryRepository;
pub use repository::{BatchInsert, Repository, StoredRecord, Tables, DEFAULT_TABLE};

/// Database location, parsed from a URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUri {
    /// `json://<path>`, `tinydb://<path>`, or a bare path ending in `.json`.
    JsonFile(PathBuf),
    /// `memory://`
    Memory,
}

impl DatabaseUri {
    /// # Errors
    ///
    /// [`StoreError::UnsupportedUri`] for any other scheme, or a file scheme
    /// with an empty path.
    pub fn parse(uri: &str) -> Result<Self, StoreError> {
        let uri = uri.trim();
        if uri == "memory://" || uri == "memory" {
            return Ok(DatabaseUri::Memory);
        }
        for scheme in ["json://", "tinydb://"] {
            if let Some(path) = uri.strip_prefix(scheme) {
                if path.is_empty() {
                    break;
                }
                return Ok(DatabaseUri::JsonFile(PathBuf::from(path)));
            }
        }
        if !uri.contains("://") && uri.ends_with(".json") {
            return Ok(DatabaseUri::JsonFile(PathBuf::from(uri)));
        }
        Err(StoreError::UnsupportedUri(uri.to_string()))
    }
}

/// Open the repository a database URI points at.
pub fn open_repository(uri: &str) -> Result<Box<dyn Repository>, StoreError> {
    match DatabaseUri::parse(uri)? {
        DatabaseUri::JsonFile(path) => {
            tracing::debug!(path = %path.display(), "opening JSON file database");
            Ok(Box::new(JsonFileRepository::open(path)))
        }
        DatabaseUri::Memory => {
            tracing::debug!("opening in-memory database");
            Ok(Box::new(InMemoryRepository::new()))
        }
    }
}
