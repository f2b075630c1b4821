//! # Store Errors

use std::path::PathBuf;

use docgen_core::ValidationError;
use thiserror::Error;

/// Errors raised by repository engines.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the database file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The database file is not valid JSON, or a record could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The database URI names no known engine.
    #[error("unsupported database URI: {0:?} (expected json://<path>, tinydb://<path>, <file>.json or memory://)")]
    UnsupportedUri(String),

    /// No record with this CPF in the table.
    #[error("no record with CPF {cpf} in table {table:?}")]
    NotFound { table: String, cpf: String },

    /// A record with this CPF already exists in the table.
    #[error("a record with CPF {cpf} already exists in table {table:?}")]
    Duplicate { table: String, cpf: String },

    /// A stored document no longer passes validation.
    #[error("stored record is invalid: {0}")]
    Validation(#[from] ValidationError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
