//! # docgen-core: Identity-Document Validation
//!
//! The validation and normalization layer behind `docgen`, the document
//! generator of the Secretaria de Agricultura of Feira Nova-PE. It turns raw
//! user-supplied strings into validated, canonical, immutable values:
//!
//! - [`TaxpayerId`]: CPF, 11 digits with a two-digit checksum.
//! - [`StateId`]: RG registry number, issuing authority and state.
//! - [`Address`]: address value with municipal defaults and renderings.
//! - [`PersonalRecord`]: the personal-data aggregate printed on documents.
//! - [`DocumentRequest`]: the payload of one document to be issued.
//!
//! Every entity has an `export()` operation producing a serde-serializable
//! document with the key names used by storage and rendering.
//!
//! ## Crate Policy
//!
//! - No I/O, no logging, no shared state. Collaborators (storage, CLI) call
//!   in; this crate never calls out.
//! - Constructors validate fully or fail; no partially built value is ever
//!   observable.
//! - No `unsafe`, no `.unwrap()` outside tests.

pub mod address;
pub mod document;
pub mod error;
pub mod identity;
pub mod record;

pub use address::{Address, AddressDocument, AddressFields, AddressFormat, AddressRole};
pub use document::{Activity, Amount, DocumentKind, DocumentPayload, DocumentRequest, Issuer};
pub use error::{ErrorKind, TaxpayerIdError, ValidationError};
pub use identity::{check_digits, NumberDocument, StateId, TaxpayerId};
pub use record::{
    AddressBook, AddressBookDocument, AddressInput, AddressItem, Gender, MaritalStatus,
    PersonalRecord, PersonalRecordBuilder, PersonalRecordDocument,
};
