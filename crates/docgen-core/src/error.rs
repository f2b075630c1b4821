//! # Error Types: Validation Failures
//!
//! Every constructor in this crate either returns a fully valid value or
//! one of the errors below. Nothing is logged and nothing is retried here;
//! callers catch at their boundary and decide how to present the message.
//!
//! ## Kinds
//!
//! Errors are grouped into [`ErrorKind`]s so callers can branch on the class
//! of failure without matching every variant:
//!
//! - `Format`: wrong character class.
//! - `Length`: wrong digit count.
//! - `InvalidValue`: well-formed but semantically invalid (repeated digits,
//!   bad check digit).
//! - `Gender`, `MaritalStatus`: enumerated field outside its domain.
//! - `InvalidArgument`: malformed input shape (address collections, raw
//!   address fields, amounts).
//!
//! CPF failures are always reported through the outer
//! [`ValidationError::TaxpayerId`] variant, which carries the raw input and
//! the underlying [`TaxpayerIdError`]. Use [`ValidationError::root_kind`] to
//! reach the innermost kind.

use thiserror::Error;

/// Class of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Format,
    Length,
    InvalidValue,
    Gender,
    MaritalStatus,
    InvalidArgument,
}

/// Reason a CPF string was rejected.
///
/// Variants are listed in the order the validation pipeline checks them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxpayerIdError {
    /// Empty input or a character outside `0-9`.
    #[error("CPF must contain only digits")]
    NonDigit,

    /// All digits are the same (e.g. `11111111111`). Such numbers pass the
    /// checksum but are never issued.
    #[error("CPF cannot have all digits equal")]
    RepeatedDigits,

    /// Input does not have exactly 11 digits.
    #[error("CPF must have 11 digits (got {0})")]
    Length(usize),

    /// Tenth digit does not match the computed first check digit.
    #[error("first check digit is invalid (expected {expected}, found {found})")]
    FirstCheckDigit {
        /// Digit computed from the first nine digits.
        expected: u8,
        /// Digit present in the input.
        found: u8,
    },

    /// Eleventh digit does not match the computed second check digit.
    #[error("second check digit is invalid (expected {expected}, found {found})")]
    SecondCheckDigit {
        /// Digit computed from the first ten digits.
        expected: u8,
        /// Digit present in the input.
        found: u8,
    },
}

impl TaxpayerIdError {
    /// Class of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaxpayerIdError::NonDigit => ErrorKind::Format,
            TaxpayerIdError::Length(_) => ErrorKind::Length,
            TaxpayerIdError::RepeatedDigits
            | TaxpayerIdError::FirstCheckDigit { .. }
            | TaxpayerIdError::SecondCheckDigit { .. } => ErrorKind::InvalidValue,
        }
    }
}

/// Validation errors for the identity newtypes and the personal record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// CPF rejected by the validation pipeline.
    #[error("invalid CPF: \"{input}\" ({cause})")]
    TaxpayerId {
        /// The raw string as supplied.
        input: String,
        /// Which pipeline step rejected it.
        #[source]
        cause: TaxpayerIdError,
    },

    /// RG registry number is not made of digits after stripping `.` and `-`.
    #[error("invalid RG: \"{0}\" (expected digits, optionally punctuated with '.' or '-')")]
    StateIdFormat(String),

    /// Gender code outside `M`, `F`, `O`.
    #[error("invalid gender: \"{0}\" (expected 'M', 'F' or 'O')")]
    Gender(String),

    /// Marital status outside the four accepted literals.
    #[error(
        "invalid marital status: \"{0}\" (expected 'solteiro', 'casado', 'divorciado' or 'viuvo')"
    )]
    MaritalStatus(String),

    /// Input has the wrong shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ValidationError {
    /// Class of the outermost error.
    ///
    /// CPF failures report `InvalidValue` here regardless of the cause.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::TaxpayerId { .. } => ErrorKind::InvalidValue,
            ValidationError::StateIdFormat(_) => ErrorKind::Format,
            ValidationError::Gender(_) => ErrorKind::Gender,
            ValidationError::MaritalStatus(_) => ErrorKind::MaritalStatus,
            ValidationError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    /// Class of the innermost cause.
    pub fn root_kind(&self) -> ErrorKind {
        match self {
            ValidationError::TaxpayerId { cause, .. } => cause.kind(),
            other => other.kind(),
        }
    }

    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        ValidationError::InvalidArgument(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn taxpayer_id_error_wraps_cause() {
        let err = ValidationError::TaxpayerId {
            input: "1254321".to_string(),
            cause: TaxpayerIdError::Length(7),
        };
        let msg = format!("{err}");
        assert!(msg.contains("1254321"));
        assert!(msg.contains("11 digits"));
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(err.root_kind(), ErrorKind::Length);
        assert!(err.source().is_some());
    }

    #[test]
    fn cause_kinds() {
        assert_eq!(TaxpayerIdError::NonDigit.kind(), ErrorKind::Format);
        assert_eq!(TaxpayerIdError::RepeatedDigits.kind(), ErrorKind::InvalidValue);
        assert_eq!(
            TaxpayerIdError::SecondCheckDigit { expected: 1, found: 2 }.kind(),
            ErrorKind::InvalidValue
        );
    }

    #[test]
    fn root_kind_of_plain_variant_is_its_kind() {
        let err = ValidationError::Gender("X".to_string());
        assert_eq!(err.kind(), ErrorKind::Gender);
        assert_eq!(err.root_kind(), ErrorKind::Gender);
        assert!(err.source().is_none());
    }

    #[test]
    fn state_id_format_display() {
        let err = ValidationError::StateIdFormat("12a".to_string());
        assert!(format!("{err}").contains("12a"));
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
