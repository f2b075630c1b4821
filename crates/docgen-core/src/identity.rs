//! # Identity Newtypes
//!
//! Validated identifiers printed on the office's documents.
//!
//! - [`TaxpayerId`]: CPF (Cadastro de Pessoas Físicas), the 11-digit
//!   national taxpayer number with two check digits.
//! - [`StateId`]: RG (Registro Geral), the state-issued identity number
//!   together with its issuing authority and state code.
//!
//! Both validate at construction time and are immutable afterwards. A
//! correction means constructing a new value.
//!
//! ## Checksum
//!
//! Each CPF check digit is `(Σ dᵢ·wᵢ) · 10 mod 11`, with a result of 10
//! mapped to 0. The first uses the nine leading digits with weights 10..2,
//! the second uses the ten leading digits with weights 11..2. This is the
//! form that reproduces the digits printed on issued documents; the shorter
//! `11 - (Σ mod 11)` presentation is equivalent only when written carefully,
//! so the arithmetic is kept literal.

use serde::{Deserialize, Serialize};

use crate::error::{TaxpayerIdError, ValidationError};

/// Routes deserialization of a string newtype through a validating
/// constructor so that stored values are re-checked on load.
macro_rules! impl_validating_deserialize {
    ($ty:ident, $ctor:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::$ctor(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Exported form of an identity number: `{"numero": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberDocument {
    pub numero: String,
}

// ---------------------------------------------------------------------------
// CPF
// ---------------------------------------------------------------------------

/// Brazilian individual taxpayer number (CPF).
///
/// Stored in the canonical `DDD.DDD.DDD-DD` form.
///
/// # Validation
///
/// Checked in this order, the first failure wins:
///
/// 1. Only ASCII digits, non-empty.
/// 2. Not all digits identical.
/// 3. Exactly 11 digits.
/// 4. First check digit.
/// 5. Second check digit.
///
/// ```
/// use docgen_core::TaxpayerId;
///
/// let cpf = TaxpayerId::new("12345678909").unwrap();
/// assert_eq!(cpf.as_str(), "123.456.789-09");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaxpayerId(String);

impl_validating_deserialize!(TaxpayerId, from_formatted);

impl TaxpayerId {
    /// Number of digits in a CPF.
    pub const LENGTH: usize = 11;

    /// Validate a bare-digit CPF string.
    ///
    /// Punctuation is not accepted here; use [`TaxpayerId::from_formatted`]
    /// for input that may carry `.` and `-`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TaxpayerId`] carrying the raw input and the
    /// [`TaxpayerIdError`] of the first failed check.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let input = value.into();
        match validate_digits(&input) {
            Ok(digits) => Ok(Self(format_digits(&digits))),
            Err(cause) => Err(ValidationError::TaxpayerId { input, cause }),
        }
    }

    /// Validate a CPF that may be written as `DDD.DDD.DDD-DD`.
    ///
    /// Strips `.` and `-` and runs the same pipeline as [`TaxpayerId::new`].
    /// The error still reports the string as it was supplied.
    pub fn from_formatted(value: &str) -> Result<Self, ValidationError> {
        let bare: String = value.chars().filter(|c| *c != '.' && *c != '-').collect();
        match validate_digits(&bare) {
            Ok(digits) => Ok(Self(format_digits(&digits))),
            Err(cause) => Err(ValidationError::TaxpayerId {
                input: value.to_string(),
                cause,
            }),
        }
    }

    /// The CPF in `DDD.DDD.DDD-DD` form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 11 digits without punctuation.
    pub fn digits(&self) -> String {
        self.0.chars().filter(char::is_ascii_digit).collect()
    }

    pub fn export(&self) -> NumberDocument {
        NumberDocument {
            numero: self.0.clone(),
        }
    }
}

impl std::fmt::Display for TaxpayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaxpayerId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_formatted(s)
    }
}

/// Compute both CPF check digits for a nine-digit prefix.
///
/// Each element of `prefix` must be in `0..=9`.
pub fn check_digits(prefix: &[u8; 9]) -> [u8; 2] {
    let first = check_digit(prefix);
    let mut ten = [0u8; 10];
    ten[..9].copy_from_slice(prefix);
    ten[9] = first;
    [first, check_digit(&ten)]
}

/// `(Σ dᵢ · (len + 1 - i)) · 10 mod 11`, with 10 folded to 0.
fn check_digit(digits: &[u8]) -> u8 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| u32::from(*d) * (top - i as u32))
        .sum();
    let rest = (sum * 10) % 11;
    if rest == 10 {
        0
    } else {
        rest as u8
    }
}

fn validate_digits(raw: &str) -> Result<[u8; 11], TaxpayerIdError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TaxpayerIdError::NonDigit);
    }

    let values: Vec<u8> = raw.bytes().map(|b| b - b'0').collect();

    if values.windows(2).all(|pair| pair[0] == pair[1]) {
        return Err(TaxpayerIdError::RepeatedDigits);
    }

    let digits: [u8; 11] = values
        .as_slice()
        .try_into()
        .map_err(|_| TaxpayerIdError::Length(values.len()))?;

    let first = check_digit(&digits[..9]);
    if first != digits[9] {
        return Err(TaxpayerIdError::FirstCheckDigit {
            expected: first,
            found: digits[9],
        });
    }

    let second = check_digit(&digits[..10]);
    if second != digits[10] {
        return Err(TaxpayerIdError::SecondCheckDigit {
            expected: second,
            found: digits[10],
        });
    }

    Ok(digits)
}

fn format_digits(digits: &[u8; 11]) -> String {
    let s: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
    format!("{}.{}.{}-{}", &s[..3], &s[3..6], &s[6..9], &s[9..])
}

// ---------------------------------------------------------------------------
// RG
// ---------------------------------------------------------------------------

/// State-issued identity number (RG) with issuing authority and state.
///
/// The registry number is kept as digits only; `.` and `-` are stripped.
/// RG layouts differ between issuing states, so there is no checksum. The
/// authority and state code are stored upper-cased, which is how they are
/// rendered.
///
/// Serialized as its rendering, `"{digits} {AUTHORITY}/{STATE}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateId {
    registry_number: String,
    issuing_authority: String,
    state_code: String,
}

impl_validating_deserialize!(StateId, from_rendered);

impl StateId {
    /// # Errors
    ///
    /// Returns [`ValidationError::StateIdFormat`] if the registry number is
    /// empty or contains anything but digits after stripping `.` and `-`.
    pub fn new(
        registry_number: &str,
        issuing_authority: &str,
        state_code: &str,
    ) -> Result<Self, ValidationError> {
        let digits: String = registry_number
            .chars()
            .filter(|c| *c != '.' && *c != '-')
            .collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::StateIdFormat(registry_number.to_string()));
        }

        Ok(Self {
            registry_number: digits,
            issuing_authority: issuing_authority.trim().to_uppercase(),
            state_code: state_code.trim().to_uppercase(),
        })
    }

    /// Parse the `"{digits} {AUTHORITY}/{STATE}"` rendering back into a value.
    pub fn from_rendered(value: &str) -> Result<Self, ValidationError> {
        let (number, rest) = value.trim().split_once(' ').ok_or_else(|| {
            ValidationError::invalid_argument(format!(
                "RG \"{value}\" is missing the issuing authority"
            ))
        })?;
        let (authority, state) = rest.rsplit_once('/').ok_or_else(|| {
            ValidationError::invalid_argument(format!(
                "RG \"{value}\" is missing the '/' before the state code"
            ))
        })?;
        Self::new(number, authority, state)
    }

    pub fn registry_number(&self) -> &str {
        &self.registry_number
    }

    pub fn issuing_authority(&self) -> &str {
        &self.issuing_authority
    }

    pub fn state_code(&self) -> &str {
        &self.state_code
    }

    /// The `"{digits} {AUTHORITY}/{STATE}"` rendering.
    pub fn rendered(&self) -> String {
        self.to_string()
    }

    pub fn export(&self) -> NumberDocument {
        NumberDocument {
            numero: self.rendered(),
        }
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}/{}",
            self.registry_number, self.issuing_authority, self.state_code
        )
    }
}

impl Serialize for StateId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    // -- TaxpayerId --

    #[test]
    fn cpf_known_valid_vectors() {
        assert_eq!(
            TaxpayerId::new("12345678909").unwrap().as_str(),
            "123.456.789-09"
        );
        assert_eq!(
            TaxpayerId::new("52998224725").unwrap().as_str(),
            "529.982.247-25"
        );
    }

    #[test]
    fn cpf_rejects_repeated_digits() {
        for d in 0..=9 {
            let raw = d.to_string().repeat(11);
            let err = TaxpayerId::new(raw.clone()).unwrap_err();
            assert_eq!(err.root_kind(), ErrorKind::InvalidValue, "{raw}");
            assert!(matches!(
                err,
                ValidationError::TaxpayerId {
                    cause: TaxpayerIdError::RepeatedDigits,
                    ..
                }
            ));
        }
    }

    #[test]
    fn cpf_rejects_wrong_length() {
        for raw in ["1254321", "1234568791564765"] {
            let err = TaxpayerId::new(raw).unwrap_err();
            assert_eq!(err.root_kind(), ErrorKind::Length, "{raw}");
        }
    }

    #[test]
    fn cpf_rejects_non_digits() {
        for raw in ["asdgfcvgbhn", "1235as456sd", "", "123.456.789-09"] {
            let err = TaxpayerId::new(raw).unwrap_err();
            assert_eq!(err.root_kind(), ErrorKind::Format, "{raw:?}");
        }
    }

    #[test]
    fn cpf_rejects_bad_check_digits() {
        let err = TaxpayerId::new("12345678919").unwrap_err();
        assert_eq!(
            err,
            ValidationError::TaxpayerId {
                input: "12345678919".to_string(),
                cause: TaxpayerIdError::FirstCheckDigit {
                    expected: 0,
                    found: 1
                },
            }
        );

        let err = TaxpayerId::new("12345678908").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TaxpayerId {
                cause: TaxpayerIdError::SecondCheckDigit {
                    expected: 9,
                    found: 8
                },
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn cpf_repeated_check_precedes_length() {
        // A short run of one digit is reported as repeated, not as too short.
        let err = TaxpayerId::new("1111").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TaxpayerId {
                cause: TaxpayerIdError::RepeatedDigits,
                ..
            }
        ));
    }

    #[test]
    fn cpf_error_keeps_raw_input() {
        let err = TaxpayerId::new("1235as456sd").unwrap_err();
        assert!(format!("{err}").contains("1235as456sd"));
    }

    #[test]
    fn cpf_from_formatted_accepts_punctuation() {
        let cpf = TaxpayerId::from_formatted("529.982.247-25").unwrap();
        assert_eq!(cpf, TaxpayerId::new("52998224725").unwrap());
        assert_eq!(cpf.digits(), "52998224725");
    }

    #[test]
    fn cpf_from_str() {
        let cpf: TaxpayerId = "123.456.789-09".parse().unwrap();
        assert_eq!(format!("{cpf}"), "123.456.789-09");
    }

    #[test]
    fn cpf_check_digits_helper() {
        assert_eq!(check_digits(&[1, 2, 3, 4, 5, 6, 7, 8, 9]), [0, 9]);
        assert_eq!(check_digits(&[5, 2, 9, 9, 8, 2, 2, 4, 7]), [2, 5]);
    }

    #[test]
    fn cpf_export() {
        let cpf = TaxpayerId::new("12345678909").unwrap();
        assert_eq!(cpf.export().numero, "123.456.789-09");
    }

    #[test]
    fn cpf_serde_uses_formatted_string() {
        let cpf = TaxpayerId::new("12345678909").unwrap();
        let json = serde_json::to_string(&cpf).unwrap();
        assert_eq!(json, "\"123.456.789-09\"");
        let back: TaxpayerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cpf);
    }

    #[test]
    fn cpf_deserialize_rejects_invalid() {
        let result: Result<TaxpayerId, _> = serde_json::from_str("\"111.111.111-11\"");
        assert!(result.is_err());
    }

    // -- StateId --

    #[test]
    fn rg_strips_punctuation() {
        let rg = StateId::new("1.047.991-2", "SSP", "PE").unwrap();
        assert_eq!(rg.registry_number(), "10479912");
    }

    #[test]
    fn rg_renders_upper_case() {
        let rg = StateId::new("123456789", "ssp", "sp").unwrap();
        assert_eq!(rg.rendered(), "123456789 SSP/SP");
        assert_eq!(rg.issuing_authority(), "SSP");
        assert_eq!(rg.state_code(), "SP");
    }

    #[test]
    fn rg_rejects_non_digits() {
        for raw in ["12a456", "", "..-", "12 34"] {
            let err = StateId::new(raw, "SSP", "PE").unwrap_err();
            assert_eq!(err, ValidationError::StateIdFormat(raw.to_string()));
            assert_eq!(err.kind(), ErrorKind::Format);
        }
    }

    #[test]
    fn rg_from_rendered_roundtrip() {
        let rg = StateId::new("1047991", "sds", "pe").unwrap();
        let back = StateId::from_rendered(&rg.rendered()).unwrap();
        assert_eq!(back, rg);
    }

    #[test]
    fn rg_from_rendered_rejects_incomplete() {
        assert_eq!(
            StateId::from_rendered("1047991").unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            StateId::from_rendered("1047991 SSP").unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            StateId::from_rendered("10a7991 SSP/PE").unwrap_err().kind(),
            ErrorKind::Format
        );
    }

    #[test]
    fn rg_export_uses_rendering() {
        let rg = StateId::new("1047991", "SSP", "PE").unwrap();
        assert_eq!(rg.export().numero, "1047991 SSP/PE");
    }

    #[test]
    fn rg_serde_roundtrip() {
        let rg = StateId::new("1047991", "SSP", "PE").unwrap();
        let json = serde_json::to_string(&rg).unwrap();
        assert_eq!(json, "\"1047991 SSP/PE\"");
        let back: StateId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rg);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    fn prefix() -> impl Strategy<Value = [u8; 9]> {
        prop::array::uniform9(0u8..=9)
            .prop_filter("not all digits equal", |p| p.iter().any(|d| *d != p[0]))
    }

    fn to_string(digits: &[u8]) -> String {
        digits.iter().map(|d| char::from(b'0' + d)).collect()
    }

    proptest! {
        /// A prefix completed with its computed check digits is accepted.
        #[test]
        fn computed_check_digits_are_accepted(p in prefix()) {
            let [a, b] = check_digits(&p);
            let raw = format!("{}{a}{b}", to_string(&p));
            prop_assert!(TaxpayerId::new(raw).is_ok());
        }

        /// Any other pair of trailing digits is rejected as an invalid value.
        #[test]
        fn other_check_digits_are_rejected(p in prefix(), a in 0u8..=9, b in 0u8..=9) {
            let expected = check_digits(&p);
            prop_assume!([a, b] != expected);
            let raw = format!("{}{a}{b}", to_string(&p));
            let err = TaxpayerId::new(raw).unwrap_err();
            prop_assert_eq!(err.root_kind(), ErrorKind::InvalidValue);
        }

        /// Stripping the punctuation from the canonical form and parsing
        /// again yields an equal value.
        #[test]
        fn formatted_output_roundtrips(p in prefix()) {
            let [a, b] = check_digits(&p);
            let cpf = TaxpayerId::new(format!("{}{a}{b}", to_string(&p))).unwrap();
            let again = TaxpayerId::new(cpf.digits()).unwrap();
            prop_assert_eq!(&again, &cpf);
            prop_assert_eq!(TaxpayerId::from_formatted(cpf.as_str()).unwrap(), cpf);
        }
    }
}
