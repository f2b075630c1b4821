//! # Personal Record
//!
//! [`PersonalRecord`] aggregates the identity and address data of one person
//! ("dados pessoais") as it is printed on the office's documents.
//!
//! ## Construction
//!
//! All construction goes through [`PersonalRecordBuilder::build`], which:
//!
//! 1. normalizes the address input into an [`AddressBook`] with both roles
//!    present,
//! 2. upper-cases and checks the gender code,
//! 3. checks the marital status verbatim.
//!
//! The nationality is derived from the normalized gender and has no setter.
//!
//! ## Editing
//!
//! Records are frozen. [`PersonalRecord::edit`] returns a builder seeded with
//! every field of the record; overriding a field and calling `build()` runs
//! the same checks as a fresh construction, so an invalid override is
//! rejected exactly as it would be the first time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::{Address, AddressDocument, AddressFields, AddressRole};
use crate::error::ValidationError;
use crate::identity::{NumberDocument, StateId, TaxpayerId};

/// Gender code printed on documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Masculino,
    #[serde(rename = "F")]
    Feminino,
    #[serde(rename = "O")]
    Outro,
}

impl Gender {
    /// Upper-case the code, then accept `M`, `F` or `O`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.to_uppercase().as_str() {
            "M" => Ok(Gender::Masculino),
            "F" => Ok(Gender::Feminino),
            "O" => Ok(Gender::Outro),
            _ => Err(ValidationError::Gender(raw.to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Gender::Masculino => "M",
            Gender::Feminino => "F",
            Gender::Outro => "O",
        }
    }

    /// Grammatical form of the nationality used in document text.
    pub fn nationality(&self) -> &'static str {
        match self {
            Gender::Feminino => "brasileira",
            Gender::Masculino | Gender::Outro => "brasileiro",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Marital status ("estado civil").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    Solteiro,
    Casado,
    Divorciado,
    Viuvo,
}

impl MaritalStatus {
    /// Accept one of the four literals exactly as written.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "solteiro" => Ok(MaritalStatus::Solteiro),
            "casado" => Ok(MaritalStatus::Casado),
            "divorciado" => Ok(MaritalStatus::Divorciado),
            "viuvo" => Ok(MaritalStatus::Viuvo),
            _ => Err(ValidationError::MaritalStatus(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Solteiro => "solteiro",
            MaritalStatus::Casado => "casado",
            MaritalStatus::Divorciado => "divorciado",
            MaritalStatus::Viuvo => "viuvo",
        }
    }
}

impl std::fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Address input
// ---------------------------------------------------------------------------

/// One address as handed to the record: already built, or raw fields that
/// still need promoting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressItem {
    Address(Address),
    Fields(AddressFields),
}

impl From<Address> for AddressItem {
    fn from(value: Address) -> Self {
        AddressItem::Address(value)
    }
}

impl From<AddressFields> for AddressItem {
    fn from(value: AddressFields) -> Self {
        AddressItem::Fields(value)
    }
}

/// The two accepted shapes of the address argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressInput {
    /// Items carry their own role; unknown or missing roles are dropped.
    List(Vec<AddressItem>),
    /// Items grouped under a role key, which becomes their role; keys other
    /// than the two roles are dropped.
    ByRole(BTreeMap<String, Vec<AddressItem>>),
}

impl Default for AddressInput {
    fn default() -> Self {
        AddressInput::List(Vec::new())
    }
}

impl From<Vec<Address>> for AddressInput {
    fn from(value: Vec<Address>) -> Self {
        AddressInput::List(value.into_iter().map(AddressItem::from).collect())
    }
}

impl From<Vec<AddressItem>> for AddressInput {
    fn from(value: Vec<AddressItem>) -> Self {
        AddressInput::List(value)
    }
}

impl From<BTreeMap<String, Vec<AddressItem>>> for AddressInput {
    fn from(value: BTreeMap<String, Vec<AddressItem>>) -> Self {
        AddressInput::ByRole(value)
    }
}

impl TryFrom<Value> for AddressInput {
    type Error = ValidationError;

    /// JSON array → [`AddressInput::List`], JSON object →
    /// [`AddressInput::ByRole`]. Any other JSON value is rejected.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => Ok(AddressInput::List(parse_items(items)?)),
            Value::Object(map) => {
                let mut grouped = BTreeMap::new();
                for (key, entry) in map {
                    let Value::Array(items) = entry else {
                        return Err(ValidationError::invalid_argument(format!(
                            "addresses under \"{key}\" must be a list"
                        )));
                    };
                    grouped.insert(key, parse_items(items)?);
                }
                Ok(AddressInput::ByRole(grouped))
            }
            other => Err(ValidationError::invalid_argument(format!(
                "addresses must be a list or a mapping, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn parse_items(items: Vec<Value>) -> Result<Vec<AddressItem>, ValidationError> {
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<AddressFields>(item)
                .map(AddressItem::Fields)
                .map_err(|e| ValidationError::invalid_argument(format!("malformed address: {e}")))
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// Addresses of one person, bucketed by role. Both buckets always exist and
/// keep input order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressBook {
    residencial: Vec<Address>,
    trabalho: Vec<Address>,
}

impl AddressBook {
    pub fn get(&self, role: AddressRole) -> &[Address] {
        match role {
            AddressRole::Residencial => &self.residencial,
            AddressRole::Trabalho => &self.trabalho,
        }
    }

    /// Residential addresses first, then work addresses.
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.residencial.iter().chain(self.trabalho.iter())
    }

    pub fn len(&self) -> usize {
        self.residencial.len() + self.trabalho.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, role: AddressRole, address: Address) {
        match role {
            AddressRole::Residencial => self.residencial.push(address),
            AddressRole::Trabalho => self.trabalho.push(address),
        }
    }

    pub fn export(&self) -> AddressBookDocument {
        AddressBookDocument {
            residencial: self.residencial.iter().map(Address::export).collect(),
            trabalho: self.trabalho.iter().map(Address::export).collect(),
        }
    }
}

impl From<AddressInput> for AddressBook {
    fn from(input: AddressInput) -> Self {
        let mut book = AddressBook::default();
        match input {
            AddressInput::List(items) => {
                for item in items {
                    match item {
                        AddressItem::Address(address) => book.push(address.role(), address),
                        AddressItem::Fields(fields) => {
                            let role = fields.tag.as_deref().and_then(AddressRole::parse);
                            if let Some(role) = role {
                                book.push(role, Address::from_fields_with_role(role, fields));
                            }
                        }
                    }
                }
            }
            AddressInput::ByRole(grouped) => {
                for (key, items) in grouped {
                    let Some(role) = AddressRole::parse(&key) else {
                        continue;
                    };
                    for item in items {
                        // The key decides the role, for built addresses too.
                        let address = match item {
                            AddressItem::Address(address) => address.with_role(role),
                            AddressItem::Fields(fields) => {
                                Address::from_fields_with_role(role, fields)
                            }
                        };
                        book.push(role, address);
                    }
                }
            }
        }
        book
    }
}

/// Exported addresses; both keys are always present.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressBookDocument {
    #[serde(default)]
    pub residencial: Vec<AddressDocument>,
    #[serde(default)]
    pub trabalho: Vec<AddressDocument>,
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Validated personal data of one person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalRecord {
    full_name: String,
    taxpayer_id: TaxpayerId,
    state_id: StateId,
    gender: Gender,
    marital_status: MaritalStatus,
    occupation: String,
    addresses: AddressBook,
}

impl PersonalRecord {
    /// Build and validate a record in one call.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Gender`] or [`ValidationError::MaritalStatus`] when
    /// the corresponding field is outside its domain.
    pub fn new(
        full_name: impl Into<String>,
        taxpayer_id: TaxpayerId,
        state_id: StateId,
        gender: &str,
        marital_status: &str,
        occupation: impl Into<String>,
        addresses: impl Into<AddressInput>,
    ) -> Result<Self, ValidationError> {
        Self::builder()
            .full_name(full_name)
            .taxpayer_id(taxpayer_id)
            .state_id(state_id)
            .gender(gender)
            .marital_status(marital_status)
            .occupation(occupation)
            .addresses(addresses)
            .build()
    }

    pub fn builder() -> PersonalRecordBuilder {
        PersonalRecordBuilder::default()
    }

    /// A builder holding a copy of every field of this record.
    pub fn edit(&self) -> PersonalRecordBuilder {
        // Seeded by role so each address stays in the list it was filed under.
        let grouped: BTreeMap<String, Vec<AddressItem>> = AddressRole::ALL
            .into_iter()
            .map(|role| {
                let items = self.addresses.get(role).iter().cloned().map(AddressItem::from);
                (role.as_str().to_string(), items.collect())
            })
            .collect();
        PersonalRecordBuilder {
            full_name: Some(self.full_name.clone()),
            taxpayer_id: Some(self.taxpayer_id.clone()),
            state_id: Some(self.state_id.clone()),
            gender: Some(self.gender.code().to_string()),
            marital_status: Some(self.marital_status.as_str().to_string()),
            occupation: Some(self.occupation.clone()),
            addresses: AddressInput::ByRole(grouped),
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn taxpayer_id(&self) -> &TaxpayerId {
        &self.taxpayer_id
    }

    pub fn state_id(&self) -> &StateId {
        &self.state_id
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn marital_status(&self) -> MaritalStatus {
        self.marital_status
    }

    pub fn occupation(&self) -> &str {
        &self.occupation
    }

    pub fn nationality(&self) -> &'static str {
        self.gender.nationality()
    }

    pub fn address_book(&self) -> &AddressBook {
        &self.addresses
    }

    pub fn addresses(&self, role: AddressRole) -> &[Address] {
        self.addresses.get(role)
    }

    /// Formatted CPF (`DDD.DDD.DDD-DD`).
    pub fn taxpayer_number(&self) -> &str {
        self.taxpayer_id.as_str()
    }

    /// Rendered RG (`"{digits} {AUTHORITY}/{STATE}"`).
    pub fn state_id_number(&self) -> String {
        self.state_id.rendered()
    }

    /// Every address rendered in full, residential first.
    pub fn full_addresses(&self) -> Vec<String> {
        self.addresses.iter().map(Address::to_string).collect()
    }

    pub fn export(&self) -> PersonalRecordDocument {
        PersonalRecordDocument {
            nome_completo: self.full_name.clone(),
            genero: self.gender,
            estado_civil: self.marital_status,
            profissao: self.occupation.clone(),
            nacionalidade: self.nationality().to_string(),
            cpf: self.taxpayer_id.export(),
            rg: self.state_id.export(),
            endereco: self.addresses.export(),
        }
    }
}

impl TryFrom<PersonalRecordDocument> for PersonalRecord {
    type Error = ValidationError;

    /// Rebuild a record from its export, re-running every check. The
    /// exported nationality is ignored and derived again.
    fn try_from(doc: PersonalRecordDocument) -> Result<Self, Self::Error> {
        let mut grouped = BTreeMap::new();
        for (role, entries) in [
            (AddressRole::Residencial, doc.endereco.residencial),
            (AddressRole::Trabalho, doc.endereco.trabalho),
        ] {
            let items = entries
                .into_iter()
                .map(|entry| AddressItem::Address(Address::from(entry)))
                .collect();
            grouped.insert(role.as_str().to_string(), items);
        }

        PersonalRecord::builder()
            .full_name(doc.nome_completo)
            .taxpayer_id(TaxpayerId::from_formatted(&doc.cpf.numero)?)
            .state_id(StateId::from_rendered(&doc.rg.numero)?)
            .gender(doc.genero.code())
            .marital_status(doc.estado_civil.as_str())
            .occupation(doc.profissao)
            .addresses(AddressInput::ByRole(grouped))
            .build()
    }
}

/// Builder behind every [`PersonalRecord`] construction.
#[derive(Debug, Clone, Default)]
pub struct PersonalRecordBuilder {
    full_name: Option<String>,
    taxpayer_id: Option<TaxpayerId>,
    state_id: Option<StateId>,
    gender: Option<String>,
    marital_status: Option<String>,
    occupation: Option<String>,
    addresses: AddressInput,
}

impl PersonalRecordBuilder {
    pub fn full_name(mut self, value: impl Into<String>) -> Self {
        self.full_name = Some(value.into());
        self
    }

    pub fn taxpayer_id(mut self, value: TaxpayerId) -> Self {
        self.taxpayer_id = Some(value);
        self
    }

    pub fn state_id(mut self, value: StateId) -> Self {
        self.state_id = Some(value);
        self
    }

    pub fn gender(mut self, value: impl Into<String>) -> Self {
        self.gender = Some(value.into());
        self
    }

    pub fn marital_status(mut self, value: impl Into<String>) -> Self {
        self.marital_status = Some(value.into());
        self
    }

    pub fn occupation(mut self, value: impl Into<String>) -> Self {
        self.occupation = Some(value.into());
        self
    }

    pub fn addresses(mut self, value: impl Into<AddressInput>) -> Self {
        self.addresses = value.into();
        self
    }

    /// Validate and freeze.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidArgument`] for a missing field, otherwise
    /// the gender or marital-status error of the offending value.
    pub fn build(self) -> Result<PersonalRecord, ValidationError> {
        let addresses = AddressBook::from(self.addresses);
        let gender = Gender::parse(&required(self.gender, "genero")?)?;
        let marital_status = MaritalStatus::parse(&required(self.marital_status, "estado_civil")?)?;

        Ok(PersonalRecord {
            full_name: required(self.full_name, "nome_completo")?,
            taxpayer_id: required(self.taxpayer_id, "cpf")?,
            state_id: required(self.state_id, "rg")?,
            gender,
            marital_status,
            occupation: required(self.occupation, "profissao")?,
            addresses,
        })
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::invalid_argument(format!("missing field '{field}'")))
}

/// Exported record, the shape stored and handed to document rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalRecordDocument {
    pub nome_completo: String,
    pub genero: Gender,
    pub estado_civil: MaritalStatus,
    pub profissao: String,
    pub nacionalidade: String,
    pub cpf: NumberDocument,
    pub rg: NumberDocument,
    pub endereco: AddressBookDocument,
}
