//! # Addresses
//!
//! [`Address`] is an immutable value. Defaults describe the municipality the
//! office serves, so most rural addresses only need a street and a
//! neighborhood. The `with_*` methods consume the value and return a new
//! one; nothing is mutated in place.
//!
//! Raw field mappings coming from storage or the command line are described
//! by [`AddressFields`] and promoted with [`Address::from_fields`].

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_NUMBER: &str = "S/N";
pub const DEFAULT_CITY: &str = "Feira Nova";
pub const DEFAULT_STATE: &str = "PE";
pub const DEFAULT_POSTAL_CODE: &str = "55715-000";

/// Whether an address is where the person lives or where they work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressRole {
    Residencial,
    Trabalho,
}

impl AddressRole {
    /// Both roles, in export order.
    pub const ALL: [AddressRole; 2] = [AddressRole::Residencial, AddressRole::Trabalho];

    pub fn as_str(&self) -> &'static str {
        match self {
            AddressRole::Residencial => "residencial",
            AddressRole::Trabalho => "trabalho",
        }
    }

    /// Parse a role tag. Only the exact lower-case literals are accepted.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "residencial" => Some(AddressRole::Residencial),
            "trabalho" => Some(AddressRole::Trabalho),
            _ => None,
        }
    }
}

impl std::fmt::Display for AddressRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering selected by [`Address::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressFormat {
    /// `"{street}, {number}, {neighborhood}, {city}/{state} CEP: {postal_code}"`
    #[default]
    Full,
    /// `"{street}, {number}, {city}"`
    Short,
    /// The full rendering with line breaks collapsed to spaces.
    SingleLine,
}

/// A physical address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    role: AddressRole,
    neighborhood: String,
    street: String,
    number: String,
    complement: Option<String>,
    city: String,
    state: String,
    postal_code: String,
}

impl Address {
    /// Address with every optional field at its default.
    pub fn new(
        role: AddressRole,
        neighborhood: impl Into<String>,
        street: impl Into<String>,
    ) -> Self {
        Self {
            role,
            neighborhood: neighborhood.into(),
            street: street.into(),
            number: DEFAULT_NUMBER.to_string(),
            complement: None,
            city: DEFAULT_CITY.to_string(),
            state: DEFAULT_STATE.to_string(),
            postal_code: DEFAULT_POSTAL_CODE.to_string(),
        }
    }

    pub fn with_number(self, number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            ..self
        }
    }

    pub fn with_complement(self, complement: impl Into<String>) -> Self {
        Self {
            complement: Some(complement.into()),
            ..self
        }
    }

    pub fn with_city(self, city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            ..self
        }
    }

    pub fn with_state(self, state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            ..self
        }
    }

    pub fn with_postal_code(self, postal_code: impl Into<String>) -> Self {
        Self {
            postal_code: postal_code.into(),
            ..self
        }
    }

    /// Promote a raw field mapping, filling unset fields with the defaults.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidArgument`] if the `tag` is missing or is not
    /// one of the two role literals.
    pub fn from_fields(fields: AddressFields) -> Result<Self, ValidationError> {
        let tag = fields
            .tag
            .as_deref()
            .ok_or_else(|| ValidationError::invalid_argument("address is missing its 'tag'"))?;
        let role = AddressRole::parse(tag).ok_or_else(|| {
            ValidationError::invalid_argument(format!(
                "unknown address tag \"{tag}\" (expected 'residencial' or 'trabalho')"
            ))
        })?;
        Ok(Self::from_fields_with_role(role, fields))
    }

    /// Promote a raw field mapping under a role decided by the caller. The
    /// mapping's own `tag`, if any, is ignored.
    pub fn from_fields_with_role(role: AddressRole, fields: AddressFields) -> Self {
        Self {
            role,
            neighborhood: fields.bairro,
            street: fields.logradouro,
            number: fields.numero.unwrap_or_else(|| DEFAULT_NUMBER.to_string()),
            complement: fields.complemento,
            city: fields.cidade.unwrap_or_else(|| DEFAULT_CITY.to_string()),
            state: fields.estado.unwrap_or_else(|| DEFAULT_STATE.to_string()),
            postal_code: fields.cep.unwrap_or_else(|| DEFAULT_POSTAL_CODE.to_string()),
        }
    }

    /// Same address filed under another role.
    pub(crate) fn with_role(self, role: AddressRole) -> Self {
        Self { role, ..self }
    }

    pub fn role(&self) -> AddressRole {
        self.role
    }

    pub fn neighborhood(&self) -> &str {
        &self.neighborhood
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn complement(&self) -> Option<&str> {
        self.complement.as_deref()
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn render(&self, format: AddressFormat) -> String {
        match format {
            AddressFormat::Full => self.to_string(),
            AddressFormat::Short => self.short(),
            AddressFormat::SingleLine => self.single_line(),
        }
    }

    /// `"{street}, {number}, {city}"`, used where a document line is narrow.
    pub fn short(&self) -> String {
        format!("{}, {}, {}", self.street, self.number, self.city)
    }

    pub fn single_line(&self) -> String {
        self.to_string().replace('\n', " ")
    }

    pub fn export(&self) -> AddressDocument {
        AddressDocument {
            tag: self.role,
            bairro: self.neighborhood.clone(),
            logradouro: self.street.clone(),
            numero: self.number.clone(),
            complemento: self.complement.clone(),
            cidade: self.city.clone(),
            estado: self.state.clone(),
            cep: self.postal_code.clone(),
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}/{} CEP: {}",
            self.street, self.number, self.neighborhood, self.city, self.state, self.postal_code
        )
    }
}

impl From<AddressDocument> for Address {
    fn from(doc: AddressDocument) -> Self {
        Self {
            role: doc.tag,
            neighborhood: doc.bairro,
            street: doc.logradouro,
            number: doc.numero,
            complement: doc.complemento,
            city: doc.cidade,
            state: doc.estado,
            postal_code: doc.cep,
        }
    }
}

/// Exported address: one flat mapping, one key per attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDocument {
    pub tag: AddressRole,
    pub bairro: String,
    pub logradouro: String,
    pub numero: String,
    pub complemento: Option<String>,
    pub cidade: String,
    pub estado: String,
    pub cep: String,
}

/// Raw address fields as they arrive from a collaborator.
///
/// The tag is free text here; it is checked when the fields are promoted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressFields {
    #[serde(default)]
    pub tag: Option<String>,
    pub bairro: String,
    pub logradouro: String,
    #[serde(default)]
    pub numero: Option<String>,
    #[serde(default)]
    pub complemento: Option<String>,
    #[serde(default)]
    pub cidade: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default)]
    pub cep: Option<String>,
}

impl AddressFields {
    /// Parse the `key=value,key=value` shorthand used on the command line.
    ///
    /// Keys are the export names (`tag`, `bairro`, `logradouro`, `numero`,
    /// `complemento`, `cidade`, `estado`, `cep`).
    pub fn parse_pairs(input: &str) -> Result<Self, ValidationError> {
        let mut fields = AddressFields::default();
        let mut has_street = false;
        let mut has_neighborhood = false;

        for pair in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ValidationError::invalid_argument(format!(
                    "address field \"{pair}\" is not in key=value form"
                ))
            })?;
            let value = value.trim().to_string();
            match key.trim() {
                "tag" => fields.tag = Some(value),
                "bairro" => {
                    fields.bairro = value;
                    has_neighborhood = true;
                }
                "logradouro" => {
                    fields.logradouro = value;
                    has_street = true;
                }
                "numero" => fields.numero = Some(value),
                "complemento" => fields.complemento = Some(value),
                "cidade" => fields.cidade = Some(value),
                "estado" => fields.estado = Some(value),
                "cep" => fields.cep = Some(value),
                other => {
                    return Err(ValidationError::invalid_argument(format!(
                        "unknown address field \"{other}\""
                    )))
                }
            }
        }

        if !has_street || !has_neighborhood {
            return Err(ValidationError::invalid_argument(
                "address requires 'logradouro' and 'bairro'",
            ));
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn flores() -> Address {
        Address::new(AddressRole::Residencial, "Centro", "Rua das Flores")
            .with_number("123")
            .with_complement("Apto 1")
            .with_city("Feira Nova")
            .with_state("PE")
            .with_postal_code("55715-000")
    }

    #[test]
    fn full_rendering() {
        assert_eq!(
            flores().to_string(),
            "Rua das Flores, 123, Centro, Feira Nova/PE CEP: 55715-000"
        );
        assert_eq!(flores().render(AddressFormat::Full), flores().to_string());
    }

    #[test]
    fn short_rendering() {
        assert_eq!(flores().short(), "Rua das Flores, 123, Feira Nova");
        assert_eq!(flores().render(AddressFormat::Short), flores().short());
    }

    #[test]
    fn single_line_collapses_line_breaks() {
        let addr = Address::new(AddressRole::Trabalho, "Centro", "Rua Joaquim Correia\nPrédio Público");
        assert_eq!(
            addr.render(AddressFormat::SingleLine),
            "Rua Joaquim Correia Prédio Público, S/N, Centro, Feira Nova/PE CEP: 55715-000"
        );
        assert_eq!(flores().single_line(), flores().to_string());
    }

    #[test]
    fn defaults_apply() {
        let addr = Address::new(AddressRole::Residencial, "Zona Rural", "Sítio Cachoeira do Salobro");
        assert_eq!(addr.number(), "S/N");
        assert_eq!(addr.complement(), None);
        assert_eq!(addr.city(), "Feira Nova");
        assert_eq!(addr.state(), "PE");
        assert_eq!(addr.postal_code(), "55715-000");
    }

    #[test]
    fn export_is_flat_mapping() {
        let value = serde_json::to_value(flores().export()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "tag": "residencial",
                "bairro": "Centro",
                "logradouro": "Rua das Flores",
                "numero": "123",
                "complemento": "Apto 1",
                "cidade": "Feira Nova",
                "estado": "PE",
                "cep": "55715-000"
            })
        );
    }

    #[test]
    fn export_roundtrip() {
        assert_eq!(Address::from(flores().export()), flores());
    }

    #[test]
    fn from_fields_applies_defaults() {
        let fields: AddressFields = serde_json::from_value(serde_json::json!({
            "tag": "trabalho",
            "bairro": "Centro",
            "logradouro": "Rua Joaquim Correia",
            "complemento": "Prédio Público"
        }))
        .unwrap();
        let addr = Address::from_fields(fields).unwrap();
        assert_eq!(addr.role(), AddressRole::Trabalho);
        assert_eq!(addr.number(), "S/N");
        assert_eq!(addr.complement(), Some("Prédio Público"));
        assert_eq!(addr.city(), "Feira Nova");
    }

    #[test]
    fn from_fields_rejects_unknown_tag() {
        let fields = AddressFields {
            tag: Some("veraneio".to_string()),
            bairro: "Centro".to_string(),
            logradouro: "Rua A".to_string(),
            ..Default::default()
        };
        let err = Address::from_fields(fields).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn from_fields_rejects_missing_tag() {
        let fields = AddressFields {
            bairro: "Centro".to_string(),
            logradouro: "Rua A".to_string(),
            ..Default::default()
        };
        assert!(Address::from_fields(fields).is_err());
    }

    #[test]
    fn role_tags_are_exact() {
        assert_eq!(AddressRole::parse("residencial"), Some(AddressRole::Residencial));
        assert_eq!(AddressRole::parse("trabalho"), Some(AddressRole::Trabalho));
        assert_eq!(AddressRole::parse("Trabalho"), None);
        assert_eq!(AddressRole::Trabalho.to_string(), "trabalho");
    }

    #[test]
    fn parse_pairs_shorthand() {
        let fields =
            AddressFields::parse_pairs("tag=residencial, bairro=Centro, logradouro=Rua das Flores, numero=123")
                .unwrap();
        assert_eq!(fields.tag.as_deref(), Some("residencial"));
        assert_eq!(fields.logradouro, "Rua das Flores");
        assert_eq!(fields.numero.as_deref(), Some("123"));
        assert_eq!(fields.cidade, None);
    }

    #[test]
    fn parse_pairs_rejects_bad_input() {
        assert!(AddressFields::parse_pairs("bairro=Centro").is_err());
        assert!(AddressFields::parse_pairs("bairro=Centro,logradouro").is_err());
        assert!(AddressFields::parse_pairs("bairro=Centro,logradouro=A,andar=2").is_err());
    }
}
