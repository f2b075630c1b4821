//! # Document Requests
//!
//! Structured input for the documents the office issues. Nothing here
//! renders a document; [`DocumentRequest::payload`] produces the data a
//! rendering collaborator fills into its template.
//!
//! Amounts are carried as decimal strings, never as floats, so the value
//! printed on a payment request is exactly the value that was typed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::record::{PersonalRecord, PersonalRecordDocument};

/// Activity attested by a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Agricultor,
    Pescador,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Agricultor => "agricultor",
            Activity::Pescador => "pescador",
        }
    }
}

/// Kinds of document the office issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Request for the family-farmer registration (CAF).
    Caf,
    /// Declaration of farming or fishing activity.
    Declaracao(Activity),
    /// Payment request for a well drilled by the municipality.
    PagamentoPoco,
    /// Generic payment request issued by the department.
    Pagamento,
}

impl DocumentKind {
    /// Stable identifier, also used in output file names.
    pub fn slug(&self) -> &'static str {
        match self {
            DocumentKind::Caf => "caf",
            DocumentKind::Declaracao(Activity::Agricultor) => "declaracao-agricultor",
            DocumentKind::Declaracao(Activity::Pescador) => "declaracao-pescador",
            DocumentKind::PagamentoPoco => "pagamento-poco",
            DocumentKind::Pagamento => "pagamento",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Caf => "Solicitação de Cadastro da Agricultura Familiar (CAF)",
            DocumentKind::Declaracao(Activity::Agricultor) => "Declaração de Agricultor",
            DocumentKind::Declaracao(Activity::Pescador) => "Declaração de Pescador",
            DocumentKind::PagamentoPoco => "Solicitação de Pagamento de Poço",
            DocumentKind::Pagamento => "Solicitação de Pagamento",
        }
    }

    pub fn requires_amount(&self) -> bool {
        matches!(self, DocumentKind::PagamentoPoco | DocumentKind::Pagamento)
    }

    fn activity(&self) -> Option<Activity> {
        match self {
            DocumentKind::Declaracao(activity) => Some(*activity),
            _ => None,
        }
    }
}

/// Monetary amount in reais, kept as text in the `1234,56` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount(String);

impl Amount {
    /// Accepts whole reais (`1234`) or reais with two-digit cents
    /// (`1234,56` or `1234.56`). Thousands separators are not accepted.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let (units, cents) = match trimmed.find(|c: char| c == ',' || c == '.') {
            Some(pos) => (&trimmed[..pos], &trimmed[pos + 1..]),
            None => (trimmed, "00"),
        };
        let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(units) || cents.len() != 2 || !all_digits(cents) {
            return Err(ValidationError::invalid_argument(format!(
                "invalid amount \"{raw}\" (expected e.g. 150 or 150,00)"
            )));
        }
        Ok(Self(format!("{units},{cents}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R$ {}", self.0)
    }
}

/// Office issuing the document, printed in the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    pub municipio: String,
    pub estado: String,
    pub secretaria: String,
}

/// One document to be issued for one person.
#[derive(Debug, Clone)]
pub struct DocumentRequest {
    kind: DocumentKind,
    record: PersonalRecord,
    issued_on: NaiveDate,
    issuer: Option<Issuer>,
    amount: Option<Amount>,
    reference: Option<String>,
}

impl DocumentRequest {
    pub fn new(kind: DocumentKind, record: PersonalRecord, issued_on: NaiveDate) -> Self {
        Self {
            kind,
            record,
            issued_on,
            issuer: None,
            amount: None,
            reference: None,
        }
    }

    pub fn with_issuer(self, issuer: Issuer) -> Self {
        Self {
            issuer: Some(issuer),
            ..self
        }
    }

    pub fn with_amount(self, raw: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            amount: Some(Amount::parse(raw)?),
            ..self
        })
    }

    pub fn with_reference(self, reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..self
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn record(&self) -> &PersonalRecord {
        &self.record
    }

    /// Assemble the payload.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidArgument`] when a payment request has no
    /// amount.
    pub fn payload(&self) -> Result<DocumentPayload, ValidationError> {
        if self.kind.requires_amount() && self.amount.is_none() {
            return Err(ValidationError::invalid_argument(format!(
                "{} requires an amount",
                self.kind.slug()
            )));
        }

        Ok(DocumentPayload {
            documento: self.kind.slug().to_string(),
            titulo: self.kind.title().to_string(),
            emitido_em: self.issued_on,
            orgao: self.issuer.clone(),
            atividade: self.kind.activity(),
            dados_pessoais: self.record.export(),
            valor: self.amount.as_ref().map(|a| a.as_str().to_string()),
            referencia: self.reference.clone(),
        })
    }
}

/// Data handed to the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub documento: String,
    pub titulo: String,
    pub emitido_em: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orgao: Option<Issuer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atividade: Option<Activity>,
    pub dados_pessoais: PersonalRecordDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referencia: Option<String>,
}
