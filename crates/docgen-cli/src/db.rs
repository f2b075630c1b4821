//! # Database Subcommand
//!
//! CRUD over the personal-record tables.
//!
//! ## Subcommands
//!
//! - `add`: validate and insert one record from `FIELD:VALUE` pairs.
//! - `update`: edit a stored record; unchanged fields are kept.
//! - `remove`: delete records by CPF.
//! - `list`: print one or every record as JSON.
//! - `import`: insert records from a JSON file.
//!
//! Fields accepted by `add` and `update`: `nome`, `cpf`, `rg`, `emissor`,
//! `uf`, `genero`, `estado_civil`, `profissao`. Addresses are given with
//! `--endereco tag=residencial,bairro=Centro,logradouro=Rua A,numero=12`;
//! the `tag` is required and must be `residencial` or `trabalho`.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::Deserialize;

use docgen_core::{
    Address, AddressFields, AddressInput, AddressItem, PersonalRecord, StateId, TaxpayerId,
};
use docgen_store::{Repository, DEFAULT_TABLE};

/// Arguments for the `docgen db` subcommand.
#[derive(Args, Debug)]
pub struct DbArgs {
    /// Table to operate on.
    #[arg(short, long, default_value = DEFAULT_TABLE, global = true)]
    pub table: String,

    #[command(subcommand)]
    pub command: DbCommand,
}

#[derive(Subcommand, Debug)]
pub enum DbCommand {
    /// Validate and insert a new record.
    Add {
        /// Record fields as FIELD:VALUE (e.g. "nome:Maria da Silva" cpf:52998224725).
        #[arg(required = true, num_args = 1..)]
        fields: Vec<String>,
        /// Address as key=value pairs; repeat for several addresses.
        #[arg(long = "endereco")]
        enderecos: Vec<String>,
    },

    /// Edit a stored record. Given fields replace the stored ones.
    Update {
        /// CPF of the record, with or without punctuation.
        cpf: String,
        /// Fields to replace, as FIELD:VALUE.
        fields: Vec<String>,
        /// Replacement addresses; when given, all stored addresses are replaced.
        #[arg(long = "endereco")]
        enderecos: Vec<String>,
    },

    /// Delete records by CPF.
    Remove {
        #[arg(required = true, num_args = 1..)]
        cpfs: Vec<String>,
    },

    /// Print one record, or every record of the table.
    List { cpf: Option<String> },

    /// Insert records from a JSON array of person objects.
    Import { file: PathBuf },
}

/// Execute the db subcommand.
pub fn run_db(args: &DbArgs, repo: &dyn Repository, out: &mut impl Write) -> Result<u8> {
    let table = args.table.as_str();
    match &args.command {
        DbCommand::Add { fields, enderecos } => cmd_add(repo, table, fields, enderecos, out),
        DbCommand::Update {
            cpf,
            fields,
            enderecos,
        } => cmd_update(repo, table, cpf, fields, enderecos, out),
        DbCommand::Remove { cpfs } => cmd_remove(repo, table, cpfs, out),
        DbCommand::List { cpf } => cmd_list(repo, table, cpf.as_deref(), out),
        DbCommand::Import { file } => cmd_import(repo, table, file, out),
    }
}

// -- Field parsing ------------------------------------------------------------

const FIELDS: [&str; 8] = [
    "nome",
    "cpf",
    "rg",
    "emissor",
    "uf",
    "genero",
    "estado_civil",
    "profissao",
];

/// `FIELD:VALUE` pairs keyed by field name.
#[derive(Debug, Default)]
struct FieldSet(BTreeMap<&'static str, String>);

impl FieldSet {
    fn parse(raw: &[String]) -> Result<Self> {
        let mut set = BTreeMap::new();
        for item in raw {
            let Some((key, value)) = item.split_once(':') else {
                bail!("expected FIELD:VALUE, got {item:?}");
            };
            let key = key.trim().to_lowercase();
            let Some(field) = FIELDS.iter().copied().find(|f| *f == key) else {
                bail!("unknown field {key:?} (expected one of: {})", FIELDS.join(", "));
            };
            if set.insert(field, value.trim().to_string()).is_some() {
                bail!("field {field:?} given more than once");
            }
        }
        Ok(Self(set))
    }

    fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    fn require(&self, field: &str) -> Result<&str> {
        self.get(field)
            .with_context(|| format!("missing required field {field:?}"))
    }
}

/// Each `--endereco` must carry a known tag; a typo is an error rather than
/// a silently dropped address.
fn parse_addresses(raw: &[String]) -> Result<AddressInput> {
    let items = raw
        .iter()
        .map(|pairs| {
            AddressFields::parse_pairs(pairs)
                .and_then(Address::from_fields)
                .map(AddressItem::Address)
                .with_context(|| format!("invalid --endereco {pairs:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(AddressInput::List(items))
}

fn parse_cpf(raw: &str) -> Result<TaxpayerId> {
    TaxpayerId::from_formatted(raw).context("invalid CPF")
}

// -- Commands -----------------------------------------------------------------

fn cmd_add(
    repo: &dyn Repository,
    table: &str,
    fields: &[String],
    enderecos: &[String],
    out: &mut impl Write,
) -> Result<u8> {
    let fields = FieldSet::parse(fields)?;
    let record = PersonalRecord::builder()
        .full_name(fields.require("nome")?)
        .taxpayer_id(parse_cpf(fields.require("cpf")?)?)
        .state_id(
            StateId::new(
                fields.require("rg")?,
                fields.require("emissor")?,
                fields.require("uf")?,
            )
            .context("invalid RG")?,
        )
        .gender(fields.require("genero")?)
        .marital_status(fields.require("estado_civil")?)
        .occupation(fields.require("profissao")?)
        .addresses(parse_addresses(enderecos)?)
        .build()
        .context("invalid personal record")?;

    let stored = repo
        .insert(table, &record)
        .with_context(|| format!("failed to add record to table {table:?}"))?;
    tracing::info!(table, id = %stored.id, "record added");
    writeln!(out, "OK: added {} ({})", record.full_name(), stored.cpf())?;
    Ok(0)
}

fn cmd_update(
    repo: &dyn Repository,
    table: &str,
    cpf: &str,
    fields: &[String],
    enderecos: &[String],
    out: &mut impl Write,
) -> Result<u8> {
    let cpf = parse_cpf(cpf)?;
    let fields = FieldSet::parse(fields)?;
    if fields.get("cpf").is_some() {
        bail!("the CPF identifies the record and cannot be changed; remove it and add it again");
    }
    if fields.0.is_empty() && enderecos.is_empty() {
        bail!("nothing to update: give at least one FIELD:VALUE or --endereco");
    }

    let Some(stored) = repo.get(table, &cpf)? else {
        bail!("no record with CPF {cpf} in table {table:?}");
    };
    let current = stored.record()?;

    let mut builder = current.edit();
    if let Some(name) = fields.get("nome") {
        builder = builder.full_name(name);
    }
    if ["rg", "emissor", "uf"].iter().any(|f| fields.get(f).is_some()) {
        let rg = current.state_id();
        let state_id = StateId::new(
            fields.get("rg").unwrap_or(rg.registry_number()),
            fields.get("emissor").unwrap_or(rg.issuing_authority()),
            fields.get("uf").unwrap_or(rg.state_code()),
        )
        .context("invalid RG")?;
        builder = builder.state_id(state_id);
    }
    if let Some(gender) = fields.get("genero") {
        builder = builder.gender(gender);
    }
    if let Some(status) = fields.get("estado_civil") {
        builder = builder.marital_status(status);
    }
    if let Some(occupation) = fields.get("profissao") {
        builder = builder.occupation(occupation);
    }
    if !enderecos.is_empty() {
        builder = builder.addresses(parse_addresses(enderecos)?);
    }
    let record = builder.build().context("invalid personal record")?;

    repo.replace(table, &record)?;
    writeln!(out, "OK: updated {cpf}")?;
    Ok(0)
}

fn cmd_remove(
    repo: &dyn Repository,
    table: &str,
    cpfs: &[String],
    out: &mut impl Write,
) -> Result<u8> {
    let ids = cpfs
        .iter()
        .map(|raw| parse_cpf(raw))
        .collect::<Result<Vec<_>>>()?;

    let mut missing = 0;
    for cpf in &ids {
        if repo.remove(table, cpf)? {
            writeln!(out, "OK: removed {cpf}")?;
        } else {
            tracing::warn!(table, cpf = cpf.as_str(), "no record to remove");
            writeln!(out, "NOT FOUND: {cpf}")?;
            missing += 1;
        }
    }
    Ok(if missing == 0 { 0 } else { 1 })
}

fn cmd_list(
    repo: &dyn Repository,
    table: &str,
    cpf: Option<&str>,
    out: &mut impl Write,
) -> Result<u8> {
    let rows = match cpf {
        Some(raw) => {
            let cpf = parse_cpf(raw)?;
            match repo.get(table, &cpf)? {
                Some(row) => vec![row],
                None => bail!("no record with CPF {cpf} in table {table:?}"),
            }
        }
        None => repo.list(table)?,
    };

    let json = serde_json::to_string_pretty(&rows)?;
    writeln!(out, "{json}")?;
    Ok(0)
}

/// One person in an import file.
#[derive(Debug, Deserialize)]
struct ImportRow {
    nome_completo: String,
    cpf: String,
    /// Rendered RG, `"{digits} {AUTHORITY}/{STATE}"`.
    rg: String,
    genero: String,
    estado_civil: String,
    profissao: String,
    /// List of tagged addresses, or a mapping of role to addresses.
    #[serde(default)]
    endereco: Option<serde_json::Value>,
}

impl ImportRow {
    fn into_record(self) -> Result<PersonalRecord> {
        let addresses = match self.endereco {
            Some(value) => AddressInput::try_from(value)?,
            None => AddressInput::default(),
        };
        Ok(PersonalRecord::builder()
            .full_name(self.nome_completo)
            .taxpayer_id(TaxpayerId::from_formatted(&self.cpf)?)
            .state_id(StateId::from_rendered(&self.rg)?)
            .gender(self.genero)
            .marital_status(self.estado_civil)
            .occupation(self.profissao)
            .addresses(addresses)
            .build()?)
    }
}

/// Validate every row first; nothing is written if any row is invalid.
/// Rows whose CPF is already stored are skipped. The rows are stored as one
/// batch.
fn cmd_import(repo: &dyn Repository, table: &str, file: &Path, out: &mut impl Write) -> Result<u8> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;
    let rows: Vec<ImportRow> = serde_json::from_str(&content)
        .with_context(|| format!("import file is not a JSON array of people: {}", file.display()))?;

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.into_record()
                .with_context(|| format!("invalid person at index {i}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let batch = repo
        .insert_batch(table, &records)
        .with_context(|| format!("failed to import into table {table:?}"))?;
    for cpf in &batch.skipped {
        tracing::warn!(table, cpf = %cpf, "record already stored, skipping");
    }

    writeln!(
        out,
        "OK: imported {} record(s), skipped {}",
        batch.stored.len(),
        batch.skipped.len()
    )?;
    Ok(0)
}
