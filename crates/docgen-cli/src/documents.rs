//! # Document Subcommands
//!
//! `caf`, `dec`, `poco` and `pagamento` look a person up by CPF and assemble
//! the payload of the requested document. The payload is printed as JSON,
//! or written to `<output-dir>/<kind>-<cpf digits>.json` when an output
//! directory is configured.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};

use docgen_core::{Activity, DocumentKind, DocumentPayload, DocumentRequest, Issuer, TaxpayerId};
use docgen_store::{Repository, DEFAULT_TABLE};

/// Arguments shared by every document command.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// CPF of the person, with or without punctuation.
    #[arg(long)]
    pub cpf: String,

    /// Table holding the person.
    #[arg(short, long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Issue date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub data: Option<NaiveDate>,
}

/// Arguments for `docgen caf`.
#[derive(Args, Debug)]
pub struct CafArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Activity attested by `docgen dec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActivityArg {
    Agricultor,
    Pescador,
}

impl From<ActivityArg> for Activity {
    fn from(value: ActivityArg) -> Self {
        match value {
            ActivityArg::Agricultor => Activity::Agricultor,
            ActivityArg::Pescador => Activity::Pescador,
        }
    }
}

/// Arguments for `docgen dec`.
#[derive(Args, Debug)]
pub struct DecArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(long, value_enum)]
    pub atividade: ActivityArg,
}

/// Arguments for `docgen poco`.
#[derive(Args, Debug)]
pub struct PocoArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Amount in reais (e.g. 1500 or 1500,00).
    #[arg(long)]
    pub valor: String,

    /// Where the well was drilled.
    #[arg(long)]
    pub local: String,
}

/// Arguments for `docgen pagamento`.
#[derive(Args, Debug)]
pub struct PagamentoArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Amount in reais (e.g. 89,90).
    #[arg(long)]
    pub valor: String,

    /// What the payment refers to.
    #[arg(long)]
    pub referencia: String,
}

/// Everything a document command needs besides its own arguments.
pub struct DocumentContext<'a> {
    pub repo: &'a dyn Repository,
    pub issuer: &'a Issuer,
    pub output_dir: Option<&'a Path>,
}

pub fn run_caf(args: &CafArgs, ctx: &DocumentContext<'_>, out: &mut impl Write) -> Result<u8> {
    emit(ctx, &args.target, DocumentKind::Caf, None, None, out)
}

pub fn run_dec(args: &DecArgs, ctx: &DocumentContext<'_>, out: &mut impl Write) -> Result<u8> {
    let kind = DocumentKind::Declaracao(args.atividade.into());
    emit(ctx, &args.target, kind, None, None, out)
}

pub fn run_poco(args: &PocoArgs, ctx: &DocumentContext<'_>, out: &mut impl Write) -> Result<u8> {
    emit(
        ctx,
        &args.target,
        DocumentKind::PagamentoPoco,
        Some(args.valor.as_str()),
        Some(args.local.as_str()),
        out,
    )
}

pub fn run_pagamento(
    args: &PagamentoArgs,
    ctx: &DocumentContext<'_>,
    out: &mut impl Write,
) -> Result<u8> {
    emit(
        ctx,
        &args.target,
        DocumentKind::Pagamento,
        Some(args.valor.as_str()),
        Some(args.referencia.as_str()),
        out,
    )
}

fn build_payload(
    ctx: &DocumentContext<'_>,
    target: &TargetArgs,
    kind: DocumentKind,
    amount: Option<&str>,
    reference: Option<&str>,
) -> Result<(TaxpayerId, DocumentPayload)> {
    let cpf = TaxpayerId::from_formatted(&target.cpf).context("invalid CPF")?;
    let Some(stored) = ctx.repo.get(&target.table, &cpf)? else {
        bail!("no record with CPF {cpf} in table {:?}", target.table);
    };
    let record = stored.record()?;

    let issued_on = target
        .data
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut request = DocumentRequest::new(kind, record, issued_on).with_issuer(ctx.issuer.clone());
    if let Some(amount) = amount {
        request = request.with_amount(amount)?;
    }
    if let Some(reference) = reference {
        request = request.with_reference(reference);
    }

    let payload = request
        .payload()
        .with_context(|| format!("cannot assemble {}", kind.slug()))?;
    Ok((cpf, payload))
}

fn emit(
    ctx: &DocumentContext<'_>,
    target: &TargetArgs,
    kind: DocumentKind,
    amount: Option<&str>,
    reference: Option<&str>,
    out: &mut impl Write,
) -> Result<u8> {
    let (cpf, payload) = build_payload(ctx, target, kind, amount, reference)?;
    let json = serde_json::to_string_pretty(&payload)?;

    match ctx.output_dir {
        Some(dir) => {
            let path = payload_path(dir, kind, &cpf);
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory {}", dir.display()))?;
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(kind = kind.slug(), path = %path.display(), "payload written");
            writeln!(out, "OK: {} written to {}", kind.slug(), path.display())?;
        }
        None => writeln!(out, "{json}")?,
    }
    Ok(0)
}

fn payload_path(dir: &Path, kind: DocumentKind, cpf: &TaxpayerId) -> PathBuf {
    dir.join(format!("{}-{}.json", kind.slug(), cpf.digits()))
}
