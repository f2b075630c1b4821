//! # docgen CLI entry point
//!
//! Parses command-line arguments, resolves configuration, opens the
//! database and dispatches to subcommand handlers.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docgen_cli::config::DocgenConfig;
use docgen_cli::db::{run_db, DbArgs};
use docgen_cli::documents::{
    run_caf, run_dec, run_pagamento, run_poco, CafArgs, DecArgs, DocumentContext, PagamentoArgs,
    PocoArgs,
};

/// docgen: documents of the Secretaria de Agricultura
///
/// Keeps the database of people served by the office and assembles the
/// data of CAF requests, activity declarations and payment requests.
#[derive(Parser, Debug)]
#[command(name = "docgen", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database URI (json://<path>, tinydb://<path>, <file>.json, memory://).
    #[arg(long, global = true)]
    database: Option<String>,

    /// Directory for generated payloads; stdout when absent.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage personal records (add, update, remove, list, import).
    Db(DbArgs),

    /// Request for the family-farmer registration (CAF).
    Caf(CafArgs),

    /// Declaration of farming or fishing activity.
    Dec(DecArgs),

    /// Payment request for a well drilled by the municipality.
    Poco(PocoArgs),

    /// Payment request issued by the department.
    Pagamento(PagamentoArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // DOCGEN_LOG wins over -v when set.
    let filter = EnvFilter::try_from_env("DOCGEN_LOG").unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "docgen starting");

    let stdout = std::io::stdout();
    match run(cli, &mut stdout.lock()) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli, out: &mut impl Write) -> Result<u8> {
    let config = DocgenConfig::load(cli.config.as_deref())?
        .with_overrides(cli.database.as_deref(), cli.output_dir.as_deref());
    tracing::debug!(database = %config.database, "resolved configuration");

    let repo = docgen_store::open_repository(&config.database)
        .with_context(|| format!("failed to open database {}", config.database))?;

    let ctx = DocumentContext {
        repo: repo.as_ref(),
        issuer: &config.orgao,
        output_dir: config.output_dir.as_deref(),
    };

    match cli.command {
        Commands::Db(args) => run_db(&args, repo.as_ref(), out),
        Commands::Caf(args) => run_caf(&args, &ctx, out),
        Commands::Dec(args) => run_dec(&args, &ctx, out),
        Commands::Poco(args) => run_poco(&args, &ctx, out),
        Commands::Pagamento(args) => run_pagamento(&args, &ctx, out),
    }
}
