//! # docgen-cli: Command Line for docgen
//!
//! Provides the `docgen` binary used at the office counter.
//!
//! ## Subcommands
//!
//! - `docgen db`: add, update, remove, list and import personal records.
//! - `docgen caf`: CAF registration request.
//! - `docgen dec`: farmer or fisher declaration.
//! - `docgen poco`: payment request for a drilled well.
//! - `docgen pagamento`: payment request issued by the department.
//!
//! ```bash
//! docgen db add nome:"Maria da Silva" cpf:529.982.247-25 rg:7654321 emissor:SDS uf:PE \
//!     genero:F estado_civil:casado profissao:Agricultora \
//!     --endereco tag=residencial,bairro="Zona Rural",logradouro="Sítio Lagoa"
//! docgen dec --cpf 52998224725 --atividade agricultor
//! ```

pub mod config;
pub mod db;
pub mod documents;

pub use config::{ConfigError, DocgenConfig};
