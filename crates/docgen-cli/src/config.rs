//! # Configuration
//!
//! Where the database lives, where generated payloads go, and which office
//! is printed as the issuer.
//!
//! Resolution order, first match wins:
//!
//! 1. `--config <file>` (YAML).
//! 2. Environment: `DOCGEN_DATABASE`, `DOCGEN_OUTPUT_DIR`.
//! 3. Defaults: `json://instance/dados.json`, payloads on stdout, the
//!    Secretaria de Agricultura of Feira Nova-PE.
//!
//! `--database` and `--output-dir` on the command line override whatever
//! was resolved.

use std::path::{Path, PathBuf};

use docgen_core::Issuer;
use serde::{Deserialize, Serialize};

/// Database used when nothing else is configured.
pub const DEFAULT_DATABASE: &str = "json://instance/dados.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocgenConfig {
    /// Database URI, see `docgen_store::open_repository`.
    #[serde(default = "default_database")]
    pub database: String,
    /// Directory for generated payloads; stdout when absent.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Issuing office printed on every document.
    #[serde(default = "default_issuer")]
    pub orgao: Issuer,
}

impl Default for DocgenConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            output_dir: None,
            orgao: default_issuer(),
        }
    }
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_issuer() -> Issuer {
    Issuer {
        municipio: "Feira Nova".to_string(),
        estado: "PE".to_string(),
        secretaria: "Secretaria Municipal de Agricultura".to_string(),
    }
}

impl DocgenConfig {
    /// Resolve the configuration: the file when given, the process
    /// environment otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::from_env()),
        }
    }

    /// Parse a YAML configuration file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Variables:
    /// - `DOCGEN_DATABASE` (default: `json://instance/dados.json`)
    /// - `DOCGEN_OUTPUT_DIR` (default: unset, payloads go to stdout)
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        Self {
            database: non_empty("DOCGEN_DATABASE").unwrap_or_else(default_database),
            output_dir: non_empty("DOCGEN_OUTPUT_DIR").map(PathBuf::from),
            orgao: default_issuer(),
        }
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, database: Option<&str>, output_dir: Option<&Path>) -> Self {
        if let Some(database) = database {
            self.database = database.to_string();
        }
        if let Some(output_dir) = output_dir {
            self.output_dir = Some(output_dir.to_path_buf());
        }
        self
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = DocgenConfig::from_lookup(|_| None);
        assert_eq!(cfg, DocgenConfig::default());
        assert_eq!(cfg.database, DEFAULT_DATABASE);
        assert_eq!(cfg.orgao.municipio, "Feira Nova");
    }

    #[test]
    fn environment_overrides_defaults() {
        let cfg = DocgenConfig::from_lookup(|var| match var {
            "DOCGEN_DATABASE" => Some("memory://".to_string()),
            "DOCGEN_OUTPUT_DIR" => Some("saida".to_string()),
            _ => None,
        });
        assert_eq!(cfg.database, "memory://");
        assert_eq!(cfg.output_dir, Some(PathBuf::from("saida")));
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let cfg = DocgenConfig::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(cfg.database, DEFAULT_DATABASE);
        assert!(cfg.output_dir.is_none());
    }

    #[test]
    fn partial_yaml_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docgen.yaml");
        std::fs::write(
            &path,
            "database: tinydb://db/pessoas.json\norgao:\n  municipio: Limoeiro\n  estado: PE\n  secretaria: Secretaria de Pesca\n",
        )
        .unwrap();

        let cfg = DocgenConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.database, "tinydb://db/pessoas.json");
        assert_eq!(cfg.orgao.municipio, "Limoeiro");
        assert!(cfg.output_dir.is_none());
    }

    #[test]
    fn missing_and_malformed_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = DocgenConfig::from_file(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));

        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "database: [unclosed").unwrap();
        let bad = DocgenConfig::from_file(&path).unwrap_err();
        assert!(matches!(bad, ConfigError::Parse { .. }));
    }

    #[test]
    fn command_line_overrides_win() {
        let cfg = DocgenConfig::default()
            .with_overrides(Some("memory://"), Some(Path::new("/tmp/docs")));
        assert_eq!(cfg.database, "memory://");
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/tmp/docs")));
    }
}
