mod file_config;

pub use file_config::FileConfig;

use crate::error::EtlError;
use crate::ingest::MalformedPolicy;
use crate::movie_store::is_valid_table_name;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be overridden by the TOML config file.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub csv_path: Option<PathBuf>,
    pub db_path: PathBuf,
    pub table: String,
    pub on_malformed: MalformedPolicy,
    pub top_genres: usize,
}

/// Fully resolved run configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub csv_path: Option<PathBuf>,
    pub db_path: PathBuf,
    pub table: String,
    pub on_malformed: MalformedPolicy,
    pub top_genres: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let csv_path = file
            .csv_path
            .map(PathBuf::from)
            .or_else(|| cli.csv_path.clone());
        if let Some(path) = &csv_path {
            if !path.exists() {
                bail!("Movie CSV does not exist: {:?}", path);
            }
        }

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_path.clone());

        let table = file.table.unwrap_or_else(|| cli.table.clone());
        if !is_valid_table_name(&table) {
            return Err(EtlError::InvalidTableName { name: table }.into());
        }

        let on_malformed = file
            .on_malformed
            .and_then(|s| parse_policy(&s))
            .unwrap_or(cli.on_malformed);

        let top_genres = file.top_genres.unwrap_or(cli.top_genres);
        if top_genres == 0 {
            bail!("top_genres must be at least 1");
        }

        Ok(Self {
            csv_path,
            db_path,
            table,
            on_malformed,
            top_genres,
        })
    }
}

/// Parses a malformed-field policy string using clap's ValueEnum trait.
fn parse_policy(s: &str) -> Option<MalformedPolicy> {
    MalformedPolicy::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli_with_csv(csv_path: Option<PathBuf>) -> CliConfig {
        CliConfig {
            csv_path,
            db_path: PathBuf::from("movies.db"),
            table: "movies".to_string(),
            on_malformed: MalformedPolicy::Coerce,
            top_genres: 10,
        }
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(parse_policy("coerce"), Some(MalformedPolicy::Coerce));
        assert_eq!(parse_policy("reject"), Some(MalformedPolicy::Reject));
        // Case insensitive
        assert_eq!(parse_policy("REJECT"), Some(MalformedPolicy::Reject));
        assert_eq!(parse_policy("explode"), None);
    }

    #[test]
    fn test_resolve_cli_only() {
        let csv = tempfile::NamedTempFile::new().unwrap();
        let cli = cli_with_csv(Some(csv.path().to_path_buf()));

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.csv_path.as_deref(), Some(csv.path()));
        assert_eq!(config.db_path, PathBuf::from("movies.db"));
        assert_eq!(config.table, "movies");
        assert_eq!(config.on_malformed, MalformedPolicy::Coerce);
        assert_eq!(config.top_genres, 10);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let csv = tempfile::NamedTempFile::new().unwrap();
        let cli = cli_with_csv(Some(csv.path().to_path_buf()));

        let file = FileConfig {
            table: Some("film_catalog".to_string()),
            on_malformed: Some("reject".to_string()),
            top_genres: Some(5),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file)).unwrap();

        assert_eq!(config.table, "film_catalog");
        assert_eq!(config.on_malformed, MalformedPolicy::Reject);
        assert_eq!(config.top_genres, 5);
        // CLI value used when TOML doesn't specify
        assert_eq!(config.db_path, PathBuf::from("movies.db"));
    }

    #[test]
    fn test_resolve_missing_csv_error() {
        let cli = cli_with_csv(Some(PathBuf::from("/nonexistent/movies.csv")));
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_invalid_table_error() {
        let cli = CliConfig {
            table: "movies; drop".to_string(),
            ..cli_with_csv(None)
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("invalid table name"));
    }

    #[test]
    fn test_resolve_unknown_policy_string_falls_back_to_cli() {
        let cli = cli_with_csv(None);
        let file = FileConfig {
            on_malformed: Some("explode".to_string()),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, Some(file)).unwrap();
        assert_eq!(config.on_malformed, MalformedPolicy::Coerce);
    }

    #[test]
    fn test_file_config_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"db_path = \"/data/movies.db\"\ntable = \"movies\"\n")
            .unwrap();

        let config = FileConfig::load(file.path()).unwrap();
        assert_eq!(config.db_path.as_deref(), Some("/data/movies.db"));
        assert_eq!(config.table.as_deref(), Some("movies"));
        assert!(config.csv_path.is_none());
    }
}
