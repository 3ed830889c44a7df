use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Optional TOML configuration. Any field present here overrides the
/// corresponding CLI value.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub csv_path: Option<String>,
    pub db_path: Option<String>,
    pub table: Option<String>,
    /// "coerce" or "reject".
    pub on_malformed: Option<String>,
    pub top_genres: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
