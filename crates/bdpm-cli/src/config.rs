//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bdpm_ingest::IngestConfig;
use serde::Deserialize;

/// Global configuration for bdpm
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory holding the registry extracts
    #[serde(deserialize_with = "deserialize_env_path")]
    pub data_dir: PathBuf,
    /// Encoding label of the extracts
    pub encoding: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        let defaults = IngestConfig::default();
        Self {
            data_dir: defaults.data_dir,
            encoding: defaults.encoding,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// DuckDB file rebuilt on every run
    #[serde(deserialize_with = "deserialize_env_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: IngestConfig::default().db_path,
        }
    }
}

/// Deserialize a path that may be an environment variable reference like ${VAR}
fn deserialize_env_path<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    expand_env_var(&raw)
        .map(PathBuf::from)
        .ok_or_else(|| serde::de::Error::custom(format!("environment variable not set: {raw}")))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    match s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).ok(),
        None => Some(s.to_string()),
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./bdpm.toml (current directory)
    /// 2. ~/.config/bdpm/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("bdpm.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(dirs) = directories::ProjectDirs::from("", "", "bdpm") {
            let user_config = dirs.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            data_dir: self.source.data_dir.clone(),
            db_path: self.store.path.clone(),
            encoding: self.source.encoding.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.source.data_dir, PathBuf::from("files"));
        assert_eq!(config.source.encoding, "latin1");
        assert_eq!(config.store.path, PathBuf::from("bdpm.duckdb"));
        assert_eq!(config.ingest_config(), IngestConfig::default());
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("files"), Some("files".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${BDPM_NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn expand_env_var_set() {
        // PATH is set in every test environment
        let path = std::env::var("PATH").unwrap();
        assert_eq!(expand_env_var("${PATH}"), Some(path));
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[source]
data_dir = "/srv/bdpm/raw"
encoding = "windows-1252"

[store]
path = "/srv/bdpm/bdpm.duckdb"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.source.data_dir, PathBuf::from("/srv/bdpm/raw"));
        assert_eq!(config.source.encoding, "windows-1252");
        assert_eq!(config.store.path, PathBuf::from("/srv/bdpm/bdpm.duckdb"));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: Config = toml::from_str("[store]\npath = \"out.duckdb\"\n").unwrap();
        assert_eq!(config.source.data_dir, PathBuf::from("files"));
        assert_eq!(config.store.path, PathBuf::from("out.duckdb"));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bdpm.toml");
        std::fs::write(&path, "[source]\nencoding = \"latin1\"\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.source.encoding, "latin1");
    }
}
