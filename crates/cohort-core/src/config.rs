//! cohort.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::{DEFAULT_MAX_GROUP_CAPACITY, DEFAULT_MIN_GROUP_CAPACITY};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the redb database file.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cohort.redb"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Capacity bounds applied to products created without explicit values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub min_group_capacity: u32,
    pub max_group_capacity: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            min_group_capacity: DEFAULT_MIN_GROUP_CAPACITY,
            max_group_capacity: DEFAULT_MAX_GROUP_CAPACITY,
        }
    }
}

impl CohortConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CohortConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial() {
        let toml_str = r#"
[defaults]
min_group_capacity = 2
"#;
        let config: CohortConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.defaults.min_group_capacity, 2);
        assert_eq!(config.defaults.max_group_capacity, 4);
        assert_eq!(config.store.path, PathBuf::from("cohort.redb"));
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_default_serializes() {
        let toml_str = CohortConfig::default().to_toml_string().unwrap();
        assert!(toml_str.contains("cohort.redb"));
        assert!(toml_str.contains("min_group_capacity = 3"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CohortConfig::load_or_default(&dir.path().join("cohort.toml")).unwrap();
        assert!(!config.logging.json);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cohort.toml");
        std::fs::write(&path, "[logging]\nfilter = \"debug\"\njson = true\n").unwrap();

        let config = CohortConfig::from_file(&path).unwrap();
        assert_eq!(config.logging.filter, "debug");
        assert!(config.logging.json);
    }
}
