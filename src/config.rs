// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration management

use crate::types::{ConflictPolicy, START_POS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for persistent data (the book snapshot)
    pub data_dir: PathBuf,
    /// Position key the book is rooted at
    pub root_key: String,
    /// How label-key conflicts are resolved on insertion
    pub conflict_policy: ConflictPolicy,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: directories::ProjectDirs::from("org", "openbook-dev", "openbook")
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".openbook")),
            root_key: START_POS.to_string(),
            conflict_policy: ConflictPolicy::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Load configuration from a TOML file, or use defaults when it is absent
///
/// # Errors
/// Fails only if a file is present but unreadable or not valid TOML;
/// a missing file is not an error.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::default().data_dir.join("openbook.toml"),
    };
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.root_key, START_POS);
        assert_eq!(config.conflict_policy, ConflictPolicy::KeepExisting);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openbook.toml");
        std::fs::write(&path, "root_key = \"K0\"\nconflict_policy = \"prefer-new\"\n").unwrap();
        let config = load(Some(&path)).unwrap();
        assert_eq!(config.root_key, "K0");
        assert_eq!(config.conflict_policy, ConflictPolicy::PreferNew);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let config = load(Some(Path::new("/nonexistent/openbook.toml"))).unwrap();
        assert_eq!(config.root_key, START_POS);
    }
}
