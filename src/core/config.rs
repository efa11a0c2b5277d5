//! Database configuration (§1's ambient stack): a TOML-deserializable
//! `Config`, following the reference crate's own `core::config` module —
//! `#[serde(default = "...")]` fallbacks for every field so a partial or
//! missing file still produces a usable configuration.
//!
//! The reference crate's `Config` carries a `database_file_path`, an
//! `index_base_path` (each index lived in its own file), a WAL path, and a
//! handful of forward-looking cache/isolation placeholders. This engine
//! has no WAL, no cache tuning, and — per the REDESIGN FLAGS — persists
//! indexes only as part of the single whole-database snapshot rather than
//! one file per index, so those fields have no counterpart here. What
//! survives is the directory convention: `index_base_path` now simply
//! names the directory the snapshot convenience path resolves into.

use crate::core::common::error::OxidbError;
use std::fs;
use std::path::{Path, PathBuf};

fn default_index_base_path() -> String {
    "oxidb_data/".to_string()
}

fn default_snapshot_file_name() -> String {
    "oxidb.snapshot".to_string()
}

/// Settings covering snapshot file conventions and index-directory layout.
/// No connection/network settings are in scope, since this engine has none
/// (§1, Non-goals).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the snapshot convenience path resolves into. Historically
    /// the reference crate's per-index file directory; here there are no
    /// per-index files to store, so it just anchors `snapshot_file_name`.
    pub index_base_path: String,

    /// File name `Database::save_to_default`/`load_from_default` use
    /// inside `index_base_path`.
    pub snapshot_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_base_path: default_index_base_path(),
            snapshot_file_name: default_snapshot_file_name(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file. A missing file yields the
    /// default configuration rather than an error; a malformed one fails
    /// with `Configuration`.
    pub fn load_from_file(path: &Path) -> Result<Self, OxidbError> {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(OxidbError::from),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(OxidbError::from(e)),
        }
    }

    /// Loads from `optional_path` if given, else returns the default.
    pub fn load_or_default(optional_path: Option<&Path>) -> Result<Self, OxidbError> {
        match optional_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// The resolved path `Database::save_to_default`/`load_from_default`
    /// read and write.
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        Path::new(&self.index_base_path).join(&self.snapshot_file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.index_base_path, "oxidb_data/");
        assert_eq!(config.snapshot_file_name, "oxidb.snapshot");
    }

    #[test]
    fn snapshot_path_joins_base_and_file_name() {
        let config = Config {
            index_base_path: "data/".to_string(),
            snapshot_file_name: "db.snap".to_string(),
        };
        assert_eq!(config.snapshot_path(), PathBuf::from("data/db.snap"));
    }

    #[test]
    fn load_from_missing_file_returns_default() {
        let config = Config::load_from_file(Path::new("definitely_missing_oxidb.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_from_partial_file_fills_in_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"snapshot_file_name = "custom.snap""#).unwrap();
        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.snapshot_file_name, "custom.snap");
        assert_eq!(config.index_base_path, "oxidb_data/");
    }

    #[test]
    fn load_from_malformed_file_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();
        let result = Config::load_from_file(file.path());
        assert!(matches!(result, Err(OxidbError::Configuration(_))));
    }
}
