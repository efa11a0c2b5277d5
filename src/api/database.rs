//! `Database`: the facade that owns every moving part (storage, the
//! transaction manager, configuration) and drives them from SQL text, the
//! way the reference crate's `Oxidb` owns a `QueryExecutor` and dispatches
//! `execute_query_str` through it.

use crate::core::common::error::OxidbError;
use crate::core::config::Config;
use crate::core::persistence;
use crate::core::query::executor::{self, ExecutionResult};
use crate::core::query::sql;
use crate::core::storage;
use crate::core::transaction::TransactionManager;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// An embedded Oxidb database: tables, indexes, the open-transaction undo
/// log, and the configuration governing where snapshots live.
#[derive(Debug)]
pub struct Database {
    storage: storage::Database,
    txn: TransactionManager,
    config: Config,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    /// A fresh, empty in-memory database under the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self { storage: storage::Database::new(), txn: TransactionManager::new(), config: Config::default() }
    }

    /// A fresh, empty in-memory database under an explicit configuration
    /// (governs where `save_to_default`/`load_from_default` read and write).
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self { storage: storage::Database::new(), txn: TransactionManager::new(), config }
    }

    /// Loads configuration from a TOML file (falling back to defaults if it
    /// does not exist) and starts with an empty in-memory database. Does
    /// not itself load a snapshot; call `load_from_default` afterward if
    /// that's desired.
    ///
    /// # Errors
    /// Returns `OxidbError::Configuration` if the file exists but fails to
    /// parse.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, OxidbError> {
        let config = Config::load_from_file(path.as_ref())?;
        Ok(Self::with_config(config))
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parses and executes one SQL statement (§4.6, §6). `BEGIN`/`COMMIT`/
    /// `ROLLBACK` are accepted as statements like any other; outside an
    /// open transaction, mutations auto-commit (the transaction manager
    /// records no undo history while idle).
    ///
    /// # Errors
    /// Returns `OxidbError::SyntaxError` if `sql` does not parse, or
    /// whatever error the statement's execution raises.
    pub fn execute(&mut self, sql: &str) -> Result<ExecutionResult, OxidbError> {
        let statement = sql::parse(sql)?;
        executor::execute(&mut self.storage, &mut self.txn, statement)
    }

    /// Opens a transaction. Equivalent to `execute("BEGIN")`.
    ///
    /// # Errors
    /// Returns `OxidbError::TransactionError` if one is already open.
    pub fn begin(&mut self) -> Result<(), OxidbError> {
        self.txn.begin()
    }

    /// Commits the open transaction, discarding its undo log. Equivalent
    /// to `execute("COMMIT")`. A no-op if no transaction is open.
    pub fn commit(&mut self) {
        self.txn.commit();
    }

    /// Rolls back the open transaction, replaying its undo log against
    /// storage in reverse order. Equivalent to `execute("ROLLBACK")`. A
    /// no-op if no transaction is open.
    ///
    /// # Errors
    /// Returns `OxidbError::TransactionError` only if the undo log itself
    /// is inconsistent with storage (should not arise in normal use).
    pub fn rollback(&mut self) -> Result<(), OxidbError> {
        for entry in self.txn.rollback() {
            self.storage.apply_undo(entry)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_in_transaction(&self) -> bool {
        self.txn.is_active()
    }

    /// Serializes the whole database to `path` (§4.7). Overwrites any
    /// existing file at that path.
    ///
    /// # Errors
    /// Returns `OxidbError::Io` if the file cannot be created or written.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), OxidbError> {
        let file = File::create(path.as_ref())?;
        persistence::save(&self.storage, &mut BufWriter::new(file))
    }

    /// Replaces this database's tables and indexes with the snapshot
    /// stored at `path`. The open transaction, if any, is discarded first
    /// — a loaded snapshot starts from a clean transactional slate.
    ///
    /// # Errors
    /// Returns `OxidbError::Io` if the file cannot be read, or
    /// `OxidbError::CorruptSnapshot` if its contents fail validation.
    pub fn load_from(&mut self, path: impl AsRef<Path>) -> Result<(), OxidbError> {
        let file = File::open(path.as_ref())?;
        let loaded = persistence::load(&mut BufReader::new(file))?;
        self.storage = loaded;
        self.txn = TransactionManager::new();
        Ok(())
    }

    /// `save_to(self.config().snapshot_path())`.
    ///
    /// # Errors
    /// See `save_to`.
    pub fn save_to_default(&self) -> Result<(), OxidbError> {
        self.save_to(self.config.snapshot_path())
    }

    /// `load_from(self.config().snapshot_path())`.
    ///
    /// # Errors
    /// See `load_from`.
    pub fn load_from_default(&mut self) -> Result<(), OxidbError> {
        let path = self.config.snapshot_path();
        self.load_from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_insert_select_round_trip() {
        let mut db = Database::new();
        db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT UNIQUE)").unwrap();
        db.execute("INSERT INTO users VALUES (1, 'Alice')").unwrap();
        let result = db.execute("SELECT * FROM users WHERE id = 1").unwrap();
        assert_eq!(result.row_count(), 1);
    }

    #[test]
    fn begin_insert_rollback_leaves_no_trace() {
        let mut db = Database::new();
        db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY)").unwrap();
        db.begin().unwrap();
        db.execute("INSERT INTO users VALUES (1)").unwrap();
        db.rollback().unwrap();
        let result = db.execute("SELECT * FROM users").unwrap();
        assert_eq!(result.row_count(), 0);
        assert!(!db.is_in_transaction());
    }

    #[test]
    fn begin_insert_commit_keeps_the_row() {
        let mut db = Database::new();
        db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY)").unwrap();
        db.begin().unwrap();
        db.execute("INSERT INTO users VALUES (1)").unwrap();
        db.commit();
        let result = db.execute("SELECT * FROM users").unwrap();
        assert_eq!(result.row_count(), 1);
    }

    #[test]
    fn save_then_load_restores_tables_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.bin");

        let mut db = Database::new();
        db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)").unwrap();
        db.execute("INSERT INTO users VALUES (1, 'Alice')").unwrap();
        db.save_to(&path).unwrap();

        let mut reloaded = Database::new();
        reloaded.load_from(&path).unwrap();
        let result = reloaded.execute("SELECT * FROM users").unwrap();
        assert_eq!(result.row_count(), 1);
    }

    #[test]
    fn save_and_load_via_default_config_path() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.index_base_path = dir.path().to_string_lossy().into_owned();

        let mut db = Database::with_config(config.clone());
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)").unwrap();
        db.execute("INSERT INTO t VALUES (1)").unwrap();
        db.save_to_default().unwrap();

        let mut reloaded = Database::with_config(config);
        reloaded.load_from_default().unwrap();
        assert_eq!(reloaded.execute("SELECT * FROM t").unwrap().row_count(), 1);
    }

    #[test]
    fn malformed_sql_is_a_syntax_error() {
        let mut db = Database::new();
        let err = db.execute("SELEC * FROM t").unwrap_err();
        assert!(matches!(err, OxidbError::SyntaxError { .. }));
    }
}
