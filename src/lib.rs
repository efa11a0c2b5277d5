#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::correctness,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    deprecated,
    unused,
    clippy::todo,
    clippy::unimplemented,
    clippy::unreachable
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::too_many_lines,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_cmp,
    clippy::doc_markdown,
    clippy::module_inception
)]

//! # Oxidb - an in-memory relational database engine
//!
//! Oxidb is an embedded, single-writer relational engine: typed tables with
//! primary-key/unique/not-null/foreign-key enforcement, hash-backed secondary
//! indexes, an undo-log transaction manager with `BEGIN`/`COMMIT`/`ROLLBACK`,
//! a query evaluator supporting filtering, projection, hash-equi-join and
//! grouped aggregation, and whole-database snapshot persistence.
//!
//! ## Quick start
//!
//! ```
//! use oxidb_core::api::Database;
//!
//! let mut db = Database::new();
//! db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT UNIQUE)").unwrap();
//! db.execute("INSERT INTO users VALUES (1, 'Alice')").unwrap();
//! let result = db.execute("SELECT * FROM users WHERE id = 1").unwrap();
//! assert_eq!(result.row_count(), 1);
//! ```
//!
//! ## Architecture
//!
//! - **Storage Engine** (`core::storage`) — tables, rows, constraint checks.
//! - **Index Manager** (`core::indexing`) — per-column hash indexes.
//! - **Transaction Manager** (`core::transaction`) — undo log, begin/commit/rollback.
//! - **Query Evaluator** (`core::query`) — filter, join, group/aggregate, SQL parsing.
//! - **Persistence** (`core::persistence`) — whole-database snapshot encode/decode.

pub mod api;
pub mod core;

pub use api::{Database, ExecutionResult};
pub use crate::core::common::error::OxidbError;
pub use crate::core::common::types::Value;
