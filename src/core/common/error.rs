//! Error types for Oxidb.
//!
//! Follows Single Responsibility per variant: each member of `OxidbError`
//! names one failure category raised by a single subsystem. Manual
//! `Display`/`Error` impls are used rather than a derive macro so the
//! message text stays under our control.

use std::fmt;
use std::io;

/// The single error type returned by every fallible operation in the crate.
#[derive(Debug, Clone, PartialEq)]
pub enum OxidbError {
    /// The parser could not tokenize or match a statement. Carries the
    /// offending token text and its byte position in the source string.
    SyntaxError { message: String, position: usize },

    /// Unknown table, unknown column, or a duplicate DDL definition.
    SchemaError(String),

    /// A value could not be coerced to its column's declared type.
    TypeError(String),

    /// A tuple's arity did not match the table's column count.
    ArityError(String),

    /// A NOT NULL, UNIQUE, or PRIMARY KEY constraint was violated.
    ConstraintViolation(String),

    /// An FK insert referenced a missing parent, or a delete would have
    /// orphaned a child row.
    ReferentialIntegrityError(String),

    /// A bare column name in a projection or predicate resolved to more
    /// than one source column.
    AmbiguousColumn(String),

    /// A nested `BEGIN`, or a failure while replaying the undo log during
    /// `ROLLBACK`.
    TransactionError(String),

    /// A snapshot failed its checksum, magic/version check, or post-load
    /// invariant verification.
    CorruptSnapshot(String),

    /// Underlying I/O failure (reading/writing a snapshot stream or a
    /// config file).
    Io(String),

    /// Failure encoding a value into the snapshot wire format.
    Serialization(String),

    /// Failure decoding a value out of the snapshot wire format.
    Deserialization(String),

    /// A `Config` TOML file failed to parse.
    Configuration(String),

    /// Any other internal invariant violation; should not normally surface.
    Internal(String),
}

impl fmt::Display for OxidbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SyntaxError { message, position } => {
                write!(f, "Syntax error at position {position}: {message}")
            }
            Self::SchemaError(msg) => write!(f, "Schema error: {msg}"),
            Self::TypeError(msg) => write!(f, "Type error: {msg}"),
            Self::ArityError(msg) => write!(f, "Arity error: {msg}"),
            Self::ConstraintViolation(msg) => write!(f, "Constraint violation: {msg}"),
            Self::ReferentialIntegrityError(msg) => {
                write!(f, "Referential integrity error: {msg}")
            }
            Self::AmbiguousColumn(msg) => write!(f, "Ambiguous column: {msg}"),
            Self::TransactionError(msg) => write!(f, "Transaction error: {msg}"),
            Self::CorruptSnapshot(msg) => write!(f, "Corrupt snapshot: {msg}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            Self::Deserialization(msg) => write!(f, "Deserialization error: {msg}"),
            Self::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for OxidbError {}

impl From<io::Error> for OxidbError {
    fn from(error: io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<toml::de::Error> for OxidbError {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration(error.to_string())
    }
}

impl From<std::string::FromUtf8Error> for OxidbError {
    fn from(error: std::string::FromUtf8Error) -> Self {
        Self::Deserialization(error.to_string())
    }
}
