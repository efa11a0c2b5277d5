//! The public API surface (§6): a single `Database` handle over the
//! storage engine, transaction manager, and configuration, modeled on the
//! reference crate's own `api::Oxidb` facade — one struct wrapping an
//! executor, string-in/structured-out `execute`, and a handful of
//! path-based persistence convenience methods.

pub mod database;

#[cfg(test)]
mod tests;

pub use crate::core::query::executor::ExecutionResult;
pub use database::Database;
