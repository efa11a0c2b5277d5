//! `INSERT` / `UPDATE` / `DELETE` dispatch: resolves a single-table `WHERE`
//! via the filter protocol (§4.5) for UPDATE/DELETE, then hands the
//! candidate rids to `core::storage::database::Database`'s mutating methods.

use crate::core::common::error::OxidbError;
use crate::core::query::executor::{coerce_literal_for_column, resolve_single_table_predicates, ExecutionResult};
use crate::core::query::filter;
use crate::core::query::sql::ast::{DeleteStatement, InsertStatement, UpdateStatement};
use crate::core::storage::Database;
use crate::core::transaction::TransactionManager;

pub fn insert(
    db: &mut Database,
    txn: &mut TransactionManager,
    stmt: InsertStatement,
) -> Result<ExecutionResult, OxidbError> {
    db.insert(&stmt.table, stmt.values, txn)?;
    Ok(ExecutionResult::RowCount(1))
}

pub fn update(
    db: &mut Database,
    txn: &mut TransactionManager,
    stmt: UpdateStatement,
) -> Result<ExecutionResult, OxidbError> {
    let table = db
        .table(&stmt.table)
        .ok_or_else(|| OxidbError::SchemaError(format!("no such table '{}'", stmt.table)))?;
    let predicates = resolve_single_table_predicates(&table.schema, &stmt.table, &stmt.predicates)?;
    let (candidates, _plan) = filter::select(table, &predicates)?;

    let mut assignments = Vec::with_capacity(stmt.assignments.len());
    for (column, value) in stmt.assignments {
        let idx = table.schema.column_index(&column).ok_or_else(|| {
            OxidbError::SchemaError(format!("no such column '{column}' on table '{}'", stmt.table))
        })?;
        let coerced = coerce_literal_for_column(&table.schema, &column, value)?;
        assignments.push((idx, coerced));
    }

    let modified = db.update_rows(&stmt.table, &candidates, &assignments, txn)?;
    Ok(ExecutionResult::RowCount(modified))
}

pub fn delete(
    db: &mut Database,
    txn: &mut TransactionManager,
    stmt: DeleteStatement,
) -> Result<ExecutionResult, OxidbError> {
    let table = db
        .table(&stmt.table)
        .ok_or_else(|| OxidbError::SchemaError(format!("no such table '{}'", stmt.table)))?;
    let predicates = resolve_single_table_predicates(&table.schema, &stmt.table, &stmt.predicates)?;
    let (candidates, _plan) = filter::select(table, &predicates)?;

    let removed = db.delete_rows(&stmt.table, &candidates, txn)?;
    Ok(ExecutionResult::RowCount(removed))
}
