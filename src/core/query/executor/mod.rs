//! Statement dispatcher (§4.6): routes a parsed `Statement` to storage
//! (DDL/DML), the query evaluator (SELECT), or the transaction manager
//! (BEGIN/COMMIT/ROLLBACK).

pub mod ddl;
pub mod dml;
pub mod select;
pub mod transaction_handlers;

use crate::core::common::error::OxidbError;
use crate::core::common::types::{Row, Schema, Value};
use crate::core::query::filter::{self, QueryPlanKind};
use crate::core::query::sql::ast::{CompareOp as AstCompareOp, PredicateClause};
use crate::core::query::sql::Statement;
use crate::core::storage::Database;
use crate::core::transaction::TransactionManager;

/// What `execute` hands back to the caller (§6): a rectangular result set
/// for SELECT, an affected-row count for INSERT/UPDATE/DELETE, or a bare
/// acknowledgement for DDL and transaction-control statements.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    ResultSet { columns: Vec<String>, rows: Vec<Row>, plan: QueryPlanKind },
    RowCount(usize),
    Ack,
}

impl ExecutionResult {
    /// The number of rows a SELECT returned, or an INSERT/UPDATE/DELETE
    /// affected. `Ack` (DDL, transaction control) has no rows, so `0`.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            Self::ResultSet { rows, .. } => rows.len(),
            Self::RowCount(n) => *n,
            Self::Ack => 0,
        }
    }

    /// A SELECT's rows, or an empty slice for any other statement kind.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        match self {
            Self::ResultSet { rows, .. } => rows,
            Self::RowCount(_) | Self::Ack => &[],
        }
    }

    /// The plan a SELECT used, exposed for Testable Property S6.
    #[must_use]
    pub fn plan(&self) -> Option<&QueryPlanKind> {
        match self {
            Self::ResultSet { plan, .. } => Some(plan),
            Self::RowCount(_) | Self::Ack => None,
        }
    }
}

/// Dispatches one already-parsed `Statement` against `db`/`txn`.
pub fn execute(
    db: &mut Database,
    txn: &mut TransactionManager,
    statement: Statement,
) -> Result<ExecutionResult, OxidbError> {
    match statement {
        Statement::CreateTable(stmt) => ddl::create_table(db, stmt),
        Statement::CreateIndex(stmt) => ddl::create_index(db, stmt),
        Statement::Insert(stmt) => dml::insert(db, txn, stmt),
        Statement::Update(stmt) => dml::update(db, txn, stmt),
        Statement::Delete(stmt) => dml::delete(db, txn, stmt),
        Statement::Select(stmt) => select::select(db, stmt),
        Statement::Begin => transaction_handlers::begin(txn),
        Statement::Commit => transaction_handlers::commit(txn),
        Statement::Rollback => transaction_handlers::rollback(db, txn),
    }
}

/// Coerces a WHERE/assignment literal to the declared type of `column` on
/// `schema`, so later domain comparisons (`<`, `>`, equality against a
/// DATE or BOOLEAN column) see the right representation rather than a bare
/// text/integer literal.
pub(crate) fn coerce_literal_for_column(
    schema: &Schema,
    column: &str,
    operand: Value,
) -> Result<Value, OxidbError> {
    let col = schema
        .column(column)
        .ok_or_else(|| OxidbError::SchemaError(format!("no such column '{column}'")))?;
    operand.coerce_to(col.data_type)
}

fn map_compare_op(op: AstCompareOp) -> filter::CompareOp {
    match op {
        AstCompareOp::Eq => filter::CompareOp::Eq,
        AstCompareOp::Lt => filter::CompareOp::Lt,
        AstCompareOp::Gt => filter::CompareOp::Gt,
        AstCompareOp::Like => filter::CompareOp::Like,
    }
}

/// Resolves a single-table `WHERE`/`AND` predicate list (UPDATE, DELETE,
/// and non-JOIN SELECT) against `schema`. A table qualifier is accepted
/// only when it names `table_name` itself.
pub(crate) fn resolve_single_table_predicates(
    schema: &Schema,
    table_name: &str,
    predicates: &[PredicateClause],
) -> Result<Vec<filter::Predicate>, OxidbError> {
    predicates
        .iter()
        .map(|p| {
            if let Some(qualifier) = &p.table {
                if qualifier != table_name {
                    return Err(OxidbError::SchemaError(format!(
                        "unknown table qualifier '{qualifier}' (expected '{table_name}')"
                    )));
                }
            }
            let operand = coerce_literal_for_column(schema, &p.column, p.operand.clone())?;
            Ok(filter::Predicate { column: p.column.clone(), op: map_compare_op(p.op), operand })
        })
        .collect()
}
