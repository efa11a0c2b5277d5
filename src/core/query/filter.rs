//! The filter protocol (§4.5) and the Index Manager's optimizer hook
//! (§4.3): index-driven candidate selection first, then row-wise predicate
//! application over the candidates.

use crate::core::common::error::OxidbError;
use crate::core::common::types::{Row, RowId, Schema, Value};
use crate::core::storage::Table;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
    Gt,
    Like,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: CompareOp,
    pub operand: Value,
}

/// Which path the evaluator took for a given filter, exposed so callers
/// (and Testable Property S6) can observe index use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlanKind {
    IndexScan { index_name: String },
    FullScan,
}

/// Evaluates `predicates` (an implicit AND conjunction) against `table`,
/// returning the matching rids in ascending order and the plan that was
/// used. An equality conjunct over an indexed column substitutes a full
/// scan with one index lookup; every remaining conjunct (including the
/// indexed one, redundantly but harmlessly) is then applied row-wise.
pub fn select(table: &Table, predicates: &[Predicate]) -> Result<(Vec<RowId>, QueryPlanKind), OxidbError> {
    let indexable = predicates.iter().find(|p| {
        p.op == CompareOp::Eq && table.index_for_column(&p.column).is_some() && !p.operand.is_null()
    });

    let (mut candidates, plan): (Vec<RowId>, QueryPlanKind) = match indexable {
        Some(pred) => {
            let index = table.index_for_column(&pred.column).expect("checked above");
            let rids: HashSet<RowId> = index.lookup_eq(&pred.operand);
            let mut rids: Vec<RowId> = rids.into_iter().collect();
            rids.sort_by_key(|r| r.0);
            (rids, QueryPlanKind::IndexScan { index_name: pred.column.clone() })
        }
        None => (table.scan().map(|(rid, _)| rid).collect(), QueryPlanKind::FullScan),
    };

    candidates.retain(|&rid| {
        let row = table.get(rid).expect("candidate rid must exist");
        matches(row, &table.schema, predicates).unwrap_or(false)
    });
    candidates.sort_by_key(|r| r.0);

    // Surface schema errors (unknown column in a predicate) explicitly
    // rather than swallowing them via `unwrap_or(false)` above.
    for pred in predicates {
        if table.schema.column_index(&pred.column).is_none() {
            return Err(OxidbError::SchemaError(format!(
                "no such column '{}' on table '{}'",
                pred.column, table.name
            )));
        }
    }

    Ok((candidates, plan))
}

/// Row-wise predicate application, usable standalone (e.g. post-join
/// WHERE clauses applied to a joined tuple against a synthetic schema).
pub fn matches(row: &Row, schema: &Schema, predicates: &[Predicate]) -> Result<bool, OxidbError> {
    for pred in predicates {
        let col_idx = schema.column_index(&pred.column).ok_or_else(|| {
            OxidbError::SchemaError(format!("no such column '{}'", pred.column))
        })?;
        if !predicate_matches(&row[col_idx], pred) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn predicate_matches(value: &Value, pred: &Predicate) -> bool {
    compare(value, pred.op, &pred.operand)
}

/// The comparison core of the filter protocol, factored out so callers that
/// already hold a resolved column index (e.g. the SELECT executor applying
/// a post-join `WHERE` to a joined tuple, which has no single `Schema` to
/// resolve column names against) can reuse it without a `Predicate`.
#[must_use]
pub fn compare(value: &Value, op: CompareOp, operand: &Value) -> bool {
    match op {
        CompareOp::Eq => value.matches_eq(operand),
        CompareOp::Lt => !value.is_null() && value.domain_cmp(operand) == Some(std::cmp::Ordering::Less),
        CompareOp::Gt => {
            !value.is_null() && value.domain_cmp(operand) == Some(std::cmp::Ordering::Greater)
        }
        CompareOp::Like => match (value, operand) {
            (Value::Text(s), Value::Text(p)) => Value::like_matches(s, p),
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::types::{ColumnDef, DataType};
    use crate::core::storage::database::Database;
    use crate::core::transaction::TransactionManager;

    fn setup() -> Database {
        let schema = Schema::new(vec![
            ColumnDef { primary_key: true, ..ColumnDef::new("id", DataType::Integer) },
            ColumnDef::new("name", DataType::Text),
        ]);
        let mut db = Database::new();
        db.create_table("users", schema).unwrap();
        let mut txn = TransactionManager::new();
        db.insert("users", vec![Value::Integer(1), Value::Text("Alice".into())], &mut txn).unwrap();
        db.insert("users", vec![Value::Integer(2), Value::Text("Bob".into())], &mut txn).unwrap();
        db
    }

    #[test]
    fn equality_on_pk_uses_index_scan() {
        let db = setup();
        let table = db.table("users").unwrap();
        let preds = vec![Predicate { column: "id".into(), op: CompareOp::Eq, operand: Value::Integer(2) }];
        let (rids, plan) = select(table, &preds).unwrap();
        assert_eq!(rids.len(), 1);
        assert!(matches!(plan, QueryPlanKind::IndexScan { .. }));
    }

    #[test]
    fn unindexed_predicate_uses_full_scan() {
        let db = setup();
        let table = db.table("users").unwrap();
        let preds = vec![Predicate { column: "name".into(), op: CompareOp::Eq, operand: Value::Text("Bob".into()) }];
        let (rids, plan) = select(table, &preds).unwrap();
        assert_eq!(rids.len(), 1);
        assert_eq!(plan, QueryPlanKind::FullScan);
    }

    #[test]
    fn no_predicates_returns_every_row() {
        let db = setup();
        let table = db.table("users").unwrap();
        let (rids, plan) = select(table, &[]).unwrap();
        assert_eq!(rids.len(), 2);
        assert_eq!(plan, QueryPlanKind::FullScan);
    }

    #[test]
    fn null_comparisons_never_match() {
        let row = vec![Value::Null];
        let schema = Schema::new(vec![ColumnDef::new("x", DataType::Integer)]);
        let eq = Predicate { column: "x".into(), op: CompareOp::Eq, operand: Value::Integer(1) };
        let lt = Predicate { column: "x".into(), op: CompareOp::Lt, operand: Value::Integer(1) };
        assert!(!matches(&row, &schema, &[eq]).unwrap());
        assert!(!matches(&row, &schema, &[lt]).unwrap());
    }

    #[test]
    fn unknown_column_is_schema_error() {
        let db = setup();
        let table = db.table("users").unwrap();
        let preds = vec![Predicate { column: "nope".into(), op: CompareOp::Eq, operand: Value::Integer(1) }];
        assert!(matches!(select(table, &preds), Err(OxidbError::SchemaError(_))));
    }
}
