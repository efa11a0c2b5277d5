//! Hash-equi-join (§4.5): build the right relation into a hash map on the
//! join column, then probe with the left relation in scan order. Restricted
//! to two tables and a single equality condition.

use crate::core::common::types::{Row, RowId, Value};
use crate::core::storage::Table;
use std::collections::HashMap;

/// One row of a join's output: the concatenation of the left and right
/// tuples, alongside the source rids (useful for callers that need to
/// trace a joined row back to its inputs).
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub left_rid: RowId,
    pub right_rid: RowId,
    pub row: Row,
}

/// `SELECT … FROM left JOIN right ON left.left_col = right.right_col`.
/// Null-valued join keys never match (§4.5). Output order is L-scan ×
/// R-scan: for each left row in ascending rid order, every matching right
/// row in its original scan order.
#[must_use]
pub fn hash_equi_join(left: &Table, left_col: &str, right: &Table, right_col: &str) -> Vec<JoinedRow> {
    let Some(right_idx) = right.schema.column_index(right_col) else { return Vec::new() };
    let Some(left_idx) = left.schema.column_index(left_col) else { return Vec::new() };

    let mut build: HashMap<Value, Vec<(RowId, &Row)>> = HashMap::new();
    for (rid, row) in right.scan() {
        let key = &row[right_idx];
        if key.is_null() {
            continue;
        }
        build.entry(key.clone()).or_default().push((rid, row));
    }

    let mut out = Vec::new();
    for (left_rid, left_row) in left.scan() {
        let key = &left_row[left_idx];
        if key.is_null() {
            continue;
        }
        if let Some(matches) = build.get(key) {
            for &(right_rid, right_row) in matches {
                let mut combined = left_row.clone();
                combined.extend(right_row.iter().cloned());
                out.push(JoinedRow { left_rid, right_rid, row: combined });
            }
        }
    }
    out
}

/// A naive nested-loop join over the same equality predicate, used by
/// tests to check join equivalence (Testable Property 10) modulo the
/// output order `hash_equi_join` defines.
#[must_use]
pub fn nested_loop_join(left: &Table, left_col: &str, right: &Table, right_col: &str) -> Vec<JoinedRow> {
    let Some(right_idx) = right.schema.column_index(right_col) else { return Vec::new() };
    let Some(left_idx) = left.schema.column_index(left_col) else { return Vec::new() };
    let mut out = Vec::new();
    for (left_rid, left_row) in left.scan() {
        let left_key = &left_row[left_idx];
        if left_key.is_null() {
            continue;
        }
        for (right_rid, right_row) in right.scan() {
            if left_key.matches_eq(&right_row[right_idx]) {
                let mut combined = left_row.clone();
                combined.extend(right_row.iter().cloned());
                out.push(JoinedRow { left_rid, right_rid, row: combined });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::types::{ColumnDef, DataType, ForeignKeyRef, Schema};
    use crate::core::storage::Database;
    use crate::core::transaction::TransactionManager;

    fn setup() -> Database {
        let users = Schema::new(vec![
            ColumnDef { primary_key: true, ..ColumnDef::new("id", DataType::Integer) },
            ColumnDef::new("name", DataType::Text),
        ]);
        let orders = Schema::new(vec![
            ColumnDef { primary_key: true, ..ColumnDef::new("oid", DataType::Integer) },
            ColumnDef {
                foreign_key: Some(ForeignKeyRef { target_table: "users".into(), target_column: "id".into() }),
                ..ColumnDef::new("uid", DataType::Integer)
            },
        ]);
        let mut db = Database::new();
        db.create_table("users", users).unwrap();
        db.create_table("orders", orders).unwrap();
        let mut txn = TransactionManager::new();
        db.insert("users", vec![Value::Integer(1), Value::Text("Alice".into())], &mut txn).unwrap();
        db.insert("users", vec![Value::Integer(2), Value::Text("Bob".into())], &mut txn).unwrap();
        db.insert("orders", vec![Value::Integer(100), Value::Integer(1)], &mut txn).unwrap();
        db.insert("orders", vec![Value::Integer(101), Value::Integer(1)], &mut txn).unwrap();
        db.insert("orders", vec![Value::Integer(102), Value::Integer(2)], &mut txn).unwrap();
        db
    }

    #[test]
    fn join_matches_user_to_their_orders() {
        let db = setup();
        let users = db.table("users").unwrap();
        let orders = db.table("orders").unwrap();
        let joined = hash_equi_join(users, "id", orders, "uid");
        assert_eq!(joined.len(), 3);
        assert_eq!(joined[0].row[1], Value::Text("Alice".into()));
    }

    #[test]
    fn join_equals_nested_loop_modulo_order() {
        let db = setup();
        let users = db.table("users").unwrap();
        let orders = db.table("orders").unwrap();
        let mut hashed = hash_equi_join(users, "id", orders, "uid");
        let mut naive = nested_loop_join(users, "id", orders, "uid");
        let key = |j: &JoinedRow| (j.left_rid, j.right_rid);
        hashed.sort_by_key(key);
        naive.sort_by_key(key);
        assert_eq!(hashed, naive);
    }

    #[test]
    fn null_join_key_never_matches() {
        let schema_l = Schema::new(vec![ColumnDef::new("a", DataType::Integer)]);
        let schema_r = Schema::new(vec![ColumnDef::new("b", DataType::Integer)]);
        let mut db = Database::new();
        db.create_table("l", schema_l).unwrap();
        db.create_table("r", schema_r).unwrap();
        let mut txn = TransactionManager::new();
        db.insert("l", vec![Value::Null], &mut txn).unwrap();
        db.insert("r", vec![Value::Null], &mut txn).unwrap();
        let joined = hash_equi_join(db.table("l").unwrap(), "a", db.table("r").unwrap(), "b");
        assert!(joined.is_empty());
    }
}
