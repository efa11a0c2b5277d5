//! `BEGIN` / `COMMIT` / `ROLLBACK` dispatch (§4.4): thin wrappers over
//! `TransactionManager` plus, for ROLLBACK, replaying the drained undo log
//! back through storage.

use crate::core::common::error::OxidbError;
use crate::core::query::executor::ExecutionResult;
use crate::core::storage::Database;
use crate::core::transaction::TransactionManager;

pub fn begin(txn: &mut TransactionManager) -> Result<ExecutionResult, OxidbError> {
    txn.begin()?;
    Ok(ExecutionResult::Ack)
}

pub fn commit(txn: &mut TransactionManager) -> Result<ExecutionResult, OxidbError> {
    txn.commit();
    Ok(ExecutionResult::Ack)
}

/// Drains the undo log in reverse-of-recording order (`TransactionManager::rollback`
/// already returns it that way) and replays each entry through storage.
pub fn rollback(db: &mut Database, txn: &mut TransactionManager) -> Result<ExecutionResult, OxidbError> {
    for entry in txn.rollback() {
        db.apply_undo(entry)?;
    }
    Ok(ExecutionResult::Ack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::types::{ColumnDef, DataType, Schema, Value};

    fn users_schema() -> Schema {
        Schema::new(vec![ColumnDef { primary_key: true, ..ColumnDef::new("id", DataType::Integer) }])
    }

    #[test]
    fn begin_commit_discards_undo_log() {
        let mut db = Database::new();
        db.create_table("users", users_schema()).unwrap();
        let mut txn = TransactionManager::new();
        begin(&mut txn).unwrap();
        db.insert("users", vec![Value::Integer(1)], &mut txn).unwrap();
        commit(&mut txn).unwrap();
        assert!(!txn.is_active());
        assert_eq!(db.table("users").unwrap().row_count(), 1);
    }

    #[test]
    fn begin_insert_rollback_undoes_the_insert() {
        let mut db = Database::new();
        db.create_table("users", users_schema()).unwrap();
        let mut txn = TransactionManager::new();
        begin(&mut txn).unwrap();
        db.insert("users", vec![Value::Integer(1)], &mut txn).unwrap();
        rollback(&mut db, &mut txn).unwrap();
        assert_eq!(db.table("users").unwrap().row_count(), 0);
        assert!(!txn.is_active());
    }

    #[test]
    fn nested_begin_is_a_transaction_error() {
        let mut txn = TransactionManager::new();
        begin(&mut txn).unwrap();
        assert!(matches!(begin(&mut txn), Err(OxidbError::TransactionError(_))));
    }
}
