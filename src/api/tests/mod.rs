//! End-to-end tests driving `Database::execute` with SQL text only, one
//! module per concrete scenario this engine is meant to satisfy.

use crate::api::Database;
use crate::core::common::error::OxidbError;
use crate::core::common::types::Value;
use crate::core::query::filter::QueryPlanKind;

fn rows_of(result: &crate::api::ExecutionResult) -> Vec<Vec<Value>> {
    result.rows().to_vec()
}

#[test]
fn crud_round_trip() {
    let mut db = Database::new();
    db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT UNIQUE)").unwrap();
    db.execute("INSERT INTO users VALUES (1, 'Alice')").unwrap();
    db.execute("INSERT INTO users VALUES (2, 'Bob')").unwrap();

    let bob = db.execute("SELECT * FROM users WHERE id = 2").unwrap();
    assert_eq!(rows_of(&bob), vec![vec![Value::Integer(2), Value::Text("Bob".into())]]);

    let updated = db.execute("UPDATE users SET name = 'Alicia' WHERE id = 1").unwrap();
    assert_eq!(updated.row_count(), 1);
    let renamed = db.execute("SELECT name FROM users WHERE id = 1").unwrap();
    assert_eq!(rows_of(&renamed), vec![vec![Value::Text("Alicia".into())]]);

    let deleted = db.execute("DELETE FROM users WHERE id = 2").unwrap();
    assert_eq!(deleted.row_count(), 1);
    let remaining = db.execute("SELECT * FROM users").unwrap();
    assert_eq!(rows_of(&remaining), vec![vec![Value::Integer(1), Value::Text("Alicia".into())]]);
}

#[test]
fn unique_collision_leaves_existing_row_unchanged() {
    let mut db = Database::new();
    db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT UNIQUE)").unwrap();
    db.execute("INSERT INTO users VALUES (1, 'Alice')").unwrap();
    db.execute("INSERT INTO users VALUES (2, 'Bob')").unwrap();

    let err = db.execute("INSERT INTO users VALUES (3, 'Alicia')").unwrap_err();
    assert!(matches!(err, OxidbError::ConstraintViolation(_)));

    let scan = db.execute("SELECT * FROM users").unwrap();
    assert_eq!(scan.row_count(), 2);
}

#[test]
fn referential_integrity_blocks_orphan_insert_and_referenced_delete() {
    let mut db = Database::new();
    db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT UNIQUE)").unwrap();
    db.execute(
        "CREATE TABLE orders (oid INTEGER PRIMARY KEY, uid INTEGER, FOREIGN KEY (uid) REFERENCES users(id))",
    )
    .unwrap();
    db.execute("INSERT INTO users VALUES (1, 'Alice')").unwrap();

    db.execute("INSERT INTO orders VALUES (100, 1)").unwrap();
    let err = db.execute("INSERT INTO orders VALUES (101, 9)").unwrap_err();
    assert!(matches!(err, OxidbError::ReferentialIntegrityError(_)));

    let err = db.execute("DELETE FROM users WHERE id = 1").unwrap_err();
    assert!(matches!(err, OxidbError::ReferentialIntegrityError(_)));
}

#[test]
fn transaction_rollback_restores_pre_begin_state() {
    let mut db = Database::new();
    db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT UNIQUE)").unwrap();
    db.execute("INSERT INTO users VALUES (1, 'Alice')").unwrap();

    let before = rows_of(&db.execute("SELECT * FROM users").unwrap());

    db.begin().unwrap();
    db.execute("INSERT INTO users VALUES (2, 'Bob')").unwrap();
    db.execute("INSERT INTO users VALUES (3, 'Carol')").unwrap();
    db.rollback().unwrap();

    let after = rows_of(&db.execute("SELECT * FROM users").unwrap());
    assert_eq!(before, after);
    assert!(!db.is_in_transaction());
}

#[test]
fn hash_join_and_group_aggregate() {
    let mut db = Database::new();
    db.execute("CREATE TABLE tx (amt REAL, type TEXT)").unwrap();
    db.execute("INSERT INTO tx VALUES (100, 'CR')").unwrap();
    db.execute("INSERT INTO tx VALUES (50, 'DR')").unwrap();
    db.execute("INSERT INTO tx VALUES (200, 'CR')").unwrap();

    let result = db.execute("SELECT type, COUNT(*), SUM(amt) FROM tx GROUP BY type").unwrap();
    assert_eq!(
        rows_of(&result),
        vec![
            vec![Value::Text("CR".into()), Value::Integer(2), Value::Real(300.0)],
            vec![Value::Text("DR".into()), Value::Integer(1), Value::Real(50.0)],
        ]
    );
}

#[test]
fn equality_predicate_on_an_indexed_column_uses_index_scan() {
    let mut db = Database::new();
    db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)").unwrap();
    db.execute("CREATE INDEX idx_name ON users(name)").unwrap();
    db.execute("INSERT INTO users VALUES (1, 'Alicia')").unwrap();
    db.execute("INSERT INTO users VALUES (2, 'Bob')").unwrap();

    let result = db.execute("SELECT * FROM users WHERE name = 'Alicia'").unwrap();
    assert!(matches!(result.plan(), Some(QueryPlanKind::IndexScan { .. })));
    assert_eq!(result.row_count(), 1);

    let scan = db.execute("SELECT * FROM users WHERE id > 0").unwrap();
    assert_eq!(scan.plan(), Some(&QueryPlanKind::FullScan));
}
