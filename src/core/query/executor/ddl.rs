//! `CREATE TABLE` / `CREATE INDEX` dispatch: translates the SQL AST into
//! the `Schema`/`ColumnDef` shapes `core::storage` expects.

use crate::core::common::error::OxidbError;
use crate::core::common::types::{ColumnDef, ForeignKeyRef, Schema};
use crate::core::query::executor::ExecutionResult;
use crate::core::query::sql::ast::{ColumnConstraint, CreateIndexStatement, CreateTableStatement};
use crate::core::storage::Database;

pub fn create_table(db: &mut Database, stmt: CreateTableStatement) -> Result<ExecutionResult, OxidbError> {
    let mut columns = Vec::with_capacity(stmt.columns.len());
    for decl in stmt.columns {
        let mut column = ColumnDef::new(decl.name, decl.data_type);
        for constraint in decl.constraints {
            match constraint {
                ColumnConstraint::PrimaryKey => column.primary_key = true,
                ColumnConstraint::NotNull => column.not_null = true,
                ColumnConstraint::Unique => column.unique = true,
                ColumnConstraint::ForeignKey { ref_table, ref_column, .. } => {
                    column.foreign_key = Some(ForeignKeyRef { target_table: ref_table, target_column: ref_column });
                }
            }
        }
        columns.push(column);
    }
    db.create_table(&stmt.name, Schema::new(columns))?;
    Ok(ExecutionResult::Ack)
}

pub fn create_index(db: &mut Database, stmt: CreateIndexStatement) -> Result<ExecutionResult, OxidbError> {
    db.create_index(&stmt.table, &stmt.column)?;
    Ok(ExecutionResult::Ack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::sql::parse;
    use crate::core::query::sql::Statement;

    #[test]
    fn create_table_then_create_index_round_trip() {
        let mut db = Database::new();
        let create = parse("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT UNIQUE)").unwrap();
        let Statement::CreateTable(stmt) = create else { panic!() };
        assert_eq!(create_table(&mut db, stmt).unwrap(), ExecutionResult::Ack);

        let index = parse("CREATE INDEX idx_name ON users (name)").unwrap();
        let err = match index {
            Statement::CreateIndex(stmt) => create_index(&mut db, stmt),
            _ => panic!(),
        };
        // `name` already carries an implicit UNIQUE index, so an explicit
        // one on the same column is rejected.
        assert!(err.is_err());
    }

    #[test]
    fn foreign_key_constraint_is_wired_to_the_column() {
        let mut db = Database::new();
        let Statement::CreateTable(users) =
            parse("CREATE TABLE users (id INTEGER PRIMARY KEY)").unwrap()
        else {
            panic!()
        };
        create_table(&mut db, users).unwrap();

        let Statement::CreateTable(orders) = parse(
            "CREATE TABLE orders (oid INTEGER PRIMARY KEY, uid INTEGER FOREIGN KEY (uid) REFERENCES users(id))",
        )
        .unwrap() else {
            panic!()
        };
        create_table(&mut db, orders).unwrap();
        let fk = db.table("orders").unwrap().schema.column("uid").unwrap().foreign_key.clone();
        assert_eq!(fk.unwrap().target_table, "users");
    }
}
