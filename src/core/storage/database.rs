//! The whole-database container: every table plus the cross-table
//! referential-integrity checks that a single `Table` cannot perform on
//! its own (§3, §4.2). Transaction participation is dependency-injected:
//! callers pass a `&mut TransactionManager` so this module never depends
//! on `core::transaction` for anything but the undo-entry data types.

use crate::core::common::encoding::{Deserialize as Decode, Serialize as Encode};
use crate::core::common::error::OxidbError;
use crate::core::common::types::{Row, RowId, Schema, Value};
use crate::core::storage::table::Table;
use crate::core::transaction::{TransactionManager, UndoEntry};
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// A mapping from table name to `Table`. The transaction manager is owned
/// alongside it by `api::Database`, not embedded here, so storage and
/// transaction concerns stay independently testable.
#[derive(Debug, Clone, Default)]
pub struct Database {
    tables: BTreeMap<String, Table>,
}

impl Database {
    #[must_use]
    pub fn new() -> Self {
        Self { tables: BTreeMap::new() }
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    #[must_use]
    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// `CREATE TABLE`. Fails with `SchemaError` on a duplicate name, or if
    /// a declared FOREIGN KEY names a table/column that does not (yet)
    /// exist, or that isn't the target's PRIMARY KEY (§3: FK resolution is
    /// always against a PK).
    pub fn create_table(&mut self, name: &str, schema: Schema) -> Result<(), OxidbError> {
        if self.tables.contains_key(name) {
            return Err(OxidbError::SchemaError(format!("table '{name}' already exists")));
        }
        for col in &schema.columns {
            if let Some(fk) = &col.foreign_key {
                let target = self.tables.get(&fk.target_table).ok_or_else(|| {
                    OxidbError::SchemaError(format!(
                        "FOREIGN KEY references unknown table '{}'",
                        fk.target_table
                    ))
                })?;
                let target_col = target.schema.column(&fk.target_column).ok_or_else(|| {
                    OxidbError::SchemaError(format!(
                        "FOREIGN KEY references unknown column '{}.{}'",
                        fk.target_table, fk.target_column
                    ))
                })?;
                if !target_col.primary_key {
                    return Err(OxidbError::SchemaError(format!(
                        "FOREIGN KEY target '{}.{}' is not a PRIMARY KEY",
                        fk.target_table, fk.target_column
                    )));
                }
            }
        }
        self.tables.insert(name.to_string(), Table::new(name, schema));
        Ok(())
    }

    /// `CREATE INDEX <name> ON <table>(<col>)`.
    pub fn create_index(&mut self, table: &str, column: &str) -> Result<(), OxidbError> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| OxidbError::SchemaError(format!("no such table '{table}'")))?
            .create_index(column)
    }

    fn fk_checked_row(&self, table: &Table, row: &Row) -> Result<(), OxidbError> {
        for col in table.foreign_key_columns() {
            let col_idx = table.schema.column_index(&col.name).expect("column exists");
            let value = &row[col_idx];
            if value.is_null() {
                continue;
            }
            let fk = col.foreign_key.as_ref().expect("filtered by foreign_key_columns");
            let target = self.tables.get(&fk.target_table).ok_or_else(|| {
                OxidbError::ReferentialIntegrityError(format!(
                    "FK target table '{}' does not exist",
                    fk.target_table
                ))
            })?;
            let present = target
                .index_for_column(&fk.target_column)
                .map(|idx| idx.contains_value(value))
                .unwrap_or_else(|| {
                    let col_idx = target.schema.column_index(&fk.target_column);
                    col_idx.is_some_and(|ci| target.scan().any(|(_, r)| &r[ci] == value))
                });
            if !present {
                return Err(OxidbError::ReferentialIntegrityError(format!(
                    "value {value:?} has no matching row in {}.{}",
                    fk.target_table, fk.target_column
                )));
            }
        }
        Ok(())
    }

    /// §4.2 `insert`: arity/type/not-null (b,c) via `Table::validate_new_row`,
    /// uniqueness (d), FK (e), rid allocation (f), undo recording (g), then
    /// mutation (h,i).
    pub fn insert(
        &mut self,
        table_name: &str,
        values: Vec<Value>,
        txn: &mut TransactionManager,
    ) -> Result<RowId, OxidbError> {
        let table = self
            .tables
            .get(table_name)
            .ok_or_else(|| OxidbError::SchemaError(format!("no such table '{table_name}'")))?;
        let row = table.validate_new_row(values)?;
        table.check_unique(&row, None)?;
        self.fk_checked_row(table, &row)?;

        let table = self.tables.get_mut(table_name).expect("checked above");
        let rid = table.alloc_rid();
        txn.record(UndoEntry::InsertUndo { table: table_name.to_string(), rid });
        table.raw_insert(rid, row)?;
        Ok(rid)
    }

    /// §4.2 `update` over a pre-computed candidate set (the filter
    /// protocol, §4.5, lives in `core::query` and is evaluated by the
    /// caller; this method only needs rids). `assignments` is `(column
    /// index, new literal value)` pairs. Returns the number of rows
    /// modified.
    pub fn update_rows(
        &mut self,
        table_name: &str,
        candidates: &[RowId],
        assignments: &[(usize, Value)],
        txn: &mut TransactionManager,
    ) -> Result<usize, OxidbError> {
        let table = self
            .tables
            .get(table_name)
            .ok_or_else(|| OxidbError::SchemaError(format!("no such table '{table_name}'")))?;

        let mut planned = Vec::with_capacity(candidates.len());
        for &rid in candidates {
            let Some(old_row) = table.get(rid) else { continue };
            let mut new_values = old_row.clone();
            for (col_idx, value) in assignments {
                new_values[*col_idx] = value.clone();
            }
            let new_row = table.schema.coerce_and_check_row(new_values)?;
            table.check_unique(&new_row, Some(rid))?;
            self.fk_checked_row(table, &new_row)?;
            planned.push((rid, new_row));
        }

        let table = self.tables.get_mut(table_name).expect("checked above");
        let mut modified = 0usize;
        for (rid, new_row) in planned {
            if let Some(pre_row) = table.raw_replace(rid, new_row)? {
                txn.record(UndoEntry::UpdateUndo { table: table_name.to_string(), rid, pre_row });
                modified += 1;
            }
        }
        Ok(modified)
    }

    /// §4.2 `delete` over a pre-computed candidate set. Verifies, for every
    /// candidate, that no FK in any other table currently references it,
    /// failing the whole batch (no row removed) before any mutation if any
    /// one candidate is referenced.
    pub fn delete_rows(
        &mut self,
        table_name: &str,
        candidates: &[RowId],
        txn: &mut TransactionManager,
    ) -> Result<usize, OxidbError> {
        let table = self
            .tables
            .get(table_name)
            .ok_or_else(|| OxidbError::SchemaError(format!("no such table '{table_name}'")))?;

        for &rid in candidates {
            let Some(row) = table.get(rid) else { continue };
            self.reject_if_referenced(table_name, &table.schema, row)?;
        }

        let table = self.tables.get_mut(table_name).expect("checked above");
        let mut removed = 0usize;
        for &rid in candidates {
            if let Some(row) = table.raw_remove(rid) {
                txn.record(UndoEntry::DeleteUndo { table: table_name.to_string(), rid, row });
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Scans every other table's FK columns for a value matching `row`'s
    /// value in its own PK/UNIQUE columns, per §4.2's delete pre-check.
    fn reject_if_referenced(&self, table_name: &str, schema: &Schema, row: &Row) -> Result<(), OxidbError> {
        for (other_name, other) in &self.tables {
            for col in other.foreign_key_columns() {
                let fk = col.foreign_key.as_ref().expect("filtered");
                if fk.target_table != table_name {
                    continue;
                }
                let Some(target_col_idx) = schema.column_index(&fk.target_column) else { continue };
                let target_value = &row[target_col_idx];
                if target_value.is_null() {
                    continue;
                }
                let col_idx = other.schema.column_index(&col.name).expect("column exists");
                let referenced = other.scan().any(|(_, r)| &r[col_idx] == target_value);
                if referenced {
                    return Err(OxidbError::ReferentialIntegrityError(format!(
                        "row is referenced by {other_name}.{}",
                        col.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Re-checks every invariant in §3 against the current state: row
    /// arity/type/NOT NULL, index-to-row consistency, and FK referential
    /// integrity. Used by `core::persistence::load` after decoding a
    /// snapshot, since a hand-rolled wire format has no structural
    /// guarantee the bytes it decoded actually describe a legal database.
    pub fn verify_invariants(&self) -> Result<(), OxidbError> {
        for table in self.tables.values() {
            for (rid, row) in table.scan() {
                table.schema.coerce_and_check_row(row.clone()).map_err(|e| {
                    OxidbError::CorruptSnapshot(format!(
                        "table '{}' row {rid}: {e}",
                        table.name
                    ))
                })?;
                self.fk_checked_row(table, row).map_err(|e| {
                    OxidbError::CorruptSnapshot(format!(
                        "table '{}' row {rid}: {e}",
                        table.name
                    ))
                })?;
            }
            if !table.index_consistency_holds() {
                return Err(OxidbError::CorruptSnapshot(format!(
                    "table '{}' has inconsistent index entries",
                    table.name
                )));
            }
        }
        Ok(())
    }

    /// Applies one undo entry during `ROLLBACK`. A failure here leaves the
    /// database in the documented "poisoned" partial state described in
    /// §4.4 — it should never arise for a well-formed undo log, but is
    /// surfaced rather than silently ignored.
    pub fn apply_undo(&mut self, entry: UndoEntry) -> Result<(), OxidbError> {
        match entry {
            UndoEntry::InsertUndo { table, rid } => {
                let t = self
                    .tables
                    .get_mut(&table)
                    .ok_or_else(|| OxidbError::TransactionError(format!("undo: no such table '{table}'")))?;
                t.raw_remove(rid);
                Ok(())
            }
            UndoEntry::UpdateUndo { table, rid, pre_row } => {
                let t = self
                    .tables
                    .get_mut(&table)
                    .ok_or_else(|| OxidbError::TransactionError(format!("undo: no such table '{table}'")))?;
                t.raw_replace(rid, pre_row)?;
                Ok(())
            }
            UndoEntry::DeleteUndo { table, rid, row } => {
                let t = self
                    .tables
                    .get_mut(&table)
                    .ok_or_else(|| OxidbError::TransactionError(format!("undo: no such table '{table}'")))?;
                t.raw_insert(rid, row)
            }
        }
    }
}

impl Encode for Database {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        let tables: Vec<Table> = self.tables.values().cloned().collect();
        tables.serialize(writer)
    }
}

impl Decode for Database {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        let tables = Vec::<Table>::deserialize(reader)?;
        let mut map = BTreeMap::new();
        for table in tables {
            map.insert(table.name.clone(), table);
        }
        Ok(Self { tables: map })
    }
}
