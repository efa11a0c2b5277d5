//! The Storage Engine's row container: a typed table with stable row
//! identity, constraint-check primitives, and the set of hash indexes kept
//! consistent with every mutation (§4.2).

use crate::core::common::encoding::{Deserialize as Decode, Serialize as Encode};
use crate::core::common::error::OxidbError;
use crate::core::common::types::{ColumnDef, Row, RowId, Schema, Value};
use crate::core::indexing::HashIndex;
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// A typed table: ordered columns, a row store keyed by stable `RowId`, and
/// every index declared on it (implicit PK/UNIQUE indexes plus any created
/// explicitly via `CREATE INDEX`).
///
/// The row store is a `BTreeMap<RowId, Row>` rather than a `HashMap` so
/// `scan()`'s ascending-rid order falls out of iteration order for free.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub schema: Schema,
    rows: BTreeMap<RowId, Row>,
    indexes: Vec<HashIndex>,
    next_rid: u64,
}

impl Table {
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        let mut table = Self { name: name.into(), schema, rows: BTreeMap::new(), indexes: Vec::new(), next_rid: 0 };
        for col in table.schema.columns.clone() {
            if col.is_unique() {
                table.indexes.push(HashIndex::new(col.name.clone(), true));
            }
        }
        table
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Ascending-rid iteration over every live row.
    pub fn scan(&self) -> impl Iterator<Item = (RowId, &Row)> {
        self.rows.iter().map(|(rid, row)| (*rid, row))
    }

    #[must_use]
    pub fn get(&self, rid: RowId) -> Option<&Row> {
        self.rows.get(&rid)
    }

    #[must_use]
    pub fn indexes(&self) -> &[HashIndex] {
        &self.indexes
    }

    #[must_use]
    pub fn index_for_column(&self, column: &str) -> Option<&HashIndex> {
        self.indexes.iter().find(|idx| idx.column == column)
    }

    /// `CREATE INDEX <name> ON <table>(<col>)`. Backfills from every row
    /// currently in the table. Fails with `SchemaError` if the column
    /// already carries an index (implicit PK/UNIQUE or a prior explicit
    /// one) or does not exist.
    pub fn create_index(&mut self, column: &str) -> Result<(), OxidbError> {
        if self.schema.column(column).is_none() {
            return Err(OxidbError::SchemaError(format!(
                "no such column '{column}' on table '{}'",
                self.name
            )));
        }
        if self.index_for_column(column).is_some() {
            return Err(OxidbError::SchemaError(format!(
                "table '{}' already has an index on '{column}'",
                self.name
            )));
        }
        let col_idx = self.schema.column_index(column).expect("checked above");
        let mut index = HashIndex::new(column, false);
        for (rid, row) in &self.rows {
            index.add(row[col_idx].clone(), *rid)?;
        }
        self.indexes.push(index);
        Ok(())
    }

    /// Steps (a)-(c) of §4.2's insert pre-check: arity, per-column
    /// coercion, NOT NULL.
    pub fn validate_new_row(&self, values: Vec<Value>) -> Result<Row, OxidbError> {
        self.schema.coerce_and_check_row(values)
    }

    /// Step (d): for every PK/UNIQUE column, reject if `row`'s value is
    /// already present under a different rid than `exclude` (an UPDATE's
    /// own current rid does not conflict with itself).
    pub fn check_unique(&self, row: &Row, exclude: Option<RowId>) -> Result<(), OxidbError> {
        for (col_idx, col) in self.schema.columns.iter().enumerate() {
            if !col.is_unique() || row[col_idx].is_null() {
                continue;
            }
            if let Some(index) = self.index_for_column(&col.name) {
                let conflicting = index
                    .lookup_eq(&row[col_idx])
                    .into_iter()
                    .any(|rid| Some(rid) != exclude);
                if conflicting {
                    return Err(OxidbError::ConstraintViolation(format!(
                        "duplicate value for unique column '{}' on table '{}'",
                        col.name, self.name
                    )));
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn foreign_key_columns(&self) -> Vec<&ColumnDef> {
        self.schema.columns.iter().filter(|c| c.foreign_key.is_some()).collect()
    }

    #[must_use]
    pub fn next_rid_preview(&self) -> u64 {
        self.next_rid
    }

    pub fn alloc_rid(&mut self) -> RowId {
        let rid = RowId(self.next_rid);
        self.next_rid += 1;
        rid
    }

    /// Inserts `row` at `rid` and updates every index. Assumes all
    /// pre-checks already passed; never itself rejects (the unique
    /// double-check inside `HashIndex::add` is purely defensive, per §4.3).
    pub fn raw_insert(&mut self, rid: RowId, row: Row) -> Result<(), OxidbError> {
        for (col_idx, col) in self.schema.columns.iter().enumerate() {
            if let Some(index) = self.indexes.iter_mut().find(|i| i.column == col.name) {
                index.add(row[col_idx].clone(), rid)?;
            }
        }
        self.rows.insert(rid, row);
        Ok(())
    }

    /// Removes the row at `rid` from the store and every index. Returns the
    /// removed tuple (needed by the caller to build a `DeleteUndo`).
    pub fn raw_remove(&mut self, rid: RowId) -> Option<Row> {
        let row = self.rows.remove(&rid)?;
        for (col_idx, col) in self.schema.columns.iter().enumerate() {
            if let Some(index) = self.indexes.iter_mut().find(|i| i.column == col.name) {
                index.remove(&row[col_idx], rid);
            }
        }
        Some(row)
    }

    /// Replaces the row at `rid` with `new_row`, reconciling only the
    /// indexes whose column actually changed value. Returns the pre-image
    /// tuple (needed by the caller to build an `UpdateUndo`).
    pub fn raw_replace(&mut self, rid: RowId, new_row: Row) -> Result<Option<Row>, OxidbError> {
        let Some(old_row) = self.rows.get(&rid).cloned() else { return Ok(None) };
        for (col_idx, col) in self.schema.columns.iter().enumerate() {
            if old_row[col_idx] == new_row[col_idx] {
                continue;
            }
            if let Some(index) = self.indexes.iter_mut().find(|i| i.column == col.name) {
                index.remove(&old_row[col_idx], rid);
                index.add(new_row[col_idx].clone(), rid)?;
            }
        }
        self.rows.insert(rid, new_row);
        Ok(Some(old_row))
    }

    /// Every index's `(value, rid)` set, compared against a fresh scan, to
    /// verify Testable Property 4 (index consistency).
    #[must_use]
    pub fn index_consistency_holds(&self) -> bool {
        for index in &self.indexes {
            let Some(col_idx) = self.schema.column_index(&index.column) else { return false };
            for (value, rid) in index.iter_entries() {
                match self.rows.get(rid) {
                    Some(row) if &row[col_idx] == value => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

impl Encode for Table {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        self.name.serialize(writer)?;
        self.schema.serialize(writer)?;
        self.next_rid.serialize(writer)?;
        let rows: Vec<(RowId, Row)> = self.rows.iter().map(|(r, row)| (*r, row.clone())).collect();
        rows.serialize(writer)?;
        self.indexes.serialize(writer)
    }
}

impl Decode for Table {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        let name = String::deserialize(reader)?;
        let schema = Schema::deserialize(reader)?;
        let next_rid = u64::deserialize(reader)?;
        let rows_vec = Vec::<(RowId, Row)>::deserialize(reader)?;
        let indexes = Vec::<HashIndex>::deserialize(reader)?;
        let rows: BTreeMap<RowId, Row> = rows_vec.into_iter().collect();
        Ok(Self { name, schema, rows, indexes, next_rid })
    }
}
