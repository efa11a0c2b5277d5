//! Column and schema definitions, plus the arity/type/not-null validation
//! shared between `insert` and `update` (§4.2: the two call sites must
//! agree bit-for-bit on what counts as a violation).

use crate::core::common::encoding::{Deserialize as Decode, Serialize as Encode};
use crate::core::common::error::OxidbError;
use std::io::{Read, Write};

use super::data_type::DataType;
use super::value::Value;

/// A named relation from one column to a column of another table, resolved
/// via the target table's PK index at validation time (never a pointer).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ForeignKeyRef {
    pub target_table: String,
    pub target_column: String,
}

impl Encode for ForeignKeyRef {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        self.target_table.serialize(writer)?;
        self.target_column.serialize(writer)
    }
}
impl Decode for ForeignKeyRef {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        Ok(Self {
            target_table: String::deserialize(reader)?,
            target_column: String::deserialize(reader)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub not_null: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub foreign_key: Option<ForeignKeyRef>,
}

impl ColumnDef {
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            not_null: false,
            primary_key: false,
            unique: false,
            foreign_key: None,
        }
    }

    /// A PRIMARY KEY column is implicitly UNIQUE and NOT NULL.
    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.unique || self.primary_key
    }

    #[must_use]
    pub const fn is_not_null(&self) -> bool {
        self.not_null || self.primary_key
    }
}

impl Encode for ColumnDef {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        self.name.serialize(writer)?;
        self.data_type.serialize(writer)?;
        self.not_null.serialize(writer)?;
        self.primary_key.serialize(writer)?;
        self.unique.serialize(writer)?;
        match &self.foreign_key {
            None => 0u8.serialize(writer),
            Some(fk) => {
                1u8.serialize(writer)?;
                fk.serialize(writer)
            }
        }
    }
}
impl Decode for ColumnDef {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        let name = String::deserialize(reader)?;
        let data_type = DataType::deserialize(reader)?;
        let not_null = bool::deserialize(reader)?;
        let primary_key = bool::deserialize(reader)?;
        let unique = bool::deserialize(reader)?;
        let foreign_key = match u8::deserialize(reader)? {
            0 => None,
            1 => Some(ForeignKeyRef::deserialize(reader)?),
            tag => return Err(OxidbError::CorruptSnapshot(format!("invalid FK tag {tag}"))),
        };
        Ok(Self { name, data_type, not_null, primary_key, unique, foreign_key })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Schema {
    pub columns: Vec<ColumnDef>,
}

impl Schema {
    #[must_use]
    pub const fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn primary_key_column(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Arity check (a), per-column type coercion (b), and NOT NULL check
    /// (c) from §4.2's insert/update pre-check sequence. Uniqueness (d) and
    /// FK (e) checks need index access and live on `Table`.
    pub fn coerce_and_check_row(&self, values: Vec<Value>) -> Result<Vec<Value>, OxidbError> {
        if values.len() != self.columns.len() {
            return Err(OxidbError::ArityError(format!(
                "expected {} values, got {}",
                self.columns.len(),
                values.len()
            )));
        }
        let mut out = Vec::with_capacity(values.len());
        for (col, value) in self.columns.iter().zip(values) {
            let coerced = value.coerce_to(col.data_type)?;
            if coerced.is_null() && col.is_not_null() {
                return Err(OxidbError::ConstraintViolation(format!(
                    "column '{}' is NOT NULL",
                    col.name
                )));
            }
            out.push(coerced);
        }
        Ok(out)
    }
}

impl Encode for Schema {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        self.columns.serialize(writer)
    }
}
impl Decode for Schema {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        Ok(Self { columns: Vec::<ColumnDef>::deserialize(reader)? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        Schema::new(vec![
            ColumnDef { primary_key: true, ..ColumnDef::new("id", DataType::Integer) },
            ColumnDef { unique: true, ..ColumnDef::new("name", DataType::Text) },
            ColumnDef::new("age", DataType::Integer),
        ])
    }

    #[test]
    fn primary_key_is_implicitly_not_null_and_unique() {
        let schema = sample_schema();
        let id_col = schema.column("id").unwrap();
        assert!(id_col.is_not_null());
        assert!(id_col.is_unique());
    }

    #[test]
    fn arity_mismatch_errors() {
        let schema = sample_schema();
        let err = schema
            .coerce_and_check_row(vec![Value::Integer(1), Value::Text("x".into())])
            .unwrap_err();
        assert!(matches!(err, OxidbError::ArityError(_)));
    }

    #[test]
    fn not_null_violation_on_pk() {
        let schema = sample_schema();
        let err = schema
            .coerce_and_check_row(vec![Value::Null, Value::Text("x".into()), Value::Integer(1)])
            .unwrap_err();
        assert!(matches!(err, OxidbError::ConstraintViolation(_)));
    }

    #[test]
    fn nullable_column_accepts_null() {
        let schema = sample_schema();
        let row = schema
            .coerce_and_check_row(vec![Value::Integer(1), Value::Text("x".into()), Value::Null])
            .unwrap();
        assert_eq!(row[2], Value::Null);
    }

    #[test]
    fn type_error_propagates() {
        let schema = sample_schema();
        let err = schema
            .coerce_and_check_row(vec![Value::Integer(1), Value::Integer(2), Value::Integer(1)])
            .unwrap_err();
        assert!(matches!(err, OxidbError::TypeError(_)));
    }

    #[test]
    fn schema_roundtrips_through_encoding() {
        use crate::core::common::encoding::{from_slice, to_vec};
        let schema = sample_schema();
        let bytes = to_vec(&schema).unwrap();
        let back: Schema = from_slice(&bytes).unwrap();
        assert_eq!(schema, back);
    }
}
