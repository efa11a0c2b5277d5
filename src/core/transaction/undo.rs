//! Undo entries: tagged records, each sufficient to reverse one mutation.
//! Append-only during a transaction, drained in reverse on rollback,
//! discarded on commit. No log persistence is required (§4.4, §9).

use crate::core::common::encoding::{Deserialize as Decode, Serialize as Encode};
use crate::core::common::error::OxidbError;
use crate::core::common::types::{Row, RowId};
use std::io::{Read, Write};

#[derive(Debug, Clone, PartialEq)]
pub enum UndoEntry {
    /// Reverses an insert by deleting `rid` from `table`.
    InsertUndo { table: String, rid: RowId },
    /// Reverses an update by restoring the full pre-image tuple at `rid`.
    UpdateUndo { table: String, rid: RowId, pre_row: Row },
    /// Reverses a delete by re-inserting `row` at its original `rid`.
    DeleteUndo { table: String, rid: RowId, row: Row },
}

impl Encode for UndoEntry {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        match self {
            Self::InsertUndo { table, rid } => {
                0u8.serialize(writer)?;
                table.serialize(writer)?;
                rid.serialize(writer)
            }
            Self::UpdateUndo { table, rid, pre_row } => {
                1u8.serialize(writer)?;
                table.serialize(writer)?;
                rid.serialize(writer)?;
                pre_row.serialize(writer)
            }
            Self::DeleteUndo { table, rid, row } => {
                2u8.serialize(writer)?;
                table.serialize(writer)?;
                rid.serialize(writer)?;
                row.serialize(writer)
            }
        }
    }
}

impl Decode for UndoEntry {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        match u8::deserialize(reader)? {
            0 => Ok(Self::InsertUndo { table: String::deserialize(reader)?, rid: RowId::deserialize(reader)? }),
            1 => Ok(Self::UpdateUndo {
                table: String::deserialize(reader)?,
                rid: RowId::deserialize(reader)?,
                pre_row: Row::deserialize(reader)?,
            }),
            2 => Ok(Self::DeleteUndo {
                table: String::deserialize(reader)?,
                rid: RowId::deserialize(reader)?,
                row: Row::deserialize(reader)?,
            }),
            tag => Err(OxidbError::CorruptSnapshot(format!("invalid UndoEntry tag {tag}"))),
        }
    }
}
