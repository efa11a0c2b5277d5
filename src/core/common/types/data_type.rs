//! The five declared column domains plus the implicit vararg-free literal
//! set the parser can produce.

use crate::core::common::encoding::{Deserialize as Decode, Serialize as Encode};
use crate::core::common::error::OxidbError;
use std::io::{Read, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DataType {
    Integer,
    Real,
    Text,
    Boolean,
    Date,
}

impl DataType {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
        }
    }
}

impl Encode for DataType {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        let tag: u8 = match self {
            Self::Integer => 0,
            Self::Real => 1,
            Self::Text => 2,
            Self::Boolean => 3,
            Self::Date => 4,
        };
        tag.serialize(writer)
    }
}

impl Decode for DataType {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        match u8::deserialize(reader)? {
            0 => Ok(Self::Integer),
            1 => Ok(Self::Real),
            2 => Ok(Self::Text),
            3 => Ok(Self::Boolean),
            4 => Ok(Self::Date),
            tag => Err(OxidbError::CorruptSnapshot(format!("invalid DataType tag {tag}"))),
        }
    }
}
