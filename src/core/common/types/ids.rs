//! Opaque identifier newtypes: row identity and transaction identity.

use crate::core::common::encoding::{Deserialize as Decode, Serialize as Encode};
use crate::core::common::error::OxidbError;
use std::io::{Read, Write};

/// A row identifier: monotonically assigned per-table, never reused, stable
/// across the row's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct RowId(pub u64);

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Encode for RowId {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        self.0.serialize(writer)
    }
}
impl Decode for RowId {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        Ok(Self(u64::deserialize(reader)?))
    }
}

/// A transaction identifier, assigned when a session transitions from
/// `Idle` to `InTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct TransactionId(pub u64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::encoding::{from_slice, to_vec};

    #[test]
    fn row_id_roundtrips() {
        let id = RowId(42);
        let bytes = to_vec(&id).unwrap();
        let back: RowId = from_slice(&bytes).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn row_id_orders_numerically() {
        assert!(RowId(1) < RowId(2));
    }
}
