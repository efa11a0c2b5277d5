//! Per-column equality-hash index (§4.3). O(1) expected `add`/`remove`;
//! `lookup_eq` returns the empty set for an unknown key rather than `None`.

use crate::core::common::encoding::{Deserialize as Decode, Serialize as Encode};
use crate::core::common::error::OxidbError;
use crate::core::common::types::{RowId, Value};
use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};

/// A hash index over one column of one table.
#[derive(Debug, Clone)]
pub struct HashIndex {
    pub column: String,
    /// UNIQUE/PK indexes reject a second distinct rid under the same key.
    pub unique: bool,
    entries: HashMap<Value, HashSet<RowId>>,
}

impl HashIndex {
    #[must_use]
    pub fn new(column: impl Into<String>, unique: bool) -> Self {
        Self { column: column.into(), unique, entries: HashMap::new() }
    }

    /// Adds `(value, rid)`. For a unique index, rejects when `value` is
    /// already present under a *different* rid — defensive, since the
    /// storage engine is expected to pre-check uniqueness itself before
    /// calling `add`.
    pub fn add(&mut self, value: Value, rid: RowId) -> Result<(), OxidbError> {
        if value.is_null() {
            return Ok(());
        }
        if self.unique {
            if let Some(existing) = self.entries.get(&value) {
                if existing.iter().any(|&r| r != rid) {
                    return Err(OxidbError::ConstraintViolation(format!(
                        "duplicate value for unique index on '{}'",
                        self.column
                    )));
                }
            }
        }
        self.entries.entry(value).or_default().insert(rid);
        Ok(())
    }

    /// Removes `(value, rid)`; pruning the key entirely once its rid set is
    /// empty so `lookup_eq` and iteration never see stale empty buckets.
    pub fn remove(&mut self, value: &Value, rid: RowId) {
        if value.is_null() {
            return;
        }
        if let Some(set) = self.entries.get_mut(value) {
            set.remove(&rid);
            if set.is_empty() {
                self.entries.remove(value);
            }
        }
    }

    #[must_use]
    pub fn lookup_eq(&self, value: &Value) -> HashSet<RowId> {
        if value.is_null() {
            return HashSet::new();
        }
        self.entries.get(value).cloned().unwrap_or_default()
    }

    /// Every `(value, rid)` pair currently indexed, for consistency checks
    /// and persistence.
    pub fn iter_entries(&self) -> impl Iterator<Item = (&Value, &RowId)> {
        self.entries.iter().flat_map(|(v, rids)| rids.iter().map(move |r| (v, r)))
    }

    #[must_use]
    pub fn contains_value(&self, value: &Value) -> bool {
        !value.is_null() && self.entries.contains_key(value)
    }
}

impl Encode for HashIndex {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        self.column.serialize(writer)?;
        self.unique.serialize(writer)?;
        let pairs: Vec<(Value, Vec<RowId>)> = self
            .entries
            .iter()
            .map(|(v, rids)| {
                let mut rids: Vec<RowId> = rids.iter().copied().collect();
                rids.sort_by_key(|r| r.0);
                (v.clone(), rids)
            })
            .collect();
        pairs.serialize(writer)
    }
}

impl Decode for HashIndex {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        let column = String::deserialize(reader)?;
        let unique = bool::deserialize(reader)?;
        let pairs = Vec::<(Value, Vec<RowId>)>::deserialize(reader)?;
        let mut entries = HashMap::new();
        for (value, rids) in pairs {
            entries.insert(value, rids.into_iter().collect());
        }
        Ok(Self { column, unique, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_lookup() {
        let mut idx = HashIndex::new("id", true);
        idx.add(Value::Integer(1), RowId(0)).unwrap();
        idx.add(Value::Integer(2), RowId(1)).unwrap();
        assert_eq!(idx.lookup_eq(&Value::Integer(1)), HashSet::from([RowId(0)]));
    }

    #[test]
    fn unknown_key_returns_empty_set() {
        let idx = HashIndex::new("id", false);
        assert!(idx.lookup_eq(&Value::Integer(99)).is_empty());
    }

    #[test]
    fn unique_index_rejects_duplicate_under_new_rid() {
        let mut idx = HashIndex::new("id", true);
        idx.add(Value::Integer(1), RowId(0)).unwrap();
        let err = idx.add(Value::Integer(1), RowId(1)).unwrap_err();
        assert!(matches!(err, OxidbError::ConstraintViolation(_)));
    }

    #[test]
    fn null_values_are_never_indexed() {
        let mut idx = HashIndex::new("col", false);
        idx.add(Value::Null, RowId(0)).unwrap();
        assert!(idx.lookup_eq(&Value::Null).is_empty());
        assert_eq!(idx.iter_entries().count(), 0);
    }

    #[test]
    fn remove_prunes_empty_buckets() {
        let mut idx = HashIndex::new("id", false);
        idx.add(Value::Integer(1), RowId(0)).unwrap();
        idx.remove(&Value::Integer(1), RowId(0));
        assert!(!idx.contains_value(&Value::Integer(1)));
        assert_eq!(idx.iter_entries().count(), 0);
    }

    #[test]
    fn non_unique_index_allows_multiple_rids_per_value() {
        let mut idx = HashIndex::new("type", false);
        idx.add(Value::Text("CR".into()), RowId(0)).unwrap();
        idx.add(Value::Text("CR".into()), RowId(1)).unwrap();
        assert_eq!(idx.lookup_eq(&Value::Text("CR".into())).len(), 2);
    }

    #[test]
    fn index_roundtrips_through_encoding() {
        use crate::core::common::encoding::{from_slice, to_vec};
        let mut idx = HashIndex::new("id", true);
        idx.add(Value::Integer(1), RowId(0)).unwrap();
        idx.add(Value::Integer(2), RowId(1)).unwrap();
        let bytes = to_vec(&idx).unwrap();
        let back: HashIndex = from_slice(&bytes).unwrap();
        assert_eq!(back.lookup_eq(&Value::Integer(1)), HashSet::from([RowId(0)]));
        assert_eq!(back.column, "id");
        assert!(back.unique);
    }
}
