//! The dynamically-typed `Value` that flows through every row, index key,
//! and predicate operand in the engine.

use crate::core::common::encoding::{Deserialize as Decode, Serialize as Encode};
use crate::core::common::error::OxidbError;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};

use super::data_type::DataType;

/// A tagged value belonging to one of five domains, or the distinguished
/// null. All comparison and coercion dispatch on this tag; comparison
/// between two different non-null domains is not meaningful and callers
/// (the filter/join/aggregate stages) never attempt it because a column's
/// domain is fixed by its schema.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
    Null,
}

impl Value {
    #[must_use]
    pub const fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Integer(_) => Some(DataType::Integer),
            Self::Real(_) => Some(DataType::Real),
            Self::Text(_) => Some(DataType::Text),
            Self::Boolean(_) => Some(DataType::Boolean),
            Self::Date(_) => Some(DataType::Date),
            Self::Null => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Structural equality within a domain. Cross-domain comparisons (other
    /// than involving `Null`, which is never equal to anything including
    /// itself in a WHERE predicate — see `matches_eq`) are simply `false`.
    #[must_use]
    pub fn structural_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Null, Self::Null) => true,
            _ => false,
        }
    }

    /// `=` as used in a WHERE predicate: null never matches anything, even
    /// another null.
    #[must_use]
    pub fn matches_eq(&self, other: &Self) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        self.structural_eq(other)
    }

    /// Ordering within a domain, used by `<`/`>` predicates, MIN/MAX, and
    /// GROUP BY key sorting. Returns `None` when the two values are not of
    /// the same domain (including any comparison touching `Null`, which the
    /// caller is expected to special-case).
    #[must_use]
    pub fn domain_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.partial_cmp(b),
            (Self::Real(a), Self::Real(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.partial_cmp(b),
            (Self::Boolean(a), Self::Boolean(b)) => a.partial_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.partial_cmp(b),
            _ => None,
        }
    }

    /// Total order used for sorting GROUP BY key tuples: `Null` sorts first
    /// within its column, otherwise falls back to `domain_cmp`.
    #[must_use]
    pub fn group_key_cmp(&self, other: &Self) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.domain_cmp(other).unwrap_or(Ordering::Equal),
        }
    }

    /// Coerces a freshly-parsed literal `Value` into the representation
    /// required by `target`, per §4.1's coercion rules:
    /// - integer literals widen to REAL columns
    /// - any non-text value is rejected for TEXT (text literals stay text)
    /// - ISO-8601 `'YYYY-MM-DD'` text literals become DATE values
    /// - `TRUE`/`FALSE` text coerces to BOOLEAN (case-insensitive, used by
    ///   parsers that lex booleans as bare identifiers)
    /// - `Null` is returned unchanged (nullability is checked by the caller)
    pub fn coerce_to(self, target: DataType) -> Result<Self, OxidbError> {
        if self.is_null() {
            return Ok(Self::Null);
        }
        match (target, self) {
            (DataType::Integer, Self::Integer(i)) => Ok(Self::Integer(i)),
            (DataType::Real, Self::Integer(i)) => Ok(Self::Real(i as f64)),
            (DataType::Real, Self::Real(r)) => Ok(Self::Real(r)),
            (DataType::Text, Self::Text(s)) => Ok(Self::Text(s)),
            (DataType::Boolean, Self::Boolean(b)) => Ok(Self::Boolean(b)),
            (DataType::Boolean, Self::Text(s)) => match s.to_ascii_uppercase().as_str() {
                "TRUE" => Ok(Self::Boolean(true)),
                "FALSE" => Ok(Self::Boolean(false)),
                other => Err(OxidbError::TypeError(format!(
                    "cannot coerce '{other}' to BOOLEAN"
                ))),
            },
            (DataType::Date, Self::Date(d)) => Ok(Self::Date(d)),
            (DataType::Date, Self::Text(s)) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(Self::Date)
                .map_err(|_| OxidbError::TypeError(format!("'{s}' is not a valid DATE (YYYY-MM-DD)"))),
            (target, value) => Err(OxidbError::TypeError(format!(
                "cannot coerce {value:?} to {target:?}"
            ))),
        }
    }

    /// `LIKE` pattern matching: `%` matches any span (including empty),
    /// `_` matches exactly one character. Case-sensitive, no escaping.
    #[must_use]
    pub fn like_matches(text: &str, pattern: &str) -> bool {
        let t: Vec<char> = text.chars().collect();
        let p: Vec<char> = pattern.chars().collect();
        like_match_rec(&t, &p)
    }
}

fn like_match_rec(text: &[char], pattern: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('%') => {
            like_match_rec(text, &pattern[1..])
                || (!text.is_empty() && like_match_rec(&text[1..], pattern))
        }
        Some('_') => !text.is_empty() && like_match_rec(&text[1..], &pattern[1..]),
        Some(c) => text.first() == Some(c) && like_match_rec(&text[1..], &pattern[1..]),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.structural_eq(other)
    }
}
impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.domain_cmp(other)
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Integer(i) => i.hash(state),
            Self::Real(r) => r.to_bits().hash(state),
            Self::Text(s) => s.hash(state),
            Self::Boolean(b) => b.hash(state),
            Self::Date(d) => d.hash(state),
            Self::Null => {}
        }
    }
}

impl Encode for Value {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        match self {
            Self::Integer(i) => {
                0u8.serialize(writer)?;
                i.serialize(writer)
            }
            Self::Real(r) => {
                1u8.serialize(writer)?;
                r.serialize(writer)
            }
            Self::Text(s) => {
                2u8.serialize(writer)?;
                s.serialize(writer)
            }
            Self::Boolean(b) => {
                3u8.serialize(writer)?;
                b.serialize(writer)
            }
            Self::Date(d) => {
                4u8.serialize(writer)?;
                d.to_string().serialize(writer)
            }
            Self::Null => 5u8.serialize(writer),
        }
    }
}

impl Decode for Value {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        match u8::deserialize(reader)? {
            0 => Ok(Self::Integer(i64::deserialize(reader)?)),
            1 => Ok(Self::Real(f64::deserialize(reader)?)),
            2 => Ok(Self::Text(String::deserialize(reader)?)),
            3 => Ok(Self::Boolean(bool::deserialize(reader)?)),
            4 => {
                let s = String::deserialize(reader)?;
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map(Self::Date)
                    .map_err(|e| OxidbError::CorruptSnapshot(format!("bad DATE value: {e}")))
            }
            5 => Ok(Self::Null),
            tag => Err(OxidbError::CorruptSnapshot(format!("invalid Value tag {tag}"))),
        }
    }
}
