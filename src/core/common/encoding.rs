//! Pure-Rust binary encoding for the snapshot wire format.
//!
//! A small `Serialize`/`Deserialize` trait pair over `Read`/`Write`, written
//! by hand rather than depending on `bincode` (mirrors the reference
//! crate's own `bincode_compat` module, which exists for the same reason:
//! one pure-Rust implementation instead of an extra external codec crate).
//! All integers are little-endian; lengths are always `u64`.

use crate::core::common::error::OxidbError;
use crate::core::common::io_utils::{IoResultExt, ReadExt, WriteExt};
use std::io::{Read, Write};

/// A type that can be written to the snapshot wire format.
pub trait Serialize {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError>;
}

/// A type that can be read back from the snapshot wire format.
pub trait Deserialize: Sized {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError>;
}

/// Convenience wrapper: serialize a value into a fresh `Vec<u8>`.
pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>, OxidbError> {
    let mut buf = Vec::new();
    value.serialize(&mut buf)?;
    Ok(buf)
}

/// Convenience wrapper: deserialize a value from a byte slice.
pub fn from_slice<T: Deserialize>(bytes: &[u8]) -> Result<T, OxidbError> {
    let mut cursor = bytes;
    T::deserialize(&mut cursor)
}

impl Serialize for u8 {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        writer.write_all_oxidb(&[*self])
    }
}
impl Deserialize for u8 {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        let mut buf = [0u8; 1];
        reader.read_exact_oxidb(&mut buf)?;
        Ok(buf[0])
    }
}

macro_rules! impl_int {
    ($t:ty) => {
        impl Serialize for $t {
            fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
                writer.write_all_oxidb(&self.to_le_bytes())
            }
        }
        impl Deserialize for $t {
            fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                reader.read_exact_oxidb(&mut buf)?;
                Ok(<$t>::from_le_bytes(buf))
            }
        }
    };
}

impl_int!(u16);
impl_int!(u32);
impl_int!(u64);
impl_int!(i64);
impl_int!(f64);

impl Serialize for bool {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        u8::from(*self).serialize(writer)
    }
}
impl Deserialize for bool {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        Ok(u8::deserialize(reader)? != 0)
    }
}

impl Serialize for Vec<u8> {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        (self.len() as u64).serialize(writer)?;
        writer.write_all_oxidb(self)
    }
}
impl Deserialize for Vec<u8> {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        let len = u64::deserialize(reader)? as usize;
        let mut data = vec![0u8; len];
        reader.read_exact_oxidb(&mut data)?;
        Ok(data)
    }
}

impl Serialize for String {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        self.as_bytes().to_vec().serialize(writer)
    }
}
impl Deserialize for String {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        let bytes = Vec::<u8>::deserialize(reader)?;
        String::from_utf8(bytes).map_err(OxidbError::from)
    }
}

impl<T: Serialize> Serialize for Option<T> {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        match self {
            None => 0u8.serialize(writer),
            Some(value) => {
                1u8.serialize(writer)?;
                value.serialize(writer)
            }
        }
    }
}
impl<T: Deserialize> Deserialize for Option<T> {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        match u8::deserialize(reader)? {
            0 => Ok(None),
            1 => Ok(Some(T::deserialize(reader)?)),
            tag => Err(OxidbError::Deserialization(format!("invalid Option tag {tag}"))),
        }
    }
}

impl<T: Serialize> Serialize for Vec<T> {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        (self.len() as u64).serialize(writer)?;
        for item in self {
            item.serialize(writer)?;
        }
        Ok(())
    }
}
impl<T: Deserialize> Deserialize for Vec<T> {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        let len = u64::deserialize(reader)?;
        let mut out = Vec::with_capacity(len.min(1 << 20) as usize);
        for _ in 0..len {
            out.push(T::deserialize(reader)?);
        }
        Ok(out)
    }
}

impl<A: Serialize, B: Serialize> Serialize for (A, B) {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), OxidbError> {
        self.0.serialize(writer)?;
        self.1.serialize(writer)
    }
}
impl<A: Deserialize, B: Deserialize> Deserialize for (A, B) {
    fn deserialize<R: Read>(reader: &mut R) -> Result<Self, OxidbError> {
        Ok((A::deserialize(reader)?, B::deserialize(reader)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: Serialize + Deserialize + PartialEq + std::fmt::Debug>(value: T) {
        let bytes = to_vec(&value).unwrap();
        let back: T = from_slice(&bytes).unwrap();
        assert_eq!(value, back);
    }

    #[test]
    fn primitives_roundtrip() {
        roundtrip(42u8);
        roundtrip(0x1234_5678_9ABC_DEF0u64);
        roundtrip(-17i64);
        roundtrip(3.5f64);
        roundtrip(true);
        roundtrip(false);
    }

    #[test]
    fn string_roundtrips() {
        roundtrip("hello, world".to_string());
        roundtrip(String::new());
    }

    #[test]
    fn vec_and_option_roundtrip() {
        roundtrip(vec![1i64, 2, 3, -4]);
        roundtrip(Vec::<i64>::new());
        roundtrip(Some(7u64));
        roundtrip(None::<u64>);
    }

    #[test]
    fn truncated_stream_errors() {
        let bytes = to_vec(&42u64).unwrap();
        let short = &bytes[..4];
        let result: Result<u64, _> = from_slice(short);
        assert!(result.is_err());
    }
}
