//! The snapshot wire format (§4.7): `MAGIC` + `FORMAT_VERSION` + a CRC32
//! checksum of the encoded body, built on `core::common::encoding`'s
//! hand-rolled `Serialize`/`Deserialize` pair and `core::common::crc32`'s
//! pure-Rust checksum — both written for the same reason the reference
//! crate wrote its own: no extra codec/checksum dependency for one use.
//!
//! `load` recomputes the checksum before decoding and fails closed with
//! `CorruptSnapshot` on a checksum mismatch, an unrecognized magic or
//! version, or a post-decode invariant failure (§3), so a caller never
//! observes a `Database` that doesn't satisfy every invariant.

use crate::core::common::crc32;
use crate::core::common::encoding::{Deserialize as Decode, Serialize as Encode};
use crate::core::common::error::OxidbError;
use crate::core::common::io_utils::{IoResultExt, ReadExt, WriteExt};
use crate::core::storage::Database;
use std::io::{Read, Write};

/// 4-byte prefix identifying an Oxidb snapshot stream.
pub const MAGIC: [u8; 4] = *b"OXDB";

/// Format version embedded right after `MAGIC` so a future incompatible
/// change to the wire format can be detected rather than silently
/// misparsed (§6).
pub const FORMAT_VERSION: u32 = 1;

/// Serializes `db`'s entire state to `writer`: magic, version, CRC32 of
/// the encoded body, the body's byte length, then the body itself.
pub fn save<W: Write>(db: &Database, writer: &mut W) -> Result<(), OxidbError> {
    let body = crate::core::common::encoding::to_vec(db)?;
    let checksum = crc32::checksum(&body);

    writer.write_all_oxidb(&MAGIC)?;
    FORMAT_VERSION.serialize(writer)?;
    checksum.serialize(writer)?;
    (body.len() as u64).serialize(writer)?;
    writer.write_all_oxidb(&body)?;
    Ok(())
}

/// Restores a `Database` from `reader`. Fails with `CorruptSnapshot` if
/// the magic prefix or format version is unrecognized, the checksum does
/// not match the decoded body, or the decoded database fails any §3
/// invariant.
pub fn load<R: Read>(reader: &mut R) -> Result<Database, OxidbError> {
    let mut magic = [0u8; 4];
    reader.read_exact_oxidb(&mut magic).oxidb_io()?;
    if magic != MAGIC {
        return Err(OxidbError::CorruptSnapshot(
            "snapshot does not start with the OXDB magic prefix".to_string(),
        ));
    }

    let version = u32::deserialize(reader)?;
    if version != FORMAT_VERSION {
        return Err(OxidbError::CorruptSnapshot(format!(
            "unsupported snapshot format version {version}, expected {FORMAT_VERSION}"
        )));
    }

    let expected_checksum = u32::deserialize(reader)?;
    let body_len = u64::deserialize(reader)? as usize;
    let mut body = vec![0u8; body_len];
    reader.read_exact_oxidb(&mut body)?;

    let actual_checksum = crc32::checksum(&body);
    if actual_checksum != expected_checksum {
        return Err(OxidbError::CorruptSnapshot(format!(
            "checksum mismatch: expected {expected_checksum:#010x}, got {actual_checksum:#010x}"
        )));
    }

    let db = Database::deserialize(&mut body.as_slice())?;
    db.verify_invariants()?;
    Ok(db)
}
