//! Pure-Rust CRC32 (IEEE 802.3), used to checksum snapshot bodies.
//!
//! Written by hand rather than pulling in `crc32fast`, matching the
//! reference crate's own preference for a small const-table implementation
//! over an extra dependency for this one use.

const CRC32_POLYNOMIAL: u32 = 0xEDB8_8320;
const CRC32_TABLE: [u32; 256] = generate_crc32_table();

const fn generate_crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 == 1 {
                crc = (crc >> 1) ^ CRC32_POLYNOMIAL;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Computes the CRC32 checksum of a byte slice in one call.
#[must_use]
pub fn checksum(data: &[u8]) -> u32 {
    let mut state = 0xFFFF_FFFFu32;
    for &byte in data {
        let idx = ((state ^ u32::from(byte)) & 0xFF) as usize;
        state = (state >> 8) ^ CRC32_TABLE[idx];
    }
    !state
}
