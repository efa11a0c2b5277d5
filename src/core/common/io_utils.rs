//! IO helper traits so call sites don't repeat `.map_err(OxidbError::Io)`.

use crate::core::common::error::OxidbError;
use std::io;

/// Converts a `std::io::Result` into the crate's `Result<_, OxidbError>`.
pub trait IoResultExt<T> {
    fn oxidb_io(self) -> Result<T, OxidbError>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn oxidb_io(self) -> Result<T, OxidbError> {
        self.map_err(OxidbError::from)
    }
}

/// `Write` extension that surfaces `OxidbError` instead of `io::Error`.
pub trait WriteExt: io::Write {
    fn write_all_oxidb(&mut self, buf: &[u8]) -> Result<(), OxidbError> {
        self.write_all(buf).oxidb_io()
    }
}

/// `Read` extension that surfaces `OxidbError` instead of `io::Error`.
pub trait ReadExt: io::Read {
    fn read_exact_oxidb(&mut self, buf: &mut [u8]) -> Result<(), OxidbError> {
        self.read_exact(buf).oxidb_io()
    }
}

impl<W: io::Write + ?Sized> WriteExt for W {}
impl<R: io::Read + ?Sized> ReadExt for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn write_ext_writes_bytes() {
        let mut buffer = Vec::new();
        buffer.write_all_oxidb(b"test").unwrap();
        assert_eq!(buffer, b"test");
    }

    #[test]
    fn read_ext_reads_exact() {
        let mut cursor = Cursor::new(b"test");
        let mut buf = [0u8; 4];
        cursor.read_exact_oxidb(&mut buf).unwrap();
        assert_eq!(&buf, b"test");
    }

    #[test]
    fn io_result_ext_converts_not_found() {
        let err: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "x"));
        assert!(matches!(err.oxidb_io(), Err(OxidbError::Io(_))));
    }
}
