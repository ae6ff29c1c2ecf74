//! NUL-terminated string tables.

use crate::ElfError;
use crate::reader::ByteReader;
use alloc::string::String;

/// A string table section, addressed by the file offset of its first byte.
///
/// Lookups are bounded only by the end of the file, not by the section size,
/// so an unterminated table surfaces as [`ElfError::TruncatedFile`].
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    reader: ByteReader<'a>,
    base: usize,
}

impl<'a> StringTable<'a> {
    /// Creates a table whose contents start at file offset `base`.
    #[must_use]
    pub fn new(reader: ByteReader<'a>, base: usize) -> Self {
        Self { reader, base }
    }

    /// File offset of the first byte of the table.
    #[must_use]
    pub fn base(&self) -> usize {
        self.base
    }

    /// Reads the string starting `index` bytes into the table.
    ///
    /// Bytes are taken one at a time up to the first NUL, each mapped to the
    /// Latin-1 code point of the same value. An index pointing directly at a
    /// NUL yields the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if the end of the file is reached
    /// before a NUL.
    pub fn resolve(&self, index: usize) -> Result<String, ElfError> {
        let mut at = self.reader.advance(self.base, index)?;
        let mut name = String::new();
        loop {
            let byte = self.reader.read_u8(at)?;
            if byte == 0 {
                return Ok(name);
            }
            name.push(char::from(byte));
            at = self.reader.advance(at, 1)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_by_index() {
        let data = b"xx\x7fELFfoo\0bar\0";
        let table = StringTable::new(ByteReader::new(data), 6);
        assert_eq!(table.resolve(0).unwrap(), "foo");
        assert_eq!(table.resolve(4).unwrap(), "bar");
        assert_eq!(table.resolve(1).unwrap(), "oo");
    }

    #[test]
    fn empty_name() {
        let table = StringTable::new(ByteReader::new(b"\0main\0"), 0);
        assert_eq!(table.resolve(0).unwrap(), "");
        assert_eq!(table.resolve(5).unwrap(), "");
    }

    #[test]
    fn unterminated() {
        let table = StringTable::new(ByteReader::new(b"\0main"), 0);
        assert!(matches!(
            table.resolve(1).unwrap_err(),
            ElfError::TruncatedFile { offset: 5, .. }
        ));
        assert!(table.resolve(9).is_err());
    }

    #[test]
    fn high_bytes_are_latin1() {
        let table = StringTable::new(ByteReader::new(b"caf\xe9\0"), 0);
        assert_eq!(table.resolve(0).unwrap(), "caf\u{e9}");
    }
}
