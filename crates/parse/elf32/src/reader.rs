//! Bounds-checked little-endian reads at absolute file offsets.
//!
//! Every read either returns exactly the requested bytes or fails with
//! [`ElfError::TruncatedFile`]. Nothing is zero-filled or truncated.

use crate::ElfError;

/// A bounds-checked view over the raw file bytes.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    /// Creates a reader over `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Total length of the underlying buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the `size` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if `offset + size` exceeds the
    /// buffer length.
    pub fn read(&self, offset: usize, size: usize) -> Result<&'a [u8], ElfError> {
        let end = self.advance(offset, size)?;
        if end > self.data.len() {
            return Err(self.truncated(offset, size));
        }
        Ok(&self.data[offset..end])
    }

    /// Reads a single byte.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if `offset` is past the end.
    pub fn read_u8(&self, offset: usize) -> Result<u8, ElfError> {
        Ok(self.read(offset, 1)?[0])
    }

    /// Reads a little-endian `u16`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if the field crosses the end.
    pub fn read_u16(&self, offset: usize) -> Result<u16, ElfError> {
        let b = self.read(offset, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Reads a little-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if the field crosses the end.
    pub fn read_u32(&self, offset: usize) -> Result<u32, ElfError> {
        let b = self.read(offset, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Compares the bytes at `offset` against `expected`, one byte at a time.
    ///
    /// Stops at the first mismatch, so only a matching prefix that runs off
    /// the end of the buffer is reported as truncated.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if the buffer ends while the bytes
    /// read so far still match.
    pub fn matches_at(&self, offset: usize, expected: &[u8]) -> Result<bool, ElfError> {
        for (i, &byte) in expected.iter().enumerate() {
            if self.read_u8(self.advance(offset, i)?)? != byte {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Computes `offset + delta`, treating overflow as a read past the end.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if the sum overflows `usize`.
    pub fn advance(&self, offset: usize, delta: usize) -> Result<usize, ElfError> {
        offset
            .checked_add(delta)
            .ok_or_else(|| self.truncated(offset, delta))
    }

    fn truncated(&self, offset: usize, size: usize) -> ElfError {
        ElfError::TruncatedFile {
            offset,
            size,
            len: self.data.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: [u8; 8] = [0x7f, b'E', b'L', b'F', 0x78, 0x56, 0x34, 0x12];

    #[test]
    fn in_range_reads_match_source() {
        let r = ByteReader::new(&DATA);
        assert_eq!(r.read(0, 4).unwrap(), &DATA[..4]);
        assert_eq!(r.read(4, 4).unwrap(), &DATA[4..]);
        assert_eq!(r.read(8, 0).unwrap(), &[] as &[u8]);
        assert_eq!(r.read_u8(1).unwrap(), b'E');
        assert_eq!(r.read_u16(4).unwrap(), 0x5678);
        assert_eq!(r.read_u32(4).unwrap(), 0x1234_5678);
    }

    #[test]
    fn reads_crossing_end_fail() {
        let r = ByteReader::new(&DATA);
        assert_eq!(
            r.read(6, 4).unwrap_err(),
            ElfError::TruncatedFile {
                offset: 6,
                size: 4,
                len: 8
            }
        );
        assert!(r.read_u8(8).is_err());
        assert!(r.read_u16(7).is_err());
        assert!(r.read_u32(5).is_err());
        assert!(r.read(9, 0).is_err());
    }

    #[test]
    fn offset_overflow_is_truncation() {
        let r = ByteReader::new(&DATA);
        assert!(matches!(
            r.read(usize::MAX, 2),
            Err(ElfError::TruncatedFile { .. })
        ));
        assert!(r.advance(usize::MAX, 1).is_err());
    }

    #[test]
    fn matches_at_stops_on_mismatch() {
        let r = ByteReader::new(&DATA);
        assert!(r.matches_at(0, b"\x7fELF").unwrap());
        assert!(!r.matches_at(1, b"ELX").unwrap());
        // Mismatch before the end: no truncation reported.
        assert!(!r.matches_at(6, b"\x00\x00\x00\x00").unwrap());
        // Matching prefix that runs off the end is truncated.
        assert!(r.matches_at(6, &[0x34, 0x12, 0x00]).is_err());
    }
}
