//! ELF32 file header layout and field accessors.
//!
//! Only the fields needed to locate the section header table are decoded.
//! `e_shentsize`, `e_shnum` and `e_shstrndx` are 16-bit fields packed two to
//! a 32-bit word, so they are read as words and split.

use crate::ElfError;
use crate::reader::ByteReader;

// ---------------------------------------------------------------------------
// Identification
// ---------------------------------------------------------------------------

/// ELF magic number at offset 0: `\x7fELF`.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// Offset of the `EI_CLASS` identification byte.
pub const EI_CLASS: usize = 4;

/// `EI_CLASS` value for 32-bit objects.
pub const ELFCLASS32: u8 = 1;

/// `EI_CLASS` value for 64-bit objects.
pub const ELFCLASS64: u8 = 2;

// ---------------------------------------------------------------------------
// File header field offsets
// ---------------------------------------------------------------------------

/// Offset of `e_shoff`.
pub const E_SHOFF: usize = 32;

/// Offset of the word holding `e_phnum` (low half) and `e_shentsize` (high half).
pub const E_SHENTSIZE_WORD: usize = 44;

/// Offset of the word holding `e_shnum` (low half) and `e_shstrndx` (high half).
pub const E_SHNUM_WORD: usize = 48;

/// Accessor for the fixed ELF32 header fields.
///
/// Each method performs one bounds-checked read; nothing is cached.
#[derive(Debug, Clone, Copy)]
pub struct ElfHeader<'a> {
    reader: ByteReader<'a>,
}

impl<'a> ElfHeader<'a> {
    /// Creates an accessor over the file bytes.
    #[must_use]
    pub fn new(reader: ByteReader<'a>) -> Self {
        Self { reader }
    }

    /// Returns `true` if the file starts with [`ELF_MAGIC`].
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if the buffer ends inside a
    /// matching prefix of the magic number.
    pub fn is_elf(&self) -> Result<bool, ElfError> {
        self.reader.matches_at(0, &ELF_MAGIC)
    }

    /// Returns the raw `EI_CLASS` byte.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if the identification is short.
    pub fn class(&self) -> Result<u8, ElfError> {
        self.reader.read_u8(EI_CLASS)
    }

    /// File offset of the section header table (`e_shoff`).
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if the header is short.
    pub fn shoff(&self) -> Result<u32, ElfError> {
        self.reader.read_u32(E_SHOFF)
    }

    /// Size of one section header entry (`e_shentsize`).
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if the header is short.
    pub fn shentsize(&self) -> Result<u16, ElfError> {
        Ok(high_half(self.reader.read_u32(E_SHENTSIZE_WORD)?))
    }

    /// Number of section header entries (`e_shnum`).
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if the header is short.
    pub fn shnum(&self) -> Result<u16, ElfError> {
        Ok(low_half(self.reader.read_u32(E_SHNUM_WORD)?))
    }

    /// Header-table index of the section-header string table (`e_shstrndx`).
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if the header is short.
    pub fn shstrndx(&self) -> Result<u16, ElfError> {
        Ok(high_half(self.reader.read_u32(E_SHNUM_WORD)?))
    }
}

// Two 16-bit header fields share each 32-bit word.
#[allow(clippy::cast_possible_truncation)]
fn low_half(word: u32) -> u16 {
    (word & 0xffff) as u16
}

#[allow(clippy::cast_possible_truncation)]
fn high_half(word: u32) -> u16 {
    (word >> 16) as u16
}
