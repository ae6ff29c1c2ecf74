//! Section header table navigation.
//!
//! Sections are located by name through the section-header string table,
//! which is itself found by header index (`e_shstrndx`) rather than by name.

use crate::ElfError;
use crate::header::ElfHeader;
use crate::reader::ByteReader;
use crate::strtab::StringTable;
use alloc::string::{String, ToString};

// ---------------------------------------------------------------------------
// Section header field offsets (ELF32 `Shdr`)
// ---------------------------------------------------------------------------

/// Offset of `sh_name` within a section header.
pub const SH_NAME: usize = 0;

/// Offset of `sh_addr` within a section header.
pub const SH_ADDR: usize = 12;

/// Offset of `sh_offset` within a section header.
pub const SH_OFFSET: usize = 16;

/// Offset of `sh_size` within a section header.
pub const SH_SIZE: usize = 20;

/// Offset of `sh_entsize` within a section header.
pub const SH_ENTSIZE: usize = 36;

/// Name reported when `e_shstrndx` points outside the header table.
const SHSTRTAB_NAME: &str = ".shstrtab";

// ---------------------------------------------------------------------------
// SectionHeader
// ---------------------------------------------------------------------------

/// The fields of one section header entry that the decoder uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    /// Zero-based position in the section header table.
    pub index: u16,
    /// Offset of the name in the section-header string table.
    pub name_offset: u32,
    /// File offset of the section contents.
    pub offset: u32,
    /// Size of the section contents in bytes.
    pub size: u32,
    /// Size of one entry, for table sections such as `.symtab`.
    pub entry_size: u32,
    /// Address the section is mapped at, for allocated sections.
    pub virtual_address: u32,
}

impl SectionHeader {
    /// Decodes the section header at file offset `at`.
    fn parse(reader: &ByteReader<'_>, at: usize, index: u16) -> Result<Self, ElfError> {
        let field =
            |off: usize| -> Result<u32, ElfError> { reader.read_u32(reader.advance(at, off)?) };
        Ok(Self {
            index,
            name_offset: field(SH_NAME)?,
            offset: field(SH_OFFSET)?,
            size: field(SH_SIZE)?,
            entry_size: field(SH_ENTSIZE)?,
            virtual_address: field(SH_ADDR)?,
        })
    }
}

// ---------------------------------------------------------------------------
// SectionTable
// ---------------------------------------------------------------------------

/// The section header table, with its string table resolved.
#[derive(Debug, Clone, Copy)]
pub struct SectionTable<'a> {
    reader: ByteReader<'a>,
    shoff: usize,
    shentsize: usize,
    shnum: u16,
    names: StringTable<'a>,
}

impl<'a> SectionTable<'a> {
    /// Locates the section header table and its string table.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if the header or the string table
    /// entry cannot be read, and [`ElfError::SectionNotFound`] if
    /// `e_shstrndx` is not a valid header index.
    pub fn new(reader: ByteReader<'a>) -> Result<Self, ElfError> {
        let header = ElfHeader::new(reader);
        let shoff = header.shoff()? as usize;
        let shentsize = usize::from(header.shentsize()?);
        let shnum = header.shnum()?;
        let shstrndx = header.shstrndx()?;

        if shstrndx >= shnum {
            return Err(ElfError::SectionNotFound(SHSTRTAB_NAME.to_string()));
        }

        let entry = entry_offset(&reader, shoff, shentsize, shstrndx)?;
        let names_offset = reader.read_u32(reader.advance(entry, SH_OFFSET)?)?;

        Ok(Self {
            reader,
            shoff,
            shentsize,
            shnum,
            names: StringTable::new(reader, names_offset as usize),
        })
    }

    /// Number of entries in the table (`e_shnum`).
    #[must_use]
    pub fn len(&self) -> u16 {
        self.shnum
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shnum == 0
    }

    /// Decodes the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::SectionNotFound`] if `index` is out of range, or
    /// [`ElfError::TruncatedFile`] if the entry crosses the end of the file.
    pub fn get(&self, index: u16) -> Result<SectionHeader, ElfError> {
        if index >= self.shnum {
            return Err(ElfError::SectionNotFound(index.to_string()));
        }
        let at = entry_offset(&self.reader, self.shoff, self.shentsize, index)?;
        SectionHeader::parse(&self.reader, at, index)
    }

    /// Finds the first entry, in table order, whose name is exactly `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::SectionNotFound`] naming `name` if no entry
    /// matches, or the first read error hit during the scan.
    pub fn find(&self, name: &str) -> Result<SectionHeader, ElfError> {
        for index in 0..self.shnum {
            let at = entry_offset(&self.reader, self.shoff, self.shentsize, index)?;
            if self.is_named(at, name)? {
                return SectionHeader::parse(&self.reader, at, index);
            }
        }
        Err(ElfError::SectionNotFound(name.to_string()))
    }

    /// Returns the header-table index of the section named `name`.
    ///
    /// # Errors
    ///
    /// Same as [`SectionTable::find`].
    pub fn index_of(&self, name: &str) -> Result<u16, ElfError> {
        Ok(self.find(name)?.index)
    }

    /// Resolves the name of `section`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`] if the name is unterminated.
    pub fn name_of(&self, section: &SectionHeader) -> Result<String, ElfError> {
        self.names.resolve(section.name_offset as usize)
    }

    /// Iterates every entry in table order.
    #[must_use]
    pub fn iter(&self) -> SectionIter<'a> {
        SectionIter {
            table: *self,
            next: 0,
        }
    }

    /// Compares the name of the entry at `at` with `name` plus its NUL.
    fn is_named(&self, at: usize, name: &str) -> Result<bool, ElfError> {
        let name_offset = self.reader.read_u32(self.reader.advance(at, SH_NAME)?)?;
        let start = self
            .reader
            .advance(self.names.base(), name_offset as usize)?;
        if !self.reader.matches_at(start, name.as_bytes())? {
            return Ok(false);
        }
        let terminator = self.reader.advance(start, name.len())?;
        Ok(self.reader.read_u8(terminator)? == 0)
    }
}

/// File offset of entry `index`: `shoff + index * shentsize`.
fn entry_offset(
    reader: &ByteReader<'_>,
    shoff: usize,
    shentsize: usize,
    index: u16,
) -> Result<usize, ElfError> {
    let delta = usize::from(index)
        .checked_mul(shentsize)
        .ok_or(ElfError::TruncatedFile {
            offset: shoff,
            size: shentsize,
            len: reader.len(),
        })?;
    reader.advance(shoff, delta)
}

// ---------------------------------------------------------------------------
// SectionIter
// ---------------------------------------------------------------------------

/// An iterator over the entries of a section header table.
pub struct SectionIter<'a> {
    table: SectionTable<'a>,
    next: u16,
}

impl Iterator for SectionIter<'_> {
    type Item = Result<SectionHeader, ElfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.table.shnum {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.table.get(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::from(self.table.shnum - self.next);
        (remaining, Some(remaining))
    }
}
