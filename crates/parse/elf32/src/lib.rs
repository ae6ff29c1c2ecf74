//! `elfsym-elf32` --- a standalone, `no_std` ELF32 code and symbol parser.
//!
//! This crate reads a 32-bit little-endian ELF object or executable from an
//! in-memory byte slice and extracts what a disassembler needs: the raw bytes
//! of `.text`, the decoded `.symtab`, and a map from `.text`-relative offsets
//! to symbol names.
//!
//! Every lookup is a pure function of the borrowed buffer. Nothing is cached,
//! so a parser can be shared freely between threads.
//!
//! # Usage
//!
//! ```ignore
//! let elf = ElfParser::new(&bytes)?;
//! let code = elf.code()?;
//! let labels = elf.labels()?;
//! for (offset, byte) in code.iter().enumerate() {
//!     if let Some(name) = labels.get(&(offset as i32)) {
//!         // annotate ...
//!     }
//! }
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

pub mod header;
pub mod labels;
pub mod reader;
pub mod section;
pub mod strtab;
pub mod symbol;

#[cfg(test)]
mod test_image;

pub use header::ElfHeader;
pub use labels::{LabelMap, build_labels};
pub use reader::ByteReader;
pub use section::{SectionHeader, SectionIter, SectionTable};
pub use strtab::StringTable;
pub use symbol::{
    SectionIndex, Symbol, SymbolBind, SymbolIter, SymbolRecord, SymbolType, SymbolVisibility,
};

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Name of the section holding executable code.
pub const TEXT_SECTION: &str = ".text";

/// Name of the section holding the static symbol table.
pub const SYMTAB_SECTION: &str = ".symtab";

/// Name of the string table that `.symtab` names resolve against.
pub const STRTAB_SECTION: &str = ".strtab";

/// Errors that can occur while decoding an ELF32 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElfError {
    /// The buffer does not start with the `\x7fELF` magic number.
    InvalidFormat,
    /// A read of `size` bytes at `offset` would cross the end of the buffer.
    TruncatedFile {
        /// Start of the failed read.
        offset: usize,
        /// Number of bytes requested.
        size: usize,
        /// Total buffer length.
        len: usize,
    },
    /// No section with the requested name (or header index) exists.
    SectionNotFound(String),
    /// A table section declares an entry size of zero.
    InvalidEntrySize(String),
}

impl fmt::Display for ElfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat => write!(f, "invalid file type: ELF expected"),
            Self::TruncatedFile { offset, size, len } => write!(
                f,
                "unexpected end of file: read of {size} bytes at {offset:#x} exceeds length {len:#x}"
            ),
            Self::SectionNotFound(name) => write!(f, "section header not found: {name}"),
            Self::InvalidEntrySize(name) => write!(f, "section {name} has a zero entry size"),
        }
    }
}

impl core::error::Error for ElfError {}

/// Returns `true` if `data` starts with the ELF magic number.
#[must_use]
pub fn is_elf(data: &[u8]) -> bool {
    ElfHeader::new(ByteReader::new(data))
        .is_elf()
        .unwrap_or(false)
}

/// A read-only ELF32 image.
///
/// Borrows the raw file bytes for its whole lifetime. Construction only checks
/// the magic number; headers are decoded lazily by each accessor.
#[derive(Debug, Clone, Copy)]
pub struct ElfParser<'a> {
    reader: ByteReader<'a>,
}

impl<'a> ElfParser<'a> {
    /// Wraps `data` after checking the ELF magic number.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::InvalidFormat`] if the magic number is missing.
    pub fn new(data: &'a [u8]) -> Result<Self, ElfError> {
        if !is_elf(data) {
            return Err(ElfError::InvalidFormat);
        }
        Ok(Self {
            reader: ByteReader::new(data),
        })
    }

    /// Returns the bounds-checked reader over the file bytes.
    #[must_use]
    pub fn reader(&self) -> ByteReader<'a> {
        self.reader
    }

    /// Returns an accessor for the fixed ELF header fields.
    #[must_use]
    pub fn header(&self) -> ElfHeader<'a> {
        ElfHeader::new(self.reader)
    }

    /// Opens the section header table.
    ///
    /// # Errors
    ///
    /// Fails if the header fields or the section-header string table entry
    /// cannot be read.
    pub fn section_table(&self) -> Result<SectionTable<'a>, ElfError> {
        SectionTable::new(self.reader)
    }

    /// Finds the first section named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::SectionNotFound`] if no section has that name.
    pub fn section(&self, name: &str) -> Result<SectionHeader, ElfError> {
        self.section_table()?.find(name)
    }

    /// Returns the header-table index of the section named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::SectionNotFound`] if no section has that name.
    pub fn section_index(&self, name: &str) -> Result<u16, ElfError> {
        self.section_table()?.index_of(name)
    }

    /// Iterates every section header in table order.
    ///
    /// # Errors
    ///
    /// Fails if the section header table cannot be located.
    pub fn sections(&self) -> Result<SectionIter<'a>, ElfError> {
        Ok(self.section_table()?.iter())
    }

    /// Resolves the name of `section` through the section-header string table.
    ///
    /// # Errors
    ///
    /// Fails if the name runs past the end of the buffer.
    pub fn section_name(&self, section: &SectionHeader) -> Result<String, ElfError> {
        self.section_table()?.name_of(section)
    }

    /// Returns the raw bytes of `.text`.
    ///
    /// # Errors
    ///
    /// Fails if `.text` is missing or extends past the end of the buffer.
    pub fn code(&self) -> Result<&'a [u8], ElfError> {
        let text = self.section(TEXT_SECTION)?;
        self.reader.read(text.offset as usize, text.size as usize)
    }

    /// Returns the virtual address `.text` is mapped at.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::SectionNotFound`] if `.text` is missing.
    pub fn text_virtual_address(&self) -> Result<u32, ElfError> {
        Ok(self.section(TEXT_SECTION)?.virtual_address)
    }

    /// Iterates the decoded `.symtab` entries in table order.
    ///
    /// # Errors
    ///
    /// Fails if `.symtab` or `.strtab` is missing, or `.symtab` declares a
    /// zero entry size. Per-entry decode errors are yielded by the iterator.
    pub fn symbol_iter(&self) -> Result<SymbolIter<'a>, ElfError> {
        let table = self.section_table()?;
        let symtab = table.find(SYMTAB_SECTION)?;
        let strtab = table.find(STRTAB_SECTION)?;
        SymbolIter::new(
            self.reader,
            &symtab,
            StringTable::new(self.reader, strtab.offset as usize),
        )
    }

    /// Decodes every `.symtab` entry, including the null symbol at index 0.
    ///
    /// # Errors
    ///
    /// Propagates the first lookup or decode error encountered.
    pub fn symbols(&self) -> Result<Vec<Symbol>, ElfError> {
        self.symbol_iter()?.collect()
    }

    /// Decodes `.symtab` into rendered records, one per entry.
    ///
    /// # Errors
    ///
    /// Propagates the first lookup or decode error encountered.
    pub fn symbol_table(&self) -> Result<Vec<SymbolRecord>, ElfError> {
        self.symbol_iter()?
            .map(|sym| sym.map(|sym| sym.record()))
            .collect()
    }

    /// Maps `.text`-relative offsets to the names of symbols defined in `.text`.
    ///
    /// Offsets are not clamped to the size of `.text`.
    ///
    /// # Errors
    ///
    /// Propagates the first lookup or decode error encountered.
    pub fn labels(&self) -> Result<LabelMap, ElfError> {
        let text = self.section(TEXT_SECTION)?;
        Ok(build_labels(self.symbols()?, &text))
    }
}
