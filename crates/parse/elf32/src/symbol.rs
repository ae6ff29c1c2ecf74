//! ELF32 symbol table decoding.
//!
//! Each `.symtab` slot is decoded into a [`Symbol`], with its name resolved
//! through `.strtab` and its classification bytes mapped to typed values.

use crate::reader::ByteReader;
use crate::section::SectionHeader;
use crate::strtab::StringTable;
use crate::{ElfError, SYMTAB_SECTION};
use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;

// ---------------------------------------------------------------------------
// Symbol entry field offsets (ELF32 `Sym`)
// ---------------------------------------------------------------------------

/// Offset of `st_name`.
pub const ST_NAME: usize = 0;

/// Offset of `st_value`.
pub const ST_VALUE: usize = 4;

/// Offset of `st_size`.
pub const ST_SIZE: usize = 8;

/// Offset of `st_info` (bind in the high nibble, type in the low nibble).
pub const ST_INFO: usize = 12;

/// Offset of `st_other` (visibility).
pub const ST_OTHER: usize = 13;

/// Offset of `st_shndx`.
pub const ST_SHNDX: usize = 14;

// ---------------------------------------------------------------------------
// Classifications
// ---------------------------------------------------------------------------

/// Symbol binding, from the high nibble of `st_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolBind {
    /// `STB_LOCAL`
    Local,
    /// `STB_GLOBAL`
    Global,
    /// `STB_WEAK`
    Weak,
    /// `STB_LOOS`
    LoOs,
    /// `STB_HIOS`
    HiOs,
    /// `STB_LOPROC`
    LoProc,
    /// `STB_HIPROC`
    HiProc,
    /// Any other value, kept verbatim.
    Unknown(u8),
}

impl SymbolBind {
    /// Classifies a raw binding value.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Local,
            1 => Self::Global,
            2 => Self::Weak,
            10 => Self::LoOs,
            12 => Self::HiOs,
            13 => Self::LoProc,
            15 => Self::HiProc,
            other => Self::Unknown(other),
        }
    }

    /// Display name, as printed by `readelf`-style tables.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Local => "LOCAL",
            Self::Global => "GLOBAL",
            Self::Weak => "WEAK",
            Self::LoOs => "LOOS",
            Self::HiOs => "HIOS",
            Self::LoProc => "LOPROC",
            Self::HiProc => "HIPROC",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for SymbolBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Symbol type, from the low nibble of `st_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    /// `STT_NOTYPE`
    NoType,
    /// `STT_OBJECT`
    Object,
    /// `STT_FUNC`
    Func,
    /// `STT_SECTION`
    Section,
    /// `STT_FILE`
    File,
    /// `STT_COMMON`
    Common,
    /// `STT_TLS`
    Tls,
    /// `STT_LOOS`
    LoOs,
    /// `STT_HIOS`
    HiOs,
    /// `STT_LOPROC`
    LoProc,
    /// `STT_HIPROC`
    HiProc,
    /// Any other value, kept verbatim.
    Unknown(u8),
}

impl SymbolType {
    /// Classifies a raw type value.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::NoType,
            1 => Self::Object,
            2 => Self::Func,
            3 => Self::Section,
            4 => Self::File,
            5 => Self::Common,
            6 => Self::Tls,
            10 => Self::LoOs,
            12 => Self::HiOs,
            13 => Self::LoProc,
            15 => Self::HiProc,
            other => Self::Unknown(other),
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoType => "NOTYPE",
            Self::Object => "OBJECT",
            Self::Func => "FUNC",
            Self::Section => "SECTION",
            Self::File => "FILE",
            Self::Common => "COMMON",
            Self::Tls => "TLS",
            Self::LoOs => "LOOS",
            Self::HiOs => "HIOS",
            Self::LoProc => "LOPROC",
            Self::HiProc => "HIPROC",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Symbol visibility, from `st_other`.
///
/// The whole byte is classified, so a set reserved bit yields `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolVisibility {
    /// `STV_DEFAULT`
    Default,
    /// `STV_INTERNAL`
    Internal,
    /// `STV_HIDDEN`
    Hidden,
    /// `STV_PROTECTED`
    Protected,
    /// Any other value, kept verbatim.
    Unknown(u8),
}

impl SymbolVisibility {
    /// Classifies a raw `st_other` byte.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Default,
            1 => Self::Internal,
            2 => Self::Hidden,
            3 => Self::Protected,
            other => Self::Unknown(other),
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Internal => "INTERNAL",
            Self::Hidden => "HIDDEN",
            Self::Protected => "PROTECTED",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for SymbolVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// The section a symbol is defined relative to (`st_shndx`).
///
/// Values in `0xff00..=0xffff` are reserved pseudo-indices and never compare
/// equal to a real section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionIndex {
    /// `SHN_UNDEF`: undefined, or not relative to any section.
    Undef,
    /// `SHN_LOPROC`
    LoProc,
    /// `SHN_HIPROC`
    HiProc,
    /// `SHN_LOOS`
    LoOs,
    /// `SHN_HIOS`
    HiOs,
    /// `SHN_ABS`: absolute value, unaffected by relocation.
    Abs,
    /// `SHN_COMMON`: unallocated common block.
    Common,
    /// `SHN_XINDEX`: the real index lives in `.symtab_shndx`.
    XIndex,
    /// Any other reserved value.
    Reserved(u16),
    /// An index into the section header table.
    Real(u16),
}

impl SectionIndex {
    /// First reserved index (`SHN_LORESERVE`).
    pub const LORESERVE: u16 = 0xff00;

    /// Classifies a raw `st_shndx` value.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        match raw {
            0 => Self::Undef,
            0xff00 => Self::LoProc,
            0xff1f => Self::HiProc,
            0xff20 => Self::LoOs,
            0xff3f => Self::HiOs,
            0xfff1 => Self::Abs,
            0xfff2 => Self::Common,
            0xffff => Self::XIndex,
            n if n >= Self::LORESERVE => Self::Reserved(n),
            n => Self::Real(n),
        }
    }

    /// Returns the raw `st_shndx` value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        match self {
            Self::Undef => 0,
            Self::LoProc => 0xff00,
            Self::HiProc => 0xff1f,
            Self::LoOs => 0xff20,
            Self::HiOs => 0xff3f,
            Self::Abs => 0xfff1,
            Self::Common => 0xfff2,
            Self::XIndex => 0xffff,
            Self::Reserved(n) | Self::Real(n) => n,
        }
    }

    /// Returns `true` if this refers to the real section at `index`.
    #[must_use]
    pub const fn is_section(self, index: u16) -> bool {
        matches!(self, Self::Real(n) if n == index)
    }
}

impl fmt::Display for SectionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undef => f.pad("UNDEF"),
            Self::LoProc => f.pad("LOPROC"),
            Self::HiProc => f.pad("HIPROC"),
            Self::LoOs => f.pad("LOOS"),
            Self::HiOs => f.pad("HIOS"),
            Self::Abs => f.pad("ABS"),
            Self::Common => f.pad("COMMON"),
            Self::XIndex => f.pad("XINDEX"),
            Self::Reserved(n) | Self::Real(n) => fmt::Display::fmt(n, f),
        }
    }
}

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

/// A decoded `.symtab` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Name resolved through `.strtab`; empty for unnamed symbols.
    pub name: String,
    /// Offset of the name in `.strtab`.
    pub name_index: u32,
    /// Virtual address or absolute value.
    pub value: u32,
    /// Size in bytes, or 0 if unknown.
    pub size: u32,
    /// Raw `st_info` byte.
    pub info: u8,
    /// Raw `st_other` byte.
    pub other: u8,
    /// Section the symbol is defined relative to.
    pub section_index: SectionIndex,
}

impl Symbol {
    /// Decodes the entry at file offset `at`.
    fn parse(
        reader: &ByteReader<'_>,
        names: &StringTable<'_>,
        at: usize,
    ) -> Result<Self, ElfError> {
        let field = |off: usize| reader.advance(at, off);

        let name_index = reader.read_u32(field(ST_NAME)?)?;
        let name = names.resolve(name_index as usize)?;

        Ok(Self {
            name,
            name_index,
            value: reader.read_u32(field(ST_VALUE)?)?,
            size: reader.read_u32(field(ST_SIZE)?)?,
            info: reader.read_u8(field(ST_INFO)?)?,
            other: reader.read_u8(field(ST_OTHER)?)?,
            section_index: SectionIndex::from_raw(reader.read_u16(field(ST_SHNDX)?)?),
        })
    }

    /// Binding, from the high nibble of `st_info`.
    #[must_use]
    pub const fn bind(&self) -> SymbolBind {
        SymbolBind::from_raw(self.info >> 4)
    }

    /// Type, from the low nibble of `st_info`.
    #[must_use]
    pub const fn sym_type(&self) -> SymbolType {
        SymbolType::from_raw(self.info & 0x0f)
    }

    /// Visibility, from `st_other`.
    #[must_use]
    pub const fn visibility(&self) -> SymbolVisibility {
        SymbolVisibility::from_raw(self.other)
    }

    /// Renders the symbol into the textual columns of a symbol table listing.
    #[must_use]
    pub fn record(&self) -> SymbolRecord {
        SymbolRecord {
            value: format!("{:x}", self.value),
            size: self.size.to_string(),
            sym_type: self.sym_type().name(),
            bind: self.bind().name(),
            visibility: self.visibility().name(),
            index: self.section_index.to_string(),
            name: self.name.clone(),
        }
    }
}

/// A symbol rendered as the columns `Value / Size / Type / Bind / Vis /
/// Index / Name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRecord {
    /// Value in lowercase hex, without a prefix.
    pub value: String,
    /// Size in decimal.
    pub size: String,
    /// Type name, e.g. `FUNC`.
    pub sym_type: &'static str,
    /// Binding name, e.g. `GLOBAL`.
    pub bind: &'static str,
    /// Visibility name, e.g. `DEFAULT`.
    pub visibility: &'static str,
    /// Section index: a decimal numeral or a reserved name such as `ABS`.
    pub index: String,
    /// Symbol name.
    pub name: String,
}

// ---------------------------------------------------------------------------
// SymbolIter
// ---------------------------------------------------------------------------

/// An iterator over the entries of a symbol table section.
///
/// Steps by the section's declared entry size from its first byte up to its
/// end. Stops after the first error.
pub struct SymbolIter<'a> {
    reader: ByteReader<'a>,
    names: StringTable<'a>,
    offset: usize,
    end: usize,
    entry_size: usize,
}

impl<'a> SymbolIter<'a> {
    /// Creates an iterator over `symtab`, resolving names through `names`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::InvalidEntrySize`] if `symtab` declares a zero
    /// entry size, or [`ElfError::TruncatedFile`] if its extent overflows.
    pub fn new(
        reader: ByteReader<'a>,
        symtab: &SectionHeader,
        names: StringTable<'a>,
    ) -> Result<Self, ElfError> {
        if symtab.entry_size == 0 {
            return Err(ElfError::InvalidEntrySize(SYMTAB_SECTION.to_string()));
        }
        let offset = symtab.offset as usize;
        let end = reader.advance(offset, symtab.size as usize)?;
        Ok(Self {
            reader,
            names,
            offset,
            end,
            entry_size: symtab.entry_size as usize,
        })
    }
}

impl Iterator for SymbolIter<'_> {
    type Item = Result<Symbol, ElfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.end {
            return None;
        }
        let sym = Symbol::parse(&self.reader, &self.names, self.offset);
        // A partial last slot still decodes; never step past `end`.
        self.offset = match (&sym, self.offset.checked_add(self.entry_size)) {
            (Ok(_), Some(next)) => next.min(self.end),
            _ => self.end,
        };
        Some(sym)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.offset).div_ceil(self.entry_size);
        (0, Some(remaining))
    }
}
