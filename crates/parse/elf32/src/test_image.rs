//! ELF32 image builder for unit tests.
//!
//! Lays out a 52-byte header, the section contents back to back, a trailing
//! `.shstrtab`, and the section header table. Entry 0 is the null section and
//! the last entry is `.shstrtab`.

use alloc::vec;
use alloc::vec::Vec;

pub(crate) const EHDR_SIZE: usize = 52;
pub(crate) const SHDR_SIZE: usize = 40;

const SHT_PROGBITS: u32 = 1;
const SHT_SYMTAB: u32 = 2;
const SHT_STRTAB: u32 = 3;

/// One section to place in a [`TestImage`].
pub(crate) struct TestSection<'n> {
    name: &'n str,
    data: Vec<u8>,
    addr: u32,
    entsize: u32,
}

/// Creates a section with the given name and contents.
pub(crate) fn section<'n>(name: &'n str, data: &[u8]) -> TestSection<'n> {
    TestSection {
        name,
        data: data.to_vec(),
        addr: 0,
        entsize: 0,
    }
}

impl TestSection<'_> {
    /// Sets `sh_addr`.
    pub(crate) fn at(mut self, addr: u32) -> Self {
        self.addr = addr;
        self
    }

    /// Sets `sh_entsize`.
    pub(crate) fn entsize(mut self, entsize: u32) -> Self {
        self.entsize = entsize;
        self
    }

    fn sh_type(&self) -> u32 {
        match self.name {
            ".symtab" => SHT_SYMTAB,
            ".strtab" | ".shstrtab" => SHT_STRTAB,
            _ => SHT_PROGBITS,
        }
    }
}

/// A built image plus the file offset of each requested section.
pub(crate) struct TestImage {
    pub bytes: Vec<u8>,
    pub offsets: Vec<u32>,
}

impl TestImage {
    /// Builds an image; requested sections get header indices `1..=n`.
    pub(crate) fn build(sections: Vec<TestSection<'_>>) -> Self {
        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::new();
        for s in &sections {
            name_offsets.push(u32_len(shstrtab.len()));
            shstrtab.extend_from_slice(s.name.as_bytes());
            shstrtab.push(0);
        }
        let shstrtab_name = u32_len(shstrtab.len());
        shstrtab.extend_from_slice(b".shstrtab\0");

        let mut bytes = vec![0u8; EHDR_SIZE];
        let mut offsets = Vec::new();
        for s in &sections {
            offsets.push(u32_len(bytes.len()));
            bytes.extend_from_slice(&s.data);
        }
        let shstrtab_offset = u32_len(bytes.len());
        bytes.extend_from_slice(&shstrtab);
        while bytes.len() % 4 != 0 {
            bytes.push(0);
        }

        let shoff = u32_len(bytes.len());
        bytes.extend_from_slice(&[0u8; SHDR_SIZE]);
        for (i, s) in sections.iter().enumerate() {
            push_shdr(
                &mut bytes,
                [
                    name_offsets[i],
                    s.sh_type(),
                    0,
                    s.addr,
                    offsets[i],
                    u32_len(s.data.len()),
                    0,
                    0,
                    1,
                    s.entsize,
                ],
            );
        }
        push_shdr(
            &mut bytes,
            [
                shstrtab_name,
                SHT_STRTAB,
                0,
                0,
                shstrtab_offset,
                u32_len(shstrtab.len()),
                0,
                0,
                1,
                0,
            ],
        );

        let shnum = u16::try_from(sections.len() + 2).unwrap();
        let mut image = Self { bytes, offsets };
        image.bytes[..4].copy_from_slice(b"\x7fELF");
        image.bytes[4] = 1; // ELFCLASS32
        image.bytes[5] = 1; // ELFDATA2LSB
        image.bytes[6] = 1; // EV_CURRENT
        image.put_u16(16, 1); // ET_REL
        image.put_u16(18, 3); // EM_386
        image.put_u32(20, 1);
        image.put_u32(32, shoff);
        image.put_u16(40, u16::try_from(EHDR_SIZE).unwrap());
        image.put_u16(46, u16::try_from(SHDR_SIZE).unwrap());
        image.put_u16(48, shnum);
        image.set_shstrndx(shnum - 1);
        image
    }

    /// Overwrites `e_shnum`.
    pub(crate) fn set_shnum(&mut self, shnum: u16) {
        self.put_u16(48, shnum);
    }

    /// Overwrites `e_shstrndx`.
    pub(crate) fn set_shstrndx(&mut self, index: u16) {
        self.put_u16(50, index);
    }

    fn put_u16(&mut self, at: usize, val: u16) {
        self.bytes[at..at + 2].copy_from_slice(&val.to_le_bytes());
    }

    fn put_u32(&mut self, at: usize, val: u32) {
        self.bytes[at..at + 4].copy_from_slice(&val.to_le_bytes());
    }
}

fn push_shdr(bytes: &mut Vec<u8>, fields: [u32; 10]) {
    for f in fields {
        bytes.extend_from_slice(&f.to_le_bytes());
    }
}

fn u32_len(len: usize) -> u32 {
    u32::try_from(len).unwrap()
}

/// Encodes one ELF32 symbol entry.
pub(crate) fn symbol(
    name: u32,
    value: u32,
    size: u32,
    info: u8,
    other: u8,
    shndx: u16,
) -> [u8; 16] {
    let mut e = [0u8; 16];
    e[0..4].copy_from_slice(&name.to_le_bytes());
    e[4..8].copy_from_slice(&value.to_le_bytes());
    e[8..12].copy_from_slice(&size.to_le_bytes());
    e[12] = info;
    e[13] = other;
    e[14..16].copy_from_slice(&shndx.to_le_bytes());
    e
}

/// Builds a string table with a leading NUL; returns it and each name's offset.
pub(crate) fn string_table(names: &[&str]) -> (Vec<u8>, Vec<u32>) {
    let mut table = vec![0u8];
    let mut offsets = Vec::new();
    for name in names {
        offsets.push(u32_len(table.len()));
        table.extend_from_slice(name.as_bytes());
        table.push(0);
    }
    (table, offsets)
}
