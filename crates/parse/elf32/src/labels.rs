//! Code-offset labels derived from the symbol table.

use crate::section::SectionHeader;
use crate::symbol::Symbol;
use alloc::collections::BTreeMap;
use alloc::string::String;

/// Map from `.text`-relative byte offset to symbol name, in offset order.
pub type LabelMap = BTreeMap<i32, String>;

/// Builds labels for every symbol defined in `text`.
///
/// A symbol qualifies when its section index is the real index of `text`.
/// Its offset is `value - text.virtual_address`, wrapped to 32 bits. Offsets
/// outside `[0, text.size)` are kept; when several symbols share an offset
/// the last one in table order wins.
#[must_use]
pub fn build_labels<I>(symbols: I, text: &SectionHeader) -> LabelMap
where
    I: IntoIterator<Item = Symbol>,
{
    symbols
        .into_iter()
        .filter(|sym| sym.section_index.is_section(text.index))
        .map(|sym| (label_offset(sym.value, text.virtual_address), sym.name))
        .collect()
}

/// Translates a virtual address into an offset relative to `base`.
#[must_use]
#[expect(
    clippy::cast_possible_wrap,
    reason = "offsets are signed 32-bit; addresses below the section wrap negative"
)]
pub fn label_offset(address: u32, base: u32) -> i32 {
    address.wrapping_sub(base) as i32
}

/// Returns `true` if `offset` falls inside a section of `size` bytes.
#[must_use]
pub fn in_range(offset: i32, size: u32) -> bool {
    u32::try_from(offset).is_ok_and(|off| off < size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SectionIndex;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    fn text() -> SectionHeader {
        SectionHeader {
            index: 1,
            name_offset: 1,
            offset: 0x40,
            size: 0x100,
            entry_size: 0,
            virtual_address: 0x1000,
        }
    }

    fn sym(name: &str, value: u32, info: u8, section_index: SectionIndex) -> Symbol {
        Symbol {
            name: name.to_string(),
            name_index: 0,
            value,
            size: 0,
            info,
            other: 0,
            section_index,
        }
    }

    #[test]
    fn function_in_text() {
        let labels = build_labels(vec![sym("f", 0x1010, 0x12, SectionIndex::Real(1))], &text());
        assert_eq!(labels.get(&0x10).map(String::as_str), Some("f"));
    }

    #[test]
    fn filters_by_section() {
        let symbols = vec![
            sym("", 0, 0, SectionIndex::Undef),
            sym("in_text", 0x1000, 0x02, SectionIndex::Real(1)),
            sym("in_data", 0x2000, 0x01, SectionIndex::Real(2)),
            sym("absolute", 0x1004, 0x00, SectionIndex::Abs),
            // Reserved range, never a real section.
            sym("reserved", 0x1008, 0x00, SectionIndex::from_raw(0xff01)),
        ];
        let labels = build_labels(symbols, &text());
        let names: Vec<&str> = labels.values().map(String::as_str).collect();
        assert_eq!(names, ["in_text"]);
    }

    #[test]
    fn last_duplicate_wins() {
        let symbols = vec![
            sym(".text", 0x1000, 0x03, SectionIndex::Real(1)),
            sym("_start", 0x1000, 0x12, SectionIndex::Real(1)),
        ];
        let labels = build_labels(symbols, &text());
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[&0], "_start");
    }

    #[test]
    fn out_of_range_offsets_are_kept() {
        let symbols = vec![
            sym("end", 0x1100, 0x00, SectionIndex::Real(1)),
            sym("before", 0x0ff0, 0x00, SectionIndex::Real(1)),
        ];
        let labels = build_labels(symbols, &text());
        assert_eq!(labels[&0x100], "end");
        assert_eq!(labels[&-0x10], "before");
        assert!(!in_range(0x100, text().size));
        assert!(!in_range(-0x10, text().size));
        assert!(in_range(0xff, text().size));
    }

    #[test]
    fn ordered_by_offset() {
        let symbols = vec![
            sym("c", 0x1030, 0x12, SectionIndex::Real(1)),
            sym("a", 0x1000, 0x12, SectionIndex::Real(1)),
            sym("b", 0x1010, 0x12, SectionIndex::Real(1)),
        ];
        let labels = build_labels(symbols, &text());
        let offsets: Vec<i32> = labels.keys().copied().collect();
        assert_eq!(offsets, [0, 0x10, 0x30]);
    }
}
