//! Text and JSON rendering of decoded ELF data.

use anyhow::Result;
use elfsym_elf32::{LabelMap, SectionHeader, SymbolRecord};
use serde::Serialize;
use std::borrow::Cow;
use std::io::Write;

/// Bytes shown per hex dump line.
const HEXDUMP_WIDTH: u32 = 16;

/// Returns `name` demangled if requested and it is a mangled Rust symbol.
pub fn display_name(name: &str, demangle: bool) -> Cow<'_, str> {
    if !demangle {
        return Cow::Borrowed(name);
    }
    match rustc_demangle::try_demangle(name) {
        Ok(sym) => Cow::Owned(format!("{sym:#}")),
        Err(_) => Cow::Borrowed(name),
    }
}

// ---------------------------------------------------------------------------
// Symbol table
// ---------------------------------------------------------------------------

/// Writes the fixed-width symbol table, one row per record.
pub fn write_symbol_table<W: Write>(
    out: &mut W,
    records: &[SymbolRecord],
    demangle: bool,
) -> std::io::Result<()> {
    writeln!(
        out,
        "{} {:<10}\t{:<5} {:<8} {:<8} {:<9} {:<6} {}",
        "Symbol", "Value", "Size", "Type", "Bind", "Vis", "Index", "Name"
    )?;
    for (i, sym) in records.iter().enumerate() {
        let value = format!("0x{}", sym.value);
        writeln!(
            out,
            "[{:>4}] {:<10}\t{:<5} {:<8} {:<8} {:<9} {:<6} {}",
            i,
            value,
            sym.size,
            sym.sym_type,
            sym.bind,
            sym.visibility,
            sym.index,
            display_name(&sym.name, demangle),
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct SymbolRow<'a> {
    symbol: usize,
    value: String,
    size: &'a str,
    #[serde(rename = "type")]
    sym_type: &'a str,
    bind: &'a str,
    vis: &'a str,
    index: &'a str,
    name: Cow<'a, str>,
}

/// Writes the symbol table as a pretty-printed JSON array.
pub fn write_symbol_json<W: Write>(
    out: &mut W,
    records: &[SymbolRecord],
    demangle: bool,
) -> Result<()> {
    let rows: Vec<SymbolRow<'_>> = records
        .iter()
        .enumerate()
        .map(|(i, sym)| SymbolRow {
            symbol: i,
            value: format!("0x{}", sym.value),
            size: &sym.size,
            sym_type: sym.sym_type,
            bind: sym.bind,
            vis: sym.visibility,
            index: &sym.index,
            name: display_name(&sym.name, demangle),
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &rows)?;
    writeln!(out)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Labels, code, sections
// ---------------------------------------------------------------------------

/// Writes one `offset name` line per label, in offset order.
pub fn write_labels<W: Write>(
    out: &mut W,
    labels: &LabelMap,
    demangle: bool,
) -> std::io::Result<()> {
    for (&offset, name) in labels {
        let sign = if offset < 0 { "-" } else { "" };
        let magnitude = offset.unsigned_abs();
        writeln!(out, "{sign}{magnitude:#06x} {}", display_name(name, demangle))?;
    }
    Ok(())
}

/// Hex-dumps `code`, prefixing each line with the address of its first byte.
pub fn write_hexdump<W: Write>(out: &mut W, code: &[u8], base: u32) -> std::io::Result<()> {
    let mut addr = base;
    for chunk in code.chunks(HEXDUMP_WIDTH as usize) {
        write!(out, "{addr:08x}:")?;
        for byte in chunk {
            write!(out, " {byte:02x}")?;
        }
        writeln!(out)?;
        addr = addr.wrapping_add(HEXDUMP_WIDTH);
    }
    Ok(())
}

/// Writes the section header table, one row per `(header, name)` pair.
pub fn write_sections<W: Write>(
    out: &mut W,
    sections: &[(SectionHeader, String)],
) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<4} {:<20} {:>8} {:>8} {:>7} {:>10}",
        "[Nr]", "Name", "Offset", "Size", "EntSize", "Addr"
    )?;
    for (sh, name) in sections {
        let offset = format!("{:#x}", sh.offset);
        let size = format!("{:#x}", sh.size);
        let addr = format!("{:#x}", sh.virtual_address);
        writeln!(
            out,
            "[{:>2}] {:<20} {:>8} {:>8} {:>7} {:>10}",
            sh.index, name, offset, size, sh.entry_size, addr,
        )?;
    }
    Ok(())
}
