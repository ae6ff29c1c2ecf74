//! Dumps the code, labels and symbol table of 32-bit ELF files.
//!
//! Usage:
//!   elfsym symbols <FILE>            - Print the symbol table
//!   elfsym symbols <FILE> -o out.txt - Write the symbol table to a file
//!   elfsym symbols <FILE> -f json    - Print the symbol table as JSON
//!   elfsym labels <FILE>             - Print `.text` offset labels
//!   elfsym code <FILE>               - Hex-dump `.text`
//!   elfsym sections <FILE>           - List section headers
//!
//! Settings can also come from the nearest `elfsym.toml`; flags win.

mod config;
mod render;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use elfsym_elf32::header::ELFCLASS32;
use elfsym_elf32::labels::in_range;
use elfsym_elf32::{ElfParser, TEXT_SECTION};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, OutputFormat};

#[derive(Parser)]
#[command(name = "elfsym")]
#[command(about = "Dump the code, labels and symbol table of 32-bit ELF files")]
struct Cli {
    /// Config file (default: nearest elfsym.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the symbol table
    Symbols {
        /// ELF file to read
        file: PathBuf,

        /// Write the table to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: from config, else table)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Demangle Rust symbol names
        #[arg(long)]
        demangle: bool,
    },

    /// Print `.text`-relative offset labels
    Labels {
        /// ELF file to read
        file: PathBuf,

        /// Demangle Rust symbol names
        #[arg(long)]
        demangle: bool,
    },

    /// Hex-dump the `.text` section
    Code {
        /// ELF file to read
        file: PathBuf,
    },

    /// List section headers
    Sections {
        /// ELF file to read
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Symbols {
            file,
            output,
            format,
            demangle,
        } => {
            let config = config.with_flags(format, demangle);
            let data = read_elf(&file)?;
            let elf = open_elf(&file, &data)?;
            let records = elf
                .symbol_table()
                .with_context(|| format!("decoding symbols of {}", file.display()))?;
            info!(count = records.len(), "decoded symbol table");

            let mut out = open_output(output.as_deref())?;
            match config.format {
                OutputFormat::Table => {
                    render::write_symbol_table(&mut out, &records, config.demangle)?;
                }
                OutputFormat::Json => {
                    render::write_symbol_json(&mut out, &records, config.demangle)?;
                }
            }
            out.flush().context("flushing output")?;
            if let Some(path) = output {
                println!("Symbol table written to {}", path.display());
            }
        }

        Commands::Labels { file, demangle } => {
            let config = config.with_flags(None, demangle);
            let data = read_elf(&file)?;
            let elf = open_elf(&file, &data)?;
            let text = elf
                .section(TEXT_SECTION)
                .with_context(|| format!("locating {TEXT_SECTION} in {}", file.display()))?;
            let labels = elf
                .labels()
                .with_context(|| format!("building labels for {}", file.display()))?;
            debug!(
                count = labels.len(),
                text_index = text.index,
                text_addr = format_args!("{:#x}", text.virtual_address),
                "built labels"
            );

            if config.warn_unranged_labels {
                let unranged = labels.iter().filter(|(off, _)| !in_range(**off, text.size));
                for (offset, name) in unranged {
                    warn!(offset, %name, size = text.size, "label lies outside .text");
                }
            }

            let mut out = std::io::stdout().lock();
            render::write_labels(&mut out, &labels, config.demangle)?;
        }

        Commands::Code { file } => {
            let data = read_elf(&file)?;
            let elf = open_elf(&file, &data)?;
            let code = elf
                .code()
                .with_context(|| format!("reading {TEXT_SECTION} of {}", file.display()))?;
            let base = elf.text_virtual_address()?;
            debug!(len = code.len(), base = format_args!("{base:#x}"), "dumping code");

            let mut out = std::io::stdout().lock();
            render::write_hexdump(&mut out, code, base)?;
        }

        Commands::Sections { file } => {
            let data = read_elf(&file)?;
            let elf = open_elf(&file, &data)?;
            let table = elf
                .section_table()
                .with_context(|| format!("opening section headers of {}", file.display()))?;
            let sections = table
                .iter()
                .map(|sh| {
                    let sh = sh?;
                    let name = table.name_of(&sh)?;
                    Ok((sh, name))
                })
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("reading section headers of {}", file.display()))?;

            let mut out = std::io::stdout().lock();
            render::write_sections(&mut out, &sections)?;
        }
    }

    Ok(())
}

/// Installs the stderr `tracing` subscriber.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Reads the whole file into memory.
fn read_elf(path: &Path) -> Result<Vec<u8>> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    debug!(path = %path.display(), len = data.len(), "read input");
    Ok(data)
}

/// Checks the magic number and warns about non-ELF32 classes.
fn open_elf<'a>(path: &Path, data: &'a [u8]) -> Result<ElfParser<'a>> {
    let elf = ElfParser::new(data).with_context(|| format!("parsing {}", path.display()))?;
    match elf.header().class() {
        Ok(ELFCLASS32) => {}
        Ok(class) => warn!(class, "EI_CLASS is not ELFCLASS32; fields will be misread"),
        Err(e) => warn!("cannot read EI_CLASS: {e}"),
    }
    Ok(elf)
}

/// Opens `path` for buffered writing, or stdout.
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout().lock()))),
    }
}
