//! `dump` — inspect a `.coil` file's header and section table without running it.
//!
//! Deliberately reads no further than the section table: a corrupt Code section should still be
//! diagnosable by this tool even when it would abort the interpreter.

use std::process::ExitCode;

use clap::Parser;
use mil_format::{FileHeader, SectionEntry, MAGIC};

/// Print a `.coil` file's header and section table.
#[derive(Parser)]
#[command(name = "dump", version, about = "Inspect a .coil file's header and section table")]
struct Args {
    /// Path to the .coil file to inspect.
    file: std::path::PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let bytes = match std::fs::read(&args.file) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("dump: could not read '{}': {err}", args.file.display());
            return ExitCode::from(1);
        }
    };

    let Some(header) = FileHeader::decode(&bytes) else {
        println!("invalid");
        return ExitCode::from(1);
    };
    if !header.is_valid_magic() {
        println!("invalid");
        return ExitCode::from(1);
    }

    println!("magic:    {:#010x} (expected {:#010x})", header.magic, MAGIC);
    println!("version:  {:#010x}", header.version);
    println!("sections: {}", header.section_count);

    let mut offset = FileHeader::LEN;
    for i in 0..header.section_count as usize {
        let Some(entry) = SectionEntry::decode(&bytes[offset..]) else {
            println!("invalid");
            return ExitCode::from(1);
        };
        println!("  [{i}] {:?} offset={} size={}", entry.section_type, entry.offset, entry.size);
        offset += SectionEntry::LEN;
    }

    ExitCode::SUCCESS
}
