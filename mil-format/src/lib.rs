//! The MIL binary format: marker bytes, the opcode table, and the memory-type table.
//!
//! This crate is deliberately tiny and dependency-free beyond `thiserror`: both `hoil-builder`
//! (the emitter) and `hoil-vm` (the interpreter) depend on it so the two sides of the format
//! can never drift apart, the same discipline `fuel-asm` applies by being the single crate that
//! both the assembler and the interpreter in `fuel-vm` import their opcode table from.

#![cfg_attr(not(test), allow(dead_code))]

mod file;
mod memory_type;
mod opcode;
mod record;

pub use file::{align4, FileHeader, SectionEntry, SectionType, MAGIC, VERSION};
pub use memory_type::MemoryType;
pub use opcode::Opcode;
pub use record::{Marker, Record, RecordError, RECORD_LEN};

/// Byte size of an in-memory value of the given [`MemoryType`].
pub const fn type_size(t: MemoryType) -> usize {
    t.size()
}

/// Whether `t` denotes a signed integer type.
pub const fn is_signed(t: MemoryType) -> bool {
    t.is_signed()
}

/// Whether `t` denotes a floating-point type.
pub const fn is_float(t: MemoryType) -> bool {
    t.is_float()
}
