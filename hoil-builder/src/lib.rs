//! The binary builder: typed, append-only section writers that accumulate a module's types,
//! functions, globals, constants, and code, then [`BinaryBuilder::build`] serializes all of it
//! into one `.coil` byte string (spec §4.7, §6).
//!
//! Each section is its own small writer (`types`, `functions`, `decls`, `code`) rather than one
//! shared buffer, mirroring the layered-builder shape `fuel-tx`'s transaction builders use: each
//! sub-builder owns its own growth and serialization, and the top-level builder only sequences
//! them at `build()` time. Every sub-writer grows through a plain `Vec<u8>`, whose amortized
//! doubling already gives the geometric growth the format calls for — reimplementing that by
//! hand would just be a slower, bug-prone copy of what `Vec` already guarantees.
//!
//! The Relocation section is always present (spec §6 lists it as section type `5`) but this
//! implementation never writes an entry into it: every address used in an emitted record is
//! fully resolved at build time, so there is nothing left to relocate once a module is built.
//! Cross-module linking is out of scope (spec §1 non-goals), which is the only scenario that
//! would ever need one.

mod code;
mod decls;
mod functions;
mod types;
mod wire;

use mil_format::{FileHeader, MemoryType, Opcode, SectionEntry, SectionType};

pub use types::TypeTable;

use code::CodeSection;
use decls::DeclTable;
use functions::FunctionTable;
use wire::push_string;

/// The seven sections are always emitted in this fixed order, matching `SectionType`'s
/// declaration order in `mil-format`.
const SECTION_COUNT: usize = 7;

/// Accumulates one module's sections until [`BinaryBuilder::build`] serializes them.
pub struct BinaryBuilder {
    module_name: String,
    types: TypeTable,
    functions: FunctionTable,
    globals: DeclTable,
    constants: DeclTable,
    code: CodeSection,
}

impl BinaryBuilder {
    pub fn new() -> Self {
        Self {
            module_name: String::new(),
            types: TypeTable::new(),
            functions: FunctionTable::new(),
            globals: DeclTable::new(),
            constants: DeclTable::new(),
            code: CodeSection::new(),
        }
    }

    pub fn set_module_name(&mut self, name: &str) {
        self.module_name = name.to_string();
    }

    /// The stable index of a predefined primitive type — never allocates a new entry.
    pub fn primitive_type_index(&self, ty: MemoryType) -> u32 {
        TypeTable::primitive_index(ty)
    }

    /// Register a type entry whose descriptor word the caller already computed (see
    /// `hoil_ast::Type::encode`).
    pub fn add_type(&mut self, word: u32, name: Option<&str>) -> u32 {
        self.types.add_type(word, name)
    }

    pub fn add_struct_type(&mut self, word: u32, field_type_indices: &[u32], name: Option<&str>) -> u32 {
        self.types.add_struct_type(word, field_type_indices, name)
    }

    pub fn add_function(&mut self, name: &str, param_type_indices: &[u32], ret_type_index: u32, entry_label_id: u32) -> u32 {
        tracing::debug!(name, entry_label_id, "registering function signature");
        self.functions.add_function(name, param_type_indices, ret_type_index, entry_label_id)
    }

    pub fn add_global(&mut self, name: &str, type_index: u32, initializer: Option<&[u8]>) -> u32 {
        self.globals.add(name, type_index, initializer)
    }

    pub fn add_constant(&mut self, name: &str, type_index: u32, value: &[u8]) -> u32 {
        self.constants.add(name, type_index, Some(value))
    }

    pub fn begin_function_code(&mut self, function_index: u32) {
        self.code.begin_function_code(function_index);
    }

    pub fn add_block(&mut self, name: &str) -> u32 {
        self.code.add_block(name)
    }

    pub fn add_instruction(&mut self, opcode: Opcode, ty: MemoryType, addr: u16, imm: u64) {
        self.code.add_instruction(opcode, ty, addr, imm);
    }

    pub fn end_function_code(&mut self) {
        self.code.end_function_code();
    }

    /// Serialize header, section table, and every section payload (4-byte aligned) into the
    /// final `.coil` byte string.
    pub fn build(&self) -> Vec<u8> {
        let mut metadata = Vec::new();
        push_string(&mut metadata, &self.module_name);

        let payloads: [(SectionType, Vec<u8>); SECTION_COUNT] = [
            (SectionType::Type, self.types.encode()),
            (SectionType::Function, self.functions.encode()),
            (SectionType::Global, self.globals.encode()),
            (SectionType::Constant, self.constants.encode()),
            (SectionType::Code, self.code.encode()),
            (SectionType::Relocation, Vec::new()),
            (SectionType::Metadata, metadata),
        ];

        let header = FileHeader::new(SECTION_COUNT as u32);
        let table_len = SECTION_COUNT * SectionEntry::LEN;
        let mut offset = (FileHeader::LEN + table_len) as u32;

        let mut entries = Vec::with_capacity(SECTION_COUNT);
        for (section_type, payload) in &payloads {
            entries.push(SectionEntry { section_type: *section_type, offset, size: payload.len() as u32 });
            offset += mil_format::align4(payload.len() as u32);
        }

        let mut out = Vec::with_capacity(offset as usize);
        out.extend_from_slice(&header.encode());
        for entry in &entries {
            out.extend_from_slice(&entry.encode());
        }
        for (entry, (_, payload)) in entries.iter().zip(&payloads) {
            out.extend_from_slice(payload);
            let padded = mil_format::align4(payload.len() as u32) as usize;
            out.resize(out.len() + (padded - payload.len()), 0);
            debug_assert_eq!(out.len() as u32, entry.offset + padded as u32);
        }

        tracing::debug!(total_len = out.len(), "module built");
        out
    }
}

impl Default for BinaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mil_format::{FileHeader, SectionEntry, MAGIC};

    #[test]
    fn build_emits_valid_header_and_section_table() {
        let mut builder = BinaryBuilder::new();
        builder.set_module_name("e");
        let i32_idx = builder.primitive_type_index(MemoryType::Int32);
        let main = builder.add_function("main", &[], i32_idx, 0);
        builder.begin_function_code(main);
        builder.add_block("entry");
        builder.add_instruction(Opcode::Exit, MemoryType::Int32, 0, 0);
        builder.end_function_code();

        let bytes = builder.build();
        assert_eq!(&bytes[0..4], &MAGIC.to_le_bytes());
        let header = FileHeader::decode(&bytes).unwrap();
        assert_eq!(header.section_count, 7);

        let mut offset = FileHeader::LEN;
        let mut total = offset + 7 * SectionEntry::LEN;
        for i in 0..7 {
            let entry = SectionEntry::decode(&bytes[offset..]).unwrap();
            assert!((entry.offset + entry.size) as usize <= bytes.len());
            offset += SectionEntry::LEN;
            total = total.max((entry.offset + entry.size) as usize);
            let _ = i;
        }
        assert!(total <= bytes.len());
    }

    #[test]
    fn primitive_type_indices_are_reused_not_reallocated() {
        let builder = BinaryBuilder::new();
        let a = builder.primitive_type_index(MemoryType::Int32);
        let b = builder.primitive_type_index(MemoryType::Int32);
        assert_eq!(a, b);
    }
}
