//! The Code section writer: per function, a sequence of named blocks, each a flat run of
//! [`mil_format::Record`] bytes (spec §6: `{function_index, block_count, (name, size, bytes)*}`).

use mil_format::{MemoryType, Opcode, Record};

use crate::wire::{push_string, push_u32};

/// Panics if called out of sequence — a codegen bug (calling `add_block` before
/// `begin_function_code`, or `add_instruction` before any block is open) is a programming error
/// in the one caller this crate has, not a recoverable runtime condition.
pub struct CodeSection {
    payload: Vec<u8>,
    function_count: u32,
    current: Option<CurrentFunction>,
}

struct CurrentFunction {
    function_index: u32,
    blocks: Vec<(String, Vec<u8>)>,
}

impl CodeSection {
    pub fn new() -> Self {
        Self { payload: Vec::new(), function_count: 0, current: None }
    }

    pub fn begin_function_code(&mut self, function_index: u32) {
        assert!(self.current.is_none(), "end_function_code was not called for the previous function");
        self.current = Some(CurrentFunction { function_index, blocks: Vec::new() });
    }

    /// Open a new block within the function currently being built. Returns its 0-based ordinal
    /// within that function (not the module-wide label id codegen assigns separately).
    pub fn add_block(&mut self, name: &str) -> u32 {
        let current = self.current.as_mut().expect("add_block called with no function open");
        current.blocks.push((name.to_string(), Vec::new()));
        (current.blocks.len() - 1) as u32
    }

    pub fn add_instruction(&mut self, opcode: Opcode, ty: MemoryType, addr: u16, imm: u64) {
        let current = self.current.as_mut().expect("add_instruction called with no function open");
        let (_, block_bytes) = current.blocks.last_mut().expect("add_instruction called with no block open");
        block_bytes.extend_from_slice(&Record::new(opcode, ty, addr, imm).encode());
    }

    pub fn end_function_code(&mut self) {
        let current = self.current.take().expect("end_function_code called with no function open");
        push_u32(&mut self.payload, current.function_index);
        push_u32(&mut self.payload, current.blocks.len() as u32);
        for (name, bytes) in &current.blocks {
            push_string(&mut self.payload, name);
            push_u32(&mut self.payload, bytes.len() as u32);
            self.payload.extend_from_slice(bytes);
        }
        self.function_count += 1;
    }

    pub fn encode(&self) -> Vec<u8> {
        self.payload.clone()
    }
}

impl Default for CodeSection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_function_one_block_round_trips_record_bytes() {
        let mut code = CodeSection::new();
        code.begin_function_code(0);
        code.add_block("entry");
        code.add_instruction(Opcode::AllocImm, MemoryType::Int32, 0, 5);
        code.add_instruction(Opcode::Exit, MemoryType::Int32, 0, 0);
        code.end_function_code();

        let payload = code.encode();
        assert_eq!(u32::from_le_bytes(payload[0..4].try_into().unwrap()), 0); // function_index
        assert_eq!(u32::from_le_bytes(payload[4..8].try_into().unwrap()), 1); // block_count
        assert_eq!(code.function_count, 1);
    }

    #[test]
    #[should_panic(expected = "add_block called with no function open")]
    fn add_block_without_open_function_panics() {
        let mut code = CodeSection::new();
        code.add_block("entry");
    }
}
