//! The Function section: one entry per declared function, recording its signature and the
//! module-wide label id of its entry block (so a `CALL` target and a dump tool's symbol table
//! agree on what a label id names).

use crate::wire::{push_string, push_u32};

pub struct FunctionTable {
    count: u32,
    payload: Vec<u8>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self { count: 0, payload: Vec::new() }
    }

    /// Register a function's signature. Returns its stable function index.
    pub fn add_function(&mut self, name: &str, param_type_indices: &[u32], ret_type_index: u32, entry_label_id: u32) -> u32 {
        push_string(&mut self.payload, name);
        push_u32(&mut self.payload, param_type_indices.len() as u32);
        for &p in param_type_indices {
            push_u32(&mut self.payload, p);
        }
        push_u32(&mut self.payload, ret_type_index);
        push_u32(&mut self.payload, entry_label_id);
        let index = self.count;
        self.count += 1;
        index
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        push_u32(&mut buf, self.count);
        buf.extend_from_slice(&self.payload);
        buf
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_indices_are_sequential() {
        let mut table = FunctionTable::new();
        assert_eq!(table.add_function("main", &[], 2, 0), 0);
        assert_eq!(table.add_function("add", &[2, 2], 2, 4), 1);
        assert_eq!(table.count, 2);
    }
}
