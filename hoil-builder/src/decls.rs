//! The Global and Constant sections share one shape: a name, a type index, and an optional
//! initializer byte string. Both [`crate::BinaryBuilder::add_global`] and
//! [`crate::BinaryBuilder::add_constant`] write through a `DeclTable` of this shape.

use crate::wire::{push_optional_bytes, push_string, push_u32};

pub struct DeclTable {
    count: u32,
    payload: Vec<u8>,
}

impl DeclTable {
    pub fn new() -> Self {
        Self { count: 0, payload: Vec::new() }
    }

    pub fn add(&mut self, name: &str, type_index: u32, initializer: Option<&[u8]>) -> u32 {
        push_string(&mut self.payload, name);
        push_u32(&mut self.payload, type_index);
        push_optional_bytes(&mut self.payload, initializer);
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

impl Default for DeclTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decl_indices_are_sequential_and_initializer_is_optional() {
        let mut table = DeclTable::new();
        assert_eq!(table.add("counter", 2, None), 0);
        assert_eq!(table.add("seed", 2, Some(&[1, 0, 0, 0])), 1);
        assert_eq!(table.count, 2);
    }
}
