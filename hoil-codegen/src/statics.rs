//! Static memory allocation for globals, constants, and string literals.
//!
//! Registers live in addresses `0..=254` (a register number *is* an address — see
//! `function.rs`), so every global, constant, and string literal needs a home outside that
//! range. This allocator hands out addresses from [`Statics::BASE`] upward, bump-allocator style;
//! nothing is ever freed, matching the flat, never-reclaimed memory model the interpreter itself
//! uses (spec §4.10: one fixed-size array for the whole run).

use std::collections::HashMap;

use hoil_ast::Type;

use crate::CodegenError;

/// First address handed to static data. Chosen well clear of the 0..=254 register range and the
/// reserved top-of-memory slots in `crate::RETURN_SLOT_ADDR`.
const BASE: u16 = 0x1000;

pub struct Statics {
    addr: HashMap<String, u16>,
    ty: HashMap<String, Type>,
    next: u16,
}

impl Statics {
    pub fn new() -> Self {
        Self { addr: HashMap::new(), ty: HashMap::new(), next: BASE }
    }

    /// Reserve space for a named global or constant of type `ty`, recording both its address and
    /// declared type for later lookups.
    pub fn declare(&mut self, name: &str, ty: &Type) -> Result<u16, CodegenError> {
        let addr = self.bump(crate::types::size_of(ty).max(1), name)?;
        self.addr.insert(name.to_string(), addr);
        self.ty.insert(name.to_string(), ty.clone());
        Ok(addr)
    }

    /// Reserve `len` anonymous bytes (for a string literal's backing storage).
    pub fn reserve_bytes(&mut self, len: usize) -> Result<u16, CodegenError> {
        self.bump(len.max(1), "<string literal>")
    }

    fn bump(&mut self, size: usize, name: &str) -> Result<u16, CodegenError> {
        let addr = self.next;
        let size = u16::try_from(size).map_err(|_| CodegenError::StaticMemoryExhausted { name: name.to_string() })?;
        self.next = self
            .next
            .checked_add(size)
            .ok_or_else(|| CodegenError::StaticMemoryExhausted { name: name.to_string() })?;
        Ok(addr)
    }

    pub fn addr_of(&self, name: &str) -> Option<u16> {
        self.addr.get(name).copied()
    }

    pub fn type_of(&self, name: &str) -> Option<&Type> {
        self.ty.get(name)
    }
}

impl Default for Statics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_get_increasing_non_overlapping_addresses() {
        let mut statics = Statics::new();
        let a = statics.declare("a", &Type::Int { bits: 32, signed: true }).unwrap();
        let b = statics.declare("b", &Type::Int { bits: 64, signed: true }).unwrap();
        assert!(b >= a + 4);
        assert_eq!(statics.addr_of("a"), Some(a));
        assert_eq!(statics.type_of("b"), Some(&Type::Int { bits: 64, signed: true }));
    }

    #[test]
    fn string_reservations_do_not_collide_with_declarations() {
        let mut statics = Statics::new();
        let s = statics.reserve_bytes(12).unwrap();
        let g = statics.declare("g", &Type::Int { bits: 32, signed: true }).unwrap();
        assert!(g >= s + 12);
    }
}
