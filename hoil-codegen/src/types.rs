//! `hoil_ast::Type` -> `mil_format::MemoryType` and the Type-section registry.
//!
//! The record-level format tags every value with one byte-sized [`MemoryType`]; the richer AST
//! type tree (structs, arrays, function types, `Named`) has no one-to-one record-level
//! counterpart, so anything past a scalar is approximated by its natural scalar representative
//! (a struct's fields flatten to a byte span addressed relative to the struct's base address; an
//! array or vector degrades to its element type for the purpose of picking an opcode's type tag).

use std::collections::HashMap;

use hoil_ast::Type;
use hoil_builder::BinaryBuilder;
use mil_format::MemoryType;

/// The record-level type tag used to pick an opcode's `type` byte and to size a static
/// allocation. Structs, arrays, and function types have no scalar tag of their own; callers
/// that need one (to pick an opcode width, say) get a neutral `Int64` instead of a panic, since
/// this VM has no dedicated "aggregate" wire type.
pub fn memory_type_of(ty: &Type) -> MemoryType {
    match ty {
        Type::Bool => MemoryType::Bool,
        Type::Int { bits: 8, signed: true } => MemoryType::Int8,
        Type::Int { bits: 16, signed: true } => MemoryType::Int16,
        Type::Int { bits: 32, signed: true } => MemoryType::Int32,
        Type::Int { bits: 64, signed: true } => MemoryType::Int64,
        Type::Int { bits: 8, signed: false } => MemoryType::Uint8,
        Type::Int { bits: 16, signed: false } => MemoryType::Uint16,
        Type::Int { bits: 32, signed: false } => MemoryType::Uint32,
        Type::Int { bits: 64, signed: false } => MemoryType::Uint64,
        Type::Int { .. } => MemoryType::Int64,
        // f16 has no dedicated record-level type; it widens to f32, the narrowest type the wire
        // format actually carries.
        Type::Float { bits } if *bits <= 32 => MemoryType::Float32,
        Type::Float { .. } => MemoryType::Float64,
        Type::Ptr { .. } => MemoryType::Ptr,
        Type::Vec { elem, .. } | Type::Array { elem, .. } => memory_type_of(elem),
        Type::Struct { .. } | Type::Function { .. } | Type::Void | Type::Named(_) => MemoryType::Int64,
    }
}

/// Byte footprint of a value of `ty` in VM memory. Unlike [`memory_type_of`], this is exact for
/// aggregates: a struct is the sum of its (recursively sized) fields, laid out with no padding,
/// and an array/vec is its element size times its length.
pub fn size_of(ty: &Type) -> usize {
    match ty {
        Type::Void => 0,
        Type::Struct { fields, .. } => fields.iter().map(|f| size_of(&f.ty)).sum(),
        Type::Array { elem, size } => size_of(elem) * size.unwrap_or(0) as usize,
        Type::Vec { elem, size } => size_of(elem) * (*size as usize),
        Type::Function { .. } => memory_type_of(ty).size(),
        _ => memory_type_of(ty).size(),
    }
}

/// The byte offset of `field` within a struct, counting the sizes of every field declared before
/// it. Returns `None` if `fields` has no field by that name.
pub fn field_offset(fields: &[hoil_ast::Field], field: &str) -> Option<usize> {
    let mut offset = 0;
    for f in fields {
        if f.name == field {
            return Some(offset);
        }
        offset += size_of(&f.ty);
    }
    None
}

/// Interns struct types into the binary builder's Type section, keyed by name so a struct
/// referenced from several call sites gets one stable index rather than a fresh entry per use.
pub struct TypeRegistry {
    struct_index: HashMap<String, u32>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self { struct_index: HashMap::new() }
    }

    /// Resolve (registering if necessary) the Type-section index for `ty`.
    pub fn index_of(&mut self, builder: &mut BinaryBuilder, ty: &Type) -> u32 {
        match ty {
            Type::Struct { name, fields } => {
                if let Some(&idx) = self.struct_index.get(name) {
                    return idx;
                }
                let field_indices: Vec<u32> = fields.iter().map(|f| self.index_of(builder, &f.ty)).collect();
                let idx = builder.add_struct_type(ty.encode(), &field_indices, Some(name));
                self.struct_index.insert(name.clone(), idx);
                idx
            }
            Type::Vec { elem, .. } | Type::Array { elem, .. } => self.index_of(builder, elem),
            Type::Function { .. } => builder.primitive_type_index(MemoryType::Ptr),
            Type::Void => builder.primitive_type_index(MemoryType::Int64),
            other => builder.primitive_type_index(memory_type_of(other)),
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_width_signed_and_unsigned_map_to_distinct_tags() {
        assert_eq!(memory_type_of(&Type::Int { bits: 32, signed: true }), MemoryType::Int32);
        assert_eq!(memory_type_of(&Type::Int { bits: 32, signed: false }), MemoryType::Uint32);
    }

    #[test]
    fn f16_widens_to_f32() {
        assert_eq!(memory_type_of(&Type::Float { bits: 16 }), MemoryType::Float32);
    }

    #[test]
    fn struct_size_sums_fields() {
        let loc = hoil_ast::Location::new(1, 1, std::rc::Rc::from("t.hoil"));
        let ty = Type::Struct {
            name: "P".into(),
            fields: vec![
                hoil_ast::Field { name: "x".into(), ty: Type::Float { bits: 32 }, location: loc.clone() },
                hoil_ast::Field { name: "y".into(), ty: Type::Float { bits: 32 }, location: loc },
            ],
        };
        assert_eq!(size_of(&ty), 8);
    }

    #[test]
    fn field_offset_counts_preceding_fields() {
        let loc = hoil_ast::Location::new(1, 1, std::rc::Rc::from("t.hoil"));
        let fields = vec![
            hoil_ast::Field { name: "x".into(), ty: Type::Float { bits: 32 }, location: loc.clone() },
            hoil_ast::Field { name: "y".into(), ty: Type::Float { bits: 32 }, location: loc },
        ];
        assert_eq!(field_offset(&fields, "x"), Some(0));
        assert_eq!(field_offset(&fields, "y"), Some(4));
        assert_eq!(field_offset(&fields, "z"), None);
    }

    #[test]
    fn struct_type_index_is_reused() {
        let mut builder = BinaryBuilder::new();
        let mut registry = TypeRegistry::new();
        let ty = Type::Struct { name: "P".into(), fields: vec![] };
        let a = registry.index_of(&mut builder, &ty);
        let b = registry.index_of(&mut builder, &ty);
        assert_eq!(a, b);
    }
}
