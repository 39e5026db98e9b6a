//! Walks a checked [`hoil_ast::Module`] and drives [`hoil_builder::BinaryBuilder`] to emit MIL.
//!
//! Input to this crate is assumed already resolved and type-checked by `hoil-check` — codegen
//! does not re-validate names or types, it only lowers them. Three module-wide passes run before
//! any instruction is emitted:
//!
//! 1. [`labels::plan_labels`] numbers every block in every function once, so a forward branch or
//!    call target is always known.
//! 2. Struct types are interned into the Type section ([`types::TypeRegistry`]).
//! 3. Globals and constants are given a static address ([`statics::Statics`]) and, where their
//!    initializer is a literal, a `@init` pseudo-function is synthesized to materialize it before
//!    the program's first real function runs (see [`try_generate`]).
//!
//! Per-function codegen, including the register allocator and the mnemonic-to-opcode operand
//! packing, lives in `function.rs`.

mod function;
mod labels;
mod statics;
mod types;

use hoil_ast::{Decl, Module, Type};
use hoil_builder::BinaryBuilder;
use hoil_diag::{DiagnosticCode, Diagnostics};
use mil_format::Opcode;

use function::emit_function;
use labels::{emission_order, plan_labels};
use statics::Statics;
use types::{memory_type_of, TypeRegistry};

/// The highest register number codegen will allocate. `255` is reserved to mean "no
/// destination" for instructions whose result nobody captures.
const MAX_REGISTER: u8 = 254;
/// The address used for an instruction's `addr` field when no destination register applies.
const NO_DEST_ADDR: u16 = 255;
/// Fixed memory cell a non-entry function's `RET value;` writes to before `RET`, and its caller
/// reads immediately after `CALL`. Placed near the top of the 64K address space, well clear of
/// both the register range and where `Statics` bump-allocates from.
const RETURN_SLOT_ADDR: u16 = 0xFFF8;

/// Errors that stop codegen. Every one of these reflects a compiler resource limit or an
/// unsupported-but-syntactically-legal construct, never a user type/name error — those are
/// already caught by `hoil-check` before a module reaches this crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CodegenError {
    #[error("function uses more than 255 live locals; the register allocator has no more addresses")]
    RegisterExhausted,
    #[error("ran out of static memory allocating '{name}'")]
    StaticMemoryExhausted { name: String },
    #[error("call to unknown function '{name}'")]
    UnknownFunction { name: String },
    #[error("unsupported field access on '{base}': not a local or global of a known struct type")]
    UnsupportedFieldAccess { base: String },
    #[error("unsupported index expression: base must be a named array/vec/pointer and the index a literal integer")]
    UnsupportedIndex,
    #[error("calls through a computed callee are not supported")]
    IndirectCall,
    #[error("a syscall argument must be a literal integer or a local name")]
    BadSyscallArgument,
    #[error("internal codegen error: {0}")]
    Internal(String),
}

/// Lower `module` to a `.coil` byte string. On failure, reports an [`DiagnosticCode::Internal`]
/// diagnostic to `diag` and returns `None` — codegen failures are always resource limits or
/// unsupported constructs, which is exactly what that code means.
pub fn generate_module(module: &Module, diag: &mut Diagnostics) -> Option<Vec<u8>> {
    tracing::debug!(module = module.name.as_str(), decls = module.decls.len(), "codegen starting");
    match try_generate(module) {
        Ok(bytes) => {
            tracing::debug!(bytes = bytes.len(), "codegen finished");
            Some(bytes)
        }
        Err(err) => {
            tracing::error!(%err, "codegen failed");
            diag.report_no_location(DiagnosticCode::Internal, err.to_string());
            None
        }
    }
}

fn literal_imm_bits(expr: &hoil_ast::Expr) -> Option<u64> {
    match expr {
        hoil_ast::Expr::Integer { value, .. } => Some(*value as u64),
        hoil_ast::Expr::Float { value, .. } => Some(value.to_bits()),
        _ => None,
    }
}

fn encode_bytes(imm: u64, ty: &Type) -> Vec<u8> {
    let size = memory_type_of(ty).size();
    imm.to_le_bytes()[..size].to_vec()
}

fn try_generate(module: &Module) -> Result<Vec<u8>, CodegenError> {
    let mut builder = BinaryBuilder::new();
    builder.set_module_name(&module.name);
    let mut types = TypeRegistry::new();
    let mut statics = Statics::new();

    for decl in &module.decls {
        if let Decl::TypeDef(def) = decl {
            types.index_of(&mut builder, &Type::Struct { name: def.name.clone(), fields: def.fields.clone() });
        }
    }

    let mut preamble: Vec<(u16, mil_format::MemoryType, u64)> = Vec::new();
    for decl in &module.decls {
        match decl {
            Decl::Global(g) => {
                let addr = statics.declare(&g.name, &g.ty)?;
                let type_idx = types.index_of(&mut builder, &g.ty);
                let imm_bits = g.init.as_ref().and_then(literal_imm_bits);
                let init_bytes = imm_bits.map(|b| encode_bytes(b, &g.ty));
                builder.add_global(&g.name, type_idx, init_bytes.as_deref());
                if let Some(imm) = imm_bits {
                    preamble.push((addr, memory_type_of(&g.ty), imm));
                }
            }
            Decl::Constant(c) => {
                let addr = statics.declare(&c.name, &c.ty)?;
                let type_idx = types.index_of(&mut builder, &c.ty);
                let imm_bits = literal_imm_bits(&c.value);
                let init_bytes = imm_bits.map(|b| encode_bytes(b, &c.ty)).unwrap_or_default();
                builder.add_constant(&c.name, type_idx, &init_bytes);
                if let Some(imm) = imm_bits {
                    preamble.push((addr, memory_type_of(&c.ty), imm));
                }
            }
            _ => {}
        }
    }

    let order = emission_order(module);
    let plan = plan_labels(&order);

    let mut function_index = std::collections::HashMap::new();
    for decl in &module.decls {
        match decl {
            Decl::Function(f) => {
                let param_idxs: Vec<u32> = f.params.iter().map(|p| types.index_of(&mut builder, &p.ty)).collect();
                let ret_idx = types.index_of(&mut builder, &f.ret);
                let entry_id = plan.entry_of(&f.name).unwrap_or(0);
                let idx = builder.add_function(&f.name, &param_idxs, ret_idx, entry_id);
                function_index.insert(f.name.clone(), idx);
            }
            Decl::ExternFunction(f) => {
                let param_idxs: Vec<u32> = f.params.iter().map(|p| types.index_of(&mut builder, &p.ty)).collect();
                let ret_idx = types.index_of(&mut builder, &f.ret);
                // Extern functions have no body and so no entry block; `u32::MAX` marks the
                // absence rather than aliasing a real label id.
                builder.add_function(&f.name, &param_idxs, ret_idx, u32::MAX);
            }
            _ => {}
        }
    }

    if !preamble.is_empty() {
        let void_idx = types.index_of(&mut builder, &Type::Void);
        let init_idx = builder.add_function("@init", &[], void_idx, 0);
        builder.begin_function_code(init_idx);
        builder.add_block("@init");
        for (addr, ty, imm) in &preamble {
            builder.add_instruction(Opcode::AllocImm, *ty, *addr, *imm);
        }
        builder.end_function_code();
    }

    for (i, f) in order.into_iter().enumerate() {
        let idx = *function_index.get(&f.name).expect("every function was registered above");
        builder.begin_function_code(idx);
        emit_function(&mut builder, &mut statics, &plan, f, i == 0)?;
        builder.end_function_code();
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mil_format::{FileHeader, MAGIC};

    fn check(source: &str) -> Module {
        let mut diag = Diagnostics::new();
        let mut module = hoil_parser::parse_module(source, "t.hoil", &mut diag).expect("must parse");
        let mut check_diag = Diagnostics::new();
        assert!(hoil_check::check_module(&mut module, &mut check_diag), "{:?}", check_diag.first());
        module
    }

    #[test]
    fn minimal_main_exits_zero() {
        let module = check(
            r#"
            MODULE "m";
            FUNCTION main() -> i32 {
            entry:
                RET 0;
            }
            "#,
        );
        let mut diag = Diagnostics::new();
        let bytes = generate_module(&module, &mut diag).expect("codegen must succeed");
        assert_eq!(&bytes[0..4], &MAGIC.to_le_bytes());
        let header = FileHeader::decode(&bytes).unwrap();
        assert_eq!(header.section_count, 7);
    }

    #[test]
    fn global_initializer_produces_an_init_preamble() {
        let module = check(
            r#"
            MODULE "m";
            GLOBAL counter : i32 = 41;
            FUNCTION main() -> i32 {
            entry:
                RET counter;
            }
            "#,
        );
        let mut diag = Diagnostics::new();
        assert!(generate_module(&module, &mut diag).is_some(), "{:?}", diag.first());
    }

    #[test]
    fn calling_a_function_round_trips_a_return_value() {
        let module = check(
            r#"
            MODULE "m";
            FUNCTION add(a: i32, b: i32) -> i32 {
            entry:
                r = ADD a, b;
                RET r;
            }
            FUNCTION main() -> i32 {
            entry:
                r = CALL add(1, 2);
                RET r;
            }
            "#,
        );
        let mut diag = Diagnostics::new();
        assert!(generate_module(&module, &mut diag).is_some(), "{:?}", diag.first());
    }

    #[test]
    fn struct_field_access_compiles() {
        let module = check(
            r#"
            MODULE "m";
            TYPE Point { x: i32, y: i32 }
            FUNCTION sum(p: Point) -> i32 {
            entry:
                r = ADD p.x, p.y;
                RET r;
            }
            "#,
        );
        let mut diag = Diagnostics::new();
        assert!(generate_module(&module, &mut diag).is_some(), "{:?}", diag.first());
    }
}
