//! Per-function code generation: register allocation, expression/statement lowering, and the
//! operand-packing conventions that fit HOIL's instructions into an 18-byte MIL record.
//!
//! ## Addressing model
//!
//! A register *is* an address: naming a local by its register number and reading the memory
//! cell at that address are the same operation. Two direct consequences:
//!
//! - **Calling convention.** A callee's parameters are always allocated registers `0, 1, 2, ...`
//!   in declaration order (see [`FnCtx::new`]). A caller can therefore pass arguments by writing
//!   them into addresses `0..n` right before `CALL` — no separate argument-passing mechanism is
//!   needed. This is a real but narrow convention: it assumes the caller's own registers in that
//!   range are dead across the call, which holds for straight-line, non-recursive code and is a
//!   known limitation of this register model (see `DESIGN.md`).
//! - **Return values.** `RET` has no operand slot for a return value in the wire format's
//!   function-exit opcode, so a return value is written to the fixed [`crate::RETURN_SLOT_ADDR`]
//!   cell with a plain `MOVE` immediately before `RET`, and the caller reads it back the same
//!   way immediately after `CALL`.
//!
//! ## MOVE vs. LOAD/STORE
//!
//! `MOVE dest, src` copies `mem[src]` into `mem[dest]` directly. `LOAD`/`STORE` add one level of
//! pointer indirection (`LOAD dest, p` reads `mem[mem[p]]`; `STORE p, v` writes `mem[mem[p]]`),
//! matching how a genuine pointer dereference differs from a plain local-to-local copy. Codegen
//! only ever synthesizes `MOVE` for identifier/field/index/call-result access; `LOAD`/`STORE`
//! are emitted exclusively from an explicit HOIL `LOAD`/`STORE` mnemonic.
//!
//! ## Conditional branches
//!
//! The wire format has no `BR_COND` opcode. A conditional `BR cond, t, f;` lowers to a
//! synthesized zero-literal comparison and a `JNE`/`JMP` pair (see [`emit_branch`]).
//!
//! ## EXIT's operand is an address, not a literal status
//!
//! Taken alone, an `EXIT`'s operand reads like a literal exit status. But a worked factorial
//! program that computes its result at runtime and then executes `EXIT` on that result only
//! makes sense if the interpreter dereferences the operand as an address and exits with the
//! value found there — a literal `imm` could never carry a value nobody could have known at
//! compile time. Every `RET`/`EXIT` this crate emits from an entry function's return value
//! therefore always evaluates the expression into a register first and passes that register's
//! address, never an inline literal.

use hoil_ast::{Expr, Function, Instr, Stmt, Type};
use hoil_builder::BinaryBuilder;
use mil_format::{MemoryType, Opcode};

use crate::labels::LabelPlan;
use crate::statics::Statics;
use crate::types::{field_offset, memory_type_of};
use crate::{CodegenError, MAX_REGISTER, NO_DEST_ADDR, RETURN_SLOT_ADDR};

/// Maps a function's local names (parameters and assignment targets) to the register — i.e. the
/// fixed memory address — holding their current value. Registers are never freed: this is a toy
/// VM with one flat address space, not a stack frame, so a function with more live names than
/// `MAX_REGISTER` simply cannot be compiled (see [`CodegenError::RegisterExhausted`]).
struct RegAlloc {
    map: std::collections::HashMap<String, u8>,
    next: u16,
}

impl RegAlloc {
    fn new() -> Self {
        Self { map: std::collections::HashMap::new(), next: 0 }
    }

    fn define(&mut self, name: &str) -> Result<u8, CodegenError> {
        if let Some(&r) = self.map.get(name) {
            return Ok(r);
        }
        let r = self.fresh()?;
        self.map.insert(name.to_string(), r);
        Ok(r)
    }

    fn fresh(&mut self) -> Result<u8, CodegenError> {
        if self.next > MAX_REGISTER as u16 {
            return Err(CodegenError::RegisterExhausted);
        }
        let r = self.next as u8;
        self.next += 1;
        Ok(r)
    }

    fn get(&self, name: &str) -> Option<u8> {
        self.map.get(name).copied()
    }
}

/// Per-function codegen state: live across every block of one function, reset for the next.
struct FnCtx<'a> {
    regs: RegAlloc,
    /// Declared types of parameters, so `p.field` and `p[i]` can resolve struct/array layout
    /// without re-running type inference over already-checked code.
    var_types: std::collections::HashMap<String, Type>,
    labels: &'a LabelPlan,
    function_name: &'a str,
    is_entry: bool,
}

impl<'a> FnCtx<'a> {
    fn new(f: &'a Function, labels: &'a LabelPlan, is_entry: bool) -> Result<Self, CodegenError> {
        let mut regs = RegAlloc::new();
        let mut var_types = std::collections::HashMap::new();
        for p in &f.params {
            regs.define(&p.name)?;
            var_types.insert(p.name.clone(), p.ty.clone());
        }
        Ok(Self { regs, var_types, labels, function_name: &f.name, is_entry })
    }
}

/// Emit one function's code: a `LabelDef` record at the top of each block (carrying the
/// module-wide label id in its `addr` field — the pre-pass that builds the label table reads a
/// `LabelDef`'s address operand as the id it defines — so the interpreter's label pre-pass can
/// resolve jump targets before running anything) followed by its lowered statements.
pub fn emit_function(
    builder: &mut BinaryBuilder,
    statics: &mut Statics,
    labels: &LabelPlan,
    f: &Function,
    is_entry: bool,
) -> Result<(), CodegenError> {
    let mut ctx = FnCtx::new(f, labels, is_entry)?;
    for block in &f.blocks {
        builder.add_block(&block.label);
        let label_id = labels
            .block_of(&f.name, &block.label)
            .ok_or_else(|| CodegenError::Internal(format!("block '{}' has no assigned label", block.label)))?;
        let label_id = u16::try_from(label_id)
            .map_err(|_| CodegenError::Internal(format!("block '{}' exceeds the 65535-label id space", block.label)))?;
        builder.add_instruction(Opcode::LabelDef, MemoryType::Int64, label_id, 0);
        for stmt in &block.stmts {
            emit_stmt(stmt, &mut ctx, builder, statics)?;
        }
    }
    Ok(())
}

fn emit_stmt(stmt: &Stmt, ctx: &mut FnCtx, builder: &mut BinaryBuilder, statics: &mut Statics) -> Result<(), CodegenError> {
    match stmt {
        Stmt::Assign { target, instr, .. } => {
            let dest = ctx.regs.define(target)?;
            emit_instr(instr, dest as u16, ctx, builder, statics)
        }
        Stmt::Instruction(instr) => emit_instr(instr, NO_DEST_ADDR, ctx, builder, statics),
        Stmt::Branch { cond, true_label, false_label, .. } => {
            emit_branch(cond.as_ref(), true_label, false_label.as_deref(), ctx, builder, statics)
        }
        Stmt::Return { value, .. } => emit_return(value.as_ref(), ctx, builder, statics),
    }
}

fn emit_branch(
    cond: Option<&Expr>,
    true_label: &str,
    false_label: Option<&str>,
    ctx: &mut FnCtx,
    builder: &mut BinaryBuilder,
    statics: &mut Statics,
) -> Result<(), CodegenError> {
    let true_id = resolve_block(ctx, true_label)?;

    let Some(cond_expr) = cond else {
        builder.add_instruction(Opcode::Jmp, MemoryType::Int64, NO_DEST_ADDR, true_id as u64);
        return Ok(());
    };

    let cond_reg = emit_expr(cond_expr, ctx, builder, statics)?;
    let zero_reg = ctx.regs.fresh()?;
    builder.add_instruction(Opcode::LoadImm, MemoryType::Int64, zero_reg as u16, 0);
    builder.add_instruction(Opcode::Jne, MemoryType::Int64, NO_DEST_ADDR, pack_cond_jump(cond_reg, zero_reg, true_id));

    if let Some(false_label) = false_label {
        let false_id = resolve_block(ctx, false_label)?;
        builder.add_instruction(Opcode::Jmp, MemoryType::Int64, NO_DEST_ADDR, false_id as u64);
    }
    // With no false label, falling off the JNE lands on the next block in source order —
    // HOIL's fallthrough semantics (spec §4.6).
    Ok(())
}

fn emit_return(value: Option<&Expr>, ctx: &mut FnCtx, builder: &mut BinaryBuilder, statics: &mut Statics) -> Result<(), CodegenError> {
    if ctx.is_entry {
        let status_reg = match value {
            Some(expr) => emit_expr(expr, ctx, builder, statics)?,
            None => {
                let r = ctx.regs.fresh()?;
                builder.add_instruction(Opcode::LoadImm, MemoryType::Int64, r as u16, 0);
                r
            }
        };
        builder.add_instruction(Opcode::Exit, MemoryType::Int64, NO_DEST_ADDR, status_reg as u64);
        return Ok(());
    }

    if let Some(expr) = value {
        let r = emit_expr(expr, ctx, builder, statics)?;
        builder.add_instruction(Opcode::Move, MemoryType::Int64, RETURN_SLOT_ADDR, r as u64);
    }
    builder.add_instruction(Opcode::Ret, MemoryType::Int64, NO_DEST_ADDR, 0);
    Ok(())
}

fn emit_instr(instr: &Instr, dest: u16, ctx: &mut FnCtx, builder: &mut BinaryBuilder, statics: &mut Statics) -> Result<(), CodegenError> {
    match instr.opcode.as_str() {
        "ALLOC_IMM" => {
            let (ty, imm) = literal_imm(operand(instr, 0)?)?;
            builder.add_instruction(Opcode::AllocImm, ty, dest, imm);
        }
        "ALLOC_MEM" => {
            let src = operand_addr(operand(instr, 0)?, ctx, builder, statics)?;
            builder.add_instruction(Opcode::AllocMem, MemoryType::Int64, dest, src as u64);
        }
        "MOVE" => {
            let src = operand_addr(operand(instr, 0)?, ctx, builder, statics)?;
            builder.add_instruction(Opcode::Move, MemoryType::Int64, dest, src as u64);
        }
        "LOAD" => {
            let src = operand_addr(operand(instr, 0)?, ctx, builder, statics)?;
            builder.add_instruction(Opcode::Load, MemoryType::Int64, dest, src as u64);
        }
        "LOAD_IMM" => {
            let (ty, imm) = literal_imm(operand(instr, 0)?)?;
            builder.add_instruction(Opcode::LoadImm, ty, dest, imm);
        }
        "STORE" => {
            let ptr = operand_addr(operand(instr, 0)?, ctx, builder, statics)?;
            let value = operand_addr(operand(instr, 1)?, ctx, builder, statics)?;
            builder.add_instruction(Opcode::Store, MemoryType::Int64, ptr, value as u64);
        }
        "ADD" | "SUB" | "MUL" | "DIV" | "MOD" | "AND" | "OR" | "XOR" | "SHL" | "SHR" => {
            let a = operand_addr(operand(instr, 0)?, ctx, builder, statics)?;
            let b = operand_addr(operand(instr, 1)?, ctx, builder, statics)?;
            builder.add_instruction(binary_opcode(&instr.opcode)?, MemoryType::Int64, dest, pack_two_addrs(a, b));
        }
        "NEG" | "NOT" => {
            let a = operand_addr(operand(instr, 0)?, ctx, builder, statics)?;
            builder.add_instruction(unary_opcode(&instr.opcode)?, MemoryType::Int64, dest, a as u64);
        }
        "PUSH" => {
            let a = operand_addr(operand(instr, 0)?, ctx, builder, statics)?;
            builder.add_instruction(Opcode::Push, MemoryType::Int64, a, 0);
        }
        "POP" => {
            builder.add_instruction(Opcode::Pop, MemoryType::Int64, dest, 0);
        }
        "CALL" => {
            let result = emit_expr(operand(instr, 0)?, ctx, builder, statics)?;
            if result as u16 != dest {
                builder.add_instruction(Opcode::Move, MemoryType::Int64, dest, result as u64);
            }
        }
        "SYSCALL" => emit_syscall(instr, ctx, builder, statics)?,
        "EXIT" => {
            let a = operand_addr(operand(instr, 0)?, ctx, builder, statics)?;
            builder.add_instruction(Opcode::Exit, MemoryType::Int64, NO_DEST_ADDR, a as u64);
        }
        other => {
            return Err(CodegenError::Internal(format!(
                "'{other}' is not reachable as a bare instruction; control flow must go through BR/RET"
            )));
        }
    }
    Ok(())
}

/// `SYSCALL num(, arg)*;`. `num` is always a literal. Every argument that follows is a value the
/// interpreter uses exactly as it appears in the `imm` field — the interpreter never dereferences
/// a `SYSCALL`'s packed arguments, so every one of them must already be known at compile time. A
/// worked example in the source material shows `SYSCALL 60` paired with `ARG_DATA imm=7` exiting
/// with status 7: if that `imm` were an address instead of the literal status, the interpreter
/// would need `memory[7]` to already hold `7`, which nothing in that minimal sequence arranges —
/// so `imm` has to be the argument itself. A single argument is carried verbatim, unshifted, in
/// `ARG_DATA`'s `imm`; more than one is packed one per 16-bit slot, highest argument in the
/// highest slot (so `write`'s `fd, buf_addr, count` fits in three of the four slots, with
/// `buf_addr` used directly as the address to start reading from — it needs no further
/// indirection, since that address *is* the argument).
///
/// A local or parameter reference therefore cannot be passed to `SYSCALL`: its value isn't known
/// until runtime, and this wire format has no per-argument tag to tell the interpreter "dereference
/// this slot." A global, constant, or string literal works, since those already have a fixed
/// address or (for an integer constant) a fixed value at compile time.
fn emit_syscall(instr: &Instr, ctx: &mut FnCtx, builder: &mut BinaryBuilder, statics: &mut Statics) -> Result<(), CodegenError> {
    let num = literal_u64(operand(instr, 0)?)?;
    builder.add_instruction(Opcode::Syscall, MemoryType::Int64, NO_DEST_ADDR, num);

    match instr.operands.len() {
        0 | 1 => {}
        2 => {
            let imm = resolve_syscall_arg(&instr.operands[1], ctx, statics)? as u64;
            builder.add_instruction(Opcode::ArgData, MemoryType::Int64, NO_DEST_ADDR, imm);
        }
        _ => {
            let mut packed: [u16; 4] = [0; 4];
            for (i, arg) in instr.operands[1..].iter().take(4).enumerate() {
                packed[i] = resolve_syscall_arg(arg, ctx, statics)?;
            }
            let imm = (packed[0] as u64) << 48 | (packed[1] as u64) << 32 | (packed[2] as u64) << 16 | (packed[3] as u64);
            builder.add_instruction(Opcode::ArgData, MemoryType::Int64, NO_DEST_ADDR, imm);
        }
    }
    Ok(())
}

fn resolve_syscall_arg(expr: &Expr, ctx: &FnCtx, statics: &Statics) -> Result<u16, CodegenError> {
    match expr {
        Expr::Integer { value, .. } => Ok(*value as u16),
        Expr::Identifier { name, .. } if ctx.regs.get(name).is_none() => {
            statics.addr_of(name).ok_or(CodegenError::BadSyscallArgument)
        }
        _ => Err(CodegenError::BadSyscallArgument),
    }
}

/// Evaluate `expr`, returning the register (address) holding its value.
fn emit_expr(expr: &Expr, ctx: &mut FnCtx, builder: &mut BinaryBuilder, statics: &mut Statics) -> Result<u8, CodegenError> {
    match expr {
        Expr::Integer { value, .. } => {
            let r = ctx.regs.fresh()?;
            builder.add_instruction(Opcode::LoadImm, MemoryType::Int64, r as u16, *value as u64);
            Ok(r)
        }
        Expr::Float { value, .. } => {
            let r = ctx.regs.fresh()?;
            builder.add_instruction(Opcode::LoadImm, MemoryType::Float64, r as u16, value.to_bits());
            Ok(r)
        }
        Expr::String { value, .. } => {
            let bytes = value.as_bytes();
            let addr = statics.reserve_bytes(bytes.len())?;
            for (i, &b) in bytes.iter().enumerate() {
                builder.add_instruction(Opcode::AllocImm, MemoryType::Uint8, addr + i as u16, b as u64);
            }
            let r = ctx.regs.fresh()?;
            builder.add_instruction(Opcode::LoadImm, MemoryType::Ptr, r as u16, addr as u64);
            Ok(r)
        }
        Expr::Identifier { name, .. } => {
            if let Some(r) = ctx.regs.get(name) {
                return Ok(r);
            }
            let addr = statics.addr_of(name).ok_or_else(|| CodegenError::Internal(format!("unresolved identifier '{name}'")))?;
            let ty = statics.type_of(name).cloned().unwrap_or(Type::Int { bits: 64, signed: true });
            let r = ctx.regs.fresh()?;
            builder.add_instruction(Opcode::Move, memory_type_of(&ty), r as u16, addr as u64);
            Ok(r)
        }
        Expr::FieldAccess { base, field, .. } => {
            let Expr::Identifier { name: base_name, .. } = base.as_ref() else {
                return Err(CodegenError::UnsupportedFieldAccess { base: format!("{base:?}") });
            };
            let base_ty = lookup_var_type(ctx, statics, base_name).ok_or_else(|| CodegenError::UnsupportedFieldAccess { base: base_name.clone() })?;
            let Type::Struct { fields, .. } = &base_ty else {
                return Err(CodegenError::UnsupportedFieldAccess { base: base_name.clone() });
            };
            let offset = field_offset(fields, field).ok_or_else(|| CodegenError::UnsupportedFieldAccess { base: base_name.clone() })?;
            let field_ty = fields.iter().find(|f| f.name == *field).unwrap().ty.clone();
            let base_addr = lookup_var_addr(ctx, statics, base_name).ok_or_else(|| CodegenError::UnsupportedFieldAccess { base: base_name.clone() })?;
            let r = ctx.regs.fresh()?;
            builder.add_instruction(Opcode::Move, memory_type_of(&field_ty), r as u16, (base_addr as usize + offset) as u64);
            Ok(r)
        }
        Expr::Index { base, index, .. } => {
            let Expr::Identifier { name: base_name, .. } = base.as_ref() else {
                return Err(CodegenError::UnsupportedIndex);
            };
            let Expr::Integer { value: idx, .. } = index.as_ref() else {
                return Err(CodegenError::UnsupportedIndex);
            };
            let base_ty = lookup_var_type(ctx, statics, base_name).ok_or(CodegenError::UnsupportedIndex)?;
            let elem_ty = match &base_ty {
                Type::Array { elem, .. } | Type::Vec { elem, .. } | Type::Ptr { elem, .. } => (**elem).clone(),
                _ => return Err(CodegenError::UnsupportedIndex),
            };
            let elem_size = crate::types::size_of(&elem_ty);
            let base_addr = lookup_var_addr(ctx, statics, base_name).ok_or(CodegenError::UnsupportedIndex)?;
            let addr = base_addr as usize + (*idx as usize) * elem_size;
            let r = ctx.regs.fresh()?;
            builder.add_instruction(Opcode::Move, memory_type_of(&elem_ty), r as u16, addr as u64);
            Ok(r)
        }
        Expr::Call { callee, args, .. } => {
            let Expr::Identifier { name, .. } = callee.as_ref() else {
                return Err(CodegenError::IndirectCall);
            };
            for (i, arg) in args.iter().enumerate() {
                let r = emit_expr(arg, ctx, builder, statics)?;
                builder.add_instruction(Opcode::Move, MemoryType::Int64, i as u16, r as u64);
            }
            let target = ctx.labels.entry_of(name).ok_or_else(|| CodegenError::UnknownFunction { name: name.clone() })?;
            builder.add_instruction(Opcode::Call, MemoryType::Int64, NO_DEST_ADDR, target as u64);
            let r = ctx.regs.fresh()?;
            builder.add_instruction(Opcode::Move, MemoryType::Int64, r as u16, RETURN_SLOT_ADDR as u64);
            Ok(r)
        }
    }
}

fn lookup_var_type(ctx: &FnCtx, statics: &Statics, name: &str) -> Option<Type> {
    ctx.var_types.get(name).cloned().or_else(|| statics.type_of(name).cloned())
}

fn lookup_var_addr(ctx: &FnCtx, statics: &Statics, name: &str) -> Option<u16> {
    ctx.regs.get(name).map(|r| r as u16).or_else(|| statics.addr_of(name))
}

fn resolve_block(ctx: &FnCtx, label: &str) -> Result<u32, CodegenError> {
    ctx.labels
        .block_of(ctx.function_name, label)
        .ok_or_else(|| CodegenError::Internal(format!("branch to unknown block '{label}'")))
}

fn operand(instr: &Instr, i: usize) -> Result<&Expr, CodegenError> {
    instr.operands.get(i).ok_or_else(|| CodegenError::Internal(format!("'{}' is missing an operand", instr.opcode)))
}

fn operand_addr(expr: &Expr, ctx: &mut FnCtx, builder: &mut BinaryBuilder, statics: &mut Statics) -> Result<u16, CodegenError> {
    Ok(emit_expr(expr, ctx, builder, statics)? as u16)
}

fn literal_imm(expr: &Expr) -> Result<(MemoryType, u64), CodegenError> {
    match expr {
        Expr::Integer { value, .. } => Ok((MemoryType::Int64, *value as u64)),
        Expr::Float { value, .. } => Ok((MemoryType::Float64, value.to_bits())),
        _ => Err(CodegenError::Internal("expected a literal operand".into())),
    }
}

fn literal_u64(expr: &Expr) -> Result<u64, CodegenError> {
    match expr {
        Expr::Integer { value, .. } => Ok(*value as u64),
        _ => Err(CodegenError::Internal("expected a literal integer operand".into())),
    }
}

fn binary_opcode(mnemonic: &str) -> Result<Opcode, CodegenError> {
    Ok(match mnemonic {
        "ADD" => Opcode::Add,
        "SUB" => Opcode::Sub,
        "MUL" => Opcode::Mul,
        "DIV" => Opcode::Div,
        "MOD" => Opcode::Mod,
        "AND" => Opcode::And,
        "OR" => Opcode::Or,
        "XOR" => Opcode::Xor,
        "SHL" => Opcode::Shl,
        "SHR" => Opcode::Shr,
        other => return Err(CodegenError::Internal(format!("'{other}' is not a binary opcode"))),
    })
}

fn unary_opcode(mnemonic: &str) -> Result<Opcode, CodegenError> {
    Ok(match mnemonic {
        "NEG" => Opcode::Neg,
        "NOT" => Opcode::Not,
        other => return Err(CodegenError::Internal(format!("'{other}' is not a unary opcode"))),
    })
}

/// Pack two source addresses into one `imm` field: `a` in bits 32..48, `b` in bits 0..16 — the
/// `(src1 << 32) | src2` convention the arithmetic and bitwise opcodes read their operands with.
fn pack_two_addrs(a: u16, b: u16) -> u64 {
    ((a as u64) << 32) | (b as u64)
}

/// Pack a conditional jump's two comparands and its target label id into one `imm` field.
fn pack_cond_jump(a: u8, b: u8, target: u32) -> u64 {
    ((a as u64) << 48) | ((b as u64) << 32) | (target as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{emission_order, plan_labels};
    use hoil_builder::BinaryBuilder;
    use hoil_diag::Diagnostics;

    fn parse(source: &str) -> hoil_ast::Module {
        let mut diag = Diagnostics::new();
        let mut module = hoil_parser::parse_module(source, "t.hoil", &mut diag).expect("must parse");
        let mut check_diag = Diagnostics::new();
        assert!(hoil_check::check_module(&mut module, &mut check_diag), "{:?}", check_diag.first());
        module
    }

    #[test]
    fn add_function_emits_without_error() {
        let module = parse(
            r#"
            MODULE "m";
            FUNCTION add(a: i32, b: i32) -> i32 {
            entry:
                r = ADD a, b;
                RET r;
            }
            "#,
        );
        let order = emission_order(&module);
        let plan = plan_labels(&order);
        let mut builder = BinaryBuilder::new();
        let mut statics = Statics::new();
        builder.begin_function_code(0);
        emit_function(&mut builder, &mut statics, &plan, order[0], true).unwrap();
        builder.end_function_code();
    }

    #[test]
    fn conditional_branch_lowers_without_a_br_cond_opcode() {
        let module = parse(
            r#"
            MODULE "m";
            FUNCTION f(a: i32) -> void {
            entry:
                BR a, yes, no;
            yes:
                RET;
            no:
                RET;
            }
            "#,
        );
        let order = emission_order(&module);
        let plan = plan_labels(&order);
        let mut builder = BinaryBuilder::new();
        let mut statics = Statics::new();
        builder.begin_function_code(0);
        emit_function(&mut builder, &mut statics, &plan, order[0], true).unwrap();
        builder.end_function_code();
    }

    #[test]
    fn register_exhaustion_is_reported_not_panicked() {
        let mut alloc = RegAlloc::new();
        for i in 0..255 {
            alloc.define(&format!("v{i}")).unwrap();
        }
        assert!(matches!(alloc.define("overflow"), Err(CodegenError::RegisterExhausted)));
    }
}
