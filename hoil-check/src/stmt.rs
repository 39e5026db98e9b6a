//! Statement and function-body checking (spec §4.6's type-checking matrix, statement half).

use std::cell::RefCell;
use std::rc::Rc;

use hoil_ast::{Function, Instr, Stmt, Type};
use hoil_diag::{DiagnosticCode, Diagnostics};
use hoil_symtab::{SymbolEntry, SymbolKind, SymbolTable};

use crate::expr::infer_expr;

/// Check one function body: parameters and block labels are pre-registered into a function-local
/// scope before any statement is visited, so both backward and forward branches resolve.
pub fn check_function(function: &Function, globals: &Rc<RefCell<SymbolTable>>, diag: &mut Diagnostics) -> bool {
    let scope = SymbolTable::create_child(globals);

    for param in &function.params {
        let entry = SymbolEntry::new(param.name.clone(), SymbolKind::Parameter).with_type(param.ty.clone()).defined();
        if !scope.borrow_mut().add(entry) {
            diag.report(DiagnosticCode::Semantic, format!("duplicate parameter '{}'", param.name), param.location.as_diag());
            return false;
        }
    }

    for block in &function.blocks {
        let entry = SymbolEntry::new(block.label.clone(), SymbolKind::Block).defined();
        if !scope.borrow_mut().add(entry) {
            diag.report(DiagnosticCode::Semantic, format!("duplicate block label '{}'", block.label), block.location.as_diag());
            return false;
        }
    }

    for block in &function.blocks {
        for stmt in &block.stmts {
            if !check_stmt(stmt, function, &scope, diag) {
                return false;
            }
        }
    }

    true
}

fn check_stmt(stmt: &Stmt, function: &Function, scope: &Rc<RefCell<SymbolTable>>, diag: &mut Diagnostics) -> bool {
    match stmt {
        Stmt::Assign { target, instr, location } => {
            let Some(rhs_ty) = infer_instr(instr, scope, diag) else { return false };
            let existing = scope.borrow().lookup_up(target);
            match existing {
                Some(entry) => {
                    let declared = match entry.resolved_type {
                        Some(ty) => ty,
                        None => {
                            diag.report(DiagnosticCode::Internal, format!("'{target}' has no resolved type"), location.as_diag());
                            return false;
                        }
                    };
                    if !rhs_ty.compatible(&declared) {
                        diag.report(
                            DiagnosticCode::Type,
                            format!("cannot assign to '{target}': incompatible types"),
                            location.as_diag(),
                        );
                        return false;
                    }
                    true
                }
                None => scope.borrow_mut().add(
                    SymbolEntry::new(target.clone(), SymbolKind::Local).with_type(rhs_ty).defined(),
                ),
            }
        }
        Stmt::Instruction(instr) => infer_instr(instr, scope, diag).is_some(),
        Stmt::Branch { cond, true_label, false_label, location } => {
            if let Some(cond) = cond {
                match infer_expr(cond, scope, diag) {
                    // A branch condition is evaluated as a zero/non-zero integer register at
                    // the wire level (there is no dedicated boolean comparison opcode), so any
                    // `bool` or integer-typed expression is accepted, not only `bool` itself.
                    Some(Type::Bool) | Some(Type::Int { .. }) => {}
                    Some(_) => {
                        diag.report(DiagnosticCode::Type, "branch condition must be bool or integer", location.as_diag());
                        return false;
                    }
                    None => return false,
                }
            }
            if !block_exists(scope, true_label) {
                diag.report(DiagnosticCode::Semantic, format!("unknown block '{true_label}'"), location.as_diag());
                return false;
            }
            if let Some(label) = false_label {
                if !block_exists(scope, label) {
                    diag.report(DiagnosticCode::Semantic, format!("unknown block '{label}'"), location.as_diag());
                    return false;
                }
            }
            true
        }
        Stmt::Return { value, location } => match value {
            Some(expr) => {
                let Some(value_ty) = infer_expr(expr, scope, diag) else { return false };
                if matches!(function.ret, Type::Void) {
                    diag.report(DiagnosticCode::Type, "cannot return a value from a void function", location.as_diag());
                    return false;
                }
                if !value_ty.compatible(&function.ret) {
                    diag.report(DiagnosticCode::Type, "return value does not match the declared return type", location.as_diag());
                    return false;
                }
                true
            }
            None => {
                if !matches!(function.ret, Type::Void) {
                    diag.report(DiagnosticCode::Type, "missing return value", location.as_diag());
                    return false;
                }
                true
            }
        },
    }
}

fn block_exists(scope: &Rc<RefCell<SymbolTable>>, label: &str) -> bool {
    matches!(scope.borrow().lookup_here(label), Some(entry) if entry.kind == SymbolKind::Block)
}

/// A bare mnemonic's result type is the type of its first operand, following the convention that
/// every arithmetic and memory opcode in this instruction set preserves its operand type. An
/// instruction with no operands (for example a bare `SYSCALL`) has type `Void`.
fn infer_instr(instr: &Instr, scope: &Rc<RefCell<SymbolTable>>, diag: &mut Diagnostics) -> Option<Type> {
    let mut result = Type::Void;
    for (index, operand) in instr.operands.iter().enumerate() {
        let ty = infer_expr(operand, scope, diag)?;
        if index == 0 {
            result = ty;
        }
    }
    Some(result)
}
