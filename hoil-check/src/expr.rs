//! Expression type inference (spec §4.6's type-checking matrix, expression half).

use std::cell::RefCell;
use std::rc::Rc;

use hoil_ast::{Expr, Type};
use hoil_diag::{DiagnosticCode, Diagnostics};
use hoil_symtab::SymbolTable;

/// Infer the type of `expr` in `scope`, reporting and returning `None` on the first failure.
pub fn infer_expr(expr: &Expr, scope: &Rc<RefCell<SymbolTable>>, diag: &mut Diagnostics) -> Option<Type> {
    match expr {
        Expr::Integer { .. } => Some(Type::Int { bits: 32, signed: true }),
        Expr::Float { .. } => Some(Type::Float { bits: 64 }),
        Expr::String { .. } => Some(Type::ptr(Type::Int { bits: 8, signed: true })),
        Expr::Identifier { name, location } => {
            let Some(entry) = scope.borrow().lookup_up(name) else {
                diag.report(DiagnosticCode::Semantic, format!("unknown name '{name}'"), location.as_diag());
                return None;
            };
            match entry.resolved_type {
                Some(ty) => Some(ty),
                None => {
                    diag.report(DiagnosticCode::Internal, format!("'{name}' has no resolved type"), location.as_diag());
                    None
                }
            }
        }
        Expr::FieldAccess { base, field, location } => {
            let base_ty = infer_expr(base, scope, diag)?;
            match base_ty {
                Type::Struct { fields, name } => {
                    if let Some(f) = fields.iter().find(|f| &f.name == field) {
                        Some(f.ty.clone())
                    } else {
                        diag.report(
                            DiagnosticCode::Semantic,
                            format!("struct '{name}' has no field '{field}'"),
                            location.as_diag(),
                        );
                        None
                    }
                }
                other => {
                    diag.report(
                        DiagnosticCode::Type,
                        format!("'{}' is not a struct value", describe(&other)),
                        location.as_diag(),
                    );
                    None
                }
            }
        }
        Expr::Index { base, index, location } => {
            let base_ty = infer_expr(base, scope, diag)?;
            let index_ty = infer_expr(index, scope, diag)?;
            if !matches!(index_ty, Type::Int { .. }) {
                diag.report(DiagnosticCode::Type, "index expression must be an integer", location.as_diag());
                return None;
            }
            match base_ty {
                Type::Ptr { elem, .. } | Type::Vec { elem, .. } | Type::Array { elem, .. } => Some(*elem),
                other => {
                    diag.report(
                        DiagnosticCode::Type,
                        format!("'{}' cannot be indexed", describe(&other)),
                        location.as_diag(),
                    );
                    None
                }
            }
        }
        Expr::Call { callee, args, location } => {
            let callee_ty = infer_expr(callee, scope, diag)?;
            let Type::Function { params, ret } = callee_ty else {
                diag.report(
                    DiagnosticCode::Type,
                    format!("'{}' is not callable", describe(&callee_ty)),
                    location.as_diag(),
                );
                return None;
            };
            if params.len() != args.len() {
                diag.report(
                    DiagnosticCode::Semantic,
                    format!("expected {} argument(s), found {}", params.len(), args.len()),
                    location.as_diag(),
                );
                return None;
            }
            for (param_ty, arg) in params.iter().zip(args) {
                let arg_ty = infer_expr(arg, scope, diag)?;
                if !arg_ty.compatible(param_ty) {
                    diag.report(DiagnosticCode::Type, "argument type does not match parameter type", arg.location().as_diag());
                    return None;
                }
            }
            Some(*ret)
        }
    }
}

fn describe(ty: &Type) -> &'static str {
    match ty {
        Type::Void => "void",
        Type::Bool => "bool",
        Type::Int { .. } => "integer",
        Type::Float { .. } => "float",
        Type::Ptr { .. } => "pointer",
        Type::Vec { .. } => "vector",
        Type::Array { .. } => "array",
        Type::Struct { .. } => "struct",
        Type::Function { .. } => "function",
        Type::Named(_) => "unresolved",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoil_ast::Location;
    use hoil_symtab::{SymbolEntry, SymbolKind};
    use std::rc::Rc as StdRc;

    fn loc() -> Location {
        Location::new(1, 1, StdRc::from("t.hoil"))
    }

    #[test]
    fn integer_literal_is_i32() {
        let scope = SymbolTable::new_root();
        let mut diag = Diagnostics::new();
        let expr = Expr::Integer { value: 7, location: loc() };
        assert_eq!(infer_expr(&expr, &scope, &mut diag), Some(Type::Int { bits: 32, signed: true }));
    }

    #[test]
    fn unknown_identifier_is_semantic_error() {
        let scope = SymbolTable::new_root();
        let mut diag = Diagnostics::new();
        let expr = Expr::Identifier { name: "x".into(), location: loc() };
        assert!(infer_expr(&expr, &scope, &mut diag).is_none());
        assert_eq!(diag.code(), Some(DiagnosticCode::Semantic));
    }

    #[test]
    fn field_access_on_known_struct() {
        let scope = SymbolTable::new_root();
        scope.borrow_mut().add(
            SymbolEntry::new("p", SymbolKind::Local).with_type(Type::Struct {
                name: "Point".into(),
                fields: vec![hoil_ast::Field { name: "x".into(), ty: Type::Int { bits: 32, signed: true }, location: loc() }],
            }),
        );
        let mut diag = Diagnostics::new();
        let expr = Expr::FieldAccess {
            base: Box::new(Expr::Identifier { name: "p".into(), location: loc() }),
            field: "x".into(),
            location: loc(),
        };
        assert_eq!(infer_expr(&expr, &scope, &mut diag), Some(Type::Int { bits: 32, signed: true }));
    }

    #[test]
    fn call_checks_arity() {
        let scope = SymbolTable::new_root();
        scope.borrow_mut().add(SymbolEntry::new("f", SymbolKind::Function).with_type(Type::Function {
            params: vec![Type::Int { bits: 32, signed: true }],
            ret: Box::new(Type::Void),
        }));
        let mut diag = Diagnostics::new();
        let expr = Expr::Call { callee: Box::new(Expr::Identifier { name: "f".into(), location: loc() }), args: vec![], location: loc() };
        assert!(infer_expr(&expr, &scope, &mut diag).is_none());
        assert_eq!(diag.code(), Some(DiagnosticCode::Semantic));
    }
}
