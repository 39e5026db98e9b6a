//! Replaces every `Type::Named` reference with the concrete node it denotes (spec §4.6 pass 2).

use std::cell::RefCell;
use std::rc::Rc;

use hoil_ast::{Location, Type};
use hoil_diag::{DiagnosticCode, Diagnostics};
use hoil_symtab::{SymbolKind, SymbolTable};

/// Recursively resolve every `Named` node reachable from `ty`. Returns `false` (after reporting
/// a type error) on the first unknown name.
pub fn resolve_type(ty: &mut Type, globals: &Rc<RefCell<SymbolTable>>, diag: &mut Diagnostics, location: &Location) -> bool {
    match ty {
        Type::Named(name) => {
            let Some(entry) = globals.borrow().lookup_here(name) else {
                diag.report(
                    DiagnosticCode::Type,
                    format!("unknown type '{name}'"),
                    location.as_diag(),
                );
                return false;
            };
            if entry.kind != SymbolKind::Type {
                diag.report(
                    DiagnosticCode::Type,
                    format!("'{name}' does not name a type"),
                    location.as_diag(),
                );
                return false;
            }
            let Some(resolved) = entry.resolved_type else {
                diag.report(DiagnosticCode::Internal, format!("type '{name}' has no resolved shape"), location.as_diag());
                return false;
            };
            *ty = resolved;
            true
        }
        Type::Ptr { elem, .. } | Type::Vec { elem, .. } | Type::Array { elem, .. } => {
            resolve_type(elem, globals, diag, location)
        }
        Type::Struct { fields, .. } => {
            fields.iter_mut().all(|field| resolve_type(&mut field.ty, globals, diag, location))
        }
        Type::Function { params, ret } => {
            let params_ok = params.iter_mut().all(|p| resolve_type(p, globals, diag, location));
            params_ok && resolve_type(ret, globals, diag, location)
        }
        Type::Void | Type::Bool | Type::Int { .. } | Type::Float { .. } => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoil_ast::Field;
    use std::rc::Rc as StdRc;

    fn loc() -> Location {
        Location::new(1, 1, StdRc::from("t.hoil"))
    }

    #[test]
    fn named_resolves_to_registered_struct() {
        let globals = SymbolTable::new_root();
        let struct_ty = Type::Struct { name: "P".into(), fields: vec![] };
        globals.borrow_mut().add(
            hoil_symtab::SymbolEntry::new("P", SymbolKind::Type).with_type(struct_ty.clone()),
        );

        let mut ty = Type::Named("P".into());
        let mut diag = Diagnostics::new();
        assert!(resolve_type(&mut ty, &globals, &mut diag, &loc()));
        assert_eq!(ty, struct_ty);
        assert!(!diag.has_error());
    }

    #[test]
    fn unknown_named_type_is_a_type_error() {
        let globals = SymbolTable::new_root();
        let mut ty = Type::Named("Missing".into());
        let mut diag = Diagnostics::new();
        assert!(!resolve_type(&mut ty, &globals, &mut diag, &loc()));
        assert_eq!(diag.code(), Some(DiagnosticCode::Type));
    }

    #[test]
    fn resolves_through_pointer_and_array() {
        let globals = SymbolTable::new_root();
        globals.borrow_mut().add(
            hoil_symtab::SymbolEntry::new("P", SymbolKind::Type)
                .with_type(Type::Struct { name: "P".into(), fields: vec![Field { name: "x".into(), ty: Type::Int { bits: 32, signed: true }, location: loc() }] }),
        );

        let mut ty = Type::Ptr { elem: Box::new(Type::Named("P".into())), space: None };
        let mut diag = Diagnostics::new();
        assert!(resolve_type(&mut ty, &globals, &mut diag, &loc()));
        let Type::Ptr { elem, .. } = ty else { panic!() };
        assert!(matches!(*elem, Type::Struct { .. }));
    }
}
