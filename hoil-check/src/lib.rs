//! Two-pass name resolution and type checking over a parsed module.
//!
//! Pass 1 registers every type, constant, global, and function name into a single global table —
//! a duplicate name anywhere in that namespace is rejected regardless of declaration kind, the
//! same way C5's table rejects a second insertion into one scope. Pass 2 then walks the module a
//! second time in source order: first resolving every [`hoil_ast::Type::Named`] reference to the
//! concrete node it denotes, then type-checking constant initializers, global initializers, and
//! function bodies against the now-concrete types.
//!
//! A struct embedded *by value* inside another struct declared earlier in the same module sees
//! the embedding struct's pre-resolution field shape if the embedded struct itself has unresolved
//! fields at that point; struct identity for compatibility purposes is nominal (by name, see
//! [`hoil_ast::Type::compatible`]), so this only matters for direct field-chain access through an
//! embedded value, not for pointers or general type checking. Self-referential value structs are
//! not meaningful in a value-typed language and are not specially guarded against here.

mod expr;
mod resolve;
mod stmt;

use std::cell::RefCell;
use std::rc::Rc;

use hoil_ast::{Decl, Module, Type};
use hoil_diag::{DiagnosticCode, Diagnostics};
use hoil_symtab::{SymbolEntry, SymbolKind, SymbolTable};

use resolve::resolve_type;
use stmt::check_function;

/// Resolve and type-check `module` in place. Returns `true` if no diagnostic was reported.
///
/// On the first error, `diag` holds it and this function returns `false` immediately — later
/// declarations are left unresolved and unchecked, matching the diagnostics sink's first-error
/// discipline.
pub fn check_module(module: &mut Module, diag: &mut Diagnostics) -> bool {
    tracing::debug!(module = module.name.as_str(), decls = module.decls.len(), "pass 1: registering declarations");
    let globals = SymbolTable::new_root();

    if !register_decls(module, &globals, diag) {
        tracing::warn!(error = ?diag.first(), "registration failed");
        return false;
    }
    tracing::debug!("pass 2: resolving named types");
    if !resolve_types(module, &globals, diag) {
        tracing::warn!(error = ?diag.first(), "type resolution failed");
        return false;
    }
    tracing::debug!("pass 2: type-checking declarations");
    let ok = check_values(module, &globals, diag);
    if !ok {
        tracing::warn!(error = ?diag.first(), "type checking failed");
    }
    ok
}

fn register_decls(module: &Module, globals: &Rc<RefCell<SymbolTable>>, diag: &mut Diagnostics) -> bool {
    for decl in &module.decls {
        let entry = match decl {
            Decl::TypeDef(def) => {
                if !unique_names(def.fields.iter().map(|f| f.name.as_str()), diag, &def.location, "field") {
                    return false;
                }
                SymbolEntry::new(def.name.clone(), SymbolKind::Type)
                    .with_type(Type::Struct { name: def.name.clone(), fields: def.fields.clone() })
                    .defined()
            }
            Decl::Constant(c) => SymbolEntry::new(c.name.clone(), SymbolKind::Constant).with_type(c.ty.clone()),
            Decl::Global(g) => SymbolEntry::new(g.name.clone(), SymbolKind::Global).with_type(g.ty.clone()),
            Decl::ExternFunction(f) => {
                if !unique_names(f.params.iter().map(|p| p.name.as_str()), diag, &f.location, "parameter") {
                    return false;
                }
                let params = f.params.iter().map(|p| p.ty.clone()).collect();
                SymbolEntry::new(f.name.clone(), SymbolKind::Function)
                    .with_type(Type::Function { params, ret: Box::new(f.ret.clone()) })
                    .defined()
            }
            Decl::Function(f) => {
                if !unique_names(f.params.iter().map(|p| p.name.as_str()), diag, &f.location, "parameter") {
                    return false;
                }
                let params = f.params.iter().map(|p| p.ty.clone()).collect();
                SymbolEntry::new(f.name.clone(), SymbolKind::Function)
                    .with_type(Type::Function { params, ret: Box::new(f.ret.clone()) })
                    .defined()
            }
        };
        if !globals.borrow_mut().add(entry) {
            diag.report(
                DiagnosticCode::Semantic,
                format!("'{}' is already declared in this module", decl.name()),
                decl.location().as_diag(),
            );
            return false;
        }
    }
    true
}

fn unique_names<'a>(
    names: impl Iterator<Item = &'a str>,
    diag: &mut Diagnostics,
    location: &hoil_ast::Location,
    what: &str,
) -> bool {
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name) {
            diag.report(DiagnosticCode::Semantic, format!("duplicate {what} '{name}'"), location.as_diag());
            return false;
        }
    }
    true
}

fn resolve_types(module: &mut Module, globals: &Rc<RefCell<SymbolTable>>, diag: &mut Diagnostics) -> bool {
    for decl in &mut module.decls {
        let ok = match decl {
            Decl::TypeDef(def) => {
                let resolved = def.fields.iter_mut().all(|f| resolve_type(&mut f.ty, globals, diag, &f.location));
                if resolved {
                    globals.borrow_mut().set_type(
                        &def.name,
                        Type::Struct { name: def.name.clone(), fields: def.fields.clone() },
                    );
                }
                resolved
            }
            Decl::Constant(c) => {
                let resolved = resolve_type(&mut c.ty, globals, diag, &c.location);
                if resolved {
                    globals.borrow_mut().set_type(&c.name, c.ty.clone());
                }
                resolved
            }
            Decl::Global(g) => {
                let resolved = resolve_type(&mut g.ty, globals, diag, &g.location);
                if resolved {
                    globals.borrow_mut().set_type(&g.name, g.ty.clone());
                }
                resolved
            }
            Decl::ExternFunction(f) => {
                let ok = f.params.iter_mut().all(|p| resolve_type(&mut p.ty, globals, diag, &p.location))
                    && resolve_type(&mut f.ret, globals, diag, &f.location);
                if ok {
                    let params = f.params.iter().map(|p| p.ty.clone()).collect();
                    globals.borrow_mut().set_type(&f.name, Type::Function { params, ret: Box::new(f.ret.clone()) });
                }
                ok
            }
            Decl::Function(f) => {
                let ok = f.params.iter_mut().all(|p| resolve_type(&mut p.ty, globals, diag, &p.location))
                    && resolve_type(&mut f.ret, globals, diag, &f.location);
                if ok {
                    let params = f.params.iter().map(|p| p.ty.clone()).collect();
                    globals.borrow_mut().set_type(&f.name, Type::Function { params, ret: Box::new(f.ret.clone()) });
                }
                ok
            }
        };
        if !ok {
            return false;
        }
    }
    true
}

fn check_values(module: &Module, globals: &Rc<RefCell<SymbolTable>>, diag: &mut Diagnostics) -> bool {
    for decl in &module.decls {
        let ok = match decl {
            Decl::TypeDef(_) | Decl::ExternFunction(_) => true,
            Decl::Constant(c) => match expr::infer_expr(&c.value, globals, diag) {
                Some(ty) if ty.compatible(&c.ty) => true,
                Some(_) => {
                    diag.report(DiagnosticCode::Type, format!("constant '{}' initializer has the wrong type", c.name), c.location.as_diag());
                    false
                }
                None => false,
            },
            Decl::Global(g) => match &g.init {
                Some(expr) => match expr::infer_expr(expr, globals, diag) {
                    Some(ty) if ty.compatible(&g.ty) => true,
                    Some(_) => {
                        diag.report(DiagnosticCode::Type, format!("global '{}' initializer has the wrong type", g.name), g.location.as_diag());
                        false
                    }
                    None => false,
                },
                None => true,
            },
            Decl::Function(f) => check_function(f, globals, diag),
        };
        if !ok {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoil_diag::Diagnostics;

    fn parse(source: &str) -> Module {
        let mut diag = Diagnostics::new();
        hoil_parser::parse_module(source, "t.hoil", &mut diag).expect("source must parse")
    }

    #[test]
    fn add_function_checks_cleanly() {
        let mut module = parse(
            r#"
            MODULE "m";
            FUNCTION add(a: i32, b: i32) -> i32 {
            entry:
                r = ADD a, b;
                RET r;
            }
            "#,
        );
        let mut diag = Diagnostics::new();
        assert!(check_module(&mut module, &mut diag), "{:?}", diag.first());
    }

    #[test]
    fn unknown_type_name_is_rejected() {
        let mut module = parse(
            r#"
            MODULE "m";
            GLOBAL g : Missing;
            "#,
        );
        let mut diag = Diagnostics::new();
        assert!(!check_module(&mut module, &mut diag));
        assert_eq!(diag.code(), Some(DiagnosticCode::Type));
    }

    #[test]
    fn duplicate_declaration_name_is_semantic_error() {
        let mut module = parse(
            r#"
            MODULE "m";
            GLOBAL g : i32;
            GLOBAL g : i32;
            "#,
        );
        let mut diag = Diagnostics::new();
        assert!(!check_module(&mut module, &mut diag));
        assert_eq!(diag.code(), Some(DiagnosticCode::Semantic));
    }

    #[test]
    fn branch_to_unknown_block_is_rejected() {
        let mut module = parse(
            r#"
            MODULE "m";
            FUNCTION f() -> void {
            entry:
                BR missing;
            }
            "#,
        );
        let mut diag = Diagnostics::new();
        assert!(!check_module(&mut module, &mut diag));
        assert_eq!(diag.code(), Some(DiagnosticCode::Semantic));
    }

    #[test]
    fn struct_field_access_resolves_named_type() {
        let mut module = parse(
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
        assert!(check_module(&mut module, &mut diag), "{:?}", diag.first());
    }

    #[test]
    fn void_function_returning_a_value_is_a_type_error() {
        let mut module = parse(
            r#"
            MODULE "m";
            FUNCTION f() -> void {
            entry:
                RET 1;
            }
            "#,
        );
        let mut diag = Diagnostics::new();
        assert!(!check_module(&mut module, &mut diag));
        assert_eq!(diag.code(), Some(DiagnosticCode::Type));
    }
}
