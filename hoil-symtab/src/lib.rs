//! Scoped symbol table: a hashed `name -> entry` mapping chained to a parent scope.
//!
//! The source material implements this as an open-chained hash map with a djb2-like hash and a
//! resize at a 0.75 load factor. The design notes call that out as worth redesigning (§9):
//! "naturally a mapping from name to entry with a parent link; no inheritance is needed" — so
//! this crate is `std::collections::HashMap` plus an explicit parent `Rc`, the same way the
//! teacher's `constraints::reg_key` module prefers a thin newtype over a hand-rolled table.
//! `lookup_here` / `lookup_up` replace the boolean `walk_parents` flag the source threads through
//! every call.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use hoil_ast::Type;

/// What a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Type,
    Constant,
    Global,
    Function,
    Parameter,
    Local,
    Block,
}

/// One entry in the table.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: String,
    pub kind: SymbolKind,
    pub resolved_type: Option<Type>,
    pub defined: bool,
}

impl SymbolEntry {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self { name: name.into(), kind, resolved_type: None, defined: false }
    }

    pub fn with_type(mut self, ty: Type) -> Self {
        self.resolved_type = Some(ty);
        self
    }

    pub fn defined(mut self) -> Self {
        self.defined = true;
        self
    }
}

/// A single scope. The global scope has no parent; a function-local scope's parent is the
/// global scope; a block-local scope's parent is its enclosing function scope.
pub struct SymbolTable {
    entries: HashMap<String, SymbolEntry>,
    parent: Option<Rc<RefCell<SymbolTable>>>,
}

impl SymbolTable {
    /// A fresh scope with no parent (the global table).
    pub fn new_root() -> Rc<RefCell<SymbolTable>> {
        Rc::new(RefCell::new(SymbolTable { entries: HashMap::with_capacity(64), parent: None }))
    }

    /// A fresh scope whose parent is `parent`.
    pub fn create_child(parent: &Rc<RefCell<SymbolTable>>) -> Rc<RefCell<SymbolTable>> {
        Rc::new(RefCell::new(SymbolTable {
            entries: HashMap::with_capacity(16),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Insert `entry` into this scope. Fails (returning `false`, leaving the table untouched) on
    /// a duplicate name already present in *this* scope — shadowing a parent-scope name is fine.
    pub fn add(&mut self, entry: SymbolEntry) -> bool {
        if self.entries.contains_key(&entry.name) {
            return false;
        }
        self.entries.insert(entry.name.clone(), entry);
        true
    }

    /// Look up `name` in this scope only.
    pub fn lookup_here(&self, name: &str) -> Option<SymbolEntry> {
        self.entries.get(name).cloned()
    }

    /// Look up `name` in this scope, then each parent in turn.
    pub fn lookup_up(&self, name: &str) -> Option<SymbolEntry> {
        if let Some(entry) = self.entries.get(name) {
            return Some(entry.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().lookup_up(name))
    }

    pub fn set_type(&mut self, name: &str, ty: Type) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.resolved_type = Some(ty);
                true
            }
            None => false,
        }
    }

    pub fn mark_defined(&mut self, name: &str) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.defined = true;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_in_same_scope_is_rejected() {
        let root = SymbolTable::new_root();
        assert!(root.borrow_mut().add(SymbolEntry::new("x", SymbolKind::Global)));
        assert!(!root.borrow_mut().add(SymbolEntry::new("x", SymbolKind::Global)));
    }

    #[test]
    fn child_may_shadow_parent() {
        let root = SymbolTable::new_root();
        root.borrow_mut().add(SymbolEntry::new("x", SymbolKind::Global));
        let child = SymbolTable::create_child(&root);
        assert!(child.borrow_mut().add(SymbolEntry::new("x", SymbolKind::Local)));
        assert_eq!(child.borrow().lookup_here("x").unwrap().kind, SymbolKind::Local);
    }

    #[test]
    fn lookup_up_walks_to_parent() {
        let root = SymbolTable::new_root();
        root.borrow_mut().add(SymbolEntry::new("g", SymbolKind::Global));
        let child = SymbolTable::create_child(&root);
        assert!(child.borrow().lookup_here("g").is_none());
        assert_eq!(child.borrow().lookup_up("g").unwrap().kind, SymbolKind::Global);
    }

    #[test]
    fn set_type_and_mark_defined_update_existing_entry() {
        let root = SymbolTable::new_root();
        root.borrow_mut().add(SymbolEntry::new("c", SymbolKind::Constant));
        assert!(root.borrow_mut().set_type("c", Type::Int { bits: 32, signed: true }));
        assert!(root.borrow_mut().mark_defined("c"));
        let entry = root.borrow().lookup_here("c").unwrap();
        assert_eq!(entry.resolved_type, Some(Type::Int { bits: 32, signed: true }));
        assert!(entry.defined);
    }

    #[test]
    fn set_type_on_missing_name_fails() {
        let root = SymbolTable::new_root();
        assert!(!root.borrow_mut().set_type("missing", Type::Void));
    }
}
