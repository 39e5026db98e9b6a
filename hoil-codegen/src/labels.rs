//! Module-wide block label assignment.
//!
//! Every block in every function gets one label id, assigned in a single counting pass before
//! any code is emitted, so a forward `CALL`/`BR` target is always known by the time it is
//! needed. Ids are handed out in emission order (see [`emission_order`]): the function that will
//! run first gets the lowest ids, which is what lets a freshly started VM — whose cursor begins
//! at label 0 — land directly on it with no synthetic entry jump.

use std::collections::HashMap;

use hoil_ast::{Decl, Function, Module};

/// The module's functions in the order their code will be emitted: whichever function is named
/// `main` first if one exists (so the VM's initial cursor lands on it), the rest in declaration
/// order. A module with no `main` simply starts on whatever function is emitted first.
pub fn emission_order(module: &Module) -> Vec<&Function> {
    let mut fns: Vec<&Function> = module
        .decls
        .iter()
        .filter_map(|d| match d {
            Decl::Function(f) => Some(f),
            _ => None,
        })
        .collect();
    if let Some(pos) = fns.iter().position(|f| f.name == "main") {
        let main = fns.remove(pos);
        fns.insert(0, main);
    }
    fns
}

/// The assigned label ids for one module: each function's entry-block id (what a `CALL` target
/// resolves to) and, per function, each of its blocks' ids (what a `BR` target resolves to).
pub struct LabelPlan {
    entry: HashMap<String, u32>,
    blocks: HashMap<String, HashMap<String, u32>>,
}

impl LabelPlan {
    pub fn entry_of(&self, function: &str) -> Option<u32> {
        self.entry.get(function).copied()
    }

    pub fn block_of(&self, function: &str, label: &str) -> Option<u32> {
        self.blocks.get(function)?.get(label).copied()
    }
}

/// Number `fns` consecutively, assigning every block across the module a distinct id.
pub fn plan_labels(fns: &[&Function]) -> LabelPlan {
    let mut next: u32 = 0;
    let mut entry = HashMap::new();
    let mut blocks = HashMap::new();

    for f in fns {
        let mut fn_blocks = HashMap::new();
        for (i, block) in f.blocks.iter().enumerate() {
            let id = next;
            next += 1;
            if i == 0 {
                entry.insert(f.name.clone(), id);
            }
            fn_blocks.insert(block.label.clone(), id);
        }
        blocks.insert(f.name.clone(), fn_blocks);
    }

    LabelPlan { entry, blocks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoil_diag::Diagnostics;

    fn parse(source: &str) -> Module {
        let mut diag = Diagnostics::new();
        hoil_parser::parse_module(source, "t.hoil", &mut diag).expect("must parse")
    }

    #[test]
    fn main_is_emitted_first_regardless_of_declaration_order() {
        let module = parse(
            r#"
            MODULE "m";
            FUNCTION helper() -> void { entry: RET; }
            FUNCTION main() -> void { entry: RET; }
            "#,
        );
        let order = emission_order(&module);
        assert_eq!(order[0].name, "main");
        assert_eq!(order[1].name, "helper");
    }

    #[test]
    fn labels_are_assigned_consecutively_across_functions() {
        let module = parse(
            r#"
            MODULE "m";
            FUNCTION main() -> void {
            entry:
                BR next;
            next:
                RET;
            }
            FUNCTION helper() -> void { entry: RET; }
            "#,
        );
        let order = emission_order(&module);
        let plan = plan_labels(&order);
        assert_eq!(plan.entry_of("main"), Some(0));
        assert_eq!(plan.block_of("main", "entry"), Some(0));
        assert_eq!(plan.block_of("main", "next"), Some(1));
        assert_eq!(plan.entry_of("helper"), Some(2));
    }
}
