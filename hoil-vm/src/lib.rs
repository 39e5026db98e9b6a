//! Stack-and-flat-memory interpreter for `.coil` MIL images.
//!
//! Loading ([`program::load`]/[`program::from_bytes`]) and running ([`interp::Vm`]) are separate
//! steps, mirroring `fuel-vm`'s split between a `Transaction`/`Script` check phase and the
//! `Interpreter` that executes it: a caller can load a program, inspect it, and only then decide
//! to run it.

pub mod consts;
pub mod error;
pub mod interp;
pub mod labels;
pub mod memory;
pub mod program;
pub mod stack;

pub use error::{LoadError, RuntimeError};
pub use interp::Vm;
pub use program::{from_bytes, load, Program};

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> Vec<u8> {
        let mut diag = hoil_diag::Diagnostics::new();
        let mut module = hoil_parser::parse_module(source, "t.hoil", &mut diag).expect("parses");
        let mut check_diag = hoil_diag::Diagnostics::new();
        assert!(hoil_check::check_module(&mut module, &mut check_diag), "{:?}", check_diag.first());
        let mut codegen_diag = hoil_diag::Diagnostics::new();
        hoil_codegen::generate_module(&module, &mut codegen_diag).expect("codegen succeeds")
    }

    #[test]
    fn a_minimal_main_exits_zero() {
        let bytes = compile(
            r#"
            MODULE "e";
            FUNCTION main() -> i32 {
            entry:
                RET 0;
            }
            "#,
        );
        let program = from_bytes(&bytes).expect("loads");
        let mut vm = Vm::new(program);
        assert_eq!(vm.run().expect("runs"), 0);
    }

    #[test]
    fn calling_a_function_returns_its_computed_value() {
        let bytes = compile(
            r#"
            MODULE "e";
            FUNCTION add(a: i32, b: i32) -> i32 {
            entry:
                r = ADD a, b;
                RET r;
            }
            FUNCTION main() -> i32 {
            entry:
                r = CALL add(19, 23);
                RET r;
            }
            "#,
        );
        let program = from_bytes(&bytes).expect("loads");
        let mut vm = Vm::new(program);
        assert_eq!(vm.run().expect("runs"), 42);
    }

    #[test]
    fn a_conditional_branch_selects_the_matching_block() {
        let bytes = compile(
            r#"
            MODULE "e";
            FUNCTION pick(a: i32) -> i32 {
            entry:
                BR a, nonzero, zero;
            zero:
                RET 0;
            nonzero:
                RET 1;
            }
            FUNCTION main() -> i32 {
            entry:
                r = CALL pick(5);
                RET r;
            }
            "#,
        );
        let program = from_bytes(&bytes).expect("loads");
        let mut vm = Vm::new(program);
        assert_eq!(vm.run().expect("runs"), 1);
    }
}
