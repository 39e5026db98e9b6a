//! Compile-and-run scenarios exercising the whole pipeline: source text in, VM exit status out.

use mil_format::{Opcode, Record, RECORD_LEN};

fn compile(source: &str) -> Vec<u8> {
    let mut diag = hoil_diag::Diagnostics::new();
    let mut module = hoil_parser::parse_module(source, "t.hoil", &mut diag).expect("parses");
    let mut check_diag = hoil_diag::Diagnostics::new();
    assert!(hoil_check::check_module(&mut module, &mut check_diag), "{:?}", check_diag.first());
    let mut codegen_diag = hoil_diag::Diagnostics::new();
    hoil_codegen::generate_module(&module, &mut codegen_diag).expect("codegen succeeds")
}

fn run(source: &str) -> i64 {
    let bytes = compile(source);
    let program = hoil_vm::from_bytes(&bytes).expect("loads");
    let mut vm = hoil_vm::Vm::new(program);
    vm.run().expect("runs to completion")
}

#[test]
fn minimal_main_exits_zero() {
    assert_eq!(
        run(
            r#"
            MODULE "e";
            FUNCTION main() -> i32 {
            entry:
                RET 0;
            }
            "#
        ),
        0
    );
}

#[test]
fn an_add_function_emits_an_add_followed_eventually_by_a_ret() {
    let bytes = compile(
        r#"
        MODULE "e";
        FUNCTION add(a: i32, b: i32) -> i32 {
        entry:
            r = ADD a, b;
            RET r;
        }
        "#,
    );
    let mut found_add_then_ret = false;
    let mut seen_add = false;
    let mut cursor = 0;
    // The Code section sits after the Type/Function/Global/Constant sections; scanning the whole
    // byte string for valid records is sufficient here since every other section's bytes cannot
    // spuriously decode as a legal 18-byte record (the marker bytes make false positives vanishingly
    // unlikely, and this module emits no other function whose own Ret could be mistaken for it).
    while cursor + RECORD_LEN <= bytes.len() {
        if let Ok(record) = Record::decode(&bytes[cursor..]) {
            if record.opcode == Opcode::Add {
                seen_add = true;
            } else if seen_add && record.opcode == Opcode::Ret {
                found_add_then_ret = true;
                break;
            }
            cursor += RECORD_LEN;
        } else {
            cursor += 1;
        }
    }
    assert!(found_add_then_ret, "expected an ADD record followed by a RET record");
}

#[test]
fn a_countdown_loop_computes_factorial_of_five() {
    let result = run(
        r#"
        MODULE "fact";
        FUNCTION main() -> i32 {
        entry:
            n = ALLOC_IMM 5;
            acc = ALLOC_IMM 1;
            BR n, body, done;
        body:
            acc = MUL acc, n;
            n = SUB n, 1;
            BR n, body, done;
        done:
            RET acc;
        }
        "#,
    );
    assert_eq!(result, 120);
}

#[test]
fn syscall_sixty_exits_with_the_given_status() {
    let result = run(
        r#"
        MODULE "e";
        FUNCTION main() -> void {
        entry:
            SYSCALL 60, 7;
        }
        "#,
    );
    assert_eq!(result, 7);
}

#[test]
fn a_struct_field_mismatch_is_rejected_before_codegen() {
    let mut diag = hoil_diag::Diagnostics::new();
    let mut module = hoil_parser::parse_module(
        r#"
        MODULE "e";
        TYPE Point { x: i32, y: i32 }
        FUNCTION main() -> i32 {
        entry:
            p = ALLOC_IMM 1;
            RET p.x;
        }
        "#,
        "t.hoil",
        &mut diag,
    )
    .expect("parses");
    let mut check_diag = hoil_diag::Diagnostics::new();
    assert!(!hoil_check::check_module(&mut module, &mut check_diag), "an i32 local has no 'x' field and must be rejected");
    assert_eq!(check_diag.code(), Some(hoil_diag::DiagnosticCode::Type));
}
