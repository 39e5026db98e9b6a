//! Fixed capacities of the machine: every array the interpreter owns is sized once, here, and
//! never grows — there is no heap and no dynamic resizing anywhere in this crate.

/// Size of the flat byte-addressable memory every `ALLOC_IMM`/`MOVE`/arithmetic instruction
/// reads and writes through.
pub const STATIC_SIZE: usize = 65536;
/// Size, in bytes, of the `PUSH`/`POP` data stack.
pub const STACK_SIZE: usize = 4096;
/// Maximum nesting depth of `CALL`/`RET` pairs.
pub const CALL_STACK_SIZE: usize = 256;
/// Maximum number of distinct `LABEL_DEF` ids one program may declare.
pub const LABEL_TABLE_CAP: usize = 256;
