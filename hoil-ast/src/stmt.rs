use crate::{Expr, Location};

/// A bare mnemonic application: `MNEMONIC expr, expr, ...;`. Shared by [`Stmt::Instruction`]
/// (no destination) and [`Stmt::Assign`] (destination named by the enclosing assignment).
#[derive(Debug, Clone, PartialEq)]
pub struct Instr {
    pub opcode: String,
    pub operands: Vec<Expr>,
    pub location: Location,
}

/// A statement inside a basic block.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `target = instr;` — defines or redefines `target` with the instruction's result.
    Assign { target: String, instr: Instr, location: Location },
    /// `instr;` with no destination (e.g. a bare `STORE`).
    Instruction(Instr),
    /// `BR (cond,)? true_label (, false_label)?;`.
    Branch { cond: Option<Expr>, true_label: String, false_label: Option<String>, location: Location },
    /// `RET expr?;`.
    Return { value: Option<Expr>, location: Location },
}

impl Stmt {
    pub fn location(&self) -> &Location {
        match self {
            Stmt::Assign { location, .. } => location,
            Stmt::Instruction(instr) => &instr.location,
            Stmt::Branch { location, .. } => location,
            Stmt::Return { location, .. } => location,
        }
    }
}
