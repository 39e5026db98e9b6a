use std::fmt;

/// The full MIL opcode set (spec §6). Values are stable across releases: a record's `op` field
/// is this repr cast to `u16`.
///
/// `LOAD_IMM` is not named in the distilled opcode table; it resolves the "authoritative
/// encoding for in-code immediates" open question (spec §9) by giving literal materialization a
/// dedicated opcode that carries the immediate in the record's `imm` field, instead of the
/// operand-less `LOAD` the codegen notes describe as a stopgap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
#[non_exhaustive]
pub enum Opcode {
    // --- memory ---
    AllocImm = 0x0001,
    AllocMem = 0x0002,
    Move = 0x0003,
    Load = 0x0004,
    Store = 0x0005,
    LoadImm = 0x0006,

    // --- arithmetic ---
    Add = 0x0101,
    Sub = 0x0102,
    Mul = 0x0103,
    Div = 0x0104,
    Mod = 0x0105,
    Neg = 0x0106,

    // --- bitwise ---
    And = 0x0201,
    Or = 0x0202,
    Xor = 0x0203,
    Not = 0x0204,
    Shl = 0x0205,
    Shr = 0x0206,

    // --- control ---
    Jmp = 0x0301,
    Jeq = 0x0302,
    Jne = 0x0303,
    Jlt = 0x0304,
    Jle = 0x0305,
    Jgt = 0x0306,
    Jge = 0x0307,

    // --- function ---
    Call = 0x0401,
    Ret = 0x0402,
    Push = 0x0403,
    Pop = 0x0404,

    // --- system ---
    Syscall = 0x0501,
    Exit = 0x0502,

    // --- special ---
    LabelDef = 0xFFFE,
    ArgData = 0xFFFF,
}

impl Opcode {
    pub const fn from_u16(raw: u16) -> Option<Self> {
        Some(match raw {
            0x0001 => Self::AllocImm,
            0x0002 => Self::AllocMem,
            0x0003 => Self::Move,
            0x0004 => Self::Load,
            0x0005 => Self::Store,
            0x0006 => Self::LoadImm,
            0x0101 => Self::Add,
            0x0102 => Self::Sub,
            0x0103 => Self::Mul,
            0x0104 => Self::Div,
            0x0105 => Self::Mod,
            0x0106 => Self::Neg,
            0x0201 => Self::And,
            0x0202 => Self::Or,
            0x0203 => Self::Xor,
            0x0204 => Self::Not,
            0x0205 => Self::Shl,
            0x0206 => Self::Shr,
            0x0301 => Self::Jmp,
            0x0302 => Self::Jeq,
            0x0303 => Self::Jne,
            0x0304 => Self::Jlt,
            0x0305 => Self::Jle,
            0x0306 => Self::Jgt,
            0x0307 => Self::Jge,
            0x0401 => Self::Call,
            0x0402 => Self::Ret,
            0x0403 => Self::Push,
            0x0404 => Self::Pop,
            0x0501 => Self::Syscall,
            0x0502 => Self::Exit,
            0xFFFE => Self::LabelDef,
            0xFFFF => Self::ArgData,
            _ => return None,
        })
    }

    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Whether this is one of the six conditional-jump opcodes (`JEQ`..`JGE`).
    pub const fn is_conditional_jump(self) -> bool {
        matches!(self, Self::Jeq | Self::Jne | Self::Jlt | Self::Jle | Self::Jgt | Self::Jge)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        use strum::IntoEnumIterator;
        for op in Opcode::iter() {
            assert_eq!(Opcode::from_u16(op.as_u16()), Some(op));
        }
    }

    #[test]
    fn unknown_opcode_is_none() {
        assert_eq!(Opcode::from_u16(0x0777), None);
    }

    #[test]
    fn conditional_jumps_are_identified() {
        assert!(Opcode::Jlt.is_conditional_jump());
        assert!(!Opcode::Jmp.is_conditional_jump());
        assert!(!Opcode::Add.is_conditional_jump());
    }
}
