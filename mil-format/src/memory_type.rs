/// The record-level type tag used by `ALLOC_IMM`, `ALLOC_MEM`, `MOVE`, `PUSH`, `POP`, and the
/// arithmetic opcodes.
///
/// Two numeric encodings for this table appear across the source material: a terse
/// `0x01..0x08` category scheme, and a richer scheme with a signedness nibble and dedicated
/// float/pointer/bool codes. Per spec §9 the richer encoding below is authoritative; the terser
/// one only ever described the unrelated AST-level `Type` word (see `hoil-ast::Type::encode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[non_exhaustive]
pub enum MemoryType {
    Int8 = 0x01,
    Int16 = 0x02,
    Int32 = 0x04,
    Int64 = 0x08,
    Uint8 = 0x11,
    Uint16 = 0x12,
    Uint32 = 0x14,
    Uint64 = 0x18,
    Float32 = 0x24,
    Float64 = 0x28,
    Ptr = 0x40,
    Bool = 0x81,
}

impl MemoryType {
    /// Decode a raw byte into a [`MemoryType`], or `None` if it names no known type.
    pub const fn from_u8(raw: u8) -> Option<Self> {
        Some(match raw {
            0x01 => Self::Int8,
            0x02 => Self::Int16,
            0x04 => Self::Int32,
            0x08 => Self::Int64,
            0x11 => Self::Uint8,
            0x12 => Self::Uint16,
            0x14 => Self::Uint32,
            0x18 => Self::Uint64,
            0x24 => Self::Float32,
            0x28 => Self::Float64,
            0x40 => Self::Ptr,
            0x81 => Self::Bool,
            _ => return None,
        })
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Byte size of one value of this type in VM memory.
    pub const fn size(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 | Self::Bool => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 | Self::Ptr => 8,
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        use strum::IntoEnumIterator;
        for t in MemoryType::iter() {
            assert_eq!(MemoryType::from_u8(t.as_u8()), Some(t));
        }
    }

    #[test]
    fn sizes_match_spec() {
        assert_eq!(MemoryType::Int8.size(), 1);
        assert_eq!(MemoryType::Int64.size(), 8);
        assert_eq!(MemoryType::Float32.size(), 4);
        assert_eq!(MemoryType::Ptr.size(), 8);
        assert_eq!(MemoryType::Bool.size(), 1);
    }

    #[test]
    fn unknown_byte_is_none() {
        assert_eq!(MemoryType::from_u8(0x99), None);
    }
}
