//! The `.coil` file container: header, section table, and section type tags.

/// Magic number identifying a MIL file: ASCII "COIL", little-endian as a `u32`.
pub const MAGIC: u32 = 0x4C49_4F43;

/// `MAJOR<<24 | MINOR<<16 | PATCH<<8`.
pub const VERSION: u32 = (0u32 << 24) | (1u32 << 16) | (0u32 << 8);

/// The seven MIL section kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum SectionType {
    Type = 0,
    Function = 1,
    Global = 2,
    Constant = 3,
    Code = 4,
    Relocation = 5,
    Metadata = 6,
}

impl SectionType {
    pub const fn from_u32(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::Type,
            1 => Self::Function,
            2 => Self::Global,
            3 => Self::Constant,
            4 => Self::Code,
            5 => Self::Relocation,
            6 => Self::Metadata,
            _ => return None,
        })
    }

    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

/// File header: magic, version, section count, reserved flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: u32,
    pub version: u32,
    pub section_count: u32,
    pub flags: u32,
}

impl FileHeader {
    pub const LEN: usize = 16;

    pub fn new(section_count: u32) -> Self {
        Self { magic: MAGIC, version: VERSION, section_count, flags: 0 }
    }

    pub fn is_valid_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4..8].copy_from_slice(&self.version.to_le_bytes());
        buf[8..12].copy_from_slice(&self.section_count.to_le_bytes());
        buf[12..16].copy_from_slice(&self.flags.to_le_bytes());
        buf
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::LEN {
            return None;
        }
        Some(Self {
            magic: u32::from_le_bytes(bytes[0..4].try_into().ok()?),
            version: u32::from_le_bytes(bytes[4..8].try_into().ok()?),
            section_count: u32::from_le_bytes(bytes[8..12].try_into().ok()?),
            flags: u32::from_le_bytes(bytes[12..16].try_into().ok()?),
        })
    }
}

/// One entry in the section table: type tag, byte offset, and byte size of the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionEntry {
    pub section_type: SectionType,
    pub offset: u32,
    pub size: u32,
}

impl SectionEntry {
    pub const LEN: usize = 12;

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[0..4].copy_from_slice(&self.section_type.as_u32().to_le_bytes());
        buf[4..8].copy_from_slice(&self.offset.to_le_bytes());
        buf[8..12].copy_from_slice(&self.size.to_le_bytes());
        buf
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::LEN {
            return None;
        }
        let section_type = SectionType::from_u32(u32::from_le_bytes(bytes[0..4].try_into().ok()?))?;
        let offset = u32::from_le_bytes(bytes[4..8].try_into().ok()?);
        let size = u32::from_le_bytes(bytes[8..12].try_into().ok()?);
        Some(Self { section_type, offset, size })
    }
}

/// Round `n` up to the next multiple of 4, the alignment every section payload observes.
pub const fn align4(n: u32) -> u32 {
    (n + 3) & !3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let h = FileHeader::new(3);
        let bytes = h.encode();
        assert_eq!(&bytes[0..4], &MAGIC.to_le_bytes());
        let back = FileHeader::decode(&bytes).unwrap();
        assert_eq!(h, back);
        assert!(back.is_valid_magic());
    }

    #[test]
    fn bad_magic_is_detected_without_reading_further() {
        let mut bytes = FileHeader::new(1).encode();
        bytes[0] = 0;
        let header = FileHeader::decode(&bytes).unwrap();
        assert!(!header.is_valid_magic());
    }

    #[test]
    fn section_entry_round_trips() {
        let entry = SectionEntry { section_type: SectionType::Code, offset: 16, size: 128 };
        let back = SectionEntry::decode(&entry.encode()).unwrap();
        assert_eq!(entry, back);
    }

    #[test]
    fn align4_rounds_up() {
        assert_eq!(align4(0), 0);
        assert_eq!(align4(1), 4);
        assert_eq!(align4(4), 4);
        assert_eq!(align4(5), 8);
    }
}
