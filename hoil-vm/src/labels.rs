//! The label pre-pass: scan the whole instruction image once, before running anything, so every
//! forward `JMP`/`JEQ..JGE`/`CALL` target is already known by the time it is first reached.

use std::collections::HashMap;

use mil_format::{Opcode, Record};

use crate::consts::LABEL_TABLE_CAP;
use crate::error::RuntimeError;

pub struct LabelTable {
    offsets: HashMap<u16, usize>,
}

impl LabelTable {
    pub fn offset_of(&self, label_id: u16) -> Result<usize, RuntimeError> {
        self.offsets.get(&label_id).copied().ok_or(RuntimeError::UnknownLabel(label_id))
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Scan `image` front to back; every `LABEL_DEF` record's `addr` field names the label id it
/// defines, and the offset immediately after the record is where execution resumes when that
/// label is reached as a jump or call target.
pub fn build(image: &[u8]) -> Result<LabelTable, RuntimeError> {
    let mut offsets = HashMap::new();
    let mut cursor = 0usize;
    while cursor < image.len() {
        let record = Record::decode(&image[cursor..]).map_err(|source| RuntimeError::Decode { offset: cursor, source })?;
        cursor += mil_format::RECORD_LEN;
        if record.opcode == Opcode::LabelDef {
            if offsets.len() >= LABEL_TABLE_CAP && !offsets.contains_key(&record.addr) {
                return Err(RuntimeError::LabelTableFull);
            }
            if offsets.insert(record.addr, cursor).is_some() {
                return Err(RuntimeError::DuplicateLabel(record.addr));
            }
        }
    }
    Ok(LabelTable { offsets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mil_format::MemoryType;

    fn encode(records: &[Record]) -> Vec<u8> {
        records.iter().flat_map(|r| r.encode()).collect()
    }

    #[test]
    fn an_image_with_no_label_defs_produces_an_empty_table() {
        let image = encode(&[Record::new(Opcode::Exit, MemoryType::Int64, 0, 0)]);
        let table = build(&image).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn a_label_def_is_resolvable_to_the_offset_right_after_it() {
        let image = encode(&[
            Record::new(Opcode::LabelDef, MemoryType::Int64, 7, 0),
            Record::new(Opcode::Exit, MemoryType::Int64, 0, 0),
        ]);
        let table = build(&image).unwrap();
        assert_eq!(table.offset_of(7).unwrap(), mil_format::RECORD_LEN);
    }

    #[test]
    fn duplicate_label_ids_are_rejected() {
        let image = encode(&[
            Record::new(Opcode::LabelDef, MemoryType::Int64, 1, 0),
            Record::new(Opcode::LabelDef, MemoryType::Int64, 1, 0),
        ]);
        assert!(matches!(build(&image), Err(RuntimeError::DuplicateLabel(1))));
    }
}
