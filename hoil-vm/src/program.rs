//! Loads a `.coil` file and reduces it to the one thing the interpreter actually runs: a flat
//! byte image of concatenated instruction records, plus the label table built over it.
//!
//! The Code section itself is framed per function and per block (`{function_index, block_count,
//! (name, size, bytes)*}*`) so a disassembler can recover function/block boundaries. The
//! interpreter has no use for that framing — it only ever addresses the instruction stream by a
//! single running cursor — so loading flattens every block's raw record bytes, in section order,
//! into one contiguous image. This is exactly the layout `hoil-builder`'s `CodeSection::encode`
//! already produces one function at a time; flattening here just concatenates what it already
//! wrote src-order, recovering the single linear stream the label pre-pass assumes.

use mil_format::{FileHeader, SectionEntry, SectionType, MAGIC};

use crate::error::LoadError;
use crate::labels::{self, LabelTable};

pub struct Program {
    pub image: Vec<u8>,
    pub labels: LabelTable,
}

pub fn load(path: &std::path::Path) -> Result<Program, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io { path: path.display().to_string(), source })?;
    from_bytes(&bytes)
}

pub fn from_bytes(bytes: &[u8]) -> Result<Program, LoadError> {
    let header = FileHeader::decode(bytes).ok_or(LoadError::Truncated)?;
    if !header.is_valid_magic() {
        return Err(LoadError::BadMagic { found: header.magic, expected: MAGIC });
    }

    let mut code_entry = None;
    let mut offset = FileHeader::LEN;
    for i in 0..header.section_count as usize {
        let entry = SectionEntry::decode(&bytes[offset..]).ok_or(LoadError::BadSectionTable(i))?;
        if entry.section_type == SectionType::Code {
            code_entry = Some(entry);
        }
        offset += SectionEntry::LEN;
    }
    let entry = code_entry.ok_or(LoadError::MissingCodeSection)?;
    let start = entry.offset as usize;
    let end = start + entry.size as usize;
    let code = bytes.get(start..end).ok_or_else(|| LoadError::MalformedCode("section extends past end of file".into()))?;

    let image = flatten_code_section(code)?;
    let labels = labels::build(&image).map_err(|e| LoadError::MalformedCode(e.to_string()))?;
    Ok(Program { image, labels })
}

fn flatten_code_section(code: &[u8]) -> Result<Vec<u8>, LoadError> {
    let mut image = Vec::new();
    let mut cursor = 0usize;
    let function_count = read_u32(code, &mut cursor)?;
    for _ in 0..function_count {
        let _function_index = read_u32(code, &mut cursor)?;
        let block_count = read_u32(code, &mut cursor)?;
        for _ in 0..block_count {
            let _name = read_string(code, &mut cursor)?;
            let size = read_u32(code, &mut cursor)? as usize;
            let block = code.get(cursor..cursor + size).ok_or_else(|| LoadError::MalformedCode("block body truncated".into()))?;
            image.extend_from_slice(block);
            cursor += size;
        }
    }
    Ok(image)
}

fn read_u32(buf: &[u8], cursor: &mut usize) -> Result<u32, LoadError> {
    let bytes = buf.get(*cursor..*cursor + 4).ok_or_else(|| LoadError::MalformedCode("truncated u32".into()))?;
    *cursor += 4;
    Ok(u32::from_le_bytes(bytes.try_into().expect("slice is 4 bytes")))
}

fn read_string(buf: &[u8], cursor: &mut usize) -> Result<String, LoadError> {
    let len = read_u32(buf, cursor)? as usize;
    let bytes = buf.get(*cursor..*cursor + len).ok_or_else(|| LoadError::MalformedCode("truncated string".into()))?;
    *cursor += len;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_minimal_module() -> Vec<u8> {
        let src = r#"
        MODULE "t";
        FUNCTION main() -> i32 {
        entry:
            RET 0;
        }
        "#;
        let mut diag = hoil_diag::Diagnostics::new();
        let mut module = hoil_parser::parse_module(src, "t.hoil", &mut diag).expect("parses");
        let mut check_diag = hoil_diag::Diagnostics::new();
        assert!(hoil_check::check_module(&mut module, &mut check_diag));
        let mut codegen_diag = hoil_diag::Diagnostics::new();
        hoil_codegen::generate_module(&module, &mut codegen_diag).expect("codegen succeeds")
    }

    #[test]
    fn loads_a_real_compiled_module() {
        let bytes = build_minimal_module();
        let program = from_bytes(&bytes).expect("loads");
        assert!(!program.image.is_empty());
    }

    #[test]
    fn bad_magic_is_rejected_without_reading_sections() {
        let mut bytes = build_minimal_module();
        bytes[0] = 0;
        assert!(matches!(from_bytes(&bytes), Err(LoadError::BadMagic { .. })));
    }

    #[test]
    fn truncated_file_is_rejected() {
        assert!(matches!(from_bytes(&[0u8; 4]), Err(LoadError::Truncated)));
    }
}
