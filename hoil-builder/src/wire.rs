//! Little-endian primitives shared by every section writer (spec §6: "strings are
//! `{length:u32, bytes[length]}`").

pub fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn push_string(buf: &mut Vec<u8>, s: &str) {
    push_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

pub fn push_optional_bytes(buf: &mut Vec<u8>, bytes: Option<&[u8]>) {
    match bytes {
        Some(b) => {
            buf.push(1);
            push_u32(buf, b.len() as u32);
            buf.extend_from_slice(b);
        }
        None => buf.push(0),
    }
}
