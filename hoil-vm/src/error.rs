//! Every way a `.coil` file can fail to load or a running program can fail to execute.
//!
//! Every variant here is fatal: the interpreter has no recoverable-error channel at runtime, only
//! clean termination via `EXIT`/`SYSCALL 60` or a hard stop reported through one of these.

use mil_format::RecordError;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read '{path}': {source}")]
    Io { path: String, source: std::io::Error },
    #[error("file is too short to contain a header")]
    Truncated,
    #[error("bad magic number {found:#010x}, expected {expected:#010x}")]
    BadMagic { found: u32, expected: u32 },
    #[error("section table entry {0} is out of bounds")]
    BadSectionTable(usize),
    #[error("file has no Code section")]
    MissingCodeSection,
    #[error("Code section is malformed: {0}")]
    MalformedCode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("malformed instruction stream at offset {offset}: {source}")]
    Decode { offset: usize, source: RecordError },
    #[error("memory access out of bounds: address {addr} length {len} exceeds the static memory size")]
    OutOfBounds { addr: usize, len: usize },
    #[error("data stack overflow: cannot push {len} more bytes")]
    StackOverflow { len: usize },
    #[error("data stack underflow: cannot pop {len} bytes from an empty region")]
    StackUnderflow { len: usize },
    #[error("call stack overflow: exceeded the maximum nested call depth")]
    CallStackOverflow,
    #[error("call stack underflow: RET with no matching CALL")]
    CallStackUnderflow,
    #[error("duplicate label id {0}")]
    DuplicateLabel(u16),
    #[error("label table is full: more than the maximum number of distinct labels was declared")]
    LabelTableFull,
    #[error("jump or call to unknown label {0}")]
    UnknownLabel(u16),
    #[error("division by zero")]
    DivisionByZero,
    #[error("unsupported syscall number {0}")]
    UnsupportedSyscall(u64),
    #[error("host write for syscall 1 failed: {0}")]
    SyscallIo(std::io::Error),
    #[error("ARG_DATA record encountered with no preceding SYSCALL")]
    StrayArgData,
    #[error("cursor ran past the end of the instruction stream")]
    CursorOutOfBounds,
}
