//! The fetch-decode-execute loop: the one subsystem every other module in this crate exists to
//! support. Every opcode's operand layout here mirrors exactly what `hoil-codegen::function`
//! documents it writes — this file is the reader of that contract, not an independent design.
//!
//! Two operand-packing conventions recur throughout: [`unpack_two_addrs`] for the arithmetic and
//! bitwise opcodes (`(src1 << 32) | src2`) and [`unpack_cond_jump`] for the six conditional jumps
//! (`(a << 48) | (b << 32) | target`). `JMP`/`CALL` targets are carried unshifted in the low bits
//! of `imm`.

use std::io::Write as _;

use mil_format::{MemoryType, Opcode, Record, RECORD_LEN};
use tracing::{debug, error, trace};

use crate::error::RuntimeError;
use crate::memory::Memory;
use crate::program::Program;
use crate::stack::{CallStack, DataStack};

/// A running (or finished) program: the five pieces of state spec'd for the VM — memory, both
/// stacks, the instruction cursor, and the run/exit flags — plus the immutable label table and
/// instruction image loaded from the `.coil` file.
pub struct Vm {
    memory: Memory,
    stack: DataStack,
    calls: CallStack,
    program: Program,
    cursor: usize,
    running: bool,
    exit_code: i64,
    instruction_count: u64,
}

impl Vm {
    pub fn new(program: Program) -> Self {
        Self {
            memory: Memory::new(),
            stack: DataStack::new(),
            calls: CallStack::new(),
            program,
            cursor: 0,
            running: false,
            exit_code: 0,
            instruction_count: 0,
        }
    }

    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    pub fn memory_used(&self) -> usize {
        self.memory.used()
    }

    pub fn stack_used(&self) -> usize {
        self.stack.used()
    }

    pub fn call_depth(&self) -> usize {
        self.calls.depth()
    }

    pub fn exit_code(&self) -> i64 {
        self.exit_code
    }

    /// Run until `EXIT`/`SYSCALL 60` clears `running`, or the cursor reaches the end of the
    /// instruction stream — EOF without an explicit exit terminates normally with whatever
    /// `exit_code` is already set (`0` unless the program wrote it itself).
    pub fn run(&mut self) -> Result<i64, RuntimeError> {
        self.running = true;
        while self.running && self.cursor < self.program.image.len() {
            if let Err(err) = self.step() {
                error!(%err, cursor = self.cursor, "execution aborted");
                return Err(err);
            }
        }
        self.running = false;
        debug!(instructions = self.instruction_count, exit_code = self.exit_code, "run finished");
        Ok(self.exit_code)
    }

    fn step(&mut self) -> Result<(), RuntimeError> {
        let offset = self.cursor;
        let record = self.decode_at(offset)?;
        trace!(offset, %record, "decoded instruction");
        self.cursor += RECORD_LEN;
        self.instruction_count += 1;
        self.execute(record)
    }

    fn decode_at(&self, offset: usize) -> Result<Record, RuntimeError> {
        let bytes = self.program.image.get(offset..).ok_or(RuntimeError::CursorOutOfBounds)?;
        Record::decode(bytes).map_err(|source| RuntimeError::Decode { offset, source })
    }

    fn execute(&mut self, record: Record) -> Result<(), RuntimeError> {
        let ty = record.ty;
        let addr = record.addr;
        let imm = record.imm;
        match record.opcode {
            Opcode::AllocImm => {
                let bytes = imm.to_le_bytes();
                self.memory.alloc_write(addr, &bytes[..ty.size()])?;
            }
            Opcode::AllocMem => {
                let src = imm as u16;
                let bytes = self.memory.read(src, ty.size())?.to_vec();
                self.memory.alloc_write(addr, &bytes)?;
            }
            Opcode::Move => {
                let src = imm as u16;
                let bytes = self.memory.read(src, ty.size())?.to_vec();
                self.memory.write(addr, &bytes)?;
            }
            Opcode::Load => {
                let ptr_addr = imm as u16;
                let target = self.memory.read_i64(ptr_addr, MemoryType::Ptr)? as u16;
                let bytes = self.memory.read(target, ty.size())?.to_vec();
                self.memory.alloc_write(addr, &bytes)?;
            }
            Opcode::LoadImm => {
                let bytes = imm.to_le_bytes();
                self.memory.alloc_write(addr, &bytes[..ty.size()])?;
            }
            Opcode::Store => {
                let ptr_addr = addr;
                let value_addr = imm as u16;
                let target = self.memory.read_i64(ptr_addr, MemoryType::Ptr)? as u16;
                let bytes = self.memory.read(value_addr, ty.size())?.to_vec();
                self.memory.write(target, &bytes)?;
            }
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod | Opcode::And | Opcode::Or | Opcode::Xor | Opcode::Shl | Opcode::Shr => {
                let (a, b) = unpack_two_addrs(imm);
                let lhs = self.memory.read_i64(a, ty)?;
                let rhs = self.memory.read_i64(b, ty)?;
                let result = self.binary_op(record.opcode, lhs, rhs)?;
                self.memory.alloc_write_i64(addr, ty, result)?;
            }
            Opcode::Neg => {
                let a = imm as u16;
                let v = self.memory.read_i64(a, ty)?;
                self.memory.alloc_write_i64(addr, ty, v.wrapping_neg())?;
            }
            Opcode::Not => {
                let a = imm as u16;
                let v = self.memory.read_i64(a, ty)?;
                self.memory.alloc_write_i64(addr, ty, !v)?;
            }
            Opcode::Jmp => {
                let target = (imm & 0xFFFF) as u16;
                self.cursor = self.program.labels.offset_of(target)?;
                debug!(target, cursor = self.cursor, "jmp resolved");
            }
            Opcode::Jeq | Opcode::Jne | Opcode::Jlt | Opcode::Jle | Opcode::Jgt | Opcode::Jge => {
                let (a, b, target) = unpack_cond_jump(imm);
                let lhs = self.memory.read_i64(a, ty)?;
                let rhs = self.memory.read_i64(b, ty)?;
                if self.comparison_holds(record.opcode, lhs, rhs) {
                    self.cursor = self.program.labels.offset_of(target)?;
                    debug!(target, cursor = self.cursor, "conditional jump taken");
                }
            }
            Opcode::Call => {
                let target = (imm & 0xFFFF) as u16;
                self.calls.push(self.cursor)?;
                self.cursor = self.program.labels.offset_of(target)?;
                debug!(target, cursor = self.cursor, depth = self.calls.depth(), "call resolved");
            }
            Opcode::Ret => {
                self.cursor = self.calls.pop()?;
            }
            Opcode::Push => {
                let bytes = self.memory.read(addr, ty.size())?.to_vec();
                self.stack.push(&bytes)?;
            }
            Opcode::Pop => {
                let size = ty.size();
                let bytes = self.stack.pop(size)?.to_vec();
                self.memory.write(addr, &bytes)?;
            }
            Opcode::Syscall => self.execute_syscall(imm)?,
            Opcode::Exit => {
                let status_addr = imm as u16;
                self.exit_code = self.memory.read_i64(status_addr, MemoryType::Int64)?;
                self.running = false;
            }
            Opcode::LabelDef => {}
            Opcode::ArgData => return Err(RuntimeError::StrayArgData),
        }
        Ok(())
    }

    fn binary_op(&self, op: Opcode, a: i64, b: i64) -> Result<i64, RuntimeError> {
        Ok(match op {
            Opcode::Add => a.wrapping_add(b),
            Opcode::Sub => a.wrapping_sub(b),
            Opcode::Mul => a.wrapping_mul(b),
            Opcode::Div => {
                if b == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                a.wrapping_div(b)
            }
            Opcode::Mod => {
                if b == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                a.wrapping_rem(b)
            }
            Opcode::And => a & b,
            Opcode::Or => a | b,
            Opcode::Xor => a ^ b,
            Opcode::Shl => a.wrapping_shl(b as u32),
            Opcode::Shr => a.wrapping_shr(b as u32),
            _ => unreachable!("not a binary opcode"),
        })
    }

    fn comparison_holds(&self, op: Opcode, a: i64, b: i64) -> bool {
        match op {
            Opcode::Jeq => a == b,
            Opcode::Jne => a != b,
            Opcode::Jlt => a < b,
            Opcode::Jle => a <= b,
            Opcode::Jgt => a > b,
            Opcode::Jge => a >= b,
            _ => unreachable!("not a conditional jump"),
        }
    }

    /// `num` is the `SYSCALL` record's own `imm`. If the record immediately following (still
    /// unconsumed at this point) is `ARG_DATA`, it is consumed here and its `imm` supplies the
    /// arguments; a syscall with no operands beyond its number has no following `ARG_DATA` at
    /// all, so `arg_imm` stays `0`.
    fn execute_syscall(&mut self, num: u64) -> Result<(), RuntimeError> {
        let arg_imm = match self.decode_at(self.cursor) {
            Ok(next) if next.opcode == Opcode::ArgData => {
                self.cursor += RECORD_LEN;
                self.instruction_count += 1;
                next.imm
            }
            _ => 0,
        };

        match num {
            1 => {
                let fd = ((arg_imm >> 48) & 0xFFFF) as u16;
                let buf_addr = ((arg_imm >> 32) & 0xFFFF) as u16;
                let count = ((arg_imm >> 16) & 0xFFFF) as usize;
                let bytes = self.memory.read(buf_addr, count)?.to_vec();
                match fd {
                    1 => std::io::stdout().write_all(&bytes).map_err(RuntimeError::SyscallIo)?,
                    2 => std::io::stderr().write_all(&bytes).map_err(RuntimeError::SyscallIo)?,
                    _ => return Err(RuntimeError::UnsupportedSyscall(num)),
                }
                Ok(())
            }
            60 => {
                self.exit_code = arg_imm as i64;
                self.running = false;
                Ok(())
            }
            other => Err(RuntimeError::UnsupportedSyscall(other)),
        }
    }
}

/// Unpack the `(src1 << 32) | src2` convention arithmetic and bitwise opcodes use.
fn unpack_two_addrs(imm: u64) -> (u16, u16) {
    (((imm >> 32) & 0xFFFF) as u16, (imm & 0xFFFF) as u16)
}

/// Unpack the `(a << 48) | (b << 32) | target` convention the conditional jumps use.
fn unpack_cond_jump(imm: u64) -> (u16, u16, u16) {
    (((imm >> 48) & 0xFFFF) as u16, ((imm >> 32) & 0xFFFF) as u16, (imm & 0xFFFF) as u16)
}
