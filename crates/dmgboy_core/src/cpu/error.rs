use thiserror::Error;

use super::BusError;

/// Conditions that stop the CPU step loop.
///
/// The first one raised is kept in the CPU's error slot; `Cpu::step`
/// refuses to do further work until the CPU is reset.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum CpuError {
    /// The opcode fetch hit unmapped memory. Callers running a program to
    /// completion treat this as a normal end.
    #[error("end of program")]
    EndOfProgram,
    /// One of the opcode holes (D3, DB, DD, E3, E4, EB, EC, ED, F4, FC, FD)
    /// was executed.
    #[error("illegal opcode 0x{opcode:02X} at PC=0x{pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },
    /// The decoder reached a table slot with no executor.
    #[error("unimplemented opcode 0x{opcode:02X} (CB-prefixed: {prefixed})")]
    Unimplemented { opcode: u8, prefixed: bool },
    /// A bus access inside an instruction failed. Side effects performed
    /// before the failing access are kept.
    #[error("bus error: {0}")]
    Bus(#[from] BusError),
    /// The configured step limit was reached.
    #[error("step limit of {0} steps reached")]
    StepLimit(u64),
}

impl CpuError {
    /// Whether the loop ended because the program ran out, which is not a
    /// failure for callers that run to completion.
    pub fn is_end_of_program(&self) -> bool {
        matches!(self, CpuError::EndOfProgram)
    }
}
