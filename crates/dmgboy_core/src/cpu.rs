//! Sharp SM83 interpreter.
//!
//! The CPU is table driven: every opcode (and every `CB`-prefixed opcode)
//! resolves to an [`Instruction`] record whose executor runs the
//! instruction against the CPU and a [`Bus`] and returns its cycle cost.

use std::fmt;

mod alu;
pub mod arith;
mod bus;
mod cb;
mod error;
mod exec;
mod helpers;
mod init;
mod interrupts;
mod operand;
mod regs;
mod step;
pub mod table;
mod trace;

pub use bus::{Bus, BusError};
pub use error::CpuError;
pub use operand::{Cond, HlStep, Operand, OperandKind};
pub use regs::{Flags, Reg16, Reg8, Registers};
pub use table::Instruction;
pub use trace::{disassemble, Disassembly, StepHook};

/// Game Boy CPU state.
pub struct Cpu {
    pub regs: Registers,
    /// Interrupt master enable.
    pub ime: bool,
    pub halted: bool,
    /// Set by EI; becomes `ime_enable_delay` after the next instruction.
    ime_enable_pending: bool,
    ime_enable_delay: bool,
    /// Routes the next opcode through the `CB` table.
    prefix: bool,
    /// Total T-cycles executed since power on.
    cycles: u64,
    /// Instructions executed since power on (interrupt entries and HALT
    /// idle steps are not counted).
    instructions: u64,
    /// HALT idle steps since power on.
    idle_steps: u64,
    /// Optional step limit; reaching it fills the error slot.
    limit: Option<u64>,
    /// First fatal condition. Once set, stepping does nothing.
    error: Option<CpuError>,
    current: Option<&'static Instruction>,
    hook: Option<StepHook>,
}

impl fmt::Debug for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cpu")
            .field("regs", &self.regs)
            .field("ime", &self.ime)
            .field("halted", &self.halted)
            .field("cycles", &self.cycles)
            .field("instructions", &self.instructions)
            .field("limit", &self.limit)
            .field("error", &self.error)
            .field("current", &self.current.map(|instr| instr.to_string()))
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl Cpu {
    /// Cumulative T-cycle counter.
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// The error slot.
    #[inline]
    pub fn error(&self) -> Option<CpuError> {
        self.error
    }

    /// Whether a step would do any work.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.error.is_none()
    }

    /// Terminate stepping after `limit` executed instructions. Idle steps
    /// spent in HALT count toward the limit as well.
    pub fn set_limit(&mut self, limit: Option<u64>) {
        self.limit = limit;
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }
}

#[cfg(test)]
mod tests;
