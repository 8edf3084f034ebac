//! Introspection: step hooks, register dumps and a one-instruction
//! disassembler.

use std::fmt;
use std::io;

use super::table::{self, PREFIX_OPCODE};
use super::{Bus, BusError, Cpu, Flags, Instruction};

/// Observer called after every executed instruction with the CPU state,
/// the instruction's address and its record.
///
/// Hooks only observe; they cannot reach the bus.
pub type StepHook = Box<dyn FnMut(&Cpu, u16, &Instruction)>;

impl Cpu {
    /// Install `hook`, replacing any previous one.
    pub fn register_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&Cpu, u16, &Instruction) + 'static,
    {
        self.hook = Some(Box::new(hook));
    }

    pub fn clear_hook(&mut self) {
        self.hook = None;
    }

    /// Hook that writes one `trace!` line per instruction.
    pub fn log_trace_hook() -> StepHook {
        Box::new(|cpu: &Cpu, pc: u16, instr: &Instruction| {
            log::trace!(
                "{pc:04X}  {:<14} {}",
                instr.to_string(),
                cpu.register_summary()
            );
        })
    }

    pub(super) fn fire_hook(&mut self, pc: u16, instr: &Instruction) {
        // Taken out for the call so the hook can borrow the CPU.
        if let Some(mut hook) = self.hook.take() {
            hook(self, pc, instr);
            self.hook = Some(hook);
        }
    }

    /// Record of the most recently decoded instruction.
    pub fn current_instruction(&self) -> Option<&'static Instruction> {
        self.current
    }

    pub fn instruction_count(&self) -> u64 {
        self.instructions
    }

    /// One-line register summary, as used by the fatal diagnostic.
    pub fn register_summary(&self) -> String {
        let r = &self.regs;
        format!(
            "A={:02X} F={} BC={:04X} DE={:04X} HL={:04X} SP={:04X} PC={:04X} IME={}",
            r.a,
            flag_string(self.flags()),
            r.bc(),
            r.de(),
            r.hl(),
            r.sp,
            r.pc,
            self.ime as u8,
        )
    }

    /// Write a multi-line state dump.
    pub fn dump<W: io::Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        let r = &self.regs;
        writeln!(out, "A:  {:02X}   F:  {:02X} [{}]", r.a, r.f, flag_string(self.flags()))?;
        writeln!(out, "B:  {:02X}   C:  {:02X}   BC: {:04X}", r.b, r.c, r.bc())?;
        writeln!(out, "D:  {:02X}   E:  {:02X}   DE: {:04X}", r.d, r.e, r.de())?;
        writeln!(out, "H:  {:02X}   L:  {:02X}   HL: {:04X}", r.h, r.l, r.hl())?;
        writeln!(out, "SP: {:04X} PC: {:04X}", r.sp, r.pc)?;
        writeln!(out, "IME: {}  HALT: {}", self.ime as u8, self.halted as u8)?;
        writeln!(
            out,
            "cycles: {}  instructions: {}",
            self.cycles, self.instructions
        )?;
        match self.current {
            Some(instr) => writeln!(out, "last: {instr}")?,
            None => writeln!(out, "last: -")?,
        }
        if let Some(err) = self.error {
            writeln!(out, "error: {err}")?;
        }
        Ok(())
    }
}

fn flag_string(flags: Flags) -> String {
    [(Flags::Z, 'Z'), (Flags::N, 'N'), (Flags::H, 'H'), (Flags::C, 'C')]
        .iter()
        .map(|&(flag, name)| if flags.contains(flag) { name } else { '-' })
        .collect()
}

/// One decoded instruction together with its encoding.
#[derive(Clone, Debug)]
pub struct Disassembly {
    pub addr: u16,
    pub instruction: &'static Instruction,
    /// Raw bytes, prefix and immediates included.
    pub bytes: Vec<u8>,
}

impl Disassembly {
    /// The little-endian immediate following the opcode bytes, if any.
    pub fn immediate(&self) -> Option<u16> {
        let opcode_len = if self.instruction.prefixed { 2 } else { 1 };
        match &self.bytes[opcode_len..] {
            [] => None,
            [lo] => Some(*lo as u16),
            [lo, hi, ..] => Some(u16::from_le_bytes([*lo, *hi])),
        }
    }

    pub fn len(&self) -> u16 {
        self.bytes.len() as u16
    }

    /// Address of the following instruction.
    pub fn next_addr(&self) -> u16 {
        self.addr.wrapping_add(self.len())
    }
}

impl fmt::Display for Disassembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: Vec<String> = self.bytes.iter().map(|b| format!("{b:02X}")).collect();
        write!(
            f,
            "{:04X}: {:<9} {}",
            self.addr,
            hex.join(" "),
            self.instruction.render(self.immediate())
        )
    }
}

/// Decode the instruction at `addr` without executing it.
pub fn disassemble<B: Bus + ?Sized>(bus: &mut B, addr: u16) -> Result<Disassembly, BusError> {
    let opcode = bus.read8(addr)?;
    let instruction = if opcode == PREFIX_OPCODE {
        table::lookup(bus.read8(addr.wrapping_add(1))?, true)
    } else {
        table::lookup(opcode, false)
    };

    let mut bytes = Vec::with_capacity(instruction.bytes as usize);
    for offset in 0..instruction.bytes as u16 {
        bytes.push(bus.read8(addr.wrapping_add(offset))?);
    }

    Ok(Disassembly {
        addr,
        instruction,
        bytes,
    })
}
