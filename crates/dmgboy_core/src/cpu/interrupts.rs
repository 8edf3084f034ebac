use super::{Bus, Cpu, CpuError};

/// Cost of an interrupt dispatch in T-cycles.
const DISPATCH_CYCLES: u32 = 20;

/// Interrupt lines, lowest index has the highest priority.
pub const INTERRUPT_NAMES: [&str; 5] = ["VBlank", "STAT", "Timer", "Serial", "Joypad"];

impl Cpu {
    /// Service the highest-priority pending interrupt, if any.
    ///
    /// A pending interrupt always ends HALT, even with IME clear. Returns
    /// `Some(cycles)` if an interrupt was dispatched.
    pub(super) fn handle_interrupts(&mut self, bus: &mut dyn Bus) -> Result<Option<u32>, CpuError> {
        let pending = bus.pending_interrupts() & 0x1F;
        if pending == 0 {
            return Ok(None);
        }

        self.halted = false;
        if !self.ime {
            return Ok(None);
        }

        let index = pending.trailing_zeros() as u8;
        let vector = 0x0040 + (index as u16) * 8;
        let pc = self.regs.pc;

        self.ime = false;
        bus.acknowledge_interrupt(index);
        self.push_u16(bus, pc)?;
        self.regs.pc = vector;

        log::debug!(
            "interrupt {} ({}): vector=0x{:04X} pc=0x{:04X} sp=0x{:04X}",
            index,
            INTERRUPT_NAMES[index as usize],
            vector,
            pc,
            self.regs.sp,
        );

        Ok(Some(DISPATCH_CYCLES))
    }

    /// Apply delayed IME change requested by EI.
    #[inline]
    pub(super) fn apply_ime_delay(&mut self) {
        if self.ime_enable_delay {
            // Second step after EI: actually enable IME.
            self.ime = true;
            self.ime_enable_delay = false;
        } else if self.ime_enable_pending {
            // First step after EI: arm the delayed enable.
            self.ime_enable_pending = false;
            self.ime_enable_delay = true;
        }
    }
}
