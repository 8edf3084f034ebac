use thiserror::Error;

/// Failure of a single bus access.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BusError {
    /// Nothing is mapped at this address (e.g. cartridge space with no
    /// cartridge inserted, or past the end of a test program).
    #[error("no memory mapped at 0x{0:04X}")]
    Unmapped(u16),
}

/// Abstraction over the Game Boy bus (memory and IO).
///
/// Accesses are fallible so that buses backed by less than the full 64 KiB
/// (bare test programs, a machine without a cartridge) can report the end
/// of mapped memory; the CPU turns a failed opcode fetch into
/// `CpuError::EndOfProgram`.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> Result<u8, BusError>;
    fn write8(&mut self, addr: u16, value: u8) -> Result<(), BusError>;

    /// Little-endian 16-bit read at `addr`, `addr + 1`.
    fn read_u16(&mut self, addr: u16) -> Result<u16, BusError> {
        let lo = self.read8(addr)?;
        let hi = self.read8(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Signed 8-bit read, as used by relative jumps and `SP+e8`.
    fn read_i8(&mut self, addr: u16) -> Result<i8, BusError> {
        self.read8(addr).map(|value| value as i8)
    }

    /// Hook that finalises a single CPU step from the bus's point of view.
    ///
    /// `total_cycles` is the CPU's cumulative cycle counter after the step.
    /// System buses use it to advance the PPU stepper; the default does
    /// nothing.
    fn end_instruction(&mut self, _total_cycles: u64) {}

    /// Interrupt lines that are both requested (IF) and enabled (IE),
    /// lower five bits only. Buses without an interrupt controller report
    /// none.
    fn pending_interrupts(&mut self) -> u8 {
        0
    }

    /// Clear the request bit of interrupt `index` (0 = VBlank .. 4 = Joypad).
    fn acknowledge_interrupt(&mut self, _index: u8) {}
}
