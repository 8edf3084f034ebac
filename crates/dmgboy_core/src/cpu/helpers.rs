use super::{Bus, Cpu, CpuError, Flags};

impl Cpu {
    #[inline]
    pub fn get_flag(&self, flag: Flags) -> bool {
        self.flags().contains(flag)
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flags, value: bool) {
        let mut flags = self.flags();
        flags.set(flag, value);
        self.set_flags(flags);
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        Flags::from_bits_truncate(self.regs.f)
    }

    /// Commit a full flag set. The low nibble of F stays zero.
    #[inline]
    pub fn set_flags(&mut self, flags: Flags) {
        self.regs.f = flags.bits() & 0xF0;
    }

    /// Opcode fetch. A failed read here means the program ran off the end
    /// of mapped memory.
    #[inline]
    pub(super) fn fetch_opcode(&mut self, bus: &mut dyn Bus) -> Result<u8, CpuError> {
        let value = bus
            .read8(self.regs.pc)
            .map_err(|_| CpuError::EndOfProgram)?;
        self.regs.pc = self.regs.pc.wrapping_add(1);
        Ok(value)
    }

    #[inline]
    pub(super) fn fetch8(&mut self, bus: &mut dyn Bus) -> Result<u8, CpuError> {
        let value = bus.read8(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(1);
        Ok(value)
    }

    #[inline]
    pub(super) fn fetch_i8(&mut self, bus: &mut dyn Bus) -> Result<i8, CpuError> {
        let value = bus.read_i8(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(1);
        Ok(value)
    }

    #[inline]
    pub(super) fn fetch16(&mut self, bus: &mut dyn Bus) -> Result<u16, CpuError> {
        let value = bus.read_u16(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(2);
        Ok(value)
    }

    #[inline]
    pub(super) fn push_u16(&mut self, bus: &mut dyn Bus, value: u16) -> Result<(), CpuError> {
        let [lo, hi] = value.to_le_bytes();
        // Stack grows downward. We want memory[SP] = low, memory[SP+1] = high.
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, hi)?;
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, lo)?;
        Ok(())
    }

    #[inline]
    pub(super) fn pop_u16(&mut self, bus: &mut dyn Bus) -> Result<u16, CpuError> {
        let value = bus.read_u16(self.regs.sp)?;
        self.regs.sp = self.regs.sp.wrapping_add(2);
        Ok(value)
    }
}
