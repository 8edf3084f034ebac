use crate::cpu::{Bus, Cpu, CpuError, Instruction};

impl Cpu {
    pub(in crate::cpu) fn exec_push(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let value = self.read_operand16(bus, instr.target())?;
        self.push_u16(bus, value)?;
        Ok(instr.cycles)
    }

    /// POP rr. `POP AF` goes through `set_af`, which zeroes F's low nibble.
    pub(in crate::cpu) fn exec_pop(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let value = self.pop_u16(bus)?;
        self.write_operand16(bus, instr.target(), value)?;
        Ok(instr.cycles)
    }
}
