use crate::cpu::arith;
use crate::cpu::{Bus, Cpu, CpuError, Instruction};

impl Cpu {
    /// INC r / INC (HL). C is preserved.
    pub(in crate::cpu) fn exec_inc8(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let target = instr.target();
        let value = self.read_operand8(bus, target)?;
        let (result, flags) = arith::inc8(value, self.flags());
        self.write_operand8(bus, target, result)?;
        self.set_flags(flags);
        Ok(instr.cycles)
    }

    /// DEC r / DEC (HL). C is preserved.
    pub(in crate::cpu) fn exec_dec8(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let target = instr.target();
        let value = self.read_operand8(bus, target)?;
        let (result, flags) = arith::dec8(value, self.flags());
        self.write_operand8(bus, target, result)?;
        self.set_flags(flags);
        Ok(instr.cycles)
    }

    // 16-bit INC/DEC touch no flags.

    pub(in crate::cpu) fn exec_inc16(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let target = instr.target();
        let value = self.read_operand16(bus, target)?;
        self.write_operand16(bus, target, value.wrapping_add(1))?;
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_dec16(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let target = instr.target();
        let value = self.read_operand16(bus, target)?;
        self.write_operand16(bus, target, value.wrapping_sub(1))?;
        Ok(instr.cycles)
    }
}
