use crate::cpu::{Bus, Cpu, CpuError, Instruction};

impl Cpu {
    /// Every 8-bit load: `LD r,r'`, `LD r,n8`, the `(BC)`/`(DE)`/`(HL±)`
    /// forms, `LD (a16),A` / `LD A,(a16)` and the LDH family.
    ///
    /// The source is evaluated before the destination. At most one of the
    /// two consumes immediate bytes, so the stream order is preserved.
    pub(in crate::cpu) fn exec_ld(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let (dst, src) = instr.pair();
        let value = self.read_operand8(bus, src)?;
        self.write_operand8(bus, dst, value)?;
        Ok(instr.cycles)
    }

    /// 16-bit loads: `LD rr,n16`, `LD (a16),SP`, `LD SP,HL` and
    /// `LD HL,SP+e8` (which also sets H and C).
    pub(in crate::cpu) fn exec_ld16(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let (dst, src) = instr.pair();
        let value = self.read_operand16(bus, src)?;
        self.write_operand16(bus, dst, value)?;
        Ok(instr.cycles)
    }
}
