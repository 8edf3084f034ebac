use crate::cpu::operand::OperandKind;
use crate::cpu::{Bus, Cpu, CpuError, Instruction};

impl Cpu {
    /// Whether the record's condition (if any) passes.
    #[inline]
    fn branch_taken(&self, instr: &Instruction) -> bool {
        instr
            .condition()
            .map_or(true, |cond| cond.holds(self.flags()))
    }

    /// JR [cc,] e8. The displacement is relative to the address after the
    /// immediate.
    pub(in crate::cpu) fn exec_jr(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let offset = self.fetch_i8(bus)?;
        let taken = self.branch_taken(instr);
        if taken {
            self.regs.pc = self.regs.pc.wrapping_add_signed(offset as i16);
        }
        Ok(instr.cost(taken))
    }

    pub(in crate::cpu) fn exec_jp(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let addr = self.fetch16(bus)?;
        let taken = self.branch_taken(instr);
        if taken {
            self.regs.pc = addr;
        }
        Ok(instr.cost(taken))
    }

    /// JP HL: jump to HL itself, no memory access.
    pub(in crate::cpu) fn exec_jp_hl(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.regs.pc = self.regs.hl();
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_call(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let addr = self.fetch16(bus)?;
        let taken = self.branch_taken(instr);
        if taken {
            let ret = self.regs.pc;
            self.push_u16(bus, ret)?;
            self.regs.pc = addr;
        }
        Ok(instr.cost(taken))
    }

    pub(in crate::cpu) fn exec_ret(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let taken = self.branch_taken(instr);
        if taken {
            self.regs.pc = self.pop_u16(bus)?;
        }
        Ok(instr.cost(taken))
    }

    /// RETI enables IME immediately, without the EI delay.
    pub(in crate::cpu) fn exec_reti(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.regs.pc = self.pop_u16(bus)?;
        self.ime = true;
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_rst(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let vector = match instr.target().kind {
            OperandKind::Vector(vector) => vector,
            other => unreachable!("RST with operand {other:?}"),
        };
        let ret = self.regs.pc;
        self.push_u16(bus, ret)?;
        self.regs.pc = vector as u16;
        Ok(instr.cycles)
    }
}
