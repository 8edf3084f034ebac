use crate::cpu::arith::{self, Direction};
use crate::cpu::{Bus, Cpu, CpuError, Flags, Instruction};

impl Cpu {
    /// Fetch the source operand of an `OP A, src` record.
    #[inline]
    fn alu_source(&mut self, bus: &mut dyn Bus, instr: &Instruction) -> Result<u8, CpuError> {
        let (_, src) = instr.pair();
        self.read_operand8(bus, src)
    }

    pub(in crate::cpu) fn exec_add(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let value = self.alu_source(bus, instr)?;
        self.alu_add(value, false);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_adc(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let value = self.alu_source(bus, instr)?;
        self.alu_add(value, true);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_sub(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let value = self.alu_source(bus, instr)?;
        self.alu_sub(value, false);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_sbc(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let value = self.alu_source(bus, instr)?;
        self.alu_sub(value, true);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_and(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let value = self.alu_source(bus, instr)?;
        self.alu_and(value);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_xor(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let value = self.alu_source(bus, instr)?;
        self.alu_xor(value);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_or(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let value = self.alu_source(bus, instr)?;
        self.alu_or(value);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_cp(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let value = self.alu_source(bus, instr)?;
        self.alu_cp(value);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_add_hl(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let (_, src) = instr.pair();
        let value = self.read_operand16(bus, src)?;
        self.alu_add_hl(value);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_add_sp_e8(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let offset = self.fetch_i8(bus)?;
        let (result, flags) = arith::add_sp_e8(self.regs.sp, offset);
        self.regs.sp = result;
        self.set_flags(flags);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_rlca(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.alu_rotate_a(Direction::Left, true);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_rrca(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.alu_rotate_a(Direction::Right, true);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_rla(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.alu_rotate_a(Direction::Left, false);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_rra(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.alu_rotate_a(Direction::Right, false);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_daa(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let (result, flags) = arith::daa(self.regs.a, self.flags());
        self.regs.a = result;
        self.set_flags(flags);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_cpl(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.regs.a = !self.regs.a;
        self.set_flag(Flags::N, true);
        self.set_flag(Flags::H, true);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_scf(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, false);
        self.set_flag(Flags::C, true);
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_ccf(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let carry = self.get_flag(Flags::C);
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, false);
        self.set_flag(Flags::C, !carry);
        Ok(instr.cycles)
    }
}
