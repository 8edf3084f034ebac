use crate::cpu::table::{self, PREFIX_OPCODE};
use crate::cpu::{Bus, Cpu, CpuError, Instruction};

impl Cpu {
    pub(in crate::cpu) fn exec_nop(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        Ok(instr.cycles)
    }

    /// STOP is two bytes long. The padding byte is consumed and the
    /// low-power state itself is not modelled.
    pub(in crate::cpu) fn exec_stop(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let _padding = self.fetch8(bus)?;
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_halt(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.halted = true;
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_di(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
        Ok(instr.cycles)
    }

    pub(in crate::cpu) fn exec_ei(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        // IME becomes 1 after the *next* instruction completes.
        if !self.ime {
            self.ime_enable_pending = true;
        }
        Ok(instr.cycles)
    }

    /// The `CB` record executed on its own: fetch the second byte and run
    /// the prefixed instruction. The step loop decodes the prefix itself
    /// and never dispatches here.
    pub(in crate::cpu) fn exec_prefix(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        debug_assert_eq!(instr.opcode, PREFIX_OPCODE);
        self.prefix = true;
        let opcode = self.fetch8(bus)?;
        self.prefix = false;
        table::lookup(opcode, true).execute(self, bus)
    }

    pub(in crate::cpu) fn exec_illegal(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        Err(CpuError::IllegalOpcode {
            opcode: instr.opcode,
            pc: self.regs.pc.wrapping_sub(1),
        })
    }

    pub(in crate::cpu) fn exec_unimplemented(
        &mut self,
        _bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        Err(CpuError::Unimplemented {
            opcode: instr.opcode,
            prefixed: instr.prefixed,
        })
    }
}
