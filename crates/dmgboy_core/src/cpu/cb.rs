//! `CB`-prefixed executors: rotates and shifts, BIT, RES and SET.
//!
//! Each operates on a register or `(HL)`. Unlike their unprefixed
//! accumulator forms the rotates compute Z from the result.

use super::arith::{self, Direction};
use super::operand::{Operand, OperandKind};
use super::{Bus, Cpu, CpuError, Flags, Instruction};

fn bit_index(op: Operand) -> u8 {
    match op.kind {
        OperandKind::Bit(bit) => bit,
        other => unreachable!("expected a bit index, found {other:?}"),
    }
}

impl Cpu {
    /// Read-modify-write of the record's target through `op`.
    #[inline]
    fn cb_modify(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
        op: impl FnOnce(u8, Flags) -> (u8, Flags),
    ) -> Result<u32, CpuError> {
        let target = instr.target();
        let value = self.read_operand8(bus, target)?;
        let (result, flags) = op(value, self.flags());
        self.write_operand8(bus, target, result)?;
        self.set_flags(flags);
        Ok(instr.cycles)
    }

    pub(super) fn exec_rlc(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.cb_modify(bus, instr, |v, f| arith::rotate(v, Direction::Left, f, true))
    }

    pub(super) fn exec_rrc(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.cb_modify(bus, instr, |v, f| arith::rotate(v, Direction::Right, f, true))
    }

    pub(super) fn exec_rl(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.cb_modify(bus, instr, |v, f| arith::rotate(v, Direction::Left, f, false))
    }

    pub(super) fn exec_rr(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.cb_modify(bus, instr, |v, f| arith::rotate(v, Direction::Right, f, false))
    }

    pub(super) fn exec_sla(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.cb_modify(bus, instr, |v, _| arith::sla(v))
    }

    pub(super) fn exec_sra(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.cb_modify(bus, instr, |v, _| arith::sra(v))
    }

    pub(super) fn exec_swap(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.cb_modify(bus, instr, |v, _| arith::swap(v))
    }

    pub(super) fn exec_srl(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        self.cb_modify(bus, instr, |v, _| arith::srl(v))
    }

    /// BIT n: flags only, the target is never written back.
    pub(super) fn exec_bit(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let (bit, target) = instr.pair();
        let value = self.read_operand8(bus, target)?;
        let flags = arith::bit_test(value, bit_index(bit), self.flags());
        self.set_flags(flags);
        Ok(instr.cycles)
    }

    // RES and SET leave the flags alone.

    pub(super) fn exec_res(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let (bit, target) = instr.pair();
        let value = self.read_operand8(bus, target)?;
        self.write_operand8(bus, target, value & !(1 << bit_index(bit)))?;
        Ok(instr.cycles)
    }

    pub(super) fn exec_set(
        &mut self,
        bus: &mut dyn Bus,
        instr: &Instruction,
    ) -> Result<u32, CpuError> {
        let (bit, target) = instr.pair();
        let value = self.read_operand8(bus, target)?;
        self.write_operand8(bus, target, value | (1 << bit_index(bit)))?;
        Ok(instr.cycles)
    }
}
