use super::arith::{self, Direction};
use super::{Cpu, Flags};

impl Cpu {
    /// ADD A (or ADC A when `use_carry`).
    pub(super) fn alu_add(&mut self, value: u8, use_carry: bool) {
        let carry = use_carry && self.get_flag(Flags::C);
        let (result, flags) = arith::adc8(self.regs.a, value, carry);
        self.regs.a = result;
        self.set_flags(flags);
    }

    /// SUB A (or SBC A when `use_carry`).
    pub(super) fn alu_sub(&mut self, value: u8, use_carry: bool) {
        let carry = use_carry && self.get_flag(Flags::C);
        let (result, flags) = arith::sbc8(self.regs.a, value, carry);
        self.regs.a = result;
        self.set_flags(flags);
    }

    #[inline]
    pub(super) fn alu_and(&mut self, value: u8) {
        let result = self.regs.a & value;
        self.regs.a = result;
        self.set_flags(Flags::from_bits_znhc(result == 0, false, true, false));
    }

    #[inline]
    pub(super) fn alu_xor(&mut self, value: u8) {
        let result = self.regs.a ^ value;
        self.regs.a = result;
        self.set_flags(Flags::from_bits_znhc(result == 0, false, false, false));
    }

    #[inline]
    pub(super) fn alu_or(&mut self, value: u8) {
        let result = self.regs.a | value;
        self.regs.a = result;
        self.set_flags(Flags::from_bits_znhc(result == 0, false, false, false));
    }

    /// CP: SUB without storing the result.
    #[inline]
    pub(super) fn alu_cp(&mut self, value: u8) {
        let (_, flags) = arith::sub8(self.regs.a, value);
        self.set_flags(flags);
    }

    /// RLCA/RRCA/RLA/RRA. Unlike the `CB` rotates, Z is always cleared.
    pub(super) fn alu_rotate_a(&mut self, dir: Direction, circular: bool) {
        let (result, mut flags) = arith::rotate(self.regs.a, dir, self.flags(), circular);
        flags.remove(Flags::Z);
        self.regs.a = result;
        self.set_flags(flags);
    }

    /// ADD HL,rr. Z is left untouched.
    pub(super) fn alu_add_hl(&mut self, value: u16) {
        let (result, mut flags) = arith::add16(self.regs.hl(), value);
        flags.set(Flags::Z, self.get_flag(Flags::Z));
        self.regs.set_hl(result);
        self.set_flags(flags);
    }
}
