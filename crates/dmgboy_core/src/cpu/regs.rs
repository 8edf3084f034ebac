use bitflags::bitflags;

use super::arith;

/// Registers for the Game Boy CPU (SM83).
///
/// The eight 8-bit registers double as four 16-bit pairs (AF, BC, DE, HL)
/// where the first-named register is the high byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    #[inline]
    pub fn af(&self) -> u16 {
        arith::concat16(self.a, self.f & 0xF0)
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let (a, f) = arith::split16(value);
        self.a = a;
        // Lower 4 bits of F are always zero.
        self.f = f & 0xF0;
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        arith::concat16(self.b, self.c)
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        (self.b, self.c) = arith::split16(value);
    }

    #[inline]
    pub fn de(&self) -> u16 {
        arith::concat16(self.d, self.e)
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        (self.d, self.e) = arith::split16(value);
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        arith::concat16(self.h, self.l)
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        (self.h, self.l) = arith::split16(value);
    }

    #[inline]
    pub fn get8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.a,
            Reg8::B => self.b,
            Reg8::C => self.c,
            Reg8::D => self.d,
            Reg8::E => self.e,
            Reg8::H => self.h,
            Reg8::L => self.l,
        }
    }

    #[inline]
    pub fn set8(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::A => self.a = value,
            Reg8::B => self.b = value,
            Reg8::C => self.c = value,
            Reg8::D => self.d = value,
            Reg8::E => self.e = value,
            Reg8::H => self.h = value,
            Reg8::L => self.l = value,
        }
    }

    #[inline]
    pub fn get16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::AF => self.af(),
            Reg16::BC => self.bc(),
            Reg16::DE => self.de(),
            Reg16::HL => self.hl(),
            Reg16::SP => self.sp,
        }
    }

    /// Write a 16-bit register or pair. Writes through AF drop F's low nibble.
    #[inline]
    pub fn set16(&mut self, reg: Reg16, value: u16) {
        match reg {
            Reg16::AF => self.set_af(value),
            Reg16::BC => self.set_bc(value),
            Reg16::DE => self.set_de(value),
            Reg16::HL => self.set_hl(value),
            Reg16::SP => self.sp = value,
        }
    }
}

/// 8-bit register names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg8 {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

impl Reg8 {
    pub fn name(self) -> &'static str {
        match self {
            Reg8::A => "A",
            Reg8::B => "B",
            Reg8::C => "C",
            Reg8::D => "D",
            Reg8::E => "E",
            Reg8::H => "H",
            Reg8::L => "L",
        }
    }
}

/// 16-bit registers and register pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    SP,
}

impl Reg16 {
    pub fn name(self) -> &'static str {
        match self {
            Reg16::AF => "AF",
            Reg16::BC => "BC",
            Reg16::DE => "DE",
            Reg16::HL => "HL",
            Reg16::SP => "SP",
        }
    }
}

bitflags! {
    /// Flag bits in the F register.
    ///
    /// Layout (bit index in the byte, from MSB to LSB):
    /// - bit 7: Z (zero)
    /// - bit 6: N (subtract)
    /// - bit 5: H (half carry)
    /// - bit 4: C (carry)
    /// - bits 0–3 are always zero.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        const Z = 0b1000_0000;
        const N = 0b0100_0000;
        const H = 0b0010_0000;
        const C = 0b0001_0000;
    }
}

impl Flags {
    /// Build a flag set from individual booleans, in Z N H C order.
    #[inline]
    pub fn from_bits_znhc(z: bool, n: bool, h: bool, c: bool) -> Self {
        let mut flags = Flags::empty();
        flags.set(Flags::Z, z);
        flags.set(Flags::N, n);
        flags.set(Flags::H, h);
        flags.set(Flags::C, c);
        flags
    }
}
