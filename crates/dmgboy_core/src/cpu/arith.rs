//! Pure arithmetic and flag helpers shared by the instruction executors.
//!
//! Every helper returns the computed value together with the full flag set
//! it produces. Callers decide which of those flags they actually commit,
//! e.g. `ADD HL,rr` keeps the old Z and the A-register rotates force Z to 0.

use super::Flags;

/// Split a 16-bit value into `(high, low)`.
#[inline]
pub fn split16(value: u16) -> (u8, u8) {
    let [hi, lo] = value.to_be_bytes();
    (hi, lo)
}

/// Join `high` and `low` into a 16-bit value.
#[inline]
pub fn concat16(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}

#[inline]
pub fn add8(a: u8, b: u8) -> (u8, Flags) {
    adc8(a, b, false)
}

/// 8-bit add with carry-in.
#[inline]
pub fn adc8(a: u8, b: u8, carry: bool) -> (u8, Flags) {
    let carry_in = carry as u8;
    let half = (a & 0x0F) + (b & 0x0F) + carry_in;
    let full = a as u16 + b as u16 + carry_in as u16;
    let result = full as u8;
    (
        result,
        Flags::from_bits_znhc(result == 0, false, half > 0x0F, full > 0xFF),
    )
}

#[inline]
pub fn sub8(a: u8, b: u8) -> (u8, Flags) {
    sbc8(a, b, false)
}

/// 8-bit subtract with borrow-in.
#[inline]
pub fn sbc8(a: u8, b: u8, carry: bool) -> (u8, Flags) {
    let carry_in = carry as i16;
    let half = (a & 0x0F) as i16 - (b & 0x0F) as i16 - carry_in;
    let full = a as i16 - b as i16 - carry_in;
    let result = full as u8;
    (
        result,
        Flags::from_bits_znhc(result == 0, true, half < 0, full < 0),
    )
}

/// 16-bit add. H is the carry out of bit 11, C the carry out of bit 15.
///
/// The reported Z reflects the result; `ADD HL,rr` must not commit it.
#[inline]
pub fn add16(a: u16, b: u16) -> (u16, Flags) {
    let result = a.wrapping_add(b);
    let half = (a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF;
    let carry = a as u32 + b as u32 > 0xFFFF;
    (result, Flags::from_bits_znhc(result == 0, false, half, carry))
}

/// `SP + e8` as used by `ADD SP,e8` and `LD HL,SP+e8`.
///
/// Z and N are cleared; H and C come from the unsigned low-byte addition.
#[inline]
pub fn add_sp_e8(sp: u16, offset: i8) -> (u16, Flags) {
    let offset = offset as i16 as u16;
    let half = (sp & 0x000F) + (offset & 0x000F) > 0x000F;
    let carry = (sp & 0x00FF) + (offset & 0x00FF) > 0x00FF;
    (
        sp.wrapping_add(offset),
        Flags::from_bits_znhc(false, false, half, carry),
    )
}

/// 8-bit increment. C is carried over from `flags`.
#[inline]
pub fn inc8(value: u8, flags: Flags) -> (u8, Flags) {
    let result = value.wrapping_add(1);
    let half = (value & 0x0F) == 0x0F;
    (
        result,
        Flags::from_bits_znhc(result == 0, false, half, flags.contains(Flags::C)),
    )
}

/// 8-bit decrement. C is carried over from `flags`.
#[inline]
pub fn dec8(value: u8, flags: Flags) -> (u8, Flags) {
    let result = value.wrapping_sub(1);
    let half = (value & 0x0F) == 0;
    (
        result,
        Flags::from_bits_znhc(result == 0, true, half, flags.contains(Flags::C)),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Rotate `value` one bit in `dir`.
///
/// Circular rotations wrap the shifted-out bit into the opposite end;
/// non-circular ones shift the incoming C flag in. The shifted-out bit
/// becomes the new C. Z is set iff the result is zero.
#[inline]
pub fn rotate(value: u8, dir: Direction, flags: Flags, circular: bool) -> (u8, Flags) {
    let carry_in = flags.contains(Flags::C) as u8;
    let (result, carry_out) = match (dir, circular) {
        (Direction::Left, true) => (value.rotate_left(1), value & 0x80 != 0),
        (Direction::Right, true) => (value.rotate_right(1), value & 0x01 != 0),
        (Direction::Left, false) => ((value << 1) | carry_in, value & 0x80 != 0),
        (Direction::Right, false) => ((value >> 1) | (carry_in << 7), value & 0x01 != 0),
    };
    (
        result,
        Flags::from_bits_znhc(result == 0, false, false, carry_out),
    )
}

/// SLA: arithmetic shift left, bit 0 cleared.
#[inline]
pub fn sla(value: u8) -> (u8, Flags) {
    let result = value << 1;
    (
        result,
        Flags::from_bits_znhc(result == 0, false, false, value & 0x80 != 0),
    )
}

/// SRA: arithmetic shift right, bit 7 kept.
#[inline]
pub fn sra(value: u8) -> (u8, Flags) {
    let result = (value >> 1) | (value & 0x80);
    (
        result,
        Flags::from_bits_znhc(result == 0, false, false, value & 0x01 != 0),
    )
}

/// SRL: logical shift right, bit 7 cleared.
#[inline]
pub fn srl(value: u8) -> (u8, Flags) {
    let result = value >> 1;
    (
        result,
        Flags::from_bits_znhc(result == 0, false, false, value & 0x01 != 0),
    )
}

#[inline]
pub fn swap(value: u8) -> (u8, Flags) {
    let result = value.rotate_left(4);
    (result, Flags::from_bits_znhc(result == 0, false, false, false))
}

/// BIT n: Z reports whether bit `n` is clear; H set, N cleared, C kept.
#[inline]
pub fn bit_test(value: u8, bit: u8, flags: Flags) -> Flags {
    Flags::from_bits_znhc(
        value & (1 << bit) == 0,
        false,
        true,
        flags.contains(Flags::C),
    )
}

/// Decimal adjust after a BCD addition or subtraction.
///
/// Uses N, H and C from the previous operation; N is kept, H cleared.
pub fn daa(a: u8, flags: Flags) -> (u8, Flags) {
    let subtract = flags.contains(Flags::N);
    let mut adjust: u8 = if flags.contains(Flags::C) { 0x60 } else { 0x00 };
    if flags.contains(Flags::H) {
        adjust |= 0x06;
    }

    let result = if subtract {
        a.wrapping_sub(adjust)
    } else {
        if a & 0x0F > 0x09 {
            adjust |= 0x06;
        }
        if a > 0x99 {
            adjust |= 0x60;
        }
        a.wrapping_add(adjust)
    };

    (
        result,
        Flags::from_bits_znhc(result == 0, subtract, false, adjust >= 0x60),
    )
}
