use std::fmt;

use super::{Bus, Cpu, CpuError, Flags, Reg16, Reg8};

/// Branch conditions used by JR/JP/CALL/RET.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cond {
    NZ,
    Z,
    NC,
    C,
}

impl Cond {
    #[inline]
    pub fn holds(self, flags: Flags) -> bool {
        match self {
            Cond::NZ => !flags.contains(Flags::Z),
            Cond::Z => flags.contains(Flags::Z),
            Cond::NC => !flags.contains(Flags::C),
            Cond::C => flags.contains(Flags::C),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Cond::NZ => "NZ",
            Cond::Z => "Z",
            Cond::NC => "NC",
            Cond::C => "C",
        }
    }
}

/// What an operand names before any dereference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Reg8(Reg8),
    Reg16(Reg16),
    Cond(Cond),
    /// Unsigned byte at `[PC++]`.
    N8,
    /// Little-endian word at `[PC]`, `[PC+1]`.
    N16,
    /// Absolute address, encoded like `N16`.
    A16,
    /// Signed byte at `[PC++]`.
    E8,
    /// High-page address `0xFF00 + [PC++]` (LDH).
    A8,
    /// `SP + e8` in `LD HL,SP+e8`.
    SpPlusE8,
    /// Literal bit index for BIT/RES/SET.
    Bit(u8),
    /// Reset vector for RST.
    Vector(u8),
}

/// Post-transfer adjustment of HL for `(HL+)` / `(HL-)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HlStep {
    None,
    Inc,
    Dec,
}

/// One operand of an instruction record.
///
/// `immediate == false` is the parenthesised form: the operand's value is
/// an address and the transfer goes through the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Operand {
    pub kind: OperandKind,
    pub immediate: bool,
    pub step: HlStep,
}

impl Operand {
    pub const fn value(kind: OperandKind) -> Self {
        Self {
            kind,
            immediate: true,
            step: HlStep::None,
        }
    }

    pub const fn deref(kind: OperandKind) -> Self {
        Self {
            kind,
            immediate: false,
            step: HlStep::None,
        }
    }

    pub const fn r8(reg: Reg8) -> Self {
        Self::value(OperandKind::Reg8(reg))
    }

    pub const fn r16(reg: Reg16) -> Self {
        Self::value(OperandKind::Reg16(reg))
    }

    pub const fn cond(cond: Cond) -> Self {
        Self::value(OperandKind::Cond(cond))
    }

    /// `(BC)`, `(DE)`, `(HL)`.
    pub const fn ind(reg: Reg16) -> Self {
        Self::deref(OperandKind::Reg16(reg))
    }

    /// `(HL+)`
    pub const fn hl_inc() -> Self {
        Self {
            kind: OperandKind::Reg16(Reg16::HL),
            immediate: false,
            step: HlStep::Inc,
        }
    }

    /// `(HL-)`
    pub const fn hl_dec() -> Self {
        Self {
            kind: OperandKind::Reg16(Reg16::HL),
            immediate: false,
            step: HlStep::Dec,
        }
    }

    /// Number of immediate bytes this operand consumes from the stream.
    pub const fn immediate_len(&self) -> u8 {
        match self.kind {
            OperandKind::N8 | OperandKind::E8 | OperandKind::A8 | OperandKind::SpPlusE8 => 1,
            OperandKind::N16 | OperandKind::A16 => 2,
            _ => 0,
        }
    }

    /// Render the operand, substituting `imm` for its immediate bytes when
    /// known (used by the disassembler).
    pub(crate) fn render(&self, imm: Option<u16>) -> String {
        let body = match (self.kind, imm) {
            (OperandKind::Reg8(r), _) => r.name().to_string(),
            (OperandKind::Reg16(r), _) => r.name().to_string(),
            (OperandKind::Cond(c), _) => c.name().to_string(),
            (OperandKind::Bit(b), _) => b.to_string(),
            (OperandKind::Vector(v), _) => format!("${v:02X}"),
            (OperandKind::N8, Some(v)) => format!("${v:02X}"),
            (OperandKind::N8, None) => "n8".to_string(),
            (OperandKind::N16, Some(v)) | (OperandKind::A16, Some(v)) => format!("${v:04X}"),
            (OperandKind::N16, None) => "n16".to_string(),
            (OperandKind::A16, None) => "a16".to_string(),
            (OperandKind::E8, Some(v)) => format!("{:+}", v as u8 as i8),
            (OperandKind::E8, None) => "e8".to_string(),
            (OperandKind::A8, Some(v)) => format!("$FF{v:02X}"),
            (OperandKind::A8, None) => "a8".to_string(),
            (OperandKind::SpPlusE8, Some(v)) => format!("SP{:+}", v as u8 as i8),
            (OperandKind::SpPlusE8, None) => "SP+e8".to_string(),
        };
        let step = match self.step {
            HlStep::None => "",
            HlStep::Inc => "+",
            HlStep::Dec => "-",
        };
        if self.immediate {
            format!("{body}{step}")
        } else {
            format!("({body}{step})")
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

impl Cpu {
    /// Address named by a parenthesised operand. Consumes immediate bytes
    /// for `(a16)` and `(a8)`.
    pub(super) fn operand_addr(&mut self, bus: &mut dyn Bus, op: Operand) -> Result<u16, CpuError> {
        debug_assert!(!op.immediate, "operand {op} is not a memory reference");
        match op.kind {
            OperandKind::Reg16(reg) => Ok(self.regs.get16(reg)),
            // `(C)` in LDH (C),A / LDH A,(C).
            OperandKind::Reg8(reg) => Ok(0xFF00 | self.regs.get8(reg) as u16),
            OperandKind::A16 | OperandKind::N16 => self.fetch16(bus),
            OperandKind::A8 => Ok(0xFF00 | self.fetch8(bus)? as u16),
            other => unreachable!("operand kind {other:?} has no address"),
        }
    }

    #[inline]
    fn apply_hl_step(&mut self, op: Operand) {
        match op.step {
            HlStep::None => {}
            HlStep::Inc => self.regs.set_hl(self.regs.hl().wrapping_add(1)),
            HlStep::Dec => self.regs.set_hl(self.regs.hl().wrapping_sub(1)),
        }
    }

    /// Read an 8-bit operand: a register, an immediate byte, or memory.
    pub(super) fn read_operand8(&mut self, bus: &mut dyn Bus, op: Operand) -> Result<u8, CpuError> {
        if op.immediate {
            return match op.kind {
                OperandKind::Reg8(reg) => Ok(self.regs.get8(reg)),
                OperandKind::N8 => self.fetch8(bus),
                other => unreachable!("operand kind {other:?} is not an 8-bit source"),
            };
        }

        let addr = self.operand_addr(bus, op)?;
        let value = bus.read8(addr)?;
        self.apply_hl_step(op);
        Ok(value)
    }

    /// Write an 8-bit operand: a register or memory.
    pub(super) fn write_operand8(
        &mut self,
        bus: &mut dyn Bus,
        op: Operand,
        value: u8,
    ) -> Result<(), CpuError> {
        if op.immediate {
            return match op.kind {
                OperandKind::Reg8(reg) => {
                    self.regs.set8(reg, value);
                    Ok(())
                }
                other => unreachable!("operand kind {other:?} is not an 8-bit destination"),
            };
        }

        let addr = self.operand_addr(bus, op)?;
        bus.write8(addr, value)?;
        self.apply_hl_step(op);
        Ok(())
    }

    /// Read a 16-bit operand: a register/pair or an immediate word.
    pub(super) fn read_operand16(&mut self, bus: &mut dyn Bus, op: Operand) -> Result<u16, CpuError> {
        match op.kind {
            OperandKind::Reg16(reg) if op.immediate => Ok(self.regs.get16(reg)),
            OperandKind::N16 | OperandKind::A16 if op.immediate => self.fetch16(bus),
            OperandKind::SpPlusE8 => {
                let offset = self.fetch_i8(bus)?;
                let (result, flags) = super::arith::add_sp_e8(self.regs.sp, offset);
                self.set_flags(flags);
                Ok(result)
            }
            other => unreachable!("operand kind {other:?} is not a 16-bit source"),
        }
    }

    /// Write a 16-bit operand: a register/pair, or a little-endian store
    /// to `(a16)`.
    pub(super) fn write_operand16(
        &mut self,
        bus: &mut dyn Bus,
        op: Operand,
        value: u16,
    ) -> Result<(), CpuError> {
        if op.immediate {
            return match op.kind {
                OperandKind::Reg16(reg) => {
                    self.regs.set16(reg, value);
                    Ok(())
                }
                other => unreachable!("operand kind {other:?} is not a 16-bit destination"),
            };
        }

        let addr = self.operand_addr(bus, op)?;
        let [lo, hi] = value.to_le_bytes();
        bus.write8(addr, lo)?;
        bus.write8(addr.wrapping_add(1), hi)?;
        Ok(())
    }
}
