//! Opcode tables.
//!
//! Both tables are dense 256-entry arrays of [`Instruction`] records built
//! once on first use. The regular blocks (`LD r,r'`, the ALU block and the
//! whole CB page) are filled from the standard x/y/z opcode decomposition;
//! the irregular opcodes are listed one by one.

use std::fmt;

use lazy_static::lazy_static;

use super::operand::{Cond, Operand, OperandKind};
use super::{Bus, Cpu, CpuError, Reg16, Reg8};

/// Executes one decoded instruction and returns its cycle cost.
pub type Executor = fn(&mut Cpu, &mut dyn Bus, &Instruction) -> Result<u32, CpuError>;

/// Opcode byte that routes the following byte through [`PREFIXED`].
pub const PREFIX_OPCODE: u8 = 0xCB;

/// One entry of the opcode catalogue.
#[derive(Clone, Copy)]
pub struct Instruction {
    pub opcode: u8,
    /// Whether this record lives in the `CB`-prefixed table.
    pub prefixed: bool,
    pub mnemonic: &'static str,
    pub operands: [Option<Operand>; 2],
    /// Encoded length including the opcode (and prefix) bytes.
    pub bytes: u8,
    /// Cycle cost (T-cycles); for conditional branches, the not-taken cost.
    pub cycles: u32,
    /// Cycle cost when a conditional branch is taken.
    pub cycles_taken: Option<u32>,
    pub(crate) exec: Executor,
}

impl Instruction {
    const UNIMPLEMENTED: Instruction = Instruction {
        opcode: 0,
        prefixed: false,
        mnemonic: "???",
        operands: [None, None],
        bytes: 1,
        cycles: 0,
        cycles_taken: None,
        exec: Cpu::exec_unimplemented,
    };

    /// Cycle cost of this execution.
    #[inline]
    pub fn cost(&self, taken: bool) -> u32 {
        match self.cycles_taken {
            Some(cycles) if taken => cycles,
            _ => self.cycles,
        }
    }

    pub fn is_illegal(&self) -> bool {
        self.mnemonic == "ILLEGAL"
    }

    pub fn is_conditional(&self) -> bool {
        self.cycles_taken.is_some()
    }

    pub fn operands(&self) -> impl Iterator<Item = Operand> + '_ {
        self.operands.iter().flatten().copied()
    }

    /// Branch condition of JR/JP/CALL/RET cc, if any.
    pub fn condition(&self) -> Option<Cond> {
        match self.operands[0] {
            Some(Operand {
                kind: OperandKind::Cond(cond),
                ..
            }) => Some(cond),
            _ => None,
        }
    }

    /// The single operand of a unary record, or the last operand of a
    /// conditional one.
    pub(super) fn target(&self) -> Operand {
        match self.operands {
            [Some(_), Some(op)] | [Some(op), None] => op,
            _ => unreachable!("{self} has no operand"),
        }
    }

    /// `(destination, source)` of a binary record.
    pub(super) fn pair(&self) -> (Operand, Operand) {
        match self.operands {
            [Some(dst), Some(src)] => (dst, src),
            _ => unreachable!("{self} is not a two-operand instruction"),
        }
    }

    /// Execute this record against `cpu` and `bus`.
    #[inline]
    pub fn execute(&self, cpu: &mut Cpu, bus: &mut dyn Bus) -> Result<u32, CpuError> {
        (self.exec)(cpu, bus, self)
    }

    /// Assembler text with the given immediate value substituted.
    pub(crate) fn render(&self, imm: Option<u16>) -> String {
        let mut text = self.mnemonic.to_string();
        for (i, op) in self.operands().enumerate() {
            text.push_str(if i == 0 { " " } else { ", " });
            let value = if op.immediate_len() > 0 { imm } else { None };
            text.push_str(&op.render(value));
        }
        text
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("opcode", &format_args!("0x{:02X}", self.opcode))
            .field("prefixed", &self.prefixed)
            .field("text", &self.to_string())
            .field("bytes", &self.bytes)
            .field("cycles", &self.cycles)
            .field("cycles_taken", &self.cycles_taken)
            .finish()
    }
}

lazy_static! {
    /// Unprefixed opcodes.
    pub static ref BASE: [Instruction; 256] = build_base();
    /// `CB`-prefixed opcodes.
    pub static ref PREFIXED: [Instruction; 256] = build_prefixed();
}

/// Look up the record for `opcode`.
#[inline]
pub fn lookup(opcode: u8, prefixed: bool) -> &'static Instruction {
    if prefixed {
        &PREFIXED[opcode as usize]
    } else {
        &BASE[opcode as usize]
    }
}

/// Register order used by the opcode encoding; index 6 is `(HL)`.
fn r8(index: u8) -> Operand {
    match index & 0x07 {
        0 => Operand::r8(Reg8::B),
        1 => Operand::r8(Reg8::C),
        2 => Operand::r8(Reg8::D),
        3 => Operand::r8(Reg8::E),
        4 => Operand::r8(Reg8::H),
        5 => Operand::r8(Reg8::L),
        6 => Operand::ind(Reg16::HL),
        _ => Operand::r8(Reg8::A),
    }
}

fn rp(index: u8) -> Operand {
    match index & 0x03 {
        0 => Operand::r16(Reg16::BC),
        1 => Operand::r16(Reg16::DE),
        2 => Operand::r16(Reg16::HL),
        _ => Operand::r16(Reg16::SP),
    }
}

/// Register-pair order used by PUSH/POP.
fn rp2(index: u8) -> Operand {
    match index & 0x03 {
        0 => Operand::r16(Reg16::BC),
        1 => Operand::r16(Reg16::DE),
        2 => Operand::r16(Reg16::HL),
        _ => Operand::r16(Reg16::AF),
    }
}

fn cc(index: u8) -> Operand {
    match index & 0x03 {
        0 => Operand::cond(Cond::NZ),
        1 => Operand::cond(Cond::Z),
        2 => Operand::cond(Cond::NC),
        _ => Operand::cond(Cond::C),
    }
}

const A: Operand = Operand::r8(Reg8::A);
const HL: Operand = Operand::r16(Reg16::HL);
const SP: Operand = Operand::r16(Reg16::SP);
const N8: Operand = Operand::value(OperandKind::N8);
const N16: Operand = Operand::value(OperandKind::N16);
const A16: Operand = Operand::value(OperandKind::A16);
const E8: Operand = Operand::value(OperandKind::E8);
const IND_A8: Operand = Operand::deref(OperandKind::A8);
const IND_A16: Operand = Operand::deref(OperandKind::A16);
const IND_C: Operand = Operand::deref(OperandKind::Reg8(Reg8::C));
const IND_HL: Operand = Operand::ind(Reg16::HL);

const ILLEGAL_OPCODES: [u8; 11] = [
    0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD,
];

struct TableBuilder {
    table: [Instruction; 256],
    prefixed: bool,
}

impl TableBuilder {
    fn new(prefixed: bool) -> Self {
        let table = std::array::from_fn(|i| Instruction {
            opcode: i as u8,
            prefixed,
            ..Instruction::UNIMPLEMENTED
        });
        Self { table, prefixed }
    }

    fn insert(
        &mut self,
        opcode: u8,
        mnemonic: &'static str,
        operands: &[Operand],
        cycles: u32,
        cycles_taken: Option<u32>,
        exec: Executor,
    ) {
        let mut slots = [None, None];
        for (slot, op) in slots.iter_mut().zip(operands) {
            *slot = Some(*op);
        }
        let immediates: u8 = operands.iter().map(Operand::immediate_len).sum();
        let prefix_len = if self.prefixed { 1 } else { 0 };

        self.table[opcode as usize] = Instruction {
            opcode,
            prefixed: self.prefixed,
            mnemonic,
            operands: slots,
            bytes: 1 + prefix_len + immediates,
            cycles,
            cycles_taken,
            exec,
        };
    }

    fn op(
        &mut self,
        opcode: u8,
        mnemonic: &'static str,
        operands: &[Operand],
        cycles: u32,
        exec: Executor,
    ) {
        self.insert(opcode, mnemonic, operands, cycles, None, exec);
    }

    /// Conditional branch with separate taken / not-taken costs.
    fn branch(
        &mut self,
        opcode: u8,
        mnemonic: &'static str,
        operands: &[Operand],
        taken: u32,
        not_taken: u32,
        exec: Executor,
    ) {
        self.insert(opcode, mnemonic, operands, not_taken, Some(taken), exec);
    }

    fn finish(self) -> [Instruction; 256] {
        self.table
    }
}

fn build_base() -> [Instruction; 256] {
    let mut t = TableBuilder::new(false);

    // x = 0: miscellaneous loads, 16-bit arithmetic, relative jumps.
    t.op(0x00, "NOP", &[], 4, Cpu::exec_nop);
    t.op(0x08, "LD", &[IND_A16, SP], 20, Cpu::exec_ld16);
    t.op(0x10, "STOP", &[N8], 4, Cpu::exec_stop);
    t.op(0x18, "JR", &[E8], 12, Cpu::exec_jr);
    for y in 4..8u8 {
        t.branch(y << 3, "JR", &[cc(y - 4), E8], 12, 8, Cpu::exec_jr);
    }

    for p in 0..4u8 {
        t.op((p << 4) | 0x01, "LD", &[rp(p), N16], 12, Cpu::exec_ld16);
        t.op((p << 4) | 0x09, "ADD", &[HL, rp(p)], 8, Cpu::exec_add_hl);
        t.op((p << 4) | 0x03, "INC", &[rp(p)], 8, Cpu::exec_inc16);
        t.op((p << 4) | 0x0B, "DEC", &[rp(p)], 8, Cpu::exec_dec16);
    }

    let indirect = [
        Operand::ind(Reg16::BC),
        Operand::ind(Reg16::DE),
        Operand::hl_inc(),
        Operand::hl_dec(),
    ];
    for (p, mem) in indirect.into_iter().enumerate() {
        let p = p as u8;
        t.op((p << 4) | 0x02, "LD", &[mem, A], 8, Cpu::exec_ld);
        t.op((p << 4) | 0x0A, "LD", &[A, mem], 8, Cpu::exec_ld);
    }

    for y in 0..8u8 {
        let cycles = if y == 6 { 12 } else { 4 };
        t.op((y << 3) | 0x04, "INC", &[r8(y)], cycles, Cpu::exec_inc8);
        t.op((y << 3) | 0x05, "DEC", &[r8(y)], cycles, Cpu::exec_dec8);
        let ld_cycles = if y == 6 { 12 } else { 8 };
        t.op((y << 3) | 0x06, "LD", &[r8(y), N8], ld_cycles, Cpu::exec_ld);
    }

    t.op(0x07, "RLCA", &[], 4, Cpu::exec_rlca);
    t.op(0x0F, "RRCA", &[], 4, Cpu::exec_rrca);
    t.op(0x17, "RLA", &[], 4, Cpu::exec_rla);
    t.op(0x1F, "RRA", &[], 4, Cpu::exec_rra);
    t.op(0x27, "DAA", &[], 4, Cpu::exec_daa);
    t.op(0x2F, "CPL", &[], 4, Cpu::exec_cpl);
    t.op(0x37, "SCF", &[], 4, Cpu::exec_scf);
    t.op(0x3F, "CCF", &[], 4, Cpu::exec_ccf);

    // x = 1: LD r, r' (0x76 is HALT).
    for opcode in 0x40..=0x7Fu8 {
        if opcode == 0x76 {
            t.op(opcode, "HALT", &[], 4, Cpu::exec_halt);
            continue;
        }
        let (dst, src) = ((opcode >> 3) & 0x07, opcode & 0x07);
        let cycles = if dst == 6 || src == 6 { 8 } else { 4 };
        t.op(opcode, "LD", &[r8(dst), r8(src)], cycles, Cpu::exec_ld);
    }

    // x = 2: ALU A, r. The same eight operations exist with an n8 source
    // in column 6 of x = 3.
    let alu: [(&'static str, Executor); 8] = [
        ("ADD", Cpu::exec_add),
        ("ADC", Cpu::exec_adc),
        ("SUB", Cpu::exec_sub),
        ("SBC", Cpu::exec_sbc),
        ("AND", Cpu::exec_and),
        ("XOR", Cpu::exec_xor),
        ("OR", Cpu::exec_or),
        ("CP", Cpu::exec_cp),
    ];
    for (y, (mnemonic, exec)) in alu.into_iter().enumerate() {
        let y = y as u8;
        for z in 0..8u8 {
            let cycles = if z == 6 { 8 } else { 4 };
            t.op(0x80 | (y << 3) | z, mnemonic, &[A, r8(z)], cycles, exec);
        }
        t.op(0xC6 | (y << 3), mnemonic, &[A, N8], 8, exec);
    }

    // x = 3: control flow, stack, high-page loads.
    for y in 0..4u8 {
        t.branch(0xC0 | (y << 3), "RET", &[cc(y)], 20, 8, Cpu::exec_ret);
        t.branch(0xC2 | (y << 3), "JP", &[cc(y), A16], 16, 12, Cpu::exec_jp);
        t.branch(0xC4 | (y << 3), "CALL", &[cc(y), A16], 24, 12, Cpu::exec_call);
    }
    for p in 0..4u8 {
        t.op(0xC1 | (p << 4), "POP", &[rp2(p)], 12, Cpu::exec_pop);
        t.op(0xC5 | (p << 4), "PUSH", &[rp2(p)], 16, Cpu::exec_push);
    }
    for y in 0..8u8 {
        let vector = Operand::value(OperandKind::Vector(y << 3));
        t.op(0xC7 | (y << 3), "RST", &[vector], 16, Cpu::exec_rst);
    }

    t.op(0xC3, "JP", &[A16], 16, Cpu::exec_jp);
    t.op(0xC9, "RET", &[], 16, Cpu::exec_ret);
    t.op(PREFIX_OPCODE, "PREFIX", &[], 4, Cpu::exec_prefix);
    t.op(0xCD, "CALL", &[A16], 24, Cpu::exec_call);
    t.op(0xD9, "RETI", &[], 16, Cpu::exec_reti);
    t.op(0xE0, "LDH", &[IND_A8, A], 12, Cpu::exec_ld);
    t.op(0xF0, "LDH", &[A, IND_A8], 12, Cpu::exec_ld);
    t.op(0xE2, "LDH", &[IND_C, A], 8, Cpu::exec_ld);
    t.op(0xF2, "LDH", &[A, IND_C], 8, Cpu::exec_ld);
    t.op(0xE8, "ADD", &[SP, E8], 16, Cpu::exec_add_sp_e8);
    t.op(
        0xF8,
        "LD",
        &[HL, Operand::value(OperandKind::SpPlusE8)],
        12,
        Cpu::exec_ld16,
    );
    t.op(0xE9, "JP", &[HL], 4, Cpu::exec_jp_hl);
    t.op(0xF9, "LD", &[SP, HL], 8, Cpu::exec_ld16);
    t.op(0xEA, "LD", &[IND_A16, A], 16, Cpu::exec_ld);
    t.op(0xFA, "LD", &[A, IND_A16], 16, Cpu::exec_ld);
    t.op(0xF3, "DI", &[], 4, Cpu::exec_di);
    t.op(0xFB, "EI", &[], 4, Cpu::exec_ei);

    for opcode in ILLEGAL_OPCODES {
        t.op(opcode, "ILLEGAL", &[], 4, Cpu::exec_illegal);
    }

    t.finish()
}

fn build_prefixed() -> [Instruction; 256] {
    let mut t = TableBuilder::new(true);

    let rotates: [(&'static str, Executor); 8] = [
        ("RLC", Cpu::exec_rlc),
        ("RRC", Cpu::exec_rrc),
        ("RL", Cpu::exec_rl),
        ("RR", Cpu::exec_rr),
        ("SLA", Cpu::exec_sla),
        ("SRA", Cpu::exec_sra),
        ("SWAP", Cpu::exec_swap),
        ("SRL", Cpu::exec_srl),
    ];

    for opcode in 0..=0xFFu8 {
        let (x, y, z) = (opcode >> 6, (opcode >> 3) & 0x07, opcode & 0x07);
        let target = r8(z);
        let on_memory = target == IND_HL;
        let bit = Operand::value(OperandKind::Bit(y));

        match x {
            0 => {
                let (mnemonic, exec) = rotates[y as usize];
                let cycles = if on_memory { 16 } else { 8 };
                t.op(opcode, mnemonic, &[target], cycles, exec);
            }
            1 => {
                // BIT only reads (HL), hence the shorter cost.
                let cycles = if on_memory { 12 } else { 8 };
                t.op(opcode, "BIT", &[bit, target], cycles, Cpu::exec_bit);
            }
            2 => {
                let cycles = if on_memory { 16 } else { 8 };
                t.op(opcode, "RES", &[bit, target], cycles, Cpu::exec_res);
            }
            _ => {
                let cycles = if on_memory { 16 } else { 8 };
                t.op(opcode, "SET", &[bit, target], cycles, Cpu::exec_set);
            }
        }
    }

    t.finish()
}
