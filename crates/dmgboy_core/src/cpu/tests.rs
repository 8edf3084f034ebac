use std::cell::RefCell;
use std::rc::Rc;

use super::table::{BASE, PREFIXED};
use super::*;
use proptest::prelude::*;

/// Flat 64 KiB of RAM with a software interrupt controller.
struct TestBus {
    memory: Vec<u8>,
    ie: u8,
    iflag: u8,
}

impl Default for TestBus {
    fn default() -> Self {
        Self {
            memory: vec![0; 0x10000],
            ie: 0,
            iflag: 0,
        }
    }
}

impl TestBus {
    fn with_program(origin: u16, program: &[u8]) -> Self {
        let mut bus = Self::default();
        bus.load(origin, program);
        bus
    }

    fn load(&mut self, origin: u16, bytes: &[u8]) {
        let start = origin as usize;
        self.memory[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

impl Bus for TestBus {
    fn read8(&mut self, addr: u16) -> Result<u8, BusError> {
        Ok(self.memory[addr as usize])
    }

    fn write8(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        self.memory[addr as usize] = value;
        Ok(())
    }

    fn pending_interrupts(&mut self) -> u8 {
        self.ie & self.iflag & 0x1F
    }

    fn acknowledge_interrupt(&mut self, index: u8) {
        self.iflag &= !(1 << index);
    }
}

/// A bare program mapped at 0x0000 and nothing else.
struct ProgramBus {
    program: Vec<u8>,
}

impl Bus for ProgramBus {
    fn read8(&mut self, addr: u16) -> Result<u8, BusError> {
        self.program
            .get(addr as usize)
            .copied()
            .ok_or(BusError::Unmapped(addr))
    }

    fn write8(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        match self.program.get_mut(addr as usize) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(BusError::Unmapped(addr)),
        }
    }
}

/// CPU with PC at `pc` and everything else in the post-boot state.
fn cpu_at(pc: u16) -> Cpu {
    let mut cpu = Cpu::new();
    cpu.regs.pc = pc;
    cpu
}

fn step(cpu: &mut Cpu, bus: &mut TestBus) -> u32 {
    cpu.try_step(bus).expect("step failed")
}

#[test]
fn nop_advances_pc() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    assert_eq!(step(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.pc, 0x0001);
    assert_eq!(cpu.cycles(), 4);
    assert_eq!(cpu.instruction_count(), 1);
}

#[test]
fn add_a_b_with_carry() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0x80]); // ADD A,B
    cpu.regs.a = 120;
    cpu.regs.b = 170;

    assert_eq!(step(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.a, 34);
    assert!(cpu.get_flag(Flags::C));
    assert!(!cpu.get_flag(Flags::Z));
    assert!(!cpu.get_flag(Flags::N));
    assert!(cpu.get_flag(Flags::H));
}

#[test]
fn add_a_hl_reads_memory() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0x86]); // ADD A,(HL)
    bus.memory[0x000A] = 0x44;
    cpu.regs.set_hl(0x000A);
    cpu.regs.a = 1;

    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.regs.a, 0x45);
    assert_eq!(cpu.regs.hl(), 0x000A);
}

#[test]
fn ld_16bit_and_basic_ld_indirect_work() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(
        0x0000,
        &[
            0x01, 0x34, 0xC2, // LD BC,0xC234
            0x3E, 0x56, // LD A,0x56
            0x02, // LD (BC),A
            0x0A, // LD A,(BC)
        ],
    );

    assert_eq!(step(&mut cpu, &mut bus), 12);
    assert_eq!(cpu.regs.bc(), 0xC234);
    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.regs.a, 0x56);
    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(bus.memory[0xC234], 0x56);

    cpu.regs.a = 0;
    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.regs.a, 0x56);
    assert_eq!(cpu.regs.pc, 0x0007);
}

#[test]
fn ld_hl_inc_dec_forms_adjust_hl() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(
        0x0000,
        &[
            0x21, 0x00, 0xC0, // LD HL,0xC000
            0x3E, 0x11, // LD A,0x11
            0x22, // LD (HL+),A
            0x32, // LD (HL-),A
            0x2A, // LD A,(HL+)
            0x3A, // LD A,(HL-)
        ],
    );
    let flags_before = cpu.regs.f;

    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(bus.memory[0xC000], 0x11);
    assert_eq!(cpu.regs.hl(), 0xC001);

    step(&mut cpu, &mut bus);
    assert_eq!(bus.memory[0xC001], 0x11);
    assert_eq!(cpu.regs.hl(), 0xC000);

    bus.memory[0xC000] = 0x22;
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x22);
    assert_eq!(cpu.regs.hl(), 0xC001);

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x11);
    assert_eq!(cpu.regs.hl(), 0xC000);

    // Post-increment/decrement never touches the flags.
    assert_eq!(cpu.regs.f, flags_before);
}

#[test]
fn ld_r_r_and_ld_hl_n8() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(
        0x0000,
        &[
            0x06, 0x9A, // LD B,0x9A
            0x48, // LD C,B
            0x21, 0x10, 0xC0, // LD HL,0xC010
            0x36, 0x5B, // LD (HL),0x5B
            0x7E, // LD A,(HL)
        ],
    );

    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(step(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.c, 0x9A);
    step(&mut cpu, &mut bus);
    assert_eq!(step(&mut cpu, &mut bus), 12);
    assert_eq!(bus.memory[0xC010], 0x5B);
    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.regs.a, 0x5B);
}

#[test]
fn ldh_forms_address_the_high_page() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(
        0x0000,
        &[
            0xE0, 0x80, // LDH (0x80),A
            0xF0, 0x81, // LDH A,(0x81)
            0xE2, // LDH (C),A
            0xEA, 0x00, 0xD0, // LD (0xD000),A
            0xFA, 0x01, 0xD0, // LD A,(0xD001)
        ],
    );
    bus.memory[0xFF81] = 0x77;
    bus.memory[0xD001] = 0x99;
    cpu.regs.a = 0x42;
    cpu.regs.c = 0x90;

    assert_eq!(step(&mut cpu, &mut bus), 12);
    assert_eq!(bus.memory[0xFF80], 0x42);
    assert_eq!(step(&mut cpu, &mut bus), 12);
    assert_eq!(cpu.regs.a, 0x77);
    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(bus.memory[0xFF90], 0x77);
    assert_eq!(step(&mut cpu, &mut bus), 16);
    assert_eq!(bus.memory[0xD000], 0x77);
    assert_eq!(step(&mut cpu, &mut bus), 16);
    assert_eq!(cpu.regs.a, 0x99);
}

#[test]
fn inc_dec_8bit_update_flags_and_preserve_c() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0x04, 0x05, 0x05]); // INC B, DEC B, DEC B
    cpu.set_flags(Flags::C);
    cpu.regs.b = 0x0F;

    assert_eq!(step(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.b, 0x10);
    assert_eq!(cpu.flags(), Flags::H | Flags::C);

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.b, 0x0F);
    assert_eq!(cpu.flags(), Flags::N | Flags::H | Flags::C);

    cpu.regs.b = 0x01;
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.b, 0x00);
    assert_eq!(cpu.flags(), Flags::Z | Flags::N | Flags::C);
}

#[test]
fn inc_dec_on_hl_memory() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0x34, 0x35]); // INC (HL), DEC (HL)
    cpu.regs.set_hl(0xC000);
    cpu.set_flags(Flags::empty());
    bus.memory[0xC000] = 0xFF;

    assert_eq!(step(&mut cpu, &mut bus), 12);
    assert_eq!(bus.memory[0xC000], 0x00);
    assert_eq!(cpu.flags(), Flags::Z | Flags::H);

    assert_eq!(step(&mut cpu, &mut bus), 12);
    assert_eq!(bus.memory[0xC000], 0xFF);
    assert_eq!(cpu.flags(), Flags::N | Flags::H);
}

#[test]
fn inc_dec_16bit_touch_no_flags() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0x03, 0x1B, 0x33]); // INC BC, DEC DE, INC SP
    cpu.regs.set_bc(0xFFFF);
    cpu.regs.set_de(0x0000);
    cpu.regs.sp = 0x1234;
    let flags = cpu.flags();

    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.regs.bc(), 0x0000);
    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.regs.de(), 0xFFFF);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.sp, 0x1235);
    assert_eq!(cpu.flags(), flags);
}

#[test]
fn add_hl_rr_leaves_z_alone() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0x09, 0x09]); // ADD HL,BC twice

    cpu.set_flags(Flags::Z | Flags::N);
    cpu.regs.set_hl(0x0FFF);
    cpu.regs.set_bc(0x0001);
    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.regs.hl(), 0x1000);
    assert_eq!(cpu.flags(), Flags::Z | Flags::H);

    // A zero result does not set Z either.
    cpu.set_flags(Flags::empty());
    cpu.regs.set_hl(0xFFFF);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.hl(), 0x0000);
    assert_eq!(cpu.flags(), Flags::H | Flags::C);
}

#[test]
fn add_sp_e8_signed_and_flags() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0xE8, 0x08, 0xE8, 0xFF]);

    cpu.regs.sp = 0xFFF8;
    assert_eq!(step(&mut cpu, &mut bus), 16);
    assert_eq!(cpu.regs.sp, 0x0000);
    assert_eq!(cpu.flags(), Flags::H | Flags::C);

    cpu.regs.sp = 0x0005;
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.sp, 0x0004);
    assert_eq!(cpu.flags(), Flags::H | Flags::C);
}

#[test]
fn ld_hl_sp_plus_e8_and_ld_sp_hl() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0xF8, 0x02, 0xF9]);
    cpu.regs.sp = 0xFFF8;
    cpu.set_flags(Flags::Z | Flags::N);

    assert_eq!(step(&mut cpu, &mut bus), 12);
    assert_eq!(cpu.regs.hl(), 0xFFFA);
    assert_eq!(cpu.regs.sp, 0xFFF8);
    assert_eq!(cpu.flags(), Flags::empty());

    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.regs.sp, 0xFFFA);
}

#[test]
fn ld_a16_sp_stores_both_bytes() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0x08, 0x00, 0xC0]);
    cpu.regs.sp = 0xBEEF;

    assert_eq!(step(&mut cpu, &mut bus), 20);
    assert_eq!(bus.memory[0xC000], 0xEF);
    assert_eq!(bus.memory[0xC001], 0xBE);
    assert_eq!(cpu.regs.pc, 0x0003);
}

#[test]
fn push_and_pop_roundtrip_and_pop_af_masks_low_flags() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0xC5, 0xD1, 0xF1]); // PUSH BC, POP DE, POP AF
    cpu.regs.sp = 0xFFFE;
    cpu.regs.set_bc(0x1234);

    assert_eq!(step(&mut cpu, &mut bus), 16);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(bus.memory[0xFFFD], 0x12);
    assert_eq!(bus.memory[0xFFFC], 0x34);

    assert_eq!(step(&mut cpu, &mut bus), 12);
    assert_eq!(cpu.regs.de(), 0x1234);
    assert_eq!(cpu.regs.sp, 0xFFFE);

    cpu.regs.sp = 0xFFFC;
    bus.memory[0xFFFC] = 0x3F;
    bus.memory[0xFFFD] = 0x12;
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x12);
    assert_eq!(cpu.regs.f, 0x30);
    assert_eq!(cpu.regs.af(), 0x1230);
}

#[test]
fn daa_cpl_scf_ccf_behaviour() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0xC6, 0x15, 0x27, 0x2F, 0x37, 0x3F]);
    cpu.regs.a = 0x27;

    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.regs.a, 0x3C);

    // 27 + 15 = 42 in BCD.
    assert_eq!(step(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.a, 0x42);
    assert_eq!(cpu.flags(), Flags::empty());

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0xBD);
    assert_eq!(cpu.flags(), Flags::N | Flags::H);

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.flags(), Flags::C);

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.flags(), Flags::empty());
}

#[test]
fn daa_after_subtraction() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0xD6, 0x06, 0x27]); // SUB 0x06, DAA
    cpu.regs.a = 0x42;

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x3C);
    assert!(cpu.get_flag(Flags::H));

    // 42 - 06 = 36 in BCD.
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x36);
    assert!(cpu.get_flag(Flags::N));
    assert!(!cpu.get_flag(Flags::C));
}

#[test]
fn rlca_rrca_rla_rra_behaviour() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0x07, 0x0F, 0x17, 0x1F]);
    cpu.regs.a = 0x85;

    assert_eq!(step(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.a, 0x0B);
    assert_eq!(cpu.flags(), Flags::C);

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x85);
    assert_eq!(cpu.flags(), Flags::C);

    // A zero result still leaves Z clear for the accumulator forms.
    cpu.regs.a = 0x80;
    cpu.set_flags(Flags::empty());
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(cpu.flags(), Flags::C);

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x80);
    assert_eq!(cpu.flags(), Flags::empty());
}

#[test]
fn sub_and_sbc_update_flags() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0x90, 0x98]); // SUB B, SBC A,B
    cpu.regs.a = 0x10;
    cpu.regs.b = 0x20;

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0xF0);
    assert_eq!(cpu.flags(), Flags::N | Flags::C);

    cpu.regs.a = 0x21;
    cpu.regs.b = 0x20;
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(cpu.flags(), Flags::Z | Flags::N);
}

#[test]
fn logical_ops_and_cp_flags() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(
        0x0000,
        &[
            0xE6, 0x0F, // AND 0x0F
            0xEE, 0xFF, // XOR 0xFF
            0xF6, 0x00, // OR 0x00
            0xFE, 0xF0, // CP 0xF0
            0xAF, // XOR A
        ],
    );
    cpu.regs.a = 0xF0;

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(cpu.flags(), Flags::Z | Flags::H);

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0xFF);
    assert_eq!(cpu.flags(), Flags::empty());

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0xFF);
    assert_eq!(cpu.flags(), Flags::empty());

    // CP discards the result.
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0xFF);
    assert_eq!(cpu.flags(), Flags::N);

    assert_eq!(step(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(cpu.flags(), Flags::Z);
}

#[test]
fn cb_prefix_routes_through_extended_table() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0xCB, 0x37, 0xCB, 0x00, 0xCB, 0x00]); // SWAP A, RLC B x2
    cpu.regs.a = 0xF0;
    cpu.regs.b = 0x80;

    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.regs.a, 0x0F);
    assert_eq!(cpu.regs.pc, 0x0002);
    assert!(!cpu.prefix);
    let current = cpu.current_instruction().expect("decoded");
    assert!(current.prefixed);
    assert_eq!(current.mnemonic, "SWAP");

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.b, 0x01);
    assert_eq!(cpu.flags(), Flags::C);

    // The prefixed rotates report Z.
    cpu.regs.b = 0x00;
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.flags(), Flags::Z);
}

#[test]
fn prefix_record_executed_directly_runs_the_second_byte() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0x37]); // SWAP A
    cpu.regs.a = 0xA5;

    let cycles = BASE[0xCB]
        .execute(&mut cpu, &mut bus)
        .expect("prefixed instruction");
    assert_eq!(cycles, 8);
    assert_eq!(cpu.regs.a, 0x5A);
    assert_eq!(cpu.regs.pc, 0x0001);
}

#[test]
fn cb_bit_res_set_on_hl() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(
        0x0000,
        &[
            0xCB, 0x7E, // BIT 7,(HL)
            0xCB, 0xFE, // SET 7,(HL)
            0xCB, 0x7E, // BIT 7,(HL)
            0xCB, 0xBE, // RES 7,(HL)
        ],
    );
    cpu.regs.set_hl(0xC000);
    cpu.set_flags(Flags::C);

    assert_eq!(step(&mut cpu, &mut bus), 12);
    assert_eq!(cpu.flags(), Flags::Z | Flags::H | Flags::C);

    assert_eq!(step(&mut cpu, &mut bus), 16);
    assert_eq!(bus.memory[0xC000], 0x80);

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.flags(), Flags::H | Flags::C);

    let flags = cpu.flags();
    assert_eq!(step(&mut cpu, &mut bus), 16);
    assert_eq!(bus.memory[0xC000], 0x00);
    assert_eq!(cpu.flags(), flags);
}

#[test]
fn cb_shifts_on_registers() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(
        0x0000,
        &[
            0xCB, 0x20, // SLA B
            0xCB, 0x29, // SRA C
            0xCB, 0x3A, // SRL D
        ],
    );
    cpu.regs.b = 0x81;
    cpu.regs.c = 0x81;
    cpu.regs.d = 0x01;

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.b, 0x02);
    assert_eq!(cpu.flags(), Flags::C);

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.c, 0xC0);
    assert_eq!(cpu.flags(), Flags::C);

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.d, 0x00);
    assert_eq!(cpu.flags(), Flags::Z | Flags::C);
}

#[test]
fn jp_absolute_and_jp_hl() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0xC3, 0x00, 0x20]);
    bus.load(0x2000, &[0xE9]); // JP HL
    cpu.regs.set_hl(0x3000);

    assert_eq!(step(&mut cpu, &mut bus), 16);
    assert_eq!(cpu.regs.pc, 0x2000);
    assert_eq!(step(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.pc, 0x3000);
}

#[test]
fn jr_relative_forward_and_backward() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0x18, 0x02, 0x00, 0x00, 0x18, 0xFC]);

    assert_eq!(step(&mut cpu, &mut bus), 12);
    assert_eq!(cpu.regs.pc, 0x0004);

    // Displacement is relative to the byte after the operand.
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0002);
}

#[test]
fn conditional_branches_charge_both_paths() {
    // (program, flags that fail the condition, flags that pass it, not-taken, taken)
    let cases: [(&[u8], Flags, Flags, u32, u32); 4] = [
        (&[0x20, 0x10], Flags::Z, Flags::empty(), 8, 12), // JR NZ
        (&[0xCA, 0x00, 0x20], Flags::empty(), Flags::Z, 12, 16), // JP Z
        (&[0xD4, 0x00, 0x20], Flags::C, Flags::empty(), 12, 24), // CALL NC
        (&[0xD8], Flags::empty(), Flags::C, 8, 20), // RET C
    ];

    for (program, fail, pass, not_taken, taken) in cases {
        let mut bus = TestBus::with_program(0x0100, program);
        bus.memory[0xFFFC] = 0x00;
        bus.memory[0xFFFD] = 0x40;

        let mut cpu = cpu_at(0x0100);
        cpu.regs.sp = 0xFFFC;
        cpu.set_flags(fail);
        assert_eq!(step(&mut cpu, &mut bus), not_taken, "{:02X} not taken", program[0]);
        assert_eq!(cpu.regs.pc, 0x0100 + program.len() as u16);
        assert_eq!(cpu.regs.sp, 0xFFFC);

        let mut cpu = cpu_at(0x0100);
        cpu.regs.sp = 0xFFFC;
        cpu.set_flags(pass);
        assert_eq!(step(&mut cpu, &mut bus), taken, "{:02X} taken", program[0]);
        assert_ne!(cpu.regs.pc, 0x0100 + program.len() as u16);
    }
}

#[test]
fn call_and_ret_roundtrip() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0xCD, 0x34, 0x12]);
    bus.load(0x1234, &[0xC9]);
    cpu.regs.sp = 0xFFFE;

    assert_eq!(step(&mut cpu, &mut bus), 24);
    assert_eq!(cpu.regs.pc, 0x1234);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(bus.memory[0xFFFC], 0x03);
    assert_eq!(bus.memory[0xFFFD], 0x00);

    assert_eq!(step(&mut cpu, &mut bus), 16);
    assert_eq!(cpu.regs.pc, 0x0003);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn rst_and_reti_behaviour() {
    let mut cpu = cpu_at(0x0100);
    let mut bus = TestBus::with_program(0x0100, &[0xFF]); // RST 38
    bus.load(0x0038, &[0xD9]); // RETI
    cpu.regs.sp = 0xFFFE;
    cpu.ime = false;

    assert_eq!(step(&mut cpu, &mut bus), 16);
    assert_eq!(cpu.regs.pc, 0x0038);
    assert_eq!(bus.memory[0xFFFC], 0x01);
    assert_eq!(bus.memory[0xFFFD], 0x01);

    assert_eq!(step(&mut cpu, &mut bus), 16);
    assert_eq!(cpu.regs.pc, 0x0101);
    assert!(cpu.ime);
}

#[test]
fn ei_sets_ime_after_next_instruction() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0xFB, 0x00, 0x00]);

    step(&mut cpu, &mut bus);
    assert!(!cpu.ime);
    step(&mut cpu, &mut bus);
    assert!(cpu.ime);
}

#[test]
fn di_cancels_pending_ei() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0xFB, 0xF3, 0x00, 0x00]);

    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert!(!cpu.ime);
}

#[test]
fn interrupt_dispatch_pushes_pc_and_jumps_to_vector() {
    let mut cpu = cpu_at(0x0150);
    let mut bus = TestBus::default();
    cpu.regs.sp = 0xFFFE;
    cpu.ime = true;
    bus.ie = 0x1F;
    bus.iflag = 0b0_0101; // VBlank and Timer

    assert_eq!(step(&mut cpu, &mut bus), 20);
    assert_eq!(cpu.regs.pc, 0x0040);
    assert!(!cpu.ime);
    assert_eq!(bus.iflag, 0b0_0100);
    assert_eq!(bus.memory[0xFFFD], 0x01);
    assert_eq!(bus.memory[0xFFFC], 0x50);
    // Dispatch is not an instruction.
    assert_eq!(cpu.instruction_count(), 0);
}

#[test]
fn interrupts_wait_for_ime() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();
    bus.ie = 0x04;
    bus.iflag = 0x04;
    cpu.ime = false;

    assert_eq!(step(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.pc, 0x0001);
    assert_eq!(bus.iflag, 0x04);
}

#[test]
fn halt_idles_until_an_interrupt_is_pending() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0x76, 0x3C]); // HALT, INC A
    cpu.ime = false;
    cpu.regs.a = 0;

    step(&mut cpu, &mut bus);
    assert!(cpu.halted);
    for _ in 0..3 {
        assert_eq!(step(&mut cpu, &mut bus), 4);
        assert_eq!(cpu.regs.pc, 0x0001);
    }

    // With IME clear the CPU wakes up and carries on without dispatching.
    bus.ie = 0x01;
    bus.iflag = 0x01;
    step(&mut cpu, &mut bus);
    assert!(!cpu.halted);
    assert_eq!(cpu.regs.a, 1);
    assert_eq!(cpu.regs.pc, 0x0002);
}

#[test]
fn illegal_opcodes_fill_the_error_slot() {
    for &opcode in &[0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD] {
        let mut cpu = cpu_at(0x0000);
        let mut bus = TestBus::with_program(0x0000, &[opcode]);

        assert!(!cpu.step(&mut bus));
        assert_eq!(
            cpu.error(),
            Some(CpuError::IllegalOpcode { opcode, pc: 0x0000 })
        );

        // The slot is sticky.
        let pc = cpu.regs.pc;
        assert!(!cpu.step(&mut bus));
        assert_eq!(cpu.regs.pc, pc);
        assert_eq!(
            cpu.run(&mut bus),
            Err(CpuError::IllegalOpcode { opcode, pc: 0x0000 })
        );
    }
}

#[test]
fn tables_have_no_unimplemented_slots() {
    for instr in BASE.iter().chain(PREFIXED.iter()) {
        assert_ne!(
            instr.mnemonic, "???",
            "opcode 0x{:02X} (prefixed: {}) has no executor",
            instr.opcode, instr.prefixed
        );
        assert!(instr.cycles > 0, "{instr:?}");
    }

    let illegal = BASE.iter().filter(|instr| instr.is_illegal()).count();
    assert_eq!(illegal, 11);
}

#[test]
fn table_records_carry_lengths_costs_and_text() {
    assert_eq!(BASE[0x20].cycles, 8);
    assert_eq!(BASE[0x20].cycles_taken, Some(12));
    assert_eq!(BASE[0x20].to_string(), "JR NZ, e8");
    assert_eq!(BASE[0x2A].to_string(), "LD A, (HL+)");
    assert_eq!(BASE[0x08].to_string(), "LD (a16), SP");
    assert_eq!(BASE[0x08].bytes, 3);
    assert_eq!(BASE[0xE0].bytes, 2);
    assert_eq!(BASE[0xC9].cost(true), 16);
    assert_eq!(BASE[0xC0].cost(true), 20);
    assert_eq!(BASE[0xC0].cost(false), 8);
    assert!(!BASE[0xC9].is_conditional());

    assert_eq!(PREFIXED[0x46].to_string(), "BIT 0, (HL)");
    assert_eq!(PREFIXED[0x46].cycles, 12);
    assert_eq!(PREFIXED[0x86].cycles, 16);
    assert_eq!(PREFIXED[0x11].to_string(), "RL C");
    assert!(PREFIXED.iter().all(|instr| instr.bytes == 2));
}

#[test]
fn running_off_mapped_memory_ends_the_program() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = ProgramBus {
        program: vec![0x00, 0x3C, 0x3C],
    };

    assert_eq!(cpu.run(&mut bus), Ok(()));
    assert_eq!(cpu.error(), Some(CpuError::EndOfProgram));
    assert_eq!(cpu.instruction_count(), 3);
    assert_eq!(cpu.regs.a, 0x03);
    assert!(!cpu.step(&mut bus));
}

#[test]
fn bus_error_inside_an_instruction_keeps_earlier_effects() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = ProgramBus {
        program: vec![
            0x3E, 0x42, // LD A,0x42
            0xFA, 0x00, 0x80, // LD A,(0x8000)
        ],
    };

    assert_eq!(
        cpu.run(&mut bus),
        Err(CpuError::Bus(BusError::Unmapped(0x8000)))
    );
    assert_eq!(cpu.regs.a, 0x42);
    assert_eq!(cpu.regs.pc, 0x0005);
    assert_eq!(cpu.instruction_count(), 1);
}

#[test]
fn step_limit_stops_the_loop() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();
    cpu.set_limit(Some(10));

    assert_eq!(cpu.run(&mut bus), Err(CpuError::StepLimit(10)));
    assert_eq!(cpu.instruction_count(), 10);
    assert_eq!(cpu.cycles(), 40);
}

#[test]
fn step_limit_counts_halt_idle_steps() {
    // DI; HALT with nothing pending never wakes up.
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::with_program(0xC000, &[0xF3, 0x76]);
    cpu.set_limit(Some(10));

    assert_eq!(cpu.run(&mut bus), Err(CpuError::StepLimit(10)));
    assert!(cpu.halted);
    assert_eq!(cpu.instruction_count(), 2);
    assert_eq!(cpu.cycles(), 4 + 4 + 8 * 4);
}

#[test]
fn hook_fires_after_each_instruction() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = ProgramBus {
        program: vec![0x00, 0x04, 0xCB, 0x37],
    };
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    cpu.register_hook(move |cpu: &Cpu, pc: u16, instr: &Instruction| {
        sink.borrow_mut()
            .push((pc, instr.mnemonic, cpu.regs.pc, cpu.cycles()));
    });

    cpu.run(&mut bus).expect("runs to the end");

    assert_eq!(
        *seen.borrow(),
        vec![
            (0x0000, "NOP", 0x0001, 4),
            (0x0001, "INC", 0x0002, 8),
            (0x0002, "SWAP", 0x0004, 16),
        ]
    );

    cpu.clear_hook();
    cpu.reset();
    cpu.regs.pc = 0x0000;
    cpu.run(&mut bus).expect("runs to the end");
    assert_eq!(seen.borrow().len(), 3);
}

#[test]
fn reset_clears_the_error_slot_but_keeps_the_limit() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0xD3]);
    cpu.set_limit(Some(5));

    assert!(!cpu.step(&mut bus));
    cpu.reset();
    assert_eq!(cpu.error(), None);
    assert_eq!(cpu.regs.pc, 0x0100);
    assert_eq!(cpu.regs.af(), 0x01B0);
    assert_eq!(cpu.limit(), Some(5));
    assert_eq!(cpu.cycles(), 0);
}

#[test]
fn power_on_state_starts_at_zero() {
    let cpu = Cpu::power_on();
    assert_eq!(cpu.regs, Registers::default());
    assert_eq!(cpu.regs.pc, 0x0000);

    let cpu = Cpu::new();
    assert_eq!(cpu.regs.af(), 0x01B0);
    assert_eq!(cpu.regs.bc(), 0x0013);
    assert_eq!(cpu.regs.de(), 0x00D8);
    assert_eq!(cpu.regs.hl(), 0x014D);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert_eq!(cpu.regs.pc, 0x0100);
}

#[test]
fn dump_lists_registers_and_last_instruction() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::with_program(0x0000, &[0x3E, 0x5A]);
    step(&mut cpu, &mut bus);

    let mut out = Vec::new();
    cpu.dump(&mut out).expect("write to Vec");
    let text = String::from_utf8(out).expect("utf8");

    assert!(text.contains("A:  5A"), "{text}");
    assert!(text.contains("PC: 0002"), "{text}");
    assert!(text.contains("last: LD A, n8"), "{text}");
}

#[test]
fn disassemble_resolves_immediates() {
    let mut bus = TestBus::with_program(
        0x0000,
        &[
            0x21, 0x10, 0x80, // LD HL,0x8010
            0xCB, 0x7C, // BIT 7,H
            0x20, 0xFB, // JR NZ,-5
            0xE0, 0x50, // LDH (0x50),A
        ],
    );

    let mut addr = 0x0000;
    let mut lines = Vec::new();
    for _ in 0..4 {
        let d = disassemble(&mut bus, addr).expect("mapped");
        lines.push(d.instruction.render(d.immediate()));
        addr = d.next_addr();
    }

    assert_eq!(
        lines,
        vec!["LD HL, $8010", "BIT 7, H", "JR NZ, -5", "LDH ($FF50), A"]
    );
    assert_eq!(addr, 0x0009);
}

proptest! {
    #[test]
    fn f_low_nibble_stays_zero_for_every_opcode(
        opcode in any::<u8>(),
        prefixed in any::<bool>(),
        operands in any::<[u8; 2]>(),
        af in any::<u16>(),
        bc in any::<u16>(),
        de in any::<u16>(),
        hl in any::<u16>(),
    ) {
        let mut cpu = cpu_at(0xC000);
        let mut bus = TestBus::default();
        if prefixed {
            bus.load(0xC000, &[0xCB, opcode]);
        } else {
            bus.load(0xC000, &[opcode, operands[0], operands[1]]);
        }
        cpu.regs.set_af(af);
        cpu.regs.set_bc(bc);
        cpu.regs.set_de(de);
        cpu.regs.set_hl(hl);

        let before = cpu.cycles();
        let result = cpu.try_step(&mut bus);

        prop_assert_eq!(cpu.regs.f & 0x0F, 0);
        prop_assert!(cpu.cycles() >= before);
        if let Ok(cycles) = result {
            let instr = cpu.current_instruction().expect("decoded");
            prop_assert_eq!(cpu.cycles() - before, cycles as u64);
            prop_assert!(cycles == instr.cycles || Some(cycles) == instr.cycles_taken);
        }
    }
}
