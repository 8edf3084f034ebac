use super::{Cpu, Registers};

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// CPU in the state the DMG boot ROM leaves behind when it hands
    /// control to cartridge code at 0x0100.
    pub fn new() -> Self {
        let mut cpu = Self::power_on();
        cpu.apply_dmg_boot_state();
        cpu
    }

    /// CPU at power on: all registers zero, execution starts at 0x0000
    /// (the boot ROM overlay).
    pub fn power_on() -> Self {
        Self {
            regs: Registers::default(),
            ime: false,
            halted: false,
            ime_enable_pending: false,
            ime_enable_delay: false,
            prefix: false,
            cycles: 0,
            instructions: 0,
            idle_steps: 0,
            limit: None,
            error: None,
            current: None,
            hook: None,
        }
    }

    /// Reset to the post-boot state. The step limit and any registered
    /// hook are kept; counters and the error slot are cleared.
    pub fn reset(&mut self) {
        self.reset_power_on();
        self.apply_dmg_boot_state();
    }

    /// Reset to the power-on state, keeping the step limit and hook.
    pub fn reset_power_on(&mut self) {
        self.regs = Registers::default();
        self.ime = false;
        self.halted = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
        self.prefix = false;
        self.cycles = 0;
        self.instructions = 0;
        self.idle_steps = 0;
        self.error = None;
        self.current = None;
    }

    /// Initialize registers to match the DMG boot ROM's exit state
    /// (Pan Docs "Power Up Sequence").
    fn apply_dmg_boot_state(&mut self) {
        self.regs.a = 0x01;
        self.regs.f = 0xB0; // Z, H, C set
        self.regs.b = 0x00;
        self.regs.c = 0x13;
        self.regs.d = 0x00;
        self.regs.e = 0xD8;
        self.regs.h = 0x01;
        self.regs.l = 0x4D;
        self.regs.sp = 0xFFFE;
        self.regs.pc = 0x0100;

        // IME is clear at 0x0100; the game enables it with EI/RETI.
        self.ime = false;
    }
}
