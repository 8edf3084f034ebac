use anyhow::{bail, Context};

use crate::config::EmulatorConfig;
use crate::cpu::{Cpu, CpuError};

use super::ppu::CYCLES_PER_FRAME;
use super::{Cartridge, GameBoyBus, BOOT_ROM_SIZE};

/// High-level Game Boy machine: the CPU core and the bus it drives.
pub struct GameBoy {
    pub cpu: Cpu,
    pub bus: GameBoyBus,
}

impl GameBoy {
    /// Machine with no cartridge inserted.
    pub fn new(config: EmulatorConfig) -> anyhow::Result<Self> {
        Self::build(None, config)
    }

    /// Parse `rom` as a cartridge image and build a machine around it.
    pub fn from_rom(rom: Vec<u8>, config: EmulatorConfig) -> anyhow::Result<Self> {
        let cartridge = Cartridge::from_rom(rom).context("failed to load cartridge")?;
        Self::build(Some(cartridge), config)
    }

    pub fn with_cartridge(cartridge: Cartridge, config: EmulatorConfig) -> anyhow::Result<Self> {
        Self::build(Some(cartridge), config)
    }

    fn build(cartridge: Option<Cartridge>, config: EmulatorConfig) -> anyhow::Result<Self> {
        let boot_rom = match config.boot_rom {
            Some(image) => {
                let len = image.len();
                let Ok(image) = <Box<[u8; BOOT_ROM_SIZE]>>::try_from(image.into_boxed_slice())
                else {
                    bail!("boot ROM must be exactly {BOOT_ROM_SIZE} bytes, got {len}");
                };
                Some(image)
            }
            None => None,
        };

        let mut cpu = if boot_rom.is_some() {
            Cpu::power_on()
        } else {
            Cpu::new()
        };
        cpu.set_limit(config.step_limit);
        if config.trace {
            cpu.register_hook(Cpu::log_trace_hook());
        }

        Ok(Self {
            cpu,
            bus: GameBoyBus::new(cartridge, boot_rom),
        })
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.bus.cartridge()
    }

    /// Execute one CPU step. See [`Cpu::step`].
    pub fn step(&mut self) -> bool {
        self.cpu.step(&mut self.bus)
    }

    pub fn try_step(&mut self) -> Result<u32, CpuError> {
        self.cpu.try_step(&mut self.bus)
    }

    /// Run until the CPU stops. Running off mapped memory is success.
    pub fn run(&mut self) -> Result<(), CpuError> {
        self.cpu.run(&mut self.bus)
    }

    /// Run the boot ROM until it unmaps itself.
    ///
    /// Returns immediately when no boot ROM is mapped. A boot ROM that
    /// never writes FF50 (for example on a logo mismatch) spins or halts
    /// forever unless a step limit is configured; HALT idle steps count
    /// toward that limit.
    pub fn run_boot(&mut self) -> Result<(), CpuError> {
        while self.bus.boot_rom_active() {
            if !self.step() {
                break;
            }
        }
        match self.cpu.error() {
            None | Some(CpuError::EndOfProgram) => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Run for one frame's worth of cycles. Returns the cycles spent,
    /// which overshoots the frame length by at most one instruction.
    pub fn step_frame(&mut self) -> Result<u64, CpuError> {
        let start = self.cpu.cycles();
        while self.cpu.cycles() - start < CYCLES_PER_FRAME {
            self.try_step()?;
        }
        Ok(self.cpu.cycles() - start)
    }

    /// Read memory without side effects.
    pub fn peek(&self, addr: u16) -> Option<u8> {
        self.bus.peek(addr).ok()
    }
}
