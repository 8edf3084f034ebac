//! Game Boy (DMG) emulator core: SM83 interpreter, memory bus, cartridge
//! mappers and a minimal PPU line stepper.

pub mod config;
pub mod cpu;
pub mod machine;

pub use config::EmulatorConfig;
pub use cpu::{Bus, BusError, Cpu, CpuError};
pub use machine::{Cartridge, CartridgeError, GameBoy, GameBoyBus};

/// Visible screen width in pixels.
pub const SCREEN_WIDTH: usize = 160;
/// Visible screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;
