//! The DMG machine: memory bus, cartridge, PPU stepper and the driver that
//! ties them to the CPU.

mod bus;
mod cartridge;
mod gameboy;
mod ppu;

pub use bus::{GameBoyBus, Region};
pub use cartridge::{
    Cartridge, CartridgeError, CartridgeHeader, MbcKind, MIN_ROM_SIZE, RAM_BANK_SIZE,
    ROM_BANK_SIZE,
};
pub use gameboy::GameBoy;
pub use ppu::{
    PpuStepper, TileRow, CYCLES_PER_FRAME, CYCLES_PER_LINE, LINES_PER_FRAME, VBLANK_LINE,
};

/// Size of the DMG boot ROM overlay.
pub const BOOT_ROM_SIZE: usize = 0x100;
