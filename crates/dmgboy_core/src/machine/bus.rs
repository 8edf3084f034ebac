use super::cartridge::Cartridge;
use super::ppu::PpuStepper;
use super::BOOT_ROM_SIZE;

mod init;
mod mmio;
mod region;
mod traits;
mod video;

pub use region::Region;

pub(super) const VRAM_SIZE: usize = 0x2000;
pub(super) const WRAM_SIZE: usize = 0x2000;
pub(super) const OAM_SIZE: usize = 0xA0;
pub(super) const IO_SIZE: usize = 0x80;
pub(super) const HRAM_SIZE: usize = 0x7F;

/// The DMG memory map.
///
/// Owns every region except the cartridge's, which it delegates to the
/// inserted [`Cartridge`]. While the boot latch is on, `0000–00FF` reads
/// come from the boot ROM instead.
pub struct GameBoyBus {
    boot_rom: Option<Box<[u8; BOOT_ROM_SIZE]>>,
    /// Boot ROM overlay active. Cleared for good by a write to FF50 with
    /// bit 0 set.
    boot_latch: bool,
    cartridge: Option<Cartridge>,
    vram: Box<[u8; VRAM_SIZE]>,
    wram: Box<[u8; WRAM_SIZE]>,
    oam: [u8; OAM_SIZE],
    /// `FF00–FF7F`; IF is kept separately in `if_reg`.
    io: [u8; IO_SIZE],
    hram: [u8; HRAM_SIZE],
    /// Interrupt request flags, lower five bits only.
    pub(crate) if_reg: u8,
    pub(crate) ie_reg: u8,
    ppu: PpuStepper,
}

impl Default for GameBoyBus {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl GameBoyBus {
    /// Bus with an optional cartridge and boot ROM.
    ///
    /// With a boot ROM the overlay latch starts on and I/O starts cleared;
    /// without one the latch is already off and I/O holds the values the
    /// boot ROM would have left behind.
    pub fn new(cartridge: Option<Cartridge>, boot_rom: Option<Box<[u8; BOOT_ROM_SIZE]>>) -> Self {
        let mut bus = Self {
            boot_latch: boot_rom.is_some(),
            boot_rom,
            cartridge,
            vram: Box::new([0; VRAM_SIZE]),
            wram: Box::new([0; WRAM_SIZE]),
            oam: [0; OAM_SIZE],
            io: [0; IO_SIZE],
            hram: [0; HRAM_SIZE],
            if_reg: 0,
            ie_reg: 0,
            ppu: PpuStepper::default(),
        };
        bus.randomize_internal_ram();
        if !bus.boot_latch {
            bus.apply_dmg_initial_io_state();
        }
        bus
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = Some(cartridge);
    }

    /// Whether `0000–00FF` currently maps the boot ROM.
    pub fn boot_rom_active(&self) -> bool {
        self.boot_latch
    }

    pub fn vram(&self) -> &[u8] {
        &self.vram[..]
    }

    /// Current scanline (`FF44`).
    pub fn ly(&self) -> u8 {
        self.io[region::io::LY]
    }
}
