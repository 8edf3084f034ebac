use crate::cpu::BusError;

use super::region::{io, Region};
use super::GameBoyBus;

impl GameBoyBus {
    /// Side-effect-free read.
    pub fn peek(&self, addr: u16) -> Result<u8, BusError> {
        let value = match Region::decode(addr, self.boot_latch) {
            Region::BootRom(offset) => match &self.boot_rom {
                Some(rom) => rom[offset],
                None => return Err(BusError::Unmapped(addr)),
            },
            Region::CartRom(addr) => match &self.cartridge {
                Some(cart) => cart.rom_read(addr),
                None => return Err(BusError::Unmapped(addr)),
            },
            Region::CartRam(addr) => match &self.cartridge {
                Some(cart) => cart.ram_read(addr),
                None => return Err(BusError::Unmapped(addr)),
            },
            Region::Vram(offset) => self.vram[offset],
            // Echo RAM: 0xE000..0xFDFF mirrors 0xC000..0xDDFF.
            Region::Wram(offset) | Region::Echo(offset) => self.wram[offset],
            Region::Oam(offset) => self.oam[offset],
            Region::Unusable => 0xFF,
            Region::Io(io::IF) => self.if_reg | 0b1110_0000,
            Region::Io(offset) => self.io[offset],
            Region::Hram(offset) => self.hram[offset],
            Region::InterruptEnable => self.ie_reg,
        };
        Ok(value)
    }

    pub(super) fn write8_mmio(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        match Region::decode(addr, self.boot_latch) {
            // Writes to the overlay fall through to the cartridge's
            // control registers, as on hardware.
            Region::BootRom(_) | Region::CartRom(_) => match &mut self.cartridge {
                Some(cart) => cart.rom_write(addr, value),
                None => return Err(BusError::Unmapped(addr)),
            },
            Region::CartRam(addr) => match &mut self.cartridge {
                Some(cart) => cart.ram_write(addr, value),
                None => return Err(BusError::Unmapped(addr)),
            },
            Region::Vram(offset) => self.vram[offset] = value,
            Region::Wram(offset) | Region::Echo(offset) => self.wram[offset] = value,
            Region::Oam(offset) => self.oam[offset] = value,
            Region::Unusable => {}
            Region::Io(offset) => self.write_io(offset, value),
            Region::Hram(offset) => self.hram[offset] = value,
            Region::InterruptEnable => self.ie_reg = value,
        }
        Ok(())
    }

    fn write_io(&mut self, offset: usize, value: u8) {
        match offset {
            io::IF => self.if_reg = value & 0x1F,
            // LY is driven by the PPU stepper only.
            io::LY => {}
            io::BOOT => {
                self.io[offset] = value;
                if value & 0x01 != 0 && self.boot_latch {
                    self.boot_latch = false;
                    log::info!("boot ROM overlay disabled");
                }
            }
            _ => self.io[offset] = value,
        }
    }
}
