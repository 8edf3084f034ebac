use super::rom_byte;

/// Cartridge without a mapper (types 0x00, 0x08, 0x09).
///
/// ROM is mapped flat at `0000–7FFF`; the optional RAM is always enabled.
pub(in super::super) struct Mbc0Cartridge {
    rom: Vec<u8>,
    ram: Vec<u8>,
}

impl Mbc0Cartridge {
    pub(super) fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        Self {
            rom,
            ram: vec![0xFF; ram_size.min(0x2000)],
        }
    }

    pub(super) fn rom_read(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, (addr >> 14) as usize, addr)
    }

    pub(super) fn rom_write(&mut self, addr: u16, value: u8) {
        log::trace!("MBC0: ignored write 0x{value:02X} to ROM at 0x{addr:04X}");
    }

    pub(super) fn ram_read(&self, addr: u16) -> u8 {
        let offset = (addr.wrapping_sub(0xA000)) as usize;
        self.ram.get(offset).copied().unwrap_or(0xFF)
    }

    pub(super) fn ram_write(&mut self, addr: u16, value: u8) {
        let offset = (addr.wrapping_sub(0xA000)) as usize;
        if let Some(slot) = self.ram.get_mut(offset) {
            *slot = value;
        }
    }
}
