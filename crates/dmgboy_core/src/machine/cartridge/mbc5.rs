use super::{bank_count, ram_index, rom_byte, RAM_BANK_SIZE, ROM_BANK_SIZE};

/// MBC5 cartridge state (types 0x19–0x1E).
///
/// MBC5 supports up to 512 ROM banks (9-bit bank number) and up to 16 RAM
/// banks (4-bit bank number). Unlike MBC1/MBC3, bank 0 can be mapped into
/// `4000–7FFF`. Rumble is not modelled.
pub(in super::super) struct Mbc5Cartridge {
    rom: Vec<u8>,
    ram: Vec<u8>,
    num_rom_banks: usize,
    num_ram_banks: usize,
    rom_bank_low8: u8,
    rom_bank_high1: u8,
    ram_bank: u8,
    ram_enable: bool,
}

impl Mbc5Cartridge {
    pub(super) fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        Self {
            num_rom_banks: bank_count(rom.len(), ROM_BANK_SIZE),
            num_ram_banks: ram_size / RAM_BANK_SIZE,
            rom,
            ram: vec![0xFF; ram_size],
            rom_bank_low8: 1,
            rom_bank_high1: 0,
            ram_bank: 0,
            ram_enable: false,
        }
    }

    #[inline]
    fn effective_rom_bank(&self, addr: u16) -> usize {
        if addr < 0x4000 {
            return 0;
        }
        let bank = ((self.rom_bank_high1 as usize) << 8) | self.rom_bank_low8 as usize;
        bank % self.num_rom_banks
    }

    fn effective_ram_bank(&self) -> usize {
        self.ram_bank as usize % self.num_ram_banks.max(1)
    }

    pub(super) fn rom_read(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, self.effective_rom_bank(addr), addr)
    }

    pub(super) fn rom_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => {
                self.ram_enable = (value & 0x0F) == 0x0A;
            }
            0x2000..=0x2FFF => {
                self.rom_bank_low8 = value;
                log::debug!("MBC5: ROM bank 0x{:03X}", self.effective_rom_bank(0x4000));
            }
            0x3000..=0x3FFF => {
                self.rom_bank_high1 = value & 0x01;
                log::debug!("MBC5: ROM bank 0x{:03X}", self.effective_rom_bank(0x4000));
            }
            0x4000..=0x5FFF => {
                // Bit 3 drives the rumble motor on rumble carts.
                self.ram_bank = value & 0x0F;
            }
            _ => {}
        }
    }

    pub(super) fn ram_read(&self, addr: u16) -> u8 {
        if !self.ram_enable {
            return 0xFF;
        }
        ram_index(&self.ram, self.effective_ram_bank(), addr).map_or(0xFF, |index| self.ram[index])
    }

    pub(super) fn ram_write(&mut self, addr: u16, value: u8) {
        if !self.ram_enable {
            return;
        }
        if let Some(index) = ram_index(&self.ram, self.effective_ram_bank(), addr) {
            self.ram[index] = value;
        }
    }
}
