use super::{bank_count, ram_index, rom_byte, RAM_BANK_SIZE, ROM_BANK_SIZE};

/// MBC3 cartridge state (types 0x0F–0x13).
///
/// ROM and RAM banking only. The RTC registers are not modelled: selecting
/// one reads 0xFF and ignores writes, and the latch window is a no-op.
pub(in super::super) struct Mbc3Cartridge {
    rom: Vec<u8>,
    ram: Vec<u8>,
    num_rom_banks: usize,
    num_ram_banks: usize,
    rom_bank: u8,
    /// RAM bank (0–3) or RTC register select (0x08–0x0C).
    ram_rtc_select: u8,
    ram_enable: bool,
}

impl Mbc3Cartridge {
    pub(super) fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        Self {
            num_rom_banks: bank_count(rom.len(), ROM_BANK_SIZE),
            num_ram_banks: ram_size / RAM_BANK_SIZE,
            rom,
            ram: vec![0xFF; ram_size],
            rom_bank: 1,
            ram_rtc_select: 0,
            ram_enable: false,
        }
    }

    fn effective_rom_bank(&self, addr: u16) -> usize {
        if addr < 0x4000 {
            return 0;
        }
        // A selection past the end of the chip wraps, possibly onto bank 0.
        self.rom_bank as usize & (self.num_rom_banks.next_power_of_two() - 1)
    }

    /// Selected RAM bank, or `None` when an RTC register is selected or
    /// the cart has no RAM.
    fn ram_bank(&self) -> Option<usize> {
        match self.ram_rtc_select {
            bank @ 0x00..=0x03 if self.num_ram_banks > 0 => {
                Some(bank as usize % self.num_ram_banks)
            }
            _ => None,
        }
    }

    pub(super) fn rom_read(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, self.effective_rom_bank(addr), addr)
    }

    pub(super) fn rom_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => {
                // RAM / RTC enable.
                self.ram_enable = (value & 0x0F) == 0x0A;
            }
            0x2000..=0x3FFF => {
                // 7-bit ROM bank number; 0 is remapped to 1.
                self.rom_bank = (value & 0x7F).max(1);
                log::debug!("MBC3: ROM bank 0x{:02X}", self.rom_bank);
            }
            0x4000..=0x5FFF => {
                self.ram_rtc_select = value;
                log::debug!("MBC3: RAM/RTC select 0x{value:02X}");
            }
            // RTC latch.
            _ => {}
        }
    }

    pub(super) fn ram_read(&self, addr: u16) -> u8 {
        if !self.ram_enable {
            return 0xFF;
        }
        self.ram_bank()
            .and_then(|bank| ram_index(&self.ram, bank, addr))
            .map_or(0xFF, |index| self.ram[index])
    }

    pub(super) fn ram_write(&mut self, addr: u16, value: u8) {
        if !self.ram_enable {
            return;
        }
        if let Some(index) = self.ram_bank().and_then(|bank| ram_index(&self.ram, bank, addr)) {
            self.ram[index] = value;
        }
    }
}
