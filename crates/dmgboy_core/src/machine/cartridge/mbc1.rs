use super::{bank_count, ram_index, rom_byte, RAM_BANK_SIZE, ROM_BANK_SIZE};

/// Carts at or below both limits cannot use the advanced banking mode.
const SMALL_ROM_LIMIT: usize = 512 * 1024;
const SMALL_RAM_LIMIT: usize = 8 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BankingMode {
    /// `4000–5FFF` selects the RAM bank; `0000–3FFF` is always bank 0.
    Simple,
    /// `4000–5FFF` supplies ROM bank bits 5–6, which also apply to
    /// `0000–3FFF`.
    Advanced,
}

/// MBC1 cartridge state (types 0x01–0x03).
///
/// The 2-bit register at `4000–5FFF` is kept as two separate latches:
/// writes land in `ram_idx` in simple mode and in `rom_hi` in advanced
/// mode. Battery persistence is not modelled.
pub(in super::super) struct Mbc1Cartridge {
    rom: Vec<u8>,
    ram: Vec<u8>,
    num_rom_banks: usize,
    num_ram_banks: usize,
    /// Low five bits of the ROM bank index, never zero.
    rom_lo: u8,
    /// ROM bank bits 5–6.
    rom_hi: u8,
    ram_idx: u8,
    mode: BankingMode,
    ram_enable: bool,
    /// Whether the cart is large enough for the mode register to matter.
    mode_switchable: bool,
}

impl Mbc1Cartridge {
    pub(super) fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        let num_rom_banks = bank_count(rom.len(), ROM_BANK_SIZE);
        let num_ram_banks = ram_size / RAM_BANK_SIZE;
        let mode_switchable = rom.len() > SMALL_ROM_LIMIT || ram_size > SMALL_RAM_LIMIT;

        Self {
            rom,
            ram: vec![0xFF; ram_size],
            num_rom_banks,
            num_ram_banks,
            rom_lo: 1,
            rom_hi: 0,
            ram_idx: 0,
            mode: BankingMode::Simple,
            ram_enable: false,
            mode_switchable,
        }
    }

    /// Reduce `bank` to the banks actually present, as the unused high
    /// bank lines of a smaller ROM chip would.
    #[inline]
    fn mask_rom_bank(&self, bank: usize) -> usize {
        bank & (self.num_rom_banks.next_power_of_two() - 1)
    }

    /// Bank mapped at `addr` (`0000–7FFF`).
    fn effective_rom_bank(&self, addr: u16) -> usize {
        let hi = (self.rom_hi as usize) << 5;
        if addr < 0x4000 {
            return match self.mode {
                BankingMode::Simple => 0,
                BankingMode::Advanced => self.mask_rom_bank(hi),
            };
        }

        let mut bank = hi | self.rom_lo as usize;
        // Indices 0x00/0x20/0x40/0x60 cannot be selected here.
        if bank & 0x1F == 0 {
            bank += 1;
        }
        self.mask_rom_bank(bank)
    }

    fn effective_ram_bank(&self) -> usize {
        if self.ram.len() <= SMALL_RAM_LIMIT {
            0
        } else {
            self.ram_idx as usize % self.num_ram_banks.max(1)
        }
    }

    pub(super) fn rom_read(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, self.effective_rom_bank(addr), addr)
    }

    pub(super) fn rom_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => {
                // RAM enable: lower 4 bits must be 0x0A.
                self.ram_enable = (value & 0x0F) == 0x0A;
            }
            0x2000..=0x3FFF => {
                self.rom_lo = (value & 0x1F).max(1);
                log::debug!(
                    "MBC1: ROM bank low=0x{:02X} -> bank 0x{:02X}",
                    self.rom_lo,
                    self.effective_rom_bank(0x4000)
                );
            }
            0x4000..=0x5FFF => {
                let bits = value & 0x03;
                match self.mode {
                    BankingMode::Simple => self.ram_idx = bits,
                    BankingMode::Advanced => self.rom_hi = bits,
                }
                log::debug!("MBC1: 2-bit register=0x{bits:02X} ({:?} mode)", self.mode);
            }
            0x6000..=0x7FFF => {
                if !self.mode_switchable {
                    return;
                }
                self.mode = if value & 0x01 == 0 {
                    BankingMode::Simple
                } else {
                    BankingMode::Advanced
                };
                log::debug!("MBC1: banking mode {:?}", self.mode);
            }
            _ => {}
        }
    }

    pub(super) fn ram_read(&self, addr: u16) -> u8 {
        if !self.ram_enable {
            return 0xFF;
        }
        match ram_index(&self.ram, self.effective_ram_bank(), addr) {
            Some(index) => self.ram[index],
            None => 0xFF,
        }
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
