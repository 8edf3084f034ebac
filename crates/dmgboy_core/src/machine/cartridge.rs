//! Cartridges: header parsing and the memory bank controllers.

use thiserror::Error;

mod header;
mod mbc0;
mod mbc1;
mod mbc3;
mod mbc5;

pub use header::{CartridgeHeader, MbcKind};
use mbc0::Mbc0Cartridge;
use mbc1::Mbc1Cartridge;
use mbc3::Mbc3Cartridge;
use mbc5::Mbc5Cartridge;

/// Size of one switchable ROM bank.
pub const ROM_BANK_SIZE: usize = 0x4000;
/// Size of one external RAM bank.
pub const RAM_BANK_SIZE: usize = 0x2000;
/// Smallest valid cartridge image (two ROM banks).
pub const MIN_ROM_SIZE: usize = 2 * ROM_BANK_SIZE;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("ROM image is {0} bytes, smaller than the 32 KiB minimum")]
    TooSmall(usize),
    #[error("unsupported cartridge type 0x{0:02X}")]
    UnsupportedType(u8),
    #[error("invalid ROM size code 0x{0:02X}")]
    InvalidRomSize(u8),
    #[error("invalid RAM size code 0x{0:02X}")]
    InvalidRamSize(u8),
}

/// Mapper hardware on the cartridge.
enum Mapper {
    Mbc0(Mbc0Cartridge),
    Mbc1(Mbc1Cartridge),
    Mbc3(Mbc3Cartridge),
    Mbc5(Mbc5Cartridge),
}

/// A loaded cartridge: parsed header plus mapper state owning the ROM and
/// RAM buffers.
pub struct Cartridge {
    header: CartridgeHeader,
    mapper: Mapper,
}

impl std::fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cartridge")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

impl Cartridge {
    /// Parse the header of `rom` and build the matching mapper.
    pub fn from_rom(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        let header = CartridgeHeader::parse(&rom)?;

        if rom.len() != header.rom_size() {
            log::warn!(
                "cartridge {:?}: file is {} bytes but the header declares {}",
                header.title(),
                rom.len(),
                header.rom_size()
            );
        }
        if !header.checksum_ok() {
            log::warn!(
                "cartridge {:?}: header checksum 0x{:02X} does not match computed 0x{:02X}",
                header.title(),
                header.header_checksum(),
                header.computed_checksum()
            );
        }

        let ram_size = header.ram_size();
        let mapper = match header.mbc() {
            MbcKind::Mbc0 => Mapper::Mbc0(Mbc0Cartridge::new(rom, ram_size)),
            MbcKind::Mbc1 => Mapper::Mbc1(Mbc1Cartridge::new(rom, ram_size)),
            MbcKind::Mbc3 => Mapper::Mbc3(Mbc3Cartridge::new(rom, ram_size)),
            MbcKind::Mbc5 => Mapper::Mbc5(Mbc5Cartridge::new(rom, ram_size)),
        };

        log::info!(
            "loaded cartridge {:?}: type 0x{:02X} ({:?}), ROM {} KiB, RAM {} KiB",
            header.title(),
            header.cartridge_type(),
            header.mbc(),
            header.rom_size() / 1024,
            ram_size / 1024
        );

        Ok(Self { header, mapper })
    }

    pub fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    pub fn title(&self) -> &str {
        self.header.title()
    }

    pub fn mbc(&self) -> MbcKind {
        self.header.mbc()
    }

    pub fn rom_size(&self) -> usize {
        self.header.rom_size()
    }

    pub fn ram_size(&self) -> usize {
        self.header.ram_size()
    }

    /// Read from `0000–7FFF`.
    pub fn rom_read(&self, addr: u16) -> u8 {
        match &self.mapper {
            Mapper::Mbc0(m) => m.rom_read(addr),
            Mapper::Mbc1(m) => m.rom_read(addr),
            Mapper::Mbc3(m) => m.rom_read(addr),
            Mapper::Mbc5(m) => m.rom_read(addr),
        }
    }

    /// Write to `0000–7FFF`: a mapper control register, never ROM.
    pub fn rom_write(&mut self, addr: u16, value: u8) {
        match &mut self.mapper {
            Mapper::Mbc0(m) => m.rom_write(addr, value),
            Mapper::Mbc1(m) => m.rom_write(addr, value),
            Mapper::Mbc3(m) => m.rom_write(addr, value),
            Mapper::Mbc5(m) => m.rom_write(addr, value),
        }
    }

    /// Read from `A000–BFFF`.
    pub fn ram_read(&self, addr: u16) -> u8 {
        match &self.mapper {
            Mapper::Mbc0(m) => m.ram_read(addr),
            Mapper::Mbc1(m) => m.ram_read(addr),
            Mapper::Mbc3(m) => m.ram_read(addr),
            Mapper::Mbc5(m) => m.ram_read(addr),
        }
    }

    pub fn ram_write(&mut self, addr: u16, value: u8) {
        match &mut self.mapper {
            Mapper::Mbc0(m) => m.ram_write(addr, value),
            Mapper::Mbc1(m) => m.ram_write(addr, value),
            Mapper::Mbc3(m) => m.ram_write(addr, value),
            Mapper::Mbc5(m) => m.ram_write(addr, value),
        }
    }
}

/// Byte at `bank * ROM_BANK_SIZE + (addr & 0x3FFF)`, or 0xFF past the end
/// of a short image.
#[inline]
fn rom_byte(rom: &[u8], bank: usize, addr: u16) -> u8 {
    let index = bank * ROM_BANK_SIZE + (addr & 0x3FFF) as usize;
    rom.get(index).copied().unwrap_or(0xFF)
}

/// Offset of `addr` inside RAM bank `bank`, if that byte exists.
#[inline]
fn ram_index(ram: &[u8], bank: usize, addr: u16) -> Option<usize> {
    let index = bank * RAM_BANK_SIZE + (addr.wrapping_sub(0xA000) as usize & 0x1FFF);
    (index < ram.len()).then_some(index)
}

/// Number of whole banks of `bank_size` in `len` bytes, at least one.
#[inline]
fn bank_count(len: usize, bank_size: usize) -> usize {
    (len / bank_size).max(1)
}
