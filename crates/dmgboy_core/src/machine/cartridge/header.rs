use super::{CartridgeError, MIN_ROM_SIZE};

const TITLE: std::ops::RangeInclusive<usize> = 0x0134..=0x0142;
const CARTRIDGE_TYPE: usize = 0x0147;
const ROM_SIZE: usize = 0x0148;
const RAM_SIZE: usize = 0x0149;
const HEADER_CHECKSUM: usize = 0x014D;

/// Memory bank controller family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MbcKind {
    /// No mapper: 32 KiB ROM, optionally 8 KiB RAM.
    Mbc0,
    Mbc1,
    Mbc3,
    Mbc5,
}

impl MbcKind {
    /// Map the raw type byte at `0x0147` into a supported family.
    pub fn from_code(code: u8) -> Result<Self, CartridgeError> {
        match code {
            0x00 | 0x08 | 0x09 => Ok(MbcKind::Mbc0),
            0x01..=0x03 => Ok(MbcKind::Mbc1),
            0x0F..=0x13 => Ok(MbcKind::Mbc3),
            0x19..=0x1E => Ok(MbcKind::Mbc5),
            other => Err(CartridgeError::UnsupportedType(other)),
        }
    }
}

/// Decoded cartridge header (`0x0100–0x014F`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartridgeHeader {
    title: String,
    cartridge_type: u8,
    mbc: MbcKind,
    rom_size: usize,
    ram_size: usize,
    header_checksum: u8,
    computed_checksum: u8,
}

impl CartridgeHeader {
    pub fn parse(rom: &[u8]) -> Result<Self, CartridgeError> {
        if rom.len() < MIN_ROM_SIZE {
            return Err(CartridgeError::TooSmall(rom.len()));
        }

        let cartridge_type = rom[CARTRIDGE_TYPE];
        let mbc = MbcKind::from_code(cartridge_type)?;

        let rom_code = rom[ROM_SIZE];
        if rom_code > 0x08 {
            return Err(CartridgeError::InvalidRomSize(rom_code));
        }

        let ram_size = match rom[RAM_SIZE] {
            0x00 => 0,
            0x02 => 8 * 1024,
            0x03 => 32 * 1024,
            0x04 => 128 * 1024,
            0x05 => 64 * 1024,
            // 0x01 is listed as "unused" in the header documentation.
            other => return Err(CartridgeError::InvalidRamSize(other)),
        };

        Ok(Self {
            title: parse_title(&rom[TITLE]),
            cartridge_type,
            mbc,
            rom_size: (32 * 1024) << rom_code,
            ram_size,
            header_checksum: rom[HEADER_CHECKSUM],
            computed_checksum: compute_header_checksum(rom),
        })
    }

    /// Title with trailing NULs removed.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Raw type byte at `0x0147`.
    pub fn cartridge_type(&self) -> u8 {
        self.cartridge_type
    }

    pub fn mbc(&self) -> MbcKind {
        self.mbc
    }

    /// `32 KiB << header[0x0148]`.
    pub fn rom_size(&self) -> usize {
        self.rom_size
    }

    pub fn ram_size(&self) -> usize {
        self.ram_size
    }

    pub fn header_checksum(&self) -> u8 {
        self.header_checksum
    }

    pub fn computed_checksum(&self) -> u8 {
        self.computed_checksum
    }

    pub fn checksum_ok(&self) -> bool {
        self.header_checksum == self.computed_checksum
    }
}

/// Title bytes up to the first NUL. Non-ASCII bytes (the CGB flag shares
/// the last title byte on later cartridges) are dropped.
fn parse_title(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take_while(|&&b| b != 0)
        .filter(|b| b.is_ascii_graphic() || **b == b' ')
        .map(|&b| b as char)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Header checksum over `0x0134–0x014C` as computed by the boot ROM.
fn compute_header_checksum(rom: &[u8]) -> u8 {
    rom[0x0134..=0x014C]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1))
}
