//! Address decode for the whole 16-bit map.

/// Offsets of the I/O registers this core interprets, relative to FF00.
pub(super) mod io {
    pub const IF: usize = 0x0F;
    pub const LCDC: usize = 0x40;
    pub const SCY: usize = 0x42;
    pub const SCX: usize = 0x43;
    pub const LY: usize = 0x44;
    pub const BOOT: usize = 0x50;
}

/// A decoded bus address: the owning region and the offset inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    /// `0000–00FF` while the boot latch is on.
    BootRom(usize),
    /// `0000–7FFF`, routed through the mapper (address kept as is).
    CartRom(u16),
    Vram(usize),
    /// `A000–BFFF`, routed through the mapper.
    CartRam(u16),
    Wram(usize),
    /// `E000–FDFF`, folded onto WRAM.
    Echo(usize),
    Oam(usize),
    /// `FEA0–FEFF`: reads 0xFF, writes ignored.
    Unusable,
    Io(usize),
    Hram(usize),
    /// `FFFF`
    InterruptEnable,
}

impl Region {
    pub fn decode(addr: u16, boot_latch: bool) -> Region {
        match addr {
            0x0000..=0x00FF if boot_latch => Region::BootRom(addr as usize),
            0x0000..=0x7FFF => Region::CartRom(addr),
            0x8000..=0x9FFF => Region::Vram((addr - 0x8000) as usize),
            0xA000..=0xBFFF => Region::CartRam(addr),
            0xC000..=0xDFFF => Region::Wram((addr - 0xC000) as usize),
            0xE000..=0xFDFF => Region::Echo((addr - 0xE000) as usize),
            0xFE00..=0xFE9F => Region::Oam((addr - 0xFE00) as usize),
            0xFEA0..=0xFEFF => Region::Unusable,
            0xFF00..=0xFF7F => Region::Io((addr - 0xFF00) as usize),
            0xFF80..=0xFFFE => Region::Hram((addr - 0xFF80) as usize),
            0xFFFF => Region::InterruptEnable,
        }
    }
}
