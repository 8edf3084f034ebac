//! Minimal PPU model: the LY scanline counter and background tile rows.

/// CPU cycles per scanline.
pub const CYCLES_PER_LINE: u64 = 456;
/// Scanlines per frame, including the ten VBlank lines.
pub const LINES_PER_FRAME: u8 = 154;
/// First VBlank line.
pub const VBLANK_LINE: u8 = 144;
/// CPU cycles per frame.
pub const CYCLES_PER_FRAME: u64 = CYCLES_PER_LINE * LINES_PER_FRAME as u64;

/// Advances LY from the CPU cycle counter.
///
/// Keeps a watermark of the cycle count at the last line change. Once at
/// least [`CYCLES_PER_LINE`] cycles have passed, LY moves to the next
/// line and the watermark jumps to the current count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PpuStepper {
    last_cycles: u64,
}

impl PpuStepper {
    /// Returns the new LY when a line boundary was crossed.
    pub fn advance(&mut self, cycles: u64, ly: u8) -> Option<u8> {
        if cycles.saturating_sub(self.last_cycles) < CYCLES_PER_LINE {
            return None;
        }
        self.last_cycles = cycles;
        Some(ly.wrapping_add(1) % LINES_PER_FRAME)
    }

    pub fn last_cycles(&self) -> u64 {
        self.last_cycles
    }
}

/// One 8-pixel row of a tile, as the two bit-planes stored in VRAM.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileRow {
    pub lo: u8,
    pub hi: u8,
}

impl TileRow {
    /// Colour indices (0..=3), leftmost pixel first.
    pub fn pixels(&self) -> [u8; 8] {
        std::array::from_fn(|i| {
            let bit = 7 - i;
            (((self.hi >> bit) & 1) << 1) | ((self.lo >> bit) & 1)
        })
    }

    pub fn is_blank(&self) -> bool {
        self.lo == 0 && self.hi == 0
    }
}
