use crate::machine::ppu::{TileRow, VBLANK_LINE};
use super::region::io;
use super::GameBoyBus;

impl GameBoyBus {
    /// Run the LY stepper against the CPU's cycle total.
    pub(super) fn step_ppu(&mut self, total_cycles: u64) {
        let old_ly = self.io[io::LY];
        let Some(new_ly) = self.ppu.advance(total_cycles, old_ly) else {
            return;
        };
        self.io[io::LY] = new_ly;

        if new_ly == VBLANK_LINE {
            self.if_reg |= 0x01;
            log::debug!(
                "VBlank edge (LY {}->{}) at cycle {}, IF=0x{:02X}",
                old_ly,
                new_ly,
                total_cycles,
                self.if_reg
            );
        }
    }

    /// Background tile row under the current scanline.
    ///
    /// `tile_x` is the on-screen tile column (0..32); SCX and SCY are
    /// applied before the map lookup.
    pub fn fetch_background_tile(&self, tile_x: u8) -> TileRow {
        self.background_tile_row(self.ly(), tile_x)
    }

    /// Background tile row for an arbitrary screen line.
    pub fn background_tile_row(&self, line: u8, tile_x: u8) -> TileRow {
        let lcdc = self.io[io::LCDC];
        let scx = self.io[io::SCX];
        let scy = self.io[io::SCY];

        let map_base: usize = if lcdc & 0x08 != 0 { 0x1C00 } else { 0x1800 };
        let bg_y = line.wrapping_add(scy) as usize;
        let column = (tile_x as usize + (scx / 8) as usize) % 32;
        let tile_index = self.vram[map_base + (bg_y / 8) * 32 + column];

        // Offsets are relative to 0x8000.
        let tile_base = if lcdc & 0x10 != 0 {
            tile_index as usize * 16
        } else {
            // 0x9000-based, signed index.
            (0x1000 + (tile_index as i8 as isize) * 16) as usize
        };
        let row = tile_base + (bg_y % 8) * 2;

        TileRow {
            lo: self.vram[row],
            hi: self.vram[row + 1],
        }
    }
}
