use super::region::io;
use super::GameBoyBus;

impl GameBoyBus {
    /// I/O registers as the DMG boot ROM leaves them at PC=0x0100.
    pub(super) fn apply_dmg_initial_io_state(&mut self) {
        // Joypad.
        self.io[0x00] = 0xCF;

        // Serial.
        self.io[0x01] = 0x00;
        self.io[0x02] = 0x7E;

        // Divider / timer.
        self.io[0x04] = 0xAB;
        self.io[0x07] = 0xF8;

        // VBlank is already requested when the boot ROM hands over.
        self.if_reg = 0x01;
        self.ie_reg = 0x00;

        // Sound registers keep their post-boot values even without an APU.
        const SOUND: [(usize, u8); 21] = [
            (0x10, 0x80),
            (0x11, 0xBF),
            (0x12, 0xF3),
            (0x13, 0xFF),
            (0x14, 0xBF),
            (0x16, 0x3F),
            (0x17, 0x00),
            (0x18, 0xFF),
            (0x19, 0xBF),
            (0x1A, 0x7F),
            (0x1B, 0xFF),
            (0x1C, 0x9F),
            (0x1D, 0xFF),
            (0x1E, 0xBF),
            (0x20, 0xFF),
            (0x21, 0x00),
            (0x22, 0x00),
            (0x23, 0xBF),
            (0x24, 0x77),
            (0x25, 0xF3),
            (0x26, 0xF1),
        ];
        for (offset, value) in SOUND {
            self.io[offset] = value;
        }

        // PPU registers.
        self.io[io::LCDC] = 0x91;
        self.io[0x41] = 0x85; // STAT
        self.io[io::SCY] = 0x00;
        self.io[io::SCX] = 0x00;
        self.io[io::LY] = 0x00;
        self.io[0x45] = 0x00; // LYC
        self.io[0x46] = 0xFF; // DMA
        self.io[0x47] = 0xFC; // BGP
        self.io[0x4A] = 0x00; // WY
        self.io[0x4B] = 0x00; // WX

        // The boot ROM's last write.
        self.io[io::BOOT] = 0x01;
    }

    /// Fill WRAM and HRAM with pseudo-random bytes.
    ///
    /// These areas hold garbage at power on. A fixed-seed xorshift keeps
    /// runs reproducible without presenting an all-zero pattern.
    pub(super) fn randomize_internal_ram(&mut self) {
        let mut x: u32 = 0xC0DE_1234;
        let mut next_byte = || {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            x as u8
        };

        for byte in self.wram.iter_mut() {
            *byte = next_byte();
        }
        for byte in self.hram.iter_mut() {
            *byte = next_byte();
        }
    }
}
