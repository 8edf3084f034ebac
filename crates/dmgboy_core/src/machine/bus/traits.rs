use crate::cpu::{Bus, BusError};

use super::GameBoyBus;

impl Bus for GameBoyBus {
    fn read8(&mut self, addr: u16) -> Result<u8, BusError> {
        self.peek(addr)
    }

    fn write8(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        self.write8_mmio(addr, value)
    }

    fn end_instruction(&mut self, total_cycles: u64) {
        self.step_ppu(total_cycles);
    }

    fn pending_interrupts(&mut self) -> u8 {
        self.ie_reg & self.if_reg & 0x1F
    }

    fn acknowledge_interrupt(&mut self, index: u8) {
        self.if_reg &= !(1 << index);
    }
}
