use super::table::{self, PREFIX_OPCODE};
use super::{Bus, Cpu, CpuError, Instruction};

/// Idle cost of one step while halted.
const HALT_IDLE_CYCLES: u32 = 4;

impl Cpu {
    /// Execute a single step: one instruction, one interrupt dispatch, or
    /// one HALT idle slot.
    ///
    /// Returns whether any work was done. On failure the error is stored
    /// in the error slot (see [`Cpu::error`]) and every later call returns
    /// `false` without touching the bus.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> bool {
        self.try_step(bus).is_ok()
    }

    /// Like [`Cpu::step`] but returns the cycles spent or the error.
    pub fn try_step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.step_inner(bus).map_err(|err| self.fail(err))
    }

    /// Step until the error slot fills. Running off the end of mapped
    /// memory counts as normal completion.
    pub fn run<B: Bus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        while self.step(bus) {}
        match self.error {
            None | Some(CpuError::EndOfProgram) => Ok(()),
            Some(err) => Err(err),
        }
    }

    fn step_inner(&mut self, bus: &mut dyn Bus) -> Result<u32, CpuError> {
        if let Some(limit) = self.limit {
            if self.instructions + self.idle_steps >= limit {
                return Err(CpuError::StepLimit(limit));
            }
        }

        if let Some(cycles) = self.handle_interrupts(bus)? {
            self.finish_step(bus, cycles);
            return Ok(cycles);
        }

        if self.halted {
            self.idle_steps += 1;
            self.finish_step(bus, HALT_IDLE_CYCLES);
            return Ok(HALT_IDLE_CYCLES);
        }

        let pc = self.regs.pc;
        let instr = self.decode(bus)?;
        self.current = Some(instr);

        let cycles = instr.execute(self, bus)?;
        self.instructions += 1;
        self.finish_step(bus, cycles);
        self.apply_ime_delay();
        self.fire_hook(pc, instr);
        Ok(cycles)
    }

    /// Fetch the opcode at PC (and the second byte after a `CB` prefix)
    /// and select its record.
    pub(super) fn decode(&mut self, bus: &mut dyn Bus) -> Result<&'static Instruction, CpuError> {
        let opcode = self.fetch_opcode(bus)?;
        if opcode != PREFIX_OPCODE {
            return Ok(table::lookup(opcode, false));
        }

        self.prefix = true;
        let opcode = self.fetch_opcode(bus)?;
        self.prefix = false;
        Ok(table::lookup(opcode, true))
    }

    #[inline]
    fn finish_step(&mut self, bus: &mut dyn Bus, cycles: u32) {
        self.cycles += cycles as u64;
        bus.end_instruction(self.cycles);
    }

    /// Record `err` in the error slot and report it.
    fn fail(&mut self, err: CpuError) -> CpuError {
        match err {
            CpuError::EndOfProgram => {
                log::info!(
                    "end of program at pc=0x{:04X} after {} instructions",
                    self.regs.pc,
                    self.instructions
                );
            }
            CpuError::StepLimit(limit) => {
                log::info!("step limit of {limit} steps reached");
            }
            _ => {
                let current = self
                    .current
                    .map_or_else(|| "-".to_string(), |instr| instr.to_string());
                log::error!(
                    "CPU halted: {err}; last instruction {current}; {}",
                    self.register_summary()
                );
            }
        }
        self.error = Some(err);
        err
    }
}
