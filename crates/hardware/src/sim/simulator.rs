//! Top-level simulator: owns the core and the run loop.

use crate::config::Config;
use crate::core::{Core, TickEvents};

/// The simulation driver.
pub struct Simulator {
    /// The machine under simulation.
    pub core: Core,
}

impl Simulator {
    /// Creates a simulator at reset from the configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            core: Core::new(config),
        }
    }

    /// Loads program bytes into the instruction memory.
    pub fn load_program(&mut self, bytes: &[u8]) {
        self.core.load_program(bytes);
    }

    /// Advances the machine by one cycle.
    pub fn tick(&mut self) -> TickEvents {
        self.core.tick()
    }

    /// Runs the configured cycle budget to completion.
    ///
    /// Past the end of the program the instruction memory reads as NOPs,
    /// which keep flowing through the machine; the budget bounds the run.
    pub fn run(&mut self, max_cycles: u64) {
        for _ in 0..max_cycles {
            self.core.tick();
        }
    }

    /// Architectural value of register `x{arch}`.
    pub fn arch_reg(&self, arch: usize) -> u32 {
        self.core.arch_reg(arch)
    }
}
