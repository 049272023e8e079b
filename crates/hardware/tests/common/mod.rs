//! Shared test infrastructure: instruction builder and run harness.
#![allow(dead_code)]

/// Instruction encoding builder.
pub mod asm;

use o3sim_core::{Config, Simulator};

/// Harness owning one simulator instance.
pub struct TestContext {
    /// The simulator under test.
    pub sim: Simulator,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Creates a simulator with the default configuration.
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            sim: Simulator::new(&Config::default()),
        }
    }

    /// Creates a simulator with the given instruction words loaded at
    /// address 0.
    pub fn with_program(words: &[u32]) -> Self {
        let mut ctx = Self::new();
        ctx.load_words(words);
        ctx
    }

    /// Loads instruction words at address 0.
    pub fn load_words(&mut self, words: &[u32]) {
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        self.sim.load_program(&bytes);
    }

    /// Runs for a fixed number of cycles.
    pub fn run(&mut self, cycles: u64) {
        self.sim.run(cycles);
    }

    /// Architectural register value.
    pub fn reg(&self, arch: usize) -> u32 {
        self.sim.arch_reg(arch)
    }
}
