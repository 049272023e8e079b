//! Simulator configuration.
//!
//! This module defines the configuration structures used to parameterize a
//! simulation run. It provides:
//! 1. **Defaults:** Baseline values matching the modelled hardware.
//! 2. **Structures:** General run settings and memory sizing.
//!
//! Configuration is deserializable from JSON; the CLI uses
//! `Config::default()` and overrides individual fields from its arguments.
//! The structural core parameters (register counts, window depths) are
//! compile-time constants in `common::constants`, not configuration.

use serde::Deserialize;

/// Default configuration constants for the simulator.
mod defaults {
    /// Default reset program counter.
    pub const START_PC: u32 = 0;

    /// Default simulation budget in clock cycles.
    ///
    /// Past the end of a program the instruction memory yields NOPs, which
    /// keep committing forever; the budget bounds the run.
    pub const MAX_CYCLES: u64 = 20_000;

    /// Instruction memory depth in 32-bit words.
    pub const IMEM_WORDS: usize = 512;

    /// Data memory depth in 32-bit words.
    pub const DMEM_WORDS: usize = 1024;
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use o3sim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.general.max_cycles, 20_000);
/// assert_eq!(config.memory.imem_words, 512);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General run settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Memory sizing.
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Enable per-stage trace output to stderr.
    #[serde(default)]
    pub trace: bool,

    /// Reset program counter.
    #[serde(default = "GeneralConfig::default_start_pc")]
    pub start_pc: u32,

    /// Number of cycles to simulate.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,
}

impl GeneralConfig {
    /// Returns the default reset program counter.
    fn default_start_pc() -> u32 {
        defaults::START_PC
    }

    /// Returns the default cycle budget.
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace: false,
            start_pc: defaults::START_PC,
            max_cycles: defaults::MAX_CYCLES,
        }
    }
}

/// Memory sizing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Instruction memory depth in words.
    #[serde(default = "MemoryConfig::default_imem_words")]
    pub imem_words: usize,

    /// Data memory depth in words.
    #[serde(default = "MemoryConfig::default_dmem_words")]
    pub dmem_words: usize,
}

impl MemoryConfig {
    /// Returns the default instruction memory depth.
    fn default_imem_words() -> usize {
        defaults::IMEM_WORDS
    }

    /// Returns the default data memory depth.
    fn default_dmem_words() -> usize {
        defaults::DMEM_WORDS
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            imem_words: defaults::IMEM_WORDS,
            dmem_words: defaults::DMEM_WORDS,
        }
    }
}
