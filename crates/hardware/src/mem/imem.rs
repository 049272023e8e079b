//! Instruction memory: a word-addressed read-only BRAM.
//!
//! One-cycle latency: the address presented this tick yields `{rdata,
//! rvalid}` on the next. Unprogrammed and out-of-range words read as NOPs,
//! so a program simply runs off its end into an instruction stream of
//! no-ops.

use crate::common::constants::NOP_INSTRUCTION;

/// The instruction memory.
pub struct InstructionMemory {
    words: Vec<u32>,
    rdata_q: u32,
    rvalid_q: bool,
}

impl InstructionMemory {
    /// Creates a NOP-filled memory of `depth_words` words.
    pub fn new(depth_words: usize) -> Self {
        Self {
            words: vec![NOP_INSTRUCTION; depth_words],
            rdata_q: 0,
            rvalid_q: false,
        }
    }

    /// Packs program bytes little-endian into words starting at word 0.
    ///
    /// Trailing bytes that do not fill a word are dropped, and bytes beyond
    /// the memory's capacity are ignored.
    pub fn load_bytes(&mut self, bytes: &[u8]) {
        for (i, chunk) in bytes.chunks_exact(4).enumerate() {
            if i >= self.words.len() {
                break;
            }
            self.words[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
    }

    /// Registered read port outputs.
    #[inline]
    pub fn output(&self) -> (bool, u32) {
        (self.rvalid_q, self.rdata_q)
    }

    /// Drives the read port for one tick.
    pub fn tick(&mut self, en: bool, addr: u32) {
        if en {
            let idx = (addr >> 2) as usize;
            self.rdata_q = self.words.get(idx).copied().unwrap_or(NOP_INSTRUCTION);
            self.rvalid_q = true;
        } else {
            self.rvalid_q = false;
        }
    }
}
