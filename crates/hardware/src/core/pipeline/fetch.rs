//! Fetch: drives the instruction memory, one instruction at a time.
//!
//! A three-state machine: request a word from the instruction memory, hold
//! it until decode consumes it, advance the PC and request again. A flush
//! abandons the held word and redirects to the corrected target.

/// Fetch state machine states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FetchState {
    /// Reset state; transitions straight to `Req`.
    Idle,
    /// Read request outstanding at the instruction memory.
    Req,
    /// Fetched word held for decode.
    Have,
}

/// The fetch unit.
pub struct Fetch {
    state: FetchState,
    pc_q: u32,
    instr_q: u32,
}

impl Fetch {
    /// Creates a fetch unit parked at `start_pc`.
    pub fn new(start_pc: u32) -> Self {
        Self {
            state: FetchState::Idle,
            pc_q: start_pc,
            instr_q: crate::common::constants::NOP_INSTRUCTION,
        }
    }

    /// A fetched instruction is held for decode.
    #[inline]
    pub fn valid(&self) -> bool {
        self.state == FetchState::Have
    }

    /// PC of the held instruction (and the read address while requesting).
    #[inline]
    pub fn pc(&self) -> u32 {
        self.pc_q
    }

    /// The held instruction word.
    #[inline]
    pub fn instr(&self) -> u32 {
        self.instr_q
    }

    /// Whether the instruction memory read port should be enabled.
    #[inline]
    pub fn imem_en(&self) -> bool {
        self.state == FetchState::Req
    }

    /// Advances the state machine by one tick.
    ///
    /// `ready_in` tells fetch that decode consumed the held word this tick;
    /// `imem_rvalid`/`imem_rdata` are the memory's registered outputs.
    pub fn tick(
        &mut self,
        flush: bool,
        flush_pc: u32,
        ready_in: bool,
        imem_rvalid: bool,
        imem_rdata: u32,
    ) {
        if flush {
            self.state = FetchState::Idle;
            self.pc_q = flush_pc;
            return;
        }
        match self.state {
            FetchState::Idle => {
                self.state = FetchState::Req;
            }
            FetchState::Req => {
                if imem_rvalid {
                    self.instr_q = imem_rdata;
                    self.state = FetchState::Have;
                }
            }
            FetchState::Have => {
                if ready_in {
                    self.pc_q = self.pc_q.wrapping_add(4);
                    self.state = FetchState::Req;
                }
            }
        }
    }
}
