//! Load/store unit.
//!
//! Executes memory operations strictly one at a time, in the order its
//! reservation station issues them (oldest first). Stores resolve in a
//! single tick: address and data go to the store buffer, and a completion
//! packet is broadcast next tick — the data memory is only written when the
//! store later drains after commit. Loads first consult the store buffer:
//! a full cover forwards immediately, a partial overlap retries until the
//! blocking store drains, and a miss launches a data-memory read with the
//! memory's two-cycle latency.
//!
//! In-flight work is killed by a flush only when its tag did not survive
//! the recovery; a pre-branch load keeps waiting for its data.

use crate::common::{RobTag, TagSet};
use crate::core::pipeline::packets::{LsSize, RsEntry, WbPacket};
use crate::core::pipeline::store_buffer::{ForwardResult, StoreBuffer};

/// Progress of the operation currently in the unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LsuPhase {
    /// Load checking the store buffer (entered at issue; re-entered every
    /// tick while a partial overlap stalls it).
    CheckForward,
    /// Load waiting on the data memory; counts down the read latency.
    WaitMem(u8),
}

/// The operation in flight.
#[derive(Clone, Copy, Debug)]
struct InFlight {
    rob_tag: RobTag,
    prd: usize,
    rd_used: bool,
    addr: u32,
    size: LsSize,
    unsigned: bool,
    phase: LsuPhase,
}

/// Per-tick outputs of the load/store unit.
#[derive(Clone, Copy, Debug, Default)]
pub struct LsuOutputs {
    /// Data-memory read address to drive this tick.
    pub mem_read: Option<u32>,
    /// A load completed out of the store buffer this tick.
    pub forwarded: bool,
}

/// Per-tick inputs to the load/store unit.
pub struct LsuInputs<'a> {
    /// One-cycle flush pulse.
    pub flush: bool,
    /// Occupied ROB slots after this tick's recovery.
    pub live: TagSet,
    /// Entry issued by the LSU station this tick, with operand values.
    pub issue: Option<(RsEntry, u32, u32)>,
    /// Registered data-memory read response, if one arrived.
    pub dmem_response: Option<u32>,
    /// The store buffer (allocation and forwarding).
    pub store_buffer: &'a mut StoreBuffer,
}

/// Serialised load/store unit.
#[derive(Default)]
pub struct LoadStoreUnit {
    current: Option<InFlight>,
    wb_q: WbPacket,
}

impl LoadStoreUnit {
    /// Creates an idle unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the unit can accept an issue this tick.
    ///
    /// Conservatively requires store-buffer space so an accepted store can
    /// always deposit its data.
    pub fn ready(&self, store_buffer: &StoreBuffer) -> bool {
        self.current.is_none() && !store_buffer.is_full()
    }

    /// The writeback packet registered last tick.
    #[inline]
    pub fn writeback(&self) -> WbPacket {
        self.wb_q
    }

    /// Advances the unit by one tick.
    pub fn tick(&mut self, inputs: LsuInputs<'_>) -> LsuOutputs {
        self.wb_q = WbPacket::default();
        let mut out = LsuOutputs::default();

        if inputs.flush {
            // Kill in-flight work the recovery erased; a surviving
            // pre-branch load continues below (it may be consuming its
            // memory response this very tick).
            if let Some(cur) = &self.current {
                if !inputs.live.contains(cur.rob_tag) {
                    self.current = None;
                }
            }
        } else if let Some((entry, src1, src2)) = inputs.issue {
            debug_assert!(self.current.is_none(), "LSU issue while busy");
            let addr = src1.wrapping_add(entry.imm);
            if entry.is_store {
                // Stores complete here; memory is written at drain time.
                let ok = inputs
                    .store_buffer
                    .allocate(entry.rob_tag, addr, src2, entry.ls_size);
                debug_assert!(ok, "store issued with a full store buffer");
                self.wb_q = WbPacket {
                    valid: true,
                    rob_tag: entry.rob_tag,
                    prd: 0,
                    data: 0,
                    rd_used: false,
                };
                return out;
            }
            self.current = Some(InFlight {
                rob_tag: entry.rob_tag,
                prd: entry.prd,
                rd_used: entry.rd_used,
                addr,
                size: entry.ls_size,
                unsigned: entry.unsigned_load,
                phase: LsuPhase::CheckForward,
            });
        }

        let Some(mut cur) = self.current else {
            return out;
        };

        match cur.phase {
            LsuPhase::CheckForward => match inputs.store_buffer.forward(cur.addr, cur.size) {
                ForwardResult::Hit(raw) => {
                    self.complete(&cur, extend(raw, cur.size, cur.unsigned));
                    self.current = None;
                    out.forwarded = true;
                    return out;
                }
                ForwardResult::Stall => {
                    // Retry once the blocking store drains.
                }
                ForwardResult::Miss => {
                    out.mem_read = Some(cur.addr);
                    cur.phase = LsuPhase::WaitMem(1);
                }
            },
            LsuPhase::WaitMem(n) if n > 0 => {
                cur.phase = LsuPhase::WaitMem(n - 1);
            }
            LsuPhase::WaitMem(_) => {
                let word = inputs
                    .dmem_response
                    .expect("data memory response missed its slot");
                let raw = extract_from_word(word, cur.addr, cur.size);
                self.complete(&cur, extend(raw, cur.size, cur.unsigned));
                self.current = None;
                return out;
            }
        }

        self.current = Some(cur);
        out
    }

    /// Registers the completion packet for broadcast next tick.
    fn complete(&mut self, cur: &InFlight, data: u32) {
        self.wb_q = WbPacket {
            valid: true,
            rob_tag: cur.rob_tag,
            prd: cur.prd,
            data,
            rd_used: cur.rd_used,
        };
    }
}

/// Pulls the addressed bytes out of a memory word, low-aligned.
///
/// Halfword offsets are truncated to an even byte, matching the memory's
/// merge behaviour; word accesses ignore the low address bits.
fn extract_from_word(word: u32, addr: u32, size: LsSize) -> u32 {
    match size {
        LsSize::Byte => (word >> ((addr & 3) * 8)) & 0xFF,
        LsSize::Half => (word >> ((addr & 2) * 8)) & 0xFFFF,
        LsSize::Word => word,
    }
}

/// Sign- or zero-extends a low-aligned loaded value.
fn extend(raw: u32, size: LsSize, unsigned: bool) -> u32 {
    match (size, unsigned) {
        (LsSize::Byte, false) => raw as u8 as i8 as i32 as u32,
        (LsSize::Half, false) => raw as u16 as i16 as i32 as u32,
        _ => raw,
    }
}
