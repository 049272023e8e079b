//! Reorder Buffer (ROB) for in-order commit.
//!
//! The ROB is a circular buffer tracking every instruction from dispatch to
//! retirement. Per tick it performs, in order:
//! 1. **Recovery:** Restore `tail` from the checkpoint of the recovering
//!    branch and erase every entry strictly younger than it.
//! 2. **Writeback absorption:** Mark entries done as results broadcast on
//!    the three writeback channels.
//! 3. **Allocation:** Insert the packet the dispatcher released, at the slot
//!    named by its tag.
//! 4. **Commit:** Retire the head entry once it is done, releasing the
//!    superseded physical destination.
//!
//! Tags equal slot indices; the checkpoint for a branch records the `tail`
//! value immediately after the branch's own insertion, so a recovery keeps
//! the branch in flight and erases only strictly younger entries.

use crate::common::constants::ROB_DEPTH;
use crate::common::{RobTag, TagSet};
use crate::core::pipeline::packets::{RenamePacket, WbPacket};

/// A single reorder buffer entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct RobEntry {
    /// Slot occupied.
    pub valid: bool,
    /// Result has been written back.
    pub done: bool,
    /// Tag of this entry (equals the slot index).
    pub tag: RobTag,
    /// Whether the instruction writes a physical destination.
    pub rd_used: bool,
    /// Physical register superseded at rename, freed at commit.
    pub old_prd: usize,
    /// Instruction classification, used at commit for the store buffer
    /// hand-off and the statistics mix.
    pub is_store: bool,
    /// Memory load.
    pub is_load: bool,
    /// Branch or jump.
    pub is_ctrl: bool,
    /// Program counter, carried for tracing.
    pub pc: u32,
}

/// What the ROB retired this tick.
#[derive(Clone, Copy, Debug)]
pub struct Committed {
    /// Tag of the retired entry.
    pub tag: RobTag,
    /// Program counter of the retired instruction.
    pub pc: u32,
    /// Whether a physical destination was written.
    pub rd_used: bool,
    /// Physical register to release back to the free list.
    pub old_prd: usize,
    /// Retired instruction was a store.
    pub is_store: bool,
    /// Retired instruction was a load.
    pub is_load: bool,
    /// Retired instruction was a branch or jump.
    pub is_ctrl: bool,
}

/// Per-tick inputs to the ROB.
pub struct RobInputs<'a> {
    /// One-cycle flush pulse (coincident with `recover`).
    pub flush: bool,
    /// Restore from the checkpoint indexed by `recover_tag`.
    pub recover: bool,
    /// Tag of the mispredicting branch.
    pub recover_tag: RobTag,
    /// Packet released by the dispatcher this tick, if any.
    pub alloc: Option<&'a RenamePacket>,
    /// The three writeback channels.
    pub writebacks: &'a [WbPacket; 3],
}

/// Reorder buffer.
pub struct Rob {
    entries: [RobEntry; ROB_DEPTH],
    head: usize,
    tail: usize,
    count: usize,
    /// Per-tag checkpoint of `tail` as of the tick the branch was inserted.
    ckpt_tail: [u8; ROB_DEPTH],
}

impl Default for Rob {
    fn default() -> Self {
        Self::new()
    }
}

impl Rob {
    /// Creates an empty ROB.
    pub fn new() -> Self {
        Self {
            entries: [RobEntry::default(); ROB_DEPTH],
            head: 0,
            tail: 0,
            count: 0,
            ckpt_tail: [0; ROB_DEPTH],
        }
    }

    /// Number of occupied entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the ROB is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether an allocation can be accepted next tick.
    #[inline]
    pub fn has_space(&self) -> bool {
        self.count < ROB_DEPTH
    }

    /// Bit-set of occupied slots; drives the reservation-station sweep.
    pub fn live_tags(&self) -> TagSet {
        let mut live = TagSet::empty();
        for entry in &self.entries {
            if entry.valid {
                live.insert(entry.tag);
            }
        }
        live
    }

    /// Read access to one entry, for invariant checks.
    pub fn entry(&self, tag: RobTag) -> &RobEntry {
        &self.entries[tag.index()]
    }

    /// Advances the ROB by one tick. Returns the entry retired this tick,
    /// if any.
    pub fn tick(&mut self, inputs: RobInputs<'_>) -> Option<Committed> {
        if inputs.recover {
            self.recover_to(inputs.recover_tag);
        }

        // Writeback absorption. During a flush, a broadcast for an erased
        // tag is dropped; outside one it is a model bug.
        for wb in inputs.writebacks {
            if !wb.valid {
                continue;
            }
            let entry = &mut self.entries[wb.rob_tag.index()];
            if entry.valid {
                entry.done = true;
            } else {
                debug_assert!(
                    inputs.flush,
                    "writeback for non-live tag {} outside a flush",
                    wb.rob_tag
                );
            }
        }

        // Allocation. The dispatcher only releases when space was
        // available, and the granted tag tracks the tail cursor.
        if let Some(pkt) = inputs.alloc {
            debug_assert!(self.count < ROB_DEPTH, "ROB insert while full");
            debug_assert_eq!(
                self.tail,
                pkt.rob_tag.index(),
                "granted tag diverged from ROB tail"
            );
            let slot = pkt.rob_tag.index();
            self.entries[slot] = RobEntry {
                valid: true,
                done: false,
                tag: pkt.rob_tag,
                rd_used: pkt.rd_used,
                old_prd: pkt.old_prd,
                is_store: pkt.is_store,
                is_load: pkt.is_load,
                is_ctrl: pkt.is_branch || pkt.is_jump,
                pc: pkt.pc,
            };
            self.tail = (slot + 1) % ROB_DEPTH;
            self.count += 1;

            // The branch's checkpoint reflects state with the branch itself
            // as the youngest in-flight instruction.
            if pkt.is_branch || pkt.is_jump {
                self.ckpt_tail[slot] = self.tail as u8;
            }
        }

        // Commit: only the head, and only once done.
        let head_entry = self.entries[self.head];
        if head_entry.valid && head_entry.done {
            self.entries[self.head].valid = false;
            self.head = (self.head + 1) % ROB_DEPTH;
            self.count -= 1;
            return Some(Committed {
                tag: head_entry.tag,
                pc: head_entry.pc,
                rd_used: head_entry.rd_used,
                old_prd: head_entry.old_prd,
                is_store: head_entry.is_store,
                is_load: head_entry.is_load,
                is_ctrl: head_entry.is_ctrl,
            });
        }

        None
    }

    /// Restores `tail` from the branch's checkpoint and erases every entry
    /// strictly between the restored and the old tail.
    ///
    /// The count is decremented by the number of entries erased rather than
    /// restored from the snapshot: commits that retired while the branch
    /// was in flight have already moved `head`, and re-playing a stale
    /// count would resurrect them.
    fn recover_to(&mut self, tag: RobTag) {
        let new_tail = self.ckpt_tail[tag.index()] as usize;
        let mut idx = new_tail;
        while idx != self.tail {
            if self.entries[idx].valid {
                self.entries[idx].valid = false;
                self.count -= 1;
            }
            idx = (idx + 1) % ROB_DEPTH;
        }
        self.tail = new_tail;
    }
}
