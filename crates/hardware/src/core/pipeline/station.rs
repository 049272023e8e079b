//! Reservation station: per-unit wait pool with snoop wakeup.
//!
//! Each functional unit owns one station of `RS_DEPTH` unordered slots.
//! Per tick, in this order of effect:
//! 1. **Sweep:** Entries whose tag is no longer live in the ROB are erased.
//! 2. **Snoop:** Every occupied entry compares its pending sources against
//!    the tick's writeback broadcasts and marks matches ready.
//! 3. **Select:** If the unit can accept work, one entry with both sources
//!    ready is chosen.
//! 4. **Vacate:** The issued entry leaves its slot in the same tick.
//! 5. **Insert:** A dispatched entry is written into a free slot, snooped
//!    against the same tick's broadcasts so a wakeup in flight during
//!    dispatch is not lost.
//!
//! Selection policy is per-station: `AnyReady` picks the lowest-index ready
//! slot (stable across ticks); `OldestFirst` issues strictly in insertion
//! order and blocks behind an unready head, which keeps memory operations
//! in program order relative to each other.

use crate::common::TagSet;
use crate::common::constants::RS_DEPTH;
use crate::core::pipeline::packets::{RsEntry, WbPacket};

/// How a station chooses among ready entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssuePolicy {
    /// Any ready entry; lowest slot index wins.
    AnyReady,
    /// Strictly oldest entry first; younger entries wait behind it.
    OldestFirst,
}

/// Per-tick inputs to a reservation station.
pub struct StationInputs<'a> {
    /// One-cycle flush pulse.
    pub flush: bool,
    /// Occupied ROB slots after this tick's ROB update.
    pub live: TagSet,
    /// Entry released by the dispatcher this tick, if routed here.
    pub insert: Option<RsEntry>,
    /// The three writeback channels.
    pub writebacks: &'a [WbPacket; 3],
    /// The functional unit can accept an issue this tick.
    pub consumer_ready: bool,
}

/// One per-unit reservation station.
pub struct ReservationStation {
    policy: IssuePolicy,
    slots: [Option<RsEntry>; RS_DEPTH],
    /// Insertion sequence numbers, meaningful for occupied slots.
    age: [u64; RS_DEPTH],
    next_age: u64,
}

impl ReservationStation {
    /// Creates an empty station with the given issue policy.
    pub fn new(policy: IssuePolicy) -> Self {
        Self {
            policy,
            slots: [None; RS_DEPTH],
            age: [0; RS_DEPTH],
            next_age: 0,
        }
    }

    /// Whether a slot is free (the post-tick view the dispatcher samples).
    pub fn has_space(&self) -> bool {
        self.slots.iter().any(|s| s.is_none())
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether the station holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advances the station by one tick. Returns the issued entry, if any.
    pub fn tick(&mut self, inputs: StationInputs<'_>) -> Option<RsEntry> {
        // 1. Recovery sweep.
        for slot in &mut self.slots {
            if let Some(entry) = slot {
                if !inputs.live.contains(entry.rob_tag) {
                    *slot = None;
                }
            }
        }

        // 2. Snoop the broadcasts.
        for slot in self.slots.iter_mut().flatten() {
            snoop(slot, inputs.writebacks);
        }

        // 3. Select, 4. vacate.
        let mut issued = None;
        if inputs.consumer_ready {
            if let Some(idx) = self.select() {
                issued = self.slots[idx].take();
            }
        }

        // 5. Insert, snooping the incoming entry against this tick's
        // broadcasts.
        if let Some(mut entry) = inputs.insert {
            snoop(&mut entry, inputs.writebacks);
            let free = self
                .slots
                .iter()
                .position(|s| s.is_none())
                .expect("station insert without a free slot");
            self.slots[free] = Some(entry);
            self.age[free] = self.next_age;
            self.next_age += 1;
        }

        issued
    }

    /// Chooses the slot to issue under the station's policy.
    fn select(&self) -> Option<usize> {
        match self.policy {
            IssuePolicy::AnyReady => self
                .slots
                .iter()
                .position(|s| s.is_some_and(|e| e.operands_ready())),
            IssuePolicy::OldestFirst => {
                let oldest = (0..RS_DEPTH)
                    .filter(|&i| self.slots[i].is_some())
                    .min_by_key(|&i| self.age[i])?;
                if self.slots[oldest].unwrap().operands_ready() {
                    Some(oldest)
                } else {
                    None
                }
            }
        }
    }
}

/// Marks an entry's pending sources ready where a broadcast matches.
fn snoop(entry: &mut RsEntry, writebacks: &[WbPacket; 3]) {
    for wb in writebacks {
        if !(wb.valid && wb.rd_used) {
            continue;
        }
        if entry.rs1_used && entry.prs1 == wb.prd {
            entry.prs1_ready = true;
        }
        if entry.rs2_used && entry.prs2 == wb.prd {
            entry.prs2_ready = true;
        }
    }
}
