//! ROB tag allocator.
//!
//! Grants reorder buffer tags to rename ahead of the actual ROB insertion,
//! which happens one cycle later at dispatch. A granted tag sits in a
//! one-cycle `reserved` set until the insert fires, so the same tag cannot
//! be handed out twice in the gap. The search scans forward from a rotating
//! `next_tag` cursor, skipping every tag that is live in the ROB or
//! reserved here.
//!
//! The `alloc_ok` gate rename consults is the previous tick's registered
//! value; the tag itself is computed in the same tick as the reservation it
//! creates, which keeps grant and reservation consistent. An unsuccessful
//! request perturbs nothing.

use crate::common::constants::ROB_DEPTH;
use crate::common::{RobTag, TagSet};

/// Per-tick inputs to the tag allocator.
pub struct TagAllocInputs {
    /// One-cycle flush pulse.
    pub flush: bool,
    /// Restore `next_tag` from the checkpoint indexed by `recover_tag`.
    pub recover: bool,
    /// Tag of the mispredicting branch.
    pub recover_tag: RobTag,
    /// Rename fires this tick and takes the granted tag.
    pub alloc_req: bool,
    /// Occupied ROB slots, after this tick's ROB update.
    pub live: TagSet,
    /// The ROB inserted this tag this tick; its reservation is released.
    pub insert_fired: Option<RobTag>,
    /// Capture a checkpoint of the cursor after this tick's grant.
    pub checkpoint_take: bool,
}

/// Rotating-cursor ROB tag allocator with per-branch cursor snapshots.
pub struct TagAllocator {
    next_tag: RobTag,
    reserved: TagSet,
    alloc_ok_q: bool,
    ckpt_next: [RobTag; ROB_DEPTH],
}

impl Default for TagAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl TagAllocator {
    /// Creates an allocator with every tag available.
    pub fn new() -> Self {
        Self {
            next_tag: RobTag(0),
            reserved: TagSet::empty(),
            alloc_ok_q: true,
            ckpt_next: [RobTag(0); ROB_DEPTH],
        }
    }

    /// Registered availability gate for rename (previous tick's view).
    #[inline]
    pub fn alloc_ok(&self) -> bool {
        self.alloc_ok_q
    }

    /// Tags currently parked between grant and ROB insert.
    #[inline]
    pub fn reserved(&self) -> TagSet {
        self.reserved
    }

    /// Advances the allocator by one tick. Returns the tag granted to this
    /// tick's rename when `alloc_req` was honoured.
    pub fn tick(&mut self, inputs: TagAllocInputs) -> Option<RobTag> {
        if inputs.recover {
            self.next_tag = self.ckpt_next[inputs.recover_tag.index()];
            self.reserved.clear();
            self.alloc_ok_q = self.find_free(inputs.live).is_some();
            return None;
        }
        if inputs.flush {
            self.reserved.clear();
            self.alloc_ok_q = self.find_free(inputs.live).is_some();
            return None;
        }

        if let Some(tag) = inputs.insert_fired {
            self.reserved.remove(tag);
        }

        let mut granted = None;
        if inputs.alloc_req {
            if let Some(tag) = self.find_free(inputs.live) {
                self.reserved.insert(tag);
                if inputs.checkpoint_take {
                    self.ckpt_next[tag.index()] = tag.next();
                }
                self.next_tag = tag.next();
                granted = Some(tag);
            }
        }

        self.alloc_ok_q = self.find_free(inputs.live).is_some();
        granted
    }

    /// First tag from `next_tag` onwards that is neither live nor reserved.
    fn find_free(&self, live: TagSet) -> Option<RobTag> {
        let used = live.union(self.reserved);
        for k in 0..ROB_DEPTH {
            let cand = RobTag(((self.next_tag.index() + k) % ROB_DEPTH) as u8);
            if !used.contains(cand) {
                return Some(cand);
            }
        }
        None
    }
}
