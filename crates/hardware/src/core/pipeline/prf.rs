//! Physical Register File (PRF) with ready bits and per-branch snapshots.
//!
//! Holds the data words and a valid bit per physical register. A register's
//! valid bit is cleared the tick its destination is allocated at rename and
//! set again by the writeback that targets it; readers in between see the
//! register as not ready. Entry 0 is forced to `{0, valid}` at the end of
//! every tick.
//!
//! Checkpoints copy the full value array and valid bit-map, indexed by the
//! branch's ROB tag. Writebacks are folded into every checkpoint slot as
//! they happen: a result produced by a pre-branch instruction after the
//! snapshot was taken must survive the restore, or its consumers would wake
//! on the snoop and then read a register the restore marked invalid. On the
//! recovery tick the fold runs first, so that tick's broadcasts land in the
//! restored state as well.

use crate::common::RobTag;
use crate::common::constants::{N_PHYS_REGS, ROB_DEPTH};
use crate::core::pipeline::packets::WbPacket;

/// Per-tick inputs to the PRF.
pub struct PrfInputs<'a> {
    /// One-cycle flush pulse.
    pub flush: bool,
    /// Restore from the checkpoint indexed by `recover_tag`.
    pub recover: bool,
    /// Tag of the mispredicting branch.
    pub recover_tag: RobTag,
    /// The three writeback channels.
    pub writebacks: &'a [WbPacket; 3],
    /// Physical destination allocated by rename this tick; its valid bit
    /// is cleared.
    pub alloc_invalidate: Option<usize>,
    /// Capture a checkpoint after this tick's writebacks and invalidation.
    pub checkpoint_take: bool,
    /// Checkpoint slot (the branch's ROB tag).
    pub checkpoint_tag: RobTag,
}

/// The physical register file.
pub struct Prf {
    regs: [u32; N_PHYS_REGS],
    valid: u128,
    ckpt_regs: Vec<[u32; N_PHYS_REGS]>,
    ckpt_valid: [u128; ROB_DEPTH],
}

impl Default for Prf {
    fn default() -> Self {
        Self::new()
    }
}

impl Prf {
    /// Creates a PRF with all registers zero and valid.
    pub fn new() -> Self {
        Self {
            regs: [0; N_PHYS_REGS],
            valid: !0u128,
            ckpt_regs: vec![[0; N_PHYS_REGS]; ROB_DEPTH],
            ckpt_valid: [!0u128; ROB_DEPTH],
        }
    }

    /// Reads a register's data word.
    #[inline]
    pub fn read(&self, preg: usize) -> u32 {
        self.regs[preg]
    }

    /// Whether a register's value is available.
    #[inline]
    pub fn is_valid(&self, preg: usize) -> bool {
        self.valid & (1u128 << preg) != 0
    }

    /// The raw valid bit-map (pre-tick view for rename).
    #[inline]
    pub fn valid_bits(&self) -> u128 {
        self.valid
    }

    /// Advances the PRF by one tick.
    pub fn tick(&mut self, inputs: PrfInputs<'_>) {
        // Fold broadcasts into every checkpoint slot first. For a register
        // allocated after a given snapshot the slot already shows it free
        // and valid, so the extra write is inert there.
        for wb in inputs.writebacks {
            if wb.valid && wb.rd_used && wb.prd != 0 {
                let bit = 1u128 << wb.prd;
                for slot in 0..ROB_DEPTH {
                    self.ckpt_regs[slot][wb.prd] = wb.data;
                    self.ckpt_valid[slot] |= bit;
                }
            }
        }

        if inputs.recover {
            self.regs = self.ckpt_regs[inputs.recover_tag.index()];
            self.valid = self.ckpt_valid[inputs.recover_tag.index()];
            self.force_zero();
            return;
        }

        for wb in inputs.writebacks {
            if wb.valid && wb.rd_used && wb.prd != 0 {
                self.regs[wb.prd] = wb.data;
                self.valid |= 1u128 << wb.prd;
            }
        }

        if !inputs.flush {
            if let Some(prd) = inputs.alloc_invalidate {
                if prd != 0 {
                    self.valid &= !(1u128 << prd);
                }
            }

            if inputs.checkpoint_take {
                let slot = inputs.checkpoint_tag.index();
                self.ckpt_regs[slot] = self.regs;
                self.ckpt_valid[slot] = self.valid;
                self.ckpt_regs[slot][0] = 0;
                self.ckpt_valid[slot] |= 1;
            }
        }

        self.force_zero();
    }

    /// Entry 0 is architectural zero: always valid, always 0.
    #[inline]
    fn force_zero(&mut self) {
        self.regs[0] = 0;
        self.valid |= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_WB: [WbPacket; 3] = [
        WbPacket {
            valid: false,
            rob_tag: RobTag(0),
            prd: 0,
            data: 0,
            rd_used: false,
        };
        3
    ];

    fn wb(prd: usize, data: u32) -> WbPacket {
        WbPacket {
            valid: true,
            rob_tag: RobTag(0),
            prd,
            data,
            rd_used: true,
        }
    }

    fn quiet(prf: &mut Prf, wbs: &[WbPacket; 3], inval: Option<usize>) {
        prf.tick(PrfInputs {
            flush: false,
            recover: false,
            recover_tag: RobTag(0),
            writebacks: wbs,
            alloc_invalidate: inval,
            checkpoint_take: false,
            checkpoint_tag: RobTag(0),
        });
    }

    #[test]
    fn test_reset_all_valid() {
        let prf = Prf::new();
        for p in 0..N_PHYS_REGS {
            assert!(prf.is_valid(p));
            assert_eq!(prf.read(p), 0);
        }
    }

    #[test]
    fn test_allocate_then_writeback() {
        let mut prf = Prf::new();
        quiet(&mut prf, &NO_WB, Some(40));
        assert!(!prf.is_valid(40));

        quiet(&mut prf, &[wb(40, 0xABCD), NO_WB[0], NO_WB[0]], None);
        assert!(prf.is_valid(40));
        assert_eq!(prf.read(40), 0xABCD);
    }

    #[test]
    fn test_zero_entry_pinned() {
        let mut prf = Prf::new();
        quiet(&mut prf, &[wb(0, 0xFFFF), NO_WB[0], NO_WB[0]], Some(0));
        assert!(prf.is_valid(0));
        assert_eq!(prf.read(0), 0);
    }

    #[test]
    fn test_three_channels_absorbed_in_one_tick() {
        let mut prf = Prf::new();
        quiet(&mut prf, &NO_WB, Some(50));
        quiet(&mut prf, &NO_WB, Some(51));
        quiet(&mut prf, &NO_WB, Some(52));
        quiet(&mut prf, &[wb(50, 1), wb(51, 2), wb(52, 3)], None);
        assert_eq!(prf.read(50), 1);
        assert_eq!(prf.read(51), 2);
        assert_eq!(prf.read(52), 3);
        assert!(prf.is_valid(50) && prf.is_valid(51) && prf.is_valid(52));
    }

    #[test]
    fn test_checkpoint_and_restore_hides_younger_allocation() {
        let mut prf = Prf::new();
        // Branch tick: its own destination p40 invalidated, checkpoint taken.
        prf.tick(PrfInputs {
            flush: false,
            recover: false,
            recover_tag: RobTag(0),
            writebacks: &NO_WB,
            alloc_invalidate: Some(40),
            checkpoint_take: true,
            checkpoint_tag: RobTag(4),
        });
        // Younger instruction allocates p41.
        quiet(&mut prf, &NO_WB, Some(41));
        assert!(!prf.is_valid(41));

        prf.tick(PrfInputs {
            flush: true,
            recover: true,
            recover_tag: RobTag(4),
            writebacks: &NO_WB,
            alloc_invalidate: None,
            checkpoint_take: false,
            checkpoint_tag: RobTag(0),
        });
        // The branch's own invalidation survives; the younger one unwinds.
        assert!(!prf.is_valid(40));
        assert!(prf.is_valid(41));
    }

    #[test]
    fn test_writeback_after_snapshot_survives_restore() {
        let mut prf = Prf::new();
        // Pre-branch destination p40 allocated, then the branch checkpoints
        // while p40 is still pending.
        quiet(&mut prf, &NO_WB, Some(40));
        prf.tick(PrfInputs {
            flush: false,
            recover: false,
            recover_tag: RobTag(0),
            writebacks: &NO_WB,
            alloc_invalidate: None,
            checkpoint_take: true,
            checkpoint_tag: RobTag(7),
        });
        // The pre-branch result lands after the snapshot.
        quiet(&mut prf, &[wb(40, 0x77), NO_WB[0], NO_WB[0]], None);

        prf.tick(PrfInputs {
            flush: true,
            recover: true,
            recover_tag: RobTag(7),
            writebacks: &NO_WB,
            alloc_invalidate: None,
            checkpoint_take: false,
            checkpoint_tag: RobTag(0),
        });
        assert!(prf.is_valid(40), "pre-branch result lost by restore");
        assert_eq!(prf.read(40), 0x77);
    }

    #[test]
    fn test_writeback_on_recovery_tick_lands() {
        let mut prf = Prf::new();
        quiet(&mut prf, &NO_WB, Some(40));
        prf.tick(PrfInputs {
            flush: false,
            recover: false,
            recover_tag: RobTag(0),
            writebacks: &NO_WB,
            alloc_invalidate: None,
            checkpoint_take: true,
            checkpoint_tag: RobTag(3),
        });
        // Broadcast in the same tick as the restore.
        prf.tick(PrfInputs {
            flush: true,
            recover: true,
            recover_tag: RobTag(3),
            writebacks: &[wb(40, 0x99), NO_WB[0], NO_WB[0]],
            alloc_invalidate: None,
            checkpoint_take: false,
            checkpoint_tag: RobTag(0),
        });
        assert!(prf.is_valid(40));
        assert_eq!(prf.read(40), 0x99);
    }
}
