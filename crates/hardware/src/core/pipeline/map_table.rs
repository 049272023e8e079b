//! Register Alias Table (RAT): architectural-to-physical register map.
//!
//! Maps each architectural register to the physical register holding (or
//! about to hold) its newest value. Reset binds x_i to p_i. x0 is pinned to
//! p0 and writes to it are dropped. A full RAT snapshot is taken per
//! branch/jump at rename, indexed by the branch's ROB tag, and restored on
//! recovery.

use crate::common::RobTag;
use crate::common::constants::{N_ARCH_REGS, ROB_DEPTH};

/// Per-tick inputs to the map table.
pub struct MapTableInputs {
    /// One-cycle flush pulse.
    pub flush: bool,
    /// Restore from the checkpoint indexed by `recover_tag`.
    pub recover: bool,
    /// Tag of the mispredicting branch.
    pub recover_tag: RobTag,
    /// Rename-time write: `(rd, prd)`.
    pub write: Option<(usize, usize)>,
    /// Capture a checkpoint after applying this tick's write.
    pub checkpoint_take: bool,
    /// Checkpoint slot (the branch's ROB tag).
    pub checkpoint_tag: RobTag,
}

/// The register alias table with per-branch snapshots.
pub struct MapTable {
    rat: [usize; N_ARCH_REGS],
    ckpt: [[usize; N_ARCH_REGS]; ROB_DEPTH],
}

impl Default for MapTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MapTable {
    /// Creates a map table with the identity mapping.
    pub fn new() -> Self {
        let mut rat = [0usize; N_ARCH_REGS];
        for (i, slot) in rat.iter_mut().enumerate() {
            *slot = i;
        }
        Self {
            rat,
            ckpt: [rat; ROB_DEPTH],
        }
    }

    /// Current physical register backing an architectural register.
    #[inline]
    pub fn lookup(&self, arch: usize) -> usize {
        self.rat[arch]
    }

    /// The full current mapping, for invariant checks.
    pub fn mappings(&self) -> &[usize; N_ARCH_REGS] {
        &self.rat
    }

    /// Advances the map table by one tick.
    pub fn tick(&mut self, inputs: MapTableInputs) {
        if inputs.recover {
            self.rat = self.ckpt[inputs.recover_tag.index()];
            return;
        }
        if inputs.flush {
            return;
        }

        if let Some((rd, prd)) = inputs.write {
            if rd != 0 {
                self.rat[rd] = prd;
            }
        }

        // Snapshot after this tick's own write: the branch sees itself as
        // the most recent renamed instruction.
        if inputs.checkpoint_take {
            self.ckpt[inputs.checkpoint_tag.index()] = self.rat;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_write(mt: &mut MapTable, rd: usize, prd: usize) {
        mt.tick(MapTableInputs {
            flush: false,
            recover: false,
            recover_tag: RobTag(0),
            write: Some((rd, prd)),
            checkpoint_take: false,
            checkpoint_tag: RobTag(0),
        });
    }

    #[test]
    fn test_reset_is_identity() {
        let mt = MapTable::new();
        for i in 0..N_ARCH_REGS {
            assert_eq!(mt.lookup(i), i);
        }
    }

    #[test]
    fn test_write_and_lookup() {
        let mut mt = MapTable::new();
        quiet_write(&mut mt, 10, 42);
        assert_eq!(mt.lookup(10), 42);
        assert_eq!(mt.lookup(11), 11);
    }

    #[test]
    fn test_x0_pinned() {
        let mut mt = MapTable::new();
        quiet_write(&mut mt, 0, 99);
        assert_eq!(mt.lookup(0), 0);
    }

    #[test]
    fn test_checkpoint_includes_same_tick_write() {
        let mut mt = MapTable::new();
        // Branch renames x5 -> p50 and checkpoints in the same tick.
        mt.tick(MapTableInputs {
            flush: false,
            recover: false,
            recover_tag: RobTag(0),
            write: Some((5, 50)),
            checkpoint_take: true,
            checkpoint_tag: RobTag(3),
        });
        // A younger instruction remaps x5.
        quiet_write(&mut mt, 5, 60);
        assert_eq!(mt.lookup(5), 60);

        mt.tick(MapTableInputs {
            flush: true,
            recover: true,
            recover_tag: RobTag(3),
            write: None,
            checkpoint_take: false,
            checkpoint_tag: RobTag(0),
        });
        // The branch's own rename survives; the younger one is erased.
        assert_eq!(mt.lookup(5), 50);
    }

    #[test]
    fn test_recovery_idempotent() {
        let mut mt = MapTable::new();
        mt.tick(MapTableInputs {
            flush: false,
            recover: false,
            recover_tag: RobTag(0),
            write: Some((7, 70)),
            checkpoint_take: true,
            checkpoint_tag: RobTag(1),
        });
        quiet_write(&mut mt, 7, 71);

        for _ in 0..2 {
            mt.tick(MapTableInputs {
                flush: true,
                recover: true,
                recover_tag: RobTag(1),
                write: None,
                checkpoint_take: false,
                checkpoint_tag: RobTag(0),
            });
            assert_eq!(mt.lookup(7), 70);
        }
    }
}
