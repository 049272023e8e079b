//! Recovery controller: one-cycle delay from mispredict to flush/restore.
//!
//! The branch unit reports a mispredict with the corrected target and the
//! offending branch's ROB tag; on the *following* tick this controller
//! asserts `flush` and `recover` to every structural module at once. The
//! branch itself is preserved by restoring the checkpoint taken at its own
//! rename; only strictly younger state is erased.

use crate::common::RobTag;

/// The flush/restore pulse driven to all structural modules.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecoverySignals {
    /// Squash in-transit packets and redirect fetch.
    pub flush: bool,
    /// Restore checkpointed state.
    pub recover: bool,
    /// Corrected fetch target.
    pub flush_pc: u32,
    /// Tag of the mispredicting branch (checkpoint index).
    pub recover_tag: RobTag,
}

/// One-cycle delay register between the branch unit and the structural
/// modules.
#[derive(Default)]
pub struct RecoveryController {
    out_q: RecoverySignals,
}

impl RecoveryController {
    /// Creates an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registered pulse for the current tick.
    #[inline]
    pub fn output(&self) -> RecoverySignals {
        self.out_q
    }

    /// Latches this tick's mispredict report; it becomes the pulse seen
    /// next tick.
    pub fn tick(&mut self, mispredict: bool, target_pc: u32, tag: RobTag) {
        self.out_q = if mispredict {
            RecoverySignals {
                flush: true,
                recover: true,
                flush_pc: target_pc,
                recover_tag: tag,
            }
        } else {
            RecoverySignals::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_cycle_pulse() {
        let mut rc = RecoveryController::new();
        assert!(!rc.output().flush);

        rc.tick(true, 0x40, RobTag(5));
        let out = rc.output();
        assert!(out.flush && out.recover);
        assert_eq!(out.flush_pc, 0x40);
        assert_eq!(out.recover_tag, RobTag(5));

        // Deasserts after one tick without a new report.
        rc.tick(false, 0, RobTag(0));
        assert!(!rc.output().flush);
        assert!(!rc.output().recover);
    }
}
