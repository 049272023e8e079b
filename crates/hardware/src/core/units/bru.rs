//! Branch unit with static not-taken resolution.
//!
//! Resolves conditional branches and jumps in one tick. The frontend
//! speculates fall-through for everything, so a mispredict is reported
//! whenever a branch is taken or a jump's computed target is not `pc + 4`.
//! The redirect carries the offending instruction's ROB tag: it indexes the
//! checkpoint the recovery controller restores one tick later.

use crate::common::RobTag;
use crate::common::constants::{FUNCT3_MASK, FUNCT3_SHIFT, OPCODE_MASK};
use crate::core::pipeline::packets::{RsEntry, WbPacket};
use crate::isa::opcodes;

/// Registered redirect report.
#[derive(Clone, Copy, Debug, Default)]
pub struct Redirect {
    /// The frontend fetched the wrong path.
    pub mispredict: bool,
    /// Corrected fetch target.
    pub target: u32,
    /// ROB tag of the resolving instruction.
    pub tag: RobTag,
}

/// One-cycle branch unit with registered writeback and redirect outputs.
#[derive(Default)]
pub struct BranchUnit {
    wb_q: WbPacket,
    redirect_q: Redirect,
}

impl BranchUnit {
    /// Creates an idle branch unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// The writeback packet registered last tick (the link value).
    #[inline]
    pub fn writeback(&self) -> WbPacket {
        self.wb_q
    }

    /// The redirect registered last tick.
    #[inline]
    pub fn redirect(&self) -> Redirect {
        self.redirect_q
    }

    /// Resolves the issued entry, if any; outputs are visible next tick.
    pub fn tick(&mut self, flush: bool, issue: Option<(RsEntry, u32, u32)>) {
        self.wb_q = WbPacket::default();
        self.redirect_q = Redirect::default();
        if flush {
            return;
        }
        let Some((entry, src1, src2)) = issue else {
            return;
        };

        let fall_through = entry.pc.wrapping_add(4);
        let (taken, target) = resolve(&entry, src1, src2);
        let mispredict = if entry.is_jump {
            target != fall_through
        } else {
            taken
        };

        self.wb_q = WbPacket {
            valid: true,
            rob_tag: entry.rob_tag,
            prd: entry.prd,
            data: fall_through,
            rd_used: entry.rd_used,
        };
        self.redirect_q = Redirect {
            mispredict,
            target,
            tag: entry.rob_tag,
        };
    }
}

/// Computes taken/target for a branch or jump entry.
fn resolve(entry: &RsEntry, src1: u32, src2: u32) -> (bool, u32) {
    if entry.is_jump {
        let opcode = entry.inst & OPCODE_MASK;
        let target = if opcode == opcodes::OP_JALR {
            src1.wrapping_add(entry.imm) & !1
        } else {
            entry.pc.wrapping_add(entry.imm)
        };
        return (true, target);
    }

    let funct3 = (entry.inst >> FUNCT3_SHIFT) & FUNCT3_MASK;
    let taken = match funct3 {
        0x0 => src1 == src2,
        0x1 => src1 != src2,
        0x4 => (src1 as i32) < (src2 as i32),
        0x5 => (src1 as i32) >= (src2 as i32),
        0x6 => src1 < src2,
        0x7 => src1 >= src2,
        _ => false,
    };
    (taken, entry.pc.wrapping_add(entry.imm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::decode::decode;

    fn entry_from(pc: u32, inst: u32, tag: u8) -> RsEntry {
        let d = decode(true, pc, inst);
        RsEntry {
            pc,
            inst,
            imm: d.imm,
            imm_used: d.imm_used,
            is_branch: d.is_branch,
            is_jump: d.is_jump,
            rd_used: d.rd_used,
            prd: if d.rd_used { 40 } else { 0 },
            rob_tag: RobTag(tag),
            ..Default::default()
        }
    }

    #[test]
    fn test_not_taken_branch_is_predicted_correctly() {
        let mut bru = BranchUnit::new();
        // bne x11, x0, -8 with x11 == 0: falls through.
        let e = entry_from(8, 0xFE05_9CE3, 1);
        bru.tick(false, Some((e, 0, 0)));
        assert!(bru.writeback().valid);
        assert!(!bru.redirect().mispredict);
    }

    #[test]
    fn test_taken_branch_mispredicts() {
        let mut bru = BranchUnit::new();
        // bne x11, x0, -8 with x11 == 5: taken, target pc-8.
        let e = entry_from(16, 0xFE05_9CE3, 2);
        bru.tick(false, Some((e, 5, 0)));
        let r = bru.redirect();
        assert!(r.mispredict);
        assert_eq!(r.target, 8);
        assert_eq!(r.tag, RobTag(2));
    }

    #[test]
    fn test_branch_comparisons() {
        let cases: &[(u32, u32, u32, bool)] = &[
            // (funct3 template, src1, src2, taken)
            (0x0000_0063, 5, 5, true),            // beq
            (0x0000_1063, 5, 5, false),           // bne
            (0x0000_4063, (-1i32) as u32, 1, true), // blt signed
            (0x0000_5063, (-1i32) as u32, 1, false), // bge signed
            (0x0000_6063, (-1i32) as u32, 1, false), // bltu
            (0x0000_7063, (-1i32) as u32, 1, true),  // bgeu
        ];
        for &(inst, a, b, taken) in cases {
            let mut bru = BranchUnit::new();
            let e = entry_from(0, inst, 0);
            bru.tick(false, Some((e, a, b)));
            assert_eq!(bru.redirect().mispredict, taken, "inst {inst:#x}");
        }
    }

    #[test]
    fn test_jal_links_and_redirects() {
        let mut bru = BranchUnit::new();
        // jal x1, +8 at pc 0.
        let e = entry_from(0, 0x0080_00EF, 3);
        bru.tick(false, Some((e, 0, 0)));
        let wb = bru.writeback();
        assert!(wb.rd_used);
        assert_eq!(wb.data, 4);
        let r = bru.redirect();
        assert!(r.mispredict);
        assert_eq!(r.target, 8);
    }

    #[test]
    fn test_jump_to_fall_through_is_not_a_mispredict() {
        let mut bru = BranchUnit::new();
        // jal x0, +4: the static prediction happens to be right.
        let e = entry_from(0, 0x0040_006F, 4);
        bru.tick(false, Some((e, 0, 0)));
        assert!(!bru.redirect().mispredict);
    }

    #[test]
    fn test_jalr_target_masks_bit_zero() {
        let mut bru = BranchUnit::new();
        // jalr x0, 3(x1) with x1 = 0x100: target (0x103) & !1 = 0x102.
        let e = entry_from(0, 0x0030_8067, 5);
        bru.tick(false, Some((e, 0x100, 0)));
        assert_eq!(bru.redirect().target, 0x102);
        assert!(bru.redirect().mispredict);
    }
}
