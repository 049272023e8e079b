//! Integer ALU functional unit.
//!
//! Executes one operation per tick; the result is registered and broadcast
//! on the ALU writeback channel the following tick. Operand B is the
//! sign-extended immediate when the instruction carries one.

use crate::core::pipeline::packets::{AluOp, RsEntry, WbPacket};

/// Pure ALU datapath.
pub fn execute(op: AluOp, a: u32, b: u32) -> u32 {
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Slt => ((a as i32) < (b as i32)) as u32,
        AluOp::Sltu | AluOp::Sltiu => (a < b) as u32,
        AluOp::Sll => a.wrapping_shl(b & 31),
        AluOp::Srl => a.wrapping_shr(b & 31),
        AluOp::Sra => ((a as i32).wrapping_shr(b & 31)) as u32,
        AluOp::Lui => b,
    }
}

/// One-cycle ALU with a registered writeback output.
#[derive(Default)]
pub struct AluUnit {
    wb_q: WbPacket,
}

impl AluUnit {
    /// Creates an idle ALU.
    pub fn new() -> Self {
        Self::default()
    }

    /// The writeback packet registered last tick.
    #[inline]
    pub fn writeback(&self) -> WbPacket {
        self.wb_q
    }

    /// Executes the issued entry, if any; the result is visible next tick.
    pub fn tick(&mut self, flush: bool, issue: Option<(RsEntry, u32, u32)>) {
        self.wb_q = WbPacket::default();
        if flush {
            return;
        }
        if let Some((entry, src1, src2)) = issue {
            let b = if entry.imm_used { entry.imm } else { src2 };
            let data = execute(entry.alu_op, src1, b);
            self.wb_q = WbPacket {
                valid: true,
                rob_tag: entry.rob_tag,
                prd: entry.prd,
                data,
                rd_used: entry.rd_used,
            };
        }
    }
}
