//! Packet types carried between pipeline stages.
//!
//! This module defines the value records flowing through the machine:
//! 1. **Decode packet:** Fields and control extracted from the raw encoding.
//! 2. **Rename packet:** The decode packet plus physical register bindings and a ROB tag.
//! 3. **Writeback packet:** One result broadcast on a writeback channel.
//! 4. **Station entry:** The execution descriptor held by a reservation station.
//!
//! Every packet carries a `valid` flag; an invalid packet is a bubble.

use crate::common::RobTag;

/// Functional unit class an instruction executes on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FuType {
    /// Integer ALU.
    #[default]
    Alu,
    /// Branch unit.
    Bru,
    /// Load/store unit.
    Lsu,
}

/// Integer ALU operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AluOp {
    /// Addition (also the NOP datapath).
    #[default]
    Add,
    /// Subtraction.
    Sub,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Set less than (signed).
    Slt,
    /// Set less than (unsigned).
    Sltu,
    /// Shift left logical.
    Sll,
    /// Shift right logical.
    Srl,
    /// Shift right arithmetic.
    Sra,
    /// Set less than immediate (unsigned compare).
    Sltiu,
    /// Pass operand B through (LUI).
    Lui,
}

/// Access width of a load or store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LsSize {
    /// 8-bit byte.
    Byte,
    /// 16-bit halfword.
    Half,
    /// 32-bit word.
    #[default]
    Word,
}

impl LsSize {
    /// Access width in bytes.
    #[inline]
    pub fn bytes(self) -> u32 {
        match self {
            LsSize::Byte => 1,
            LsSize::Half => 2,
            LsSize::Word => 4,
        }
    }
}

/// Output of the combinational decoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodePacket {
    /// Present (not a bubble).
    pub valid: bool,
    /// Program counter of the instruction.
    pub pc: u32,
    /// Raw 32-bit encoding.
    pub inst: u32,
    /// First source register index.
    pub rs1: usize,
    /// Second source register index.
    pub rs2: usize,
    /// Destination register index.
    pub rd: usize,
    /// Whether rs1 is read.
    pub rs1_used: bool,
    /// Whether rs2 is read.
    pub rs2_used: bool,
    /// Sign-extended immediate.
    pub imm: u32,
    /// Whether the immediate replaces operand B.
    pub imm_used: bool,
    /// Functional unit class.
    pub fu_type: FuType,
    /// ALU operation.
    pub alu_op: AluOp,
    /// Whether a non-zero architectural destination is written.
    pub rd_used: bool,
    /// Memory load.
    pub is_load: bool,
    /// Memory store.
    pub is_store: bool,
    /// Load/store access width.
    pub ls_size: LsSize,
    /// Zero-extend (rather than sign-extend) the loaded value.
    pub unsigned_load: bool,
    /// Conditional branch.
    pub is_branch: bool,
    /// Unconditional jump (JAL/JALR).
    pub is_jump: bool,
}

/// Output of the rename stage: a decode packet bound to physical registers
/// and a reorder buffer tag.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenamePacket {
    /// Present (not a bubble).
    pub valid: bool,
    /// Program counter.
    pub pc: u32,
    /// Raw 32-bit encoding.
    pub inst: u32,
    /// Architectural destination index.
    pub rd: usize,
    /// Sign-extended immediate.
    pub imm: u32,
    /// Whether the immediate replaces operand B.
    pub imm_used: bool,
    /// Functional unit class.
    pub fu_type: FuType,
    /// ALU operation.
    pub alu_op: AluOp,
    /// Whether a non-zero architectural destination is written.
    pub rd_used: bool,
    /// Memory load.
    pub is_load: bool,
    /// Memory store.
    pub is_store: bool,
    /// Load/store access width.
    pub ls_size: LsSize,
    /// Zero-extend the loaded value.
    pub unsigned_load: bool,
    /// Conditional branch.
    pub is_branch: bool,
    /// Unconditional jump.
    pub is_jump: bool,
    /// Whether rs1 is read.
    pub rs1_used: bool,
    /// Whether rs2 is read.
    pub rs2_used: bool,
    /// Physical register backing rs1.
    pub prs1: usize,
    /// Physical register backing rs2.
    pub prs2: usize,
    /// Freshly allocated physical destination (0 when `rd_used` is false).
    pub prd: usize,
    /// rs1 value available at rename time.
    pub prs1_ready: bool,
    /// rs2 value available at rename time.
    pub prs2_ready: bool,
    /// Previous mapping of rd, released when this instruction commits.
    pub old_prd: usize,
    /// Reorder buffer tag reserved for this instruction.
    pub rob_tag: RobTag,
}

/// One result broadcast on a writeback channel.
#[derive(Clone, Copy, Debug, Default)]
pub struct WbPacket {
    /// Present (not a bubble).
    pub valid: bool,
    /// Tag of the completing instruction.
    pub rob_tag: RobTag,
    /// Physical destination written (0 when `rd_used` is false).
    pub prd: usize,
    /// Result value.
    pub data: u32,
    /// Whether a physical destination is written.
    pub rd_used: bool,
}

/// Execution descriptor held by a reservation station slot.
#[derive(Clone, Copy, Debug, Default)]
pub struct RsEntry {
    /// Program counter.
    pub pc: u32,
    /// Raw 32-bit encoding (the BRU re-derives funct3 from it).
    pub inst: u32,
    /// Functional unit class (routing sanity only; stations are per-unit).
    pub fu_type: FuType,
    /// ALU operation.
    pub alu_op: AluOp,
    /// Sign-extended immediate.
    pub imm: u32,
    /// Whether the immediate replaces operand B.
    pub imm_used: bool,
    /// Whether a physical destination is written.
    pub rd_used: bool,
    /// Memory load.
    pub is_load: bool,
    /// Memory store.
    pub is_store: bool,
    /// Load/store access width.
    pub ls_size: LsSize,
    /// Zero-extend the loaded value.
    pub unsigned_load: bool,
    /// Conditional branch.
    pub is_branch: bool,
    /// Unconditional jump.
    pub is_jump: bool,
    /// Whether rs1 is read.
    pub rs1_used: bool,
    /// Whether rs2 is read.
    pub rs2_used: bool,
    /// Physical register backing rs1.
    pub prs1: usize,
    /// Physical register backing rs2.
    pub prs2: usize,
    /// Physical destination.
    pub prd: usize,
    /// rs1 value available.
    pub prs1_ready: bool,
    /// rs2 value available.
    pub prs2_ready: bool,
    /// Reorder buffer tag.
    pub rob_tag: RobTag,
}

impl RsEntry {
    /// Builds a station entry from a released rename packet.
    pub fn from_packet(pkt: &RenamePacket) -> Self {
        RsEntry {
            pc: pkt.pc,
            inst: pkt.inst,
            fu_type: pkt.fu_type,
            alu_op: pkt.alu_op,
            imm: pkt.imm,
            imm_used: pkt.imm_used,
            rd_used: pkt.rd_used,
            is_load: pkt.is_load,
            is_store: pkt.is_store,
            ls_size: pkt.ls_size,
            unsigned_load: pkt.unsigned_load,
            is_branch: pkt.is_branch,
            is_jump: pkt.is_jump,
            rs1_used: pkt.rs1_used,
            rs2_used: pkt.rs2_used,
            prs1: pkt.prs1,
            prs2: pkt.prs2,
            prd: pkt.prd,
            prs1_ready: pkt.prs1_ready,
            prs2_ready: pkt.prs2_ready,
            rob_tag: pkt.rob_tag,
        }
    }

    /// Both source operands available.
    #[inline]
    pub fn operands_ready(&self) -> bool {
        self.prs1_ready && self.prs2_ready
    }
}
