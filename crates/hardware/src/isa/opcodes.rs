//! RV32I major opcodes recognised by the decoder.
//!
//! Defines the major opcodes (bits 6-0) for the implemented instruction subset.

/// Load Upper Immediate (LUI).
pub const OP_LUI: u32 = 0b0110111;

/// Jump and Link (JAL).
pub const OP_JAL: u32 = 0b1101111;

/// Jump and Link Register (JALR).
pub const OP_JALR: u32 = 0b1100111;

/// Immediate arithmetic instructions (ADDI, ORI, ANDI, SLTIU, SRLI, SRAI).
pub const OP_IMM: u32 = 0b0010011;

/// Register-register arithmetic (ADD, SUB, AND, OR, SRA).
pub const OP_REG: u32 = 0b0110011;

/// Load instructions (LW, LBU).
pub const OP_LOAD: u32 = 0b0000011;

/// Store instructions (SW, SH).
pub const OP_STORE: u32 = 0b0100011;

/// Conditional branch instructions (BEQ, BNE, BLT, BGE, BLTU, BGEU).
pub const OP_BRANCH: u32 = 0b1100011;
