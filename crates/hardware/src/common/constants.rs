//! Global core parameters.
//!
//! This module defines the fixed structural parameters of the core. It includes:
//! 1. **Register file geometry:** Architectural and physical register counts.
//! 2. **Window sizes:** Reorder buffer, reservation station, and store buffer depths.
//! 3. **Instruction constants:** The canonical NOP encoding and field masks.

/// Width of the integer datapath in bits.
pub const XLEN: u32 = 32;

/// Number of architectural integer registers (x0-x31).
pub const N_ARCH_REGS: usize = 32;

/// Number of physical registers backing the rename machinery.
///
/// The low `N_ARCH_REGS` physicals are bound to the initial map-table
/// identity mapping; allocation only ever grants indices at or above
/// `N_ARCH_REGS`.
pub const N_PHYS_REGS: usize = 128;

/// Number of reorder buffer entries. ROB tags are indices into this window.
pub const ROB_DEPTH: usize = 16;

/// Number of entries in each per-unit reservation station.
pub const RS_DEPTH: usize = 8;

/// Number of entries in the store buffer.
pub const STORE_BUFFER_DEPTH: usize = 8;

/// Canonical NOP encoding (`addi x0, x0, 0`).
///
/// Used to fill unprogrammed instruction memory and as the decode result
/// for unrecognised encodings.
pub const NOP_INSTRUCTION: u32 = 0x0000_0013;

/// Bit mask for extracting the major opcode field (bits 6-0).
pub const OPCODE_MASK: u32 = 0x7F;

/// Bit mask for a 5-bit register index field.
pub const REG_MASK: u32 = 0x1F;

/// Bit position of the destination register field (rd).
pub const RD_SHIFT: u32 = 7;

/// Bit position of the first source register field (rs1).
pub const RS1_SHIFT: u32 = 15;

/// Bit position of the second source register field (rs2).
pub const RS2_SHIFT: u32 = 20;

/// Bit position of the funct3 field.
pub const FUNCT3_SHIFT: u32 = 12;

/// Bit mask for the funct3 field after shifting.
pub const FUNCT3_MASK: u32 = 0x7;

/// Bit position of the funct7 field.
pub const FUNCT7_SHIFT: u32 = 25;

/// Bit mask for the funct7 field after shifting.
pub const FUNCT7_MASK: u32 = 0x7F;
