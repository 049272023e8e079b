//! Rename: architectural-to-physical translation, combinational.
//!
//! Given a decoded packet and the current structural state, rename produces
//! the packet the dispatcher buffers. It fires only when a ROB tag is
//! available, the dispatch slot is (or falls) free, and — for instructions
//! writing a non-zero architectural destination — the free list can grant a
//! physical register.
//!
//! Source operands are captured against the map table and the PRF valid map
//! *before* this tick's updates: `old_prd` is the mapping the destination
//! write will supersede, and a source's ready bit reflects the valid map
//! with this tick's writebacks not yet folded in (the reservation station
//! absorbs those via snoop). A branch or jump raises its checkpoint request
//! in the same tick it fires.

use crate::common::RobTag;
use crate::core::pipeline::map_table::MapTable;
use crate::core::pipeline::packets::{DecodePacket, RenamePacket};

/// Whether the instruction needs a physical destination.
#[inline]
pub fn needs_allocation(pkt: &DecodePacket) -> bool {
    pkt.rd_used && pkt.rd != 0
}

/// Whether the instruction takes a structural checkpoint when it fires.
#[inline]
pub fn takes_checkpoint(pkt: &DecodePacket) -> bool {
    pkt.is_branch || pkt.is_jump
}

/// Whether rename can fire this tick.
///
/// `tag_ok` is the tag allocator's registered availability; `has_free` is
/// the free list's current view; `dispatch_ready` is the skid slot state
/// after this tick's release.
pub fn can_fire(pkt: &DecodePacket, dispatch_ready: bool, tag_ok: bool, has_free: bool) -> bool {
    if !pkt.valid {
        return false;
    }
    let alloc_ok = !needs_allocation(pkt) || has_free;
    dispatch_ready && tag_ok && alloc_ok
}

/// Builds the renamed packet from the decode packet and this tick's grants.
///
/// Must be called before the map table applies the destination write: both
/// source lookups and `old_prd` read the pre-update mapping.
pub fn build_packet(
    pkt: &DecodePacket,
    map_table: &MapTable,
    prf_valid: u128,
    prd: usize,
    rob_tag: RobTag,
) -> RenamePacket {
    let prs1 = map_table.lookup(pkt.rs1);
    let prs2 = map_table.lookup(pkt.rs2);
    let ready = |used: bool, p: usize| !used || p == 0 || (prf_valid & (1u128 << p)) != 0;

    let need_alloc = needs_allocation(pkt);
    RenamePacket {
        valid: true,
        pc: pkt.pc,
        inst: pkt.inst,
        rd: pkt.rd,
        imm: pkt.imm,
        imm_used: pkt.imm_used,
        fu_type: pkt.fu_type,
        alu_op: pkt.alu_op,
        rd_used: need_alloc,
        is_load: pkt.is_load,
        is_store: pkt.is_store,
        ls_size: pkt.ls_size,
        unsigned_load: pkt.unsigned_load,
        is_branch: pkt.is_branch,
        is_jump: pkt.is_jump,
        rs1_used: pkt.rs1_used,
        rs2_used: pkt.rs2_used,
        prs1,
        prs2,
        prd: if need_alloc { prd } else { 0 },
        prs1_ready: ready(pkt.rs1_used, prs1),
        prs2_ready: ready(pkt.rs2_used, prs2),
        old_prd: if need_alloc { map_table.lookup(pkt.rd) } else { 0 },
        rob_tag,
    }
}
