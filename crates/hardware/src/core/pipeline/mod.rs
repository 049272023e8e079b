//! Pipeline structural modules.
//!
//! Everything between fetch and the functional units: the packets flowing
//! forward, the rename structures (map table, free list, tag allocator,
//! PRF), the out-of-order window (reservation stations, ROB, store buffer),
//! and the recovery machinery that restores precise state on a mispredict.

/// Dispatch skid buffer.
pub mod dispatch;
/// Fetch state machine.
pub mod fetch;
/// Physical register free list.
pub mod free_list;
/// Register alias table.
pub mod map_table;
/// Inter-stage packet types.
pub mod packets;
/// Physical register file.
pub mod prf;
/// Rename logic.
pub mod rename;
/// Reorder buffer.
pub mod rob;
/// Recovery controller.
pub mod recovery;
/// Reservation stations.
pub mod station;
/// Store buffer.
pub mod store_buffer;
/// ROB tag allocator.
pub mod tag_alloc;
