//! Dispatch: single-slot skid buffer between rename and the backend.
//!
//! Rename drops its packet here; one tick later (or whenever back-pressure
//! clears) the packet is released into the reservation station matching its
//! unit class and, simultaneously, into the reorder buffer. Release requires
//! space in both; either one lacking blocks the slot and, through the empty
//! `ready` view, rename itself.

use crate::core::pipeline::packets::{FuType, RenamePacket};

/// The dispatch skid buffer.
#[derive(Default)]
pub struct Dispatch {
    slot: Option<RenamePacket>,
}

impl Dispatch {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether rename may deposit a packet this tick (evaluated after this
    /// tick's release).
    #[inline]
    pub fn ready(&self) -> bool {
        self.slot.is_none()
    }

    /// The buffered packet, if any.
    pub fn pending(&self) -> Option<&RenamePacket> {
        self.slot.as_ref()
    }

    /// Releases the buffered packet when its target station and the ROB
    /// both have space. A flush drops the packet in transit.
    ///
    /// `station_space` is indexed by [`FuType`] as `[alu, bru, lsu]`.
    pub fn release(
        &mut self,
        station_space: [bool; 3],
        rob_space: bool,
        flush: bool,
    ) -> Option<RenamePacket> {
        if flush {
            self.slot = None;
            return None;
        }
        let pkt = self.slot.as_ref()?;
        let station_ok = match pkt.fu_type {
            FuType::Alu => station_space[0],
            FuType::Bru => station_space[1],
            FuType::Lsu => station_space[2],
        };
        if station_ok && rob_space {
            self.slot.take()
        } else {
            None
        }
    }

    /// Accepts the packet rename produced this tick.
    pub fn accept(&mut self, pkt: RenamePacket) {
        debug_assert!(self.slot.is_none(), "dispatch overrun");
        self.slot = Some(pkt);
    }
}
