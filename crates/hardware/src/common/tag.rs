//! Reorder-buffer tag and tag-set types.
//!
//! A [`RobTag`] names one slot of the reorder buffer; tags double as
//! checkpoint indices. A [`TagSet`] is a bit-set over the `ROB_DEPTH` tag
//! space, used for the live-tag view the ROB publishes and for the tag
//! allocator's reservation mask.

use crate::common::constants::ROB_DEPTH;

/// Identifies one in-flight instruction by its reorder buffer slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct RobTag(pub u8);

impl RobTag {
    /// Slot index this tag names.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The tag one slot past this one, modulo the ROB depth.
    #[inline]
    pub fn next(self) -> RobTag {
        RobTag((self.0 as usize + 1) as u8 & (ROB_DEPTH - 1) as u8)
    }
}

impl std::fmt::Display for RobTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Bit-set over the ROB tag space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TagSet(pub u16);

impl TagSet {
    /// The empty set.
    #[inline]
    pub fn empty() -> Self {
        TagSet(0)
    }

    /// Whether `tag` is a member.
    #[inline]
    pub fn contains(self, tag: RobTag) -> bool {
        self.0 & (1 << tag.index()) != 0
    }

    /// Adds `tag` to the set.
    #[inline]
    pub fn insert(&mut self, tag: RobTag) {
        self.0 |= 1 << tag.index();
    }

    /// Removes `tag` from the set.
    #[inline]
    pub fn remove(&mut self, tag: RobTag) {
        self.0 &= !(1 << tag.index());
    }

    /// Set union.
    #[inline]
    pub fn union(self, other: TagSet) -> TagSet {
        TagSet(self.0 | other.0)
    }

    /// Clears every member.
    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }
}
