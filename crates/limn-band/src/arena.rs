//! Free-list arena for band elements.

use crate::element::{BandElement, ElementIdx};
use limn_core::Voxel;

/// Pool of reusable [`BandElement`] slots.
///
/// [`acquire`](Self::acquire) prefers a previously released slot over
/// growing the slot vector; no ordering is guaranteed on which released
/// slot is reused. Released slots keep their stale contents until
/// reacquired, so holding an [`ElementIdx`] past `release` reads garbage —
/// the band bookkeeping invalidates its references (lookup table, layer
/// lists) before releasing.
#[derive(Debug, Default)]
pub struct BandArena {
    slots: Vec<BandElement>,
    free: Vec<ElementIdx>,
}

impl BandArena {
    /// An empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out an element for `voxel` carrying `value`.
    pub fn acquire(&mut self, voxel: Voxel, value: f64) -> ElementIdx {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx.0 as usize] = BandElement::new(voxel, value);
                idx
            }
            None => {
                let idx = ElementIdx(self.slots.len() as u32);
                self.slots.push(BandElement::new(voxel, value));
                idx
            }
        }
    }

    /// Return a slot to the pool.
    pub fn release(&mut self, idx: ElementIdx) {
        debug_assert!(
            !self.free.contains(&idx),
            "double release of element {idx}"
        );
        self.free.push(idx);
    }

    /// Read a slot.
    pub fn get(&self, idx: ElementIdx) -> &BandElement {
        &self.slots[idx.0 as usize]
    }

    /// Mutate a slot.
    pub fn get_mut(&mut self, idx: ElementIdx) -> &mut BandElement {
        &mut self.slots[idx.0 as usize]
    }

    /// Number of slots currently handed out.
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Total slots ever grown (live + pooled).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drop every slot, live or pooled.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
