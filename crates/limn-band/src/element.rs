//! Band element records and their arena handles.

use limn_core::Voxel;
use std::fmt;

/// Sentinel carried by an element that has been queued but does not yet
/// hold a real result (or whose pending result was already committed).
///
/// Queueing the same coordinate twice is a no-op because the second
/// consumer sees the sentinel and skips it.
pub const UNQUEUED: f64 = f64::MAX;

/// Index of a [`BandElement`] slot inside a [`BandArena`](crate::BandArena).
///
/// Both layer membership and the coordinate lookup table store these
/// indices; neither holds an owning reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementIdx(pub u32);

impl fmt::Display for ElementIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tracked voxel's record: its coordinate and a scalar slot.
///
/// The scalar doubles as the committed phi value while the element rests
/// in a layer list, and as a pending-update buffer (or the [`UNQUEUED`]
/// sentinel) while an iteration is in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandElement {
    /// The coordinate this element stands for.
    pub voxel: Voxel,
    /// Pending or committed scalar value, [`UNQUEUED`] when neither.
    pub value: f64,
}

impl BandElement {
    /// Create an element for `voxel` carrying `value`.
    pub const fn new(voxel: Voxel, value: f64) -> Self {
        Self { voxel, value }
    }

    /// Whether the scalar slot currently holds the [`UNQUEUED`] sentinel.
    pub fn is_unqueued(&self) -> bool {
        self.value == UNQUEUED
    }
}
