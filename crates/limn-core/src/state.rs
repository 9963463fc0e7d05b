//! Layer indices, side constants, and the far-sentinel state tags.
//!
//! Every voxel carries an `i32` state tag. Tracked voxels hold the index
//! of the layer that owns them (`-K..=K`, 0 is the contour); untracked
//! voxels hold one of the two far sentinels.

/// Side constant for the interior of the contour. Also the layer offset
/// of the first ring inside the zero layer.
pub const INSIDE: i32 = -1;

/// Side constant for the exterior of the contour.
pub const OUTSIDE: i32 = 1;

/// State tag for untracked voxels far inside the contour.
pub const INSIDE_FAR: i32 = i32::MIN;

/// State tag for untracked voxels far outside the contour.
pub const OUTSIDE_FAR: i32 = i32::MAX;

/// Whether a state tag denotes a tracked (in-band) voxel.
pub const fn is_tracked(tag: i32) -> bool {
    tag != INSIDE_FAR && tag != OUTSIDE_FAR
}

/// The far sentinel on the same side as `layer` (negative layers collapse
/// to [`INSIDE_FAR`], positive to [`OUTSIDE_FAR`]).
pub const fn far_for_side(layer: i32) -> i32 {
    if layer < 0 {
        INSIDE_FAR
    } else {
        OUTSIDE_FAR
    }
}

/// The side of a layer index: [`INSIDE`] for negative layers, [`OUTSIDE`]
/// for positive ones, 0 for the zero layer.
pub const fn side_of_layer(layer: i32) -> i32 {
    if layer < 0 {
        INSIDE
    } else if layer > 0 {
        OUTSIDE
    } else {
        0
    }
}
