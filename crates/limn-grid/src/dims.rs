//! Volume extent, canonical ordering, and the 6-connected neighbourhood.

use crate::error::GridError;
use limn_core::Voxel;
use smallvec::SmallVec;

/// Face-neighbour offsets: two per axis, three axes.
const NEIGHBOUR_OFFSETS: [(i32, i32, i32); 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

/// Validated extent of a 3D volume.
///
/// Canonical flat ordering is x-fastest: `flat = x + width*(y + height*z)`.
/// All per-voxel buffers in the workspace (state tags, gradient magnitudes,
/// seed labels) follow this ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolumeDims {
    width: u32,
    height: u32,
    depth: u32,
}

impl VolumeDims {
    /// Maximum extent per axis: coordinates use `i32`, so each axis must fit.
    pub const MAX_DIM: u32 = i32::MAX as u32;

    /// Create a volume extent of `width * height * depth` voxels.
    ///
    /// Returns [`GridError::EmptyVolume`] if any dimension is 0, or
    /// [`GridError::DimensionTooLarge`] if one exceeds [`Self::MAX_DIM`].
    pub fn new(width: u32, height: u32, depth: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(GridError::EmptyVolume);
        }
        for (axis, value) in [("width", width), ("height", height), ("depth", depth)] {
            if value > Self::MAX_DIM {
                return Err(GridError::DimensionTooLarge {
                    axis,
                    value,
                    max: Self::MAX_DIM,
                });
            }
        }
        Ok(Self {
            width,
            height,
            depth,
        })
    }

    /// Extent along x.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Extent along y.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Extent along z (number of slices).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Total number of voxels.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    /// Whether `v` lies inside the volume.
    pub fn contains(&self, v: Voxel) -> bool {
        v.x >= 0
            && v.y >= 0
            && v.z >= 0
            && (v.x as u32) < self.width
            && (v.y as u32) < self.height
            && (v.z as u32) < self.depth
    }

    /// Canonical flat index of an in-bounds voxel.
    ///
    /// Callers must check [`contains`](Self::contains) first; out-of-bounds
    /// coordinates would alias another voxel's slot.
    pub fn flat_index(&self, v: Voxel) -> usize {
        debug_assert!(self.contains(v), "flat_index on out-of-bounds {v}");
        v.x as usize + self.width as usize * (v.y as usize + self.height as usize * v.z as usize)
    }

    /// The in-bounds face neighbours of `v` (up to 6; fewer at the border).
    pub fn neighbours(&self, v: Voxel) -> SmallVec<[Voxel; 6]> {
        let mut out = SmallVec::new();
        for (dx, dy, dz) in NEIGHBOUR_OFFSETS {
            let nb = v.offset(dx, dy, dz);
            if self.contains(nb) {
                out.push(nb);
            }
        }
        out
    }

    /// Iterate every voxel in canonical order.
    ///
    /// The iterator owns copies of the extents, so it outlives `self`.
    pub fn voxels(&self) -> impl Iterator<Item = Voxel> {
        let (w, h, d) = (self.width as i32, self.height as i32, self.depth as i32);
        (0..d).flat_map(move |z| {
            (0..h).flat_map(move |y| (0..w).map(move |x| Voxel::new(x, y, z)))
        })
    }
}
