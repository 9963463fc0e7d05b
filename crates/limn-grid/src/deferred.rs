//! Tile-based lazily-allocated per-voxel storage.

use crate::dims::VolumeDims;
use limn_core::Voxel;

/// Tile edge length. Each tile covers `8 * 8 * 8` voxels.
const TILE: usize = 8;

/// A sparse per-voxel store backed by lazily-allocated cubic tiles.
///
/// Reads of untouched regions return the default value without allocating;
/// the first write into a tile materialises it. This keeps the memory
/// footprint proportional to the narrow band rather than the volume, which
/// is the whole point of the sparse-field scheme: phi, action tags, and the
/// element lookup table only ever touch a thin shell of tiles around the
/// contour.
///
/// [`clear`](Self::clear) drops every tile at once, used when the engine
/// releases its working state after convergence or failure.
#[derive(Clone, Debug)]
pub struct DeferredGrid<T: Copy> {
    tiles: Vec<Option<Box<[T]>>>,
    tiles_x: usize,
    tiles_y: usize,
    default: T,
}

impl<T: Copy> DeferredGrid<T> {
    /// Create an (unallocated) grid covering `dims`, reading `default`
    /// everywhere.
    pub fn new(dims: VolumeDims, default: T) -> Self {
        let tiles_x = (dims.width() as usize).div_ceil(TILE);
        let tiles_y = (dims.height() as usize).div_ceil(TILE);
        let tiles_z = (dims.depth() as usize).div_ceil(TILE);
        Self {
            tiles: vec![None; tiles_x * tiles_y * tiles_z],
            tiles_x,
            tiles_y,
            default,
        }
    }

    fn tile_index(&self, v: Voxel) -> (usize, usize) {
        let (x, y, z) = (v.x as usize, v.y as usize, v.z as usize);
        let tile =
            (x / TILE) + self.tiles_x * ((y / TILE) + self.tiles_y * (z / TILE));
        let within = (x % TILE) + TILE * ((y % TILE) + TILE * (z % TILE));
        (tile, within)
    }

    /// Read the value at `v`, or the default if its tile was never written.
    pub fn get(&self, v: Voxel) -> T {
        let (tile, within) = self.tile_index(v);
        match &self.tiles[tile] {
            Some(data) => data[within],
            None => self.default,
        }
    }

    /// Write the value at `v`, materialising its tile on first touch.
    pub fn set(&mut self, v: Voxel, value: T) {
        let (tile, within) = self.tile_index(v);
        let default = self.default;
        let data = self.tiles[tile]
            .get_or_insert_with(|| vec![default; TILE * TILE * TILE].into_boxed_slice());
        data[within] = value;
    }

    /// Drop every allocated tile; subsequent reads return the default.
    pub fn clear(&mut self) {
        for tile in &mut self.tiles {
            *tile = None;
        }
    }

    /// Number of currently allocated tiles.
    pub fn allocated_tiles(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }
}
