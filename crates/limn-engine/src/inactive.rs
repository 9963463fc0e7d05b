//! The inactive-layer pass: phi refresh and demotion for the non-zero rings.
//!
//! Each ring re-derives its phi from the neighbouring ring one step closer
//! to the contour: the extremal neighbour phi (maximum inside, minimum
//! outside) plus a signed unit offset. Voxels with no inner support are
//! pushed one ring outward, or collapsed to a far sentinel at the band
//! edge. Elements whose voxel was re-labelled by the transition engine are
//! orphans and are recycled here.

use limn_core::{far_for_side, side_of_layer, Voxel};

use crate::field::VoxelField;

/// Refresh every inactive ring, inner rings before outer on each side.
pub(crate) fn update_inactive_layers(field: &mut VoxelField) {
    let k = field.layers().half_width();
    for i in 1..=k {
        update_inactive_layer(field, -i);
        update_inactive_layer(field, i);
    }
}

fn update_inactive_layer(field: &mut VoxelField, layer: i32) {
    let k = field.layers.half_width();
    let delta = f64::from(side_of_layer(layer));

    let mut pos = 0;
    while pos < field.layers.len(layer) {
        let idx = field.layers.list(layer)[pos];
        let v = field.arena.get(idx).voxel;

        // Orphaned by a transition this iteration.
        if field.state(v) != layer {
            field.layers.swap_remove(layer, pos);
            field.arena.release(idx);
            continue;
        }

        match inner_support(field, v, layer) {
            Some(value) => {
                field.phi.set(v, value + delta);
                pos += 1;
            }
            None => {
                field.layers.swap_remove(layer, pos);
                if layer.abs() == k {
                    field.set_state(v, far_for_side(layer));
                    field.set_element(v, None);
                    field.arena.release(idx);
                } else {
                    let next = layer + side_of_layer(layer);
                    field.layers.push(next, idx);
                    field.set_state(v, next);
                }
            }
        }
    }
}

/// The extremal phi among neighbours belonging to the ring one step closer
/// to the contour: maximum on the inside, minimum on the outside. `None`
/// when no such neighbour exists.
fn inner_support(field: &VoxelField, v: Voxel, layer: i32) -> Option<f64> {
    let from_layer = layer - side_of_layer(layer);
    let inside = layer < 0;

    let mut best: Option<f64> = None;
    for nb in field.dims.neighbours(v) {
        if field.state(nb) != from_layer {
            continue;
        }
        let phi = field.phi.get(nb);
        best = Some(match best {
            None => phi,
            Some(b) if inside => b.max(phi),
            Some(b) => b.min(phi),
        });
    }
    best
}
