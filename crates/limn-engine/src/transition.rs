//! The layer-transition pass: ring-by-ring promote/demote with dragging.
//!
//! A single contour move triggers an outward wave of re-classification.
//! Voxels leaving the zero layer land in ring ±1; each subsequent call
//! consumes the previous call's drag output, pulling qualifying neighbours
//! from the adjacent ring one step toward the contour, until the outermost
//! ring drags fresh voxels in from the far sentinels.

use std::mem;

use limn_band::{ElementIdx, UNQUEUED};
use limn_core::{INSIDE, INSIDE_FAR, OUTSIDE, OUTSIDE_FAR};

use crate::field::{Action, VoxelField};

/// Reused per-iteration work lists.
///
/// `move_in`/`move_out` double as the current transition input and are
/// swapped with `drag_in`/`drag_out` between rings (the drag output of one
/// ring is the input of the next). `commits` is the deferred phi update
/// queue of the active-layer pass.
#[derive(Debug, Default)]
pub(crate) struct TransitionQueues {
    pub move_in: Vec<ElementIdx>,
    pub move_out: Vec<ElementIdx>,
    pub drag_in: Vec<ElementIdx>,
    pub drag_out: Vec<ElementIdx>,
    pub commits: Vec<ElementIdx>,
}

impl TransitionQueues {
    fn swap_drag_buffers(&mut self) {
        mem::swap(&mut self.move_in, &mut self.drag_in);
        mem::swap(&mut self.move_out, &mut self.drag_out);
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.move_in.is_empty()
            && self.move_out.is_empty()
            && self.drag_in.is_empty()
            && self.drag_out.is_empty()
            && self.commits.is_empty()
    }
}

/// Run the full transition cascade for one iteration, inside-out.
///
/// Both directions interleave per ring: the inward cascade re-labels
/// `0 → −1, +1 → 0, …, FAR → +K` and the outward cascade mirrors it.
pub(crate) fn run_transitions(field: &mut VoxelField, q: &mut TransitionQueues) {
    let k = field.layers().half_width();

    // Zero-layer movers enter ring ±1, dragging the opposite ring.
    process_layer_change(field, &mut q.move_in, INSIDE, Some(OUTSIDE), &mut q.drag_in);
    process_layer_change(field, &mut q.move_out, OUTSIDE, Some(INSIDE), &mut q.drag_out);

    // Dragged rings step toward the contour, each pulling the next ring out.
    for i in 1..k {
        q.swap_drag_buffers();
        process_layer_change(field, &mut q.move_in, i - 1, Some(i + 1), &mut q.drag_in);
        process_layer_change(
            field,
            &mut q.move_out,
            -(i - 1),
            Some(-(i + 1)),
            &mut q.drag_out,
        );
    }

    // The outermost ring's members step in, dragging far voxels into the band.
    q.swap_drag_buffers();
    process_layer_change(
        field,
        &mut q.move_in,
        k - 1,
        Some(OUTSIDE_FAR),
        &mut q.drag_in,
    );
    process_layer_change(
        field,
        &mut q.move_out,
        -(k - 1),
        Some(INSIDE_FAR),
        &mut q.drag_out,
    );

    // Newly adopted far voxels become the outermost ring; nothing follows.
    q.swap_drag_buffers();
    process_layer_change(field, &mut q.move_in, k, None, &mut q.drag_in);
    process_layer_change(field, &mut q.move_out, -k, None, &mut q.drag_out);
}

/// Move every voxel in `src` into `dest_layer`: refresh its lookup-table
/// entry, set its state tag, clear its action tag. When `drag_state` is
/// set, each grid neighbour currently tagged with it — and not already
/// flagged this iteration — is acquired from the arena and appended to
/// `drag_list` for the next ring's call.
fn process_layer_change(
    field: &mut VoxelField,
    src: &mut Vec<ElementIdx>,
    dest_layer: i32,
    drag_state: Option<i32>,
    drag_list: &mut Vec<ElementIdx>,
) {
    for idx in src.drain(..) {
        let v = field.arena.get(idx).voxel;

        field.layers.push(dest_layer, idx);
        field.set_element(v, Some(idx));
        field.set_state(v, dest_layer);
        field.set_action(v, Action::None);

        let Some(drag_state) = drag_state else {
            continue;
        };
        for nb in field.dims.neighbours(v) {
            if field.state(nb) == drag_state && field.action.get(nb) != Action::ChangeLayer {
                field.set_action(nb, Action::ChangeLayer);
                let dragged = field.arena.acquire(nb, UNQUEUED);
                drag_list.push(dragged);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limn_core::Voxel;
    use limn_grid::VolumeDims;

    /// A straight inward front on a 5-wide line: −1 at x=0, zero at x=1,
    /// rings +1/+2 behind, far beyond.
    fn line_field() -> (VoxelField, ElementIdx) {
        let dims = VolumeDims::new(6, 1, 1).unwrap();
        let mut field = VoxelField::new(dims, 2);
        let mut zero_idx = None;
        for (x, layer) in [(0, -1), (1, 0), (2, 1), (3, 2)] {
            let v = Voxel::new(x, 0, 0);
            field.set_state(v, layer);
            field.phi.set(v, f64::from(layer));
            let idx = field.arena.acquire(v, UNQUEUED);
            field.layers.push(layer, idx);
            field.set_element(v, Some(idx));
            if layer == 0 {
                zero_idx = Some(idx);
            }
        }
        (field, zero_idx.unwrap())
    }

    #[test]
    fn inward_move_cascades_to_the_far_edge() {
        let (mut field, zero_idx) = line_field();
        let mut q = TransitionQueues::default();

        // The zero voxel at x=1 leaves the contour inward.
        let v = field.arena.get(zero_idx).voxel;
        let pos = field
            .layers
            .list(0)
            .iter()
            .position(|&i| i == zero_idx)
            .unwrap();
        field.layers.swap_remove(0, pos);
        field.set_action(v, Action::MoveIn);
        q.move_in.push(zero_idx);

        run_transitions(&mut field, &mut q);

        // Re-labelled front: x=1 → −1, x=2 → 0, x=3 → +1, x=4 adopted → +2.
        assert_eq!(field.state(Voxel::new(1, 0, 0)), -1);
        assert_eq!(field.state(Voxel::new(2, 0, 0)), 0);
        assert_eq!(field.state(Voxel::new(3, 0, 0)), 1);
        assert_eq!(field.state(Voxel::new(4, 0, 0)), 2);
        assert_eq!(field.state(Voxel::new(5, 0, 0)), OUTSIDE_FAR);

        assert!(q.is_empty(), "all drag lists consumed");
        assert_eq!(field.layers().len(0), 1);
        assert_eq!(field.layers().len(2), 2, "old +2 element lingers until the inactive sweep");

        // Every transitioned voxel's action tag is cleared.
        for x in 1..=4 {
            assert_eq!(field.action.get(Voxel::new(x, 0, 0)), Action::None);
        }
    }

    #[test]
    fn drag_is_deduplicated_by_action_tag() {
        // Two zero voxels moving inward share a +1 neighbour; it must be
        // dragged exactly once.
        let dims = VolumeDims::new(3, 3, 1).unwrap();
        let mut field = VoxelField::new(dims, 2);
        let shared = Voxel::new(1, 1, 0);
        field.set_state(shared, 1);
        field.phi.set(shared, 1.0);
        let shared_idx = field.arena.acquire(shared, UNQUEUED);
        field.layers.push(1, shared_idx);
        field.set_element(shared, Some(shared_idx));

        let mut q = TransitionQueues::default();
        for v in [Voxel::new(1, 0, 0), Voxel::new(0, 1, 0)] {
            field.set_state(v, 0);
            let idx = field.arena.acquire(v, UNQUEUED);
            field.set_element(v, Some(idx));
            field.set_action(v, Action::MoveIn);
            q.move_in.push(idx);
        }

        process_layer_change(&mut field, &mut q.move_in, INSIDE, Some(OUTSIDE), &mut q.drag_in);
        assert_eq!(q.drag_in.len(), 1);
        assert_eq!(field.action.get(shared), Action::ChangeLayer);
    }

    #[test]
    fn dragged_voxel_gets_fresh_element_and_orphans_old_one() {
        let (mut field, zero_idx) = line_field();
        let mut q = TransitionQueues::default();
        let old_plus_one = field.element_at(Voxel::new(2, 0, 0)).unwrap();

        let pos = field
            .layers
            .list(0)
            .iter()
            .position(|&i| i == zero_idx)
            .unwrap();
        field.layers.swap_remove(0, pos);
        q.move_in.push(zero_idx);
        run_transitions(&mut field, &mut q);

        let new_zero = field.element_at(Voxel::new(2, 0, 0)).unwrap();
        assert_ne!(new_zero, old_plus_one);
        // The superseded element still sits in the +1 list; its voxel's
        // state no longer matches, which is the orphan sweep's cue.
        assert!(field.layers().list(1).contains(&old_plus_one));
        assert_eq!(field.state(Voxel::new(2, 0, 0)), 0);
    }
}
