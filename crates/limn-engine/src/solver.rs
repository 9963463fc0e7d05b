//! The active-layer pass: PDE evaluation on the zero layer.
//!
//! Every zero-layer voxel gets a delta from the discretized evolution
//! equation. Voxels whose phi would cross the ±0.5 threshold are scheduled
//! to leave the contour; the rest queue a deferred phi commit. All commits
//! are applied only after the whole layer has been evaluated, so every
//! computation in a pass reads pre-iteration values.

use limn_band::ElementIdx;
use limn_core::Voxel;
use limn_grid::ImageVolume;

use crate::field::{Action, VoxelField};
use crate::transition::TransitionQueues;

/// Half-width of the phi band the zero layer occupies.
const PHI_THRESHOLD: f64 = 0.5;

/// Per-pass scalar inputs resolved by the controller.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PassParams {
    pub dt: f64,
    pub advection_weight: f64,
    pub curvature_weight: f64,
    /// `convergence_weight * dt`.
    pub convergence_factor: f64,
    pub noise_floor: f64,
    pub z_scale: f64,
    pub seed_intensity: f64,
}

/// Aggregates of one active-layer pass.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ActiveOutcome {
    pub total_change: f64,
    pub updated: usize,
    pub converged: bool,
}

/// Evaluate the evolution equation on the zero layer and classify every
/// voxel: stay (deferred commit), move inward, or move outward. Movers are
/// parked in the transition queues; the commit queue is drained before
/// returning.
pub(crate) fn update_active_layer(
    field: &mut VoxelField,
    image: &dyn ImageVolume,
    gradients: &[f64],
    params: &PassParams,
    queues: &mut TransitionQueues,
) -> ActiveOutcome {
    let mut total_change = 0.0;
    let mut updated = 0usize;

    let mut pos = 0;
    while pos < field.layers.len(0) {
        let idx = field.layers.list(0)[pos];
        let v = field.arena.get(idx).voxel;

        let image_term = image_term(
            gradients[field.dims.flat_index(v)],
            image.intensity(v),
            params.seed_intensity,
            params.noise_floor,
        );
        let curvature = curvature_term(field, v);
        let advection = advection_term(field, v, params.z_scale);

        let delta = -params.dt
            * image_term
            * (advection * params.advection_weight + curvature * params.curvature_weight);

        total_change += delta.abs();
        updated += 1;

        let temp = field.phi.get(v) + delta;

        if temp < -PHI_THRESHOLD {
            // Crossing inward. A zero-layer neighbour already moving the
            // same way covers this part of the front; wait a pass.
            if neighbour_scheduled(field, v, Action::MoveIn) {
                pos += 1;
                continue;
            }
            tighten_next_layer(field, v, 1, temp, &mut queues.commits);
            field.layers.swap_remove(0, pos);
            queues.move_in.push(idx);
            field.set_action(v, Action::MoveIn);
        } else if temp > PHI_THRESHOLD {
            if neighbour_scheduled(field, v, Action::MoveOut) {
                pos += 1;
                continue;
            }
            tighten_next_layer(field, v, -1, temp, &mut queues.commits);
            field.layers.swap_remove(0, pos);
            queues.move_out.push(idx);
            field.set_action(v, Action::MoveOut);
        } else {
            field.arena.get_mut(idx).value = temp;
            queues.commits.push(idx);
            pos += 1;
        }
    }

    commit_pending(field, &mut queues.commits);

    let converged =
        updated == 0 || (total_change / updated as f64) < params.convergence_factor;

    ActiveOutcome {
        total_change,
        updated,
        converged,
    }
}

/// Apply every queued phi commit. An element queued more than once commits
/// exactly once: the first application resets its value to the sentinel and
/// later occurrences are skipped.
fn commit_pending(field: &mut VoxelField, commits: &mut Vec<ElementIdx>) {
    for idx in commits.drain(..) {
        let elem = *field.arena.get(idx);
        if elem.is_unqueued() {
            continue;
        }
        field.phi.set(elem.voxel, elem.value);
        field.arena.get_mut(idx).value = limn_band::UNQUEUED;
    }
}

/// Whether any zero-layer neighbour of `v` already carries `scheduled`.
fn neighbour_scheduled(field: &VoxelField, v: Voxel, scheduled: Action) -> bool {
    field
        .dims
        .neighbours(v)
        .into_iter()
        .any(|nb| field.state(nb) == 0 && field.action.get(nb) == scheduled)
}

/// A voxel leaving the zero layer toward one side pulls the next layer on
/// the other side (`side` = +1 outward ring for inward movers, −1 for
/// outward movers) up against the contour: their phi is tightened toward
/// `temp ± 1` and queued for the deferred commit.
fn tighten_next_layer(
    field: &mut VoxelField,
    v: Voxel,
    side: i32,
    temp: f64,
    commits: &mut Vec<ElementIdx>,
) {
    for nb in field.dims.neighbours(v) {
        if field.state(nb) != side {
            continue;
        }
        let Some(idx) = field.element_at(nb) else {
            continue;
        };
        let elem = field.arena.get(idx);
        let current = if elem.is_unqueued() {
            f64::from(side) * f64::MAX
        } else {
            elem.value
        };

        if side < 0 {
            let candidate = temp - 1.0;
            if candidate > current {
                field.arena.get_mut(idx).value = candidate;
                commits.push(idx);
            }
        } else {
            let candidate = temp + 1.0;
            if candidate < current {
                field.arena.get_mut(idx).value = candidate;
                commits.push(idx);
            }
        }
    }
}

/// Upwind (Godunov) advection magnitude at `v`.
///
/// Forward and backward differences per axis, each clamped to one-sided
/// wind direction; neighbours outside the volume contribute nothing; the
/// z-axis differences are divided by the slice-spacing ratio.
pub(crate) fn advection_term(field: &VoxelField, v: Voxel, z_scale: f64) -> f64 {
    let cell = field.phi.get(v);

    let back = |nb: Voxel| field.phi_at(nb).map_or(0.0, |p| (cell - p).max(0.0));
    let fwd = |nb: Voxel| field.phi_at(nb).map_or(0.0, |p| (p - cell).min(0.0));
    let back_z = |nb: Voxel| {
        field
            .phi_at(nb)
            .map_or(0.0, |p| ((cell - p) / z_scale).max(0.0))
    };
    let fwd_z = |nb: Voxel| {
        field
            .phi_at(nb)
            .map_or(0.0, |p| ((p - cell) / z_scale).min(0.0))
    };

    let xb = back(v.offset(-1, 0, 0));
    let xf = fwd(v.offset(1, 0, 0));
    let yb = back(v.offset(0, -1, 0));
    let yf = fwd(v.offset(0, 1, 0));
    let zb = back_z(v.offset(0, 0, -1));
    let zf = fwd_z(v.offset(0, 0, 1));

    (xb * xb + xf * xf + yb * yb + yf * yf + zb * zb + zf * zf).sqrt()
}

/// In-slice mean-curvature term at `v`, scaled by `|∇φ|`.
///
/// Central differences over the two in-slice axes only; the third axis is
/// deliberately left out of the stencil. Zero at the x/y volume borders and
/// wherever either first derivative vanishes.
pub(crate) fn curvature_term(field: &VoxelField, v: Voxel) -> f64 {
    let dims = field.dims;
    if v.x == 0 || v.x >= dims.width() as i32 - 1 {
        return 0.0;
    }
    if v.y == 0 || v.y >= dims.height() as i32 - 1 {
        return 0.0;
    }

    let cell = field.phi.get(v);
    let xb = field.phi.get(v.offset(-1, 0, 0));
    let xf = field.phi.get(v.offset(1, 0, 0));
    let yb = field.phi.get(v.offset(0, -1, 0));
    let yf = field.phi.get(v.offset(0, 1, 0));

    let phi_x = (xf - xb) / 2.0;
    let phi_y = (yf - yb) / 2.0;
    if phi_x == 0.0 || phi_y == 0.0 {
        return 0.0;
    }

    let phi_xx = xf + xb - 2.0 * cell;
    let phi_yy = yf + yb - 2.0 * cell;
    let phi_xy = (field.phi.get(v.offset(1, 1, 0)) - field.phi.get(v.offset(1, -1, 0))
        - field.phi.get(v.offset(-1, 1, 0))
        + field.phi.get(v.offset(-1, -1, 0)))
        / 4.0;

    let grad_sq = phi_x * phi_x + phi_y * phi_y;
    let curvature =
        -(phi_xx * phi_y * phi_y + phi_yy * phi_x * phi_x - 2.0 * phi_x * phi_y * phi_xy)
            / grad_sq.powf(1.5);

    curvature * grad_sq.sqrt()
}

/// Image speed term: `1 / (1 + 2·(gradient + penalty))`, where deviation
/// from the seed intensity below the noise floor is not penalized.
pub(crate) fn image_term(gradient: f64, intensity: f64, seed: f64, noise_floor: f64) -> f64 {
    let mut penalty = (intensity - seed).abs();
    if penalty < noise_floor {
        penalty = 0.0;
    }
    1.0 / (1.0 + 2.0 * (gradient + penalty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use limn_band::UNQUEUED;
    use limn_grid::VolumeDims;

    struct FlatImage {
        dims: VolumeDims,
        intensity: f64,
        z_scale: f64,
    }

    impl ImageVolume for FlatImage {
        fn dims(&self) -> VolumeDims {
            self.dims
        }

        fn intensity(&self, _v: Voxel) -> f64 {
            self.intensity
        }

        fn z_scale(&self) -> f64 {
            self.z_scale
        }

        fn gradient_magnitudes(&self) -> Vec<f64> {
            vec![0.0; self.dims.cell_count()]
        }
    }

    fn params() -> PassParams {
        // Default weights: dt * advection_weight = 1/6 exactly.
        let dt = 1.0 / 6.0 / 2.2;
        PassParams {
            dt,
            advection_weight: 2.2,
            curvature_weight: 1.0,
            convergence_factor: 0.005 * dt,
            noise_floor: 30.0,
            z_scale: 1.0,
            seed_intensity: 100.0,
        }
    }

    /// Build a field with explicit (state, phi) per voxel; every listed
    /// tracked voxel gets an element in its layer.
    fn field_from(dims: VolumeDims, cells: &[(Voxel, i32, f64)]) -> VoxelField {
        let mut field = VoxelField::new(dims, 2);
        for &(v, layer, phi) in cells {
            field.set_state(v, layer);
            field.phi.set(v, phi);
            let idx = field.arena.acquire(v, UNQUEUED);
            field.layers.push(layer, idx);
            field.set_element(v, Some(idx));
        }
        field
    }

    #[test]
    fn image_term_applies_noise_floor() {
        // 20 units off the seed: inside the floor, no penalty.
        assert_eq!(image_term(0.0, 120.0, 100.0, 30.0), 1.0);
        // 40 units off: penalized.
        let t = image_term(0.0, 140.0, 100.0, 30.0);
        assert!((t - 1.0 / 81.0).abs() < 1e-12);
        // Gradient alone also damps.
        let t = image_term(2.0, 100.0, 100.0, 30.0);
        assert!((t - 0.2).abs() < 1e-12);
    }

    #[test]
    fn advection_is_one_sided() {
        let dims = VolumeDims::new(3, 3, 3).unwrap();
        let c = Voxel::new(1, 1, 1);
        // Inner neighbour one unit below, outer one unit above: only the
        // backward difference survives the clamps.
        let field = field_from(
            dims,
            &[
                (c, 0, 0.0),
                (Voxel::new(0, 1, 1), -1, -1.0),
                (Voxel::new(2, 1, 1), 1, 1.0),
            ],
        );
        let a = advection_term(&field, c, 1.0);
        assert!((a - 1.0).abs() < 1e-12, "got {a}");
    }

    #[test]
    fn advection_ignores_out_of_volume_neighbours() {
        let dims = VolumeDims::new(2, 1, 1).unwrap();
        let c = Voxel::new(0, 0, 0);
        let field = field_from(dims, &[(c, 0, 0.0), (Voxel::new(1, 0, 0), 1, 1.0)]);
        // The −x neighbour is outside the volume and contributes nothing;
        // the +x forward difference is clamped away (phi rises outward).
        let a = advection_term(&field, c, 1.0);
        assert_eq!(a, 0.0);
    }

    #[test]
    fn advection_scales_z_differences() {
        let dims = VolumeDims::new(1, 1, 3).unwrap();
        let c = Voxel::new(0, 0, 1);
        let field = field_from(
            dims,
            &[(c, 0, 0.0), (Voxel::new(0, 0, 0), -1, -1.0)],
        );
        let a = advection_term(&field, c, 2.0);
        assert!((a - 0.5).abs() < 1e-12, "got {a}");
    }

    #[test]
    fn curvature_zero_at_slice_border() {
        let dims = VolumeDims::new(3, 3, 1).unwrap();
        let field = field_from(dims, &[(Voxel::new(0, 1, 0), 0, 0.0)]);
        assert_eq!(curvature_term(&field, Voxel::new(0, 1, 0)), 0.0);
    }

    #[test]
    fn curvature_zero_when_a_first_derivative_vanishes() {
        let dims = VolumeDims::new(3, 3, 1).unwrap();
        let c = Voxel::new(1, 1, 0);
        // phi varies along x only.
        let field = field_from(
            dims,
            &[
                (c, 0, 0.0),
                (Voxel::new(0, 1, 0), -1, -1.0),
                (Voxel::new(2, 1, 0), 1, 1.0),
            ],
        );
        assert_eq!(curvature_term(&field, c), 0.0);
    }

    #[test]
    fn curvature_of_paraboloid_profile() {
        // phi = x² + y² on the slice around (1, 1): φx = φy = 2,
        // φxx = φyy = 2, φxy = 0 ⇒ κ·|∇φ| = −16/8 = −2.
        let dims = VolumeDims::new(3, 3, 1).unwrap();
        let mut field = VoxelField::new(dims, 2);
        for v in dims.voxels() {
            let phi = (v.x * v.x + v.y * v.y) as f64;
            field.phi.set(v, phi);
        }
        let k = curvature_term(&field, Voxel::new(1, 1, 0));
        assert!((k - (-2.0)).abs() < 1e-12, "got {k}");
    }

    #[test]
    fn commits_read_pre_iteration_values() {
        // Two adjacent zero voxels. The second one's upwind stencil must
        // see the first one's phi as it was before the pass.
        let dims = VolumeDims::new(4, 1, 1).unwrap();
        let a = Voxel::new(1, 0, 0);
        let b = Voxel::new(2, 0, 0);
        let mut field = field_from(
            dims,
            &[
                (Voxel::new(0, 0, 0), -1, -1.0),
                (a, 0, -0.2),
                (b, 0, 0.2),
                (Voxel::new(3, 0, 0), 1, 1.0),
            ],
        );
        let mut queues = TransitionQueues::default();
        let image = FlatImage {
            dims,
            intensity: 100.0,
            z_scale: 1.0,
        };
        let gradients = image.gradient_magnitudes();

        let outcome =
            update_active_layer(&mut field, &image, &gradients, &params(), &mut queues);

        // a: backward diff 0.8 ⇒ delta = −0.8/6; b: backward diff against
        // a's OLD phi 0.4 ⇒ delta = −0.4/6.
        assert!((field.phi(a) - (-0.2 - 0.8 / 6.0)).abs() < 1e-12);
        assert!((field.phi(b) - (0.2 - 0.4 / 6.0)).abs() < 1e-12);
        assert_eq!(outcome.updated, 2);
        assert!(!outcome.converged);
        assert!(queues.move_in.is_empty() && queues.move_out.is_empty());
        assert!(queues.commits.is_empty(), "commit queue must drain");
    }

    #[test]
    fn mover_skips_when_neighbour_already_scheduled_same_direction() {
        // A column front of three zero voxels all crossing −0.5 in one
        // pass: the middle one sees a neighbour scheduled inward first and
        // waits, keeping its phi untouched.
        let dims = VolumeDims::new(4, 3, 1).unwrap();
        let zero = [
            Voxel::new(1, 0, 0),
            Voxel::new(1, 1, 0),
            Voxel::new(1, 2, 0),
        ];
        let mut cells = vec![
            (Voxel::new(0, 0, 0), -1, -1.4),
            (Voxel::new(0, 1, 0), -1, -1.4),
            (Voxel::new(0, 2, 0), -1, -1.4),
            (Voxel::new(2, 0, 0), 1, 0.6),
            (Voxel::new(2, 1, 0), 1, 0.6),
            (Voxel::new(2, 2, 0), 1, 0.6),
        ];
        for v in zero {
            cells.push((v, 0, -0.4));
        }
        let mut field = field_from(dims, &cells);
        let mut queues = TransitionQueues::default();
        let image = FlatImage {
            dims,
            intensity: 100.0,
            z_scale: 1.0,
        };
        let gradients = image.gradient_magnitudes();

        update_active_layer(&mut field, &image, &gradients, &params(), &mut queues);

        // Swap-remove order: (1,0) moves, then (1,2); (1,1) is adjacent to
        // a scheduled mover and stays put.
        assert_eq!(queues.move_in.len(), 2);
        assert_eq!(field.layers().len(0), 1);
        let stayed = field.arena().get(field.layers().list(0)[0]).voxel;
        assert_eq!(stayed, Voxel::new(1, 1, 0));
        assert_eq!(field.phi(stayed), -0.4);

        // The movers tightened their outward neighbours toward the contour.
        let tightened = -0.4 - 1.0 / 6.0 + 1.0;
        assert!((field.phi(Voxel::new(2, 0, 0)) - tightened).abs() < 1e-12);
        assert!((field.phi(Voxel::new(2, 2, 0)) - tightened).abs() < 1e-12);
        assert_eq!(field.phi(Voxel::new(2, 1, 0)), 0.6);
    }

    #[test]
    fn empty_zero_layer_counts_as_converged() {
        let dims = VolumeDims::new(3, 3, 3).unwrap();
        let mut field = VoxelField::new(dims, 2);
        let mut queues = TransitionQueues::default();
        let image = FlatImage {
            dims,
            intensity: 100.0,
            z_scale: 1.0,
        };
        let gradients = image.gradient_magnitudes();

        let outcome =
            update_active_layer(&mut field, &image, &gradients, &params(), &mut queues);
        assert_eq!(outcome.updated, 0);
        assert!(outcome.converged);
    }
}
