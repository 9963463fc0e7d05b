//! Integration test: the empty-seed failure path.
//!
//! A classification with no ZERO and no INSIDE voxels gives the engine no
//! starting contour. The first `step` call must fail fast — terminal
//! `Invalid` phase, no PDE pass, no panic — and the snapshot accessor must
//! surface the error.

use limn_core::{EvolveError, OUTSIDE_FAR};
use limn_engine::{EvolveConfig, Phase, SparseFieldEngine};
use limn_grid::{SeedMap, VolumeDims};
use limn_test_utils::FlatVolume;

fn empty_seed_engine() -> SparseFieldEngine {
    let dims = VolumeDims::new(4, 4, 4).unwrap();
    let image = FlatVolume::new(dims, 50.0);
    let seed = SeedMap::new(dims); // everything OUTSIDE
    SparseFieldEngine::new(Box::new(image), seed, EvolveConfig::default()).unwrap()
}

#[test]
fn first_step_returns_false_and_invalidates() {
    let mut engine = empty_seed_engine();
    assert!(!engine.step(10));
    assert_eq!(engine.phase(), Phase::Invalid);
    assert_eq!(engine.failure(), Some(EvolveError::InvalidSeed));
    assert_eq!(engine.metrics().iterations, 0, "no PDE pass may run");
}

#[test]
fn snapshot_yields_the_terminal_error() {
    let mut engine = empty_seed_engine();
    engine.step(1);
    assert_eq!(engine.state_snapshot().unwrap_err(), EvolveError::InvalidSeed);
}

#[test]
fn invalid_is_terminal_across_calls() {
    let mut engine = empty_seed_engine();
    assert!(!engine.step(1));
    for _ in 0..3 {
        assert!(!engine.step(100));
        assert_eq!(engine.phase(), Phase::Invalid);
    }
}

#[test]
fn state_map_stays_readable_after_failure() {
    let mut engine = empty_seed_engine();
    engine.step(1);
    assert!(engine.state_map().iter().all(|&tag| tag == OUTSIDE_FAR));

    let mut out = Vec::new();
    engine.dump_state_map(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("4 4 4\n\n"));
    assert!(text.contains("9 9 9 9"));
}
