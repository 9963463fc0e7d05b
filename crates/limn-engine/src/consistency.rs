//! Diagnostic-only invariant checks over the band.
//!
//! These checks are instrumentation for debugging and tests: they report
//! violations but never alter control flow, and the engine never calls them
//! on its own hot path.

use std::fmt;

use limn_core::Voxel;

use crate::field::VoxelField;

/// Zero-layer phi is expected to stay inside this band after a commit.
const ZERO_PHI_TOLERANCE: f64 = 0.55;

/// A violated band invariant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConsistencyWarning {
    /// An element sits in a layer list whose index differs from its
    /// voxel's state tag.
    LayerStateMismatch {
        /// The offending voxel.
        voxel: Voxel,
        /// The list it was found in.
        layer: i32,
        /// The tag the state map holds.
        state: i32,
    },
    /// A non-zero layer's phi has the wrong sign for its side.
    PhiSideMismatch {
        /// The offending voxel.
        voxel: Voxel,
        /// Its layer.
        layer: i32,
        /// The out-of-place phi value.
        phi: f64,
    },
    /// A zero-layer phi strayed outside the tolerance band around zero.
    ZeroPhiOutOfBand {
        /// The offending voxel.
        voxel: Voxel,
        /// The out-of-place phi value.
        phi: f64,
    },
    /// A tracked voxel's lookup-table entry does not point at its element.
    LookupMismatch {
        /// The offending voxel.
        voxel: Voxel,
        /// Its layer.
        layer: i32,
    },
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LayerStateMismatch {
                voxel,
                layer,
                state,
            } => write!(
                f,
                "voxel {voxel} in layer {layer} list but state tag is {state}"
            ),
            Self::PhiSideMismatch { voxel, layer, phi } => {
                write!(f, "voxel {voxel} in layer {layer} has phi {phi}")
            }
            Self::ZeroPhiOutOfBand { voxel, phi } => {
                write!(f, "zero-layer voxel {voxel} has phi {phi}")
            }
            Self::LookupMismatch { voxel, layer } => {
                write!(f, "voxel {voxel} in layer {layer} has a stale lookup entry")
            }
        }
    }
}

/// Sweep every layer list and report invariant violations.
pub(crate) fn check_field(field: &VoxelField) -> Vec<ConsistencyWarning> {
    let mut warnings = Vec::new();

    for layer in field.layers().layer_range() {
        for &idx in field.layers().list(layer) {
            let voxel = field.arena().get(idx).voxel;
            let state = field.state(voxel);
            if state != layer {
                warnings.push(ConsistencyWarning::LayerStateMismatch {
                    voxel,
                    layer,
                    state,
                });
                continue;
            }
            if field.element_at(voxel) != Some(idx) {
                warnings.push(ConsistencyWarning::LookupMismatch { voxel, layer });
            }
            let phi = field.phi(voxel);
            if (layer < 0 && phi > 0.0) || (layer > 0 && phi < 0.0) {
                warnings.push(ConsistencyWarning::PhiSideMismatch { voxel, layer, phi });
            }
            if layer == 0 && phi.abs() > ZERO_PHI_TOLERANCE {
                warnings.push(ConsistencyWarning::ZeroPhiOutOfBand { voxel, phi });
            }
        }
    }

    warnings
}
