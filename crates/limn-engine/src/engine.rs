//! The evolution controller.
//!
//! [`SparseFieldEngine`] owns initialization, the per-call iteration
//! budget, convergence and failure detection, and the state accessors
//! collaborators read. Construction validates configuration and geometry;
//! the first [`step`](SparseFieldEngine::step) call performs the one-time
//! band initialization from the seed classification.

use std::io;

use limn_core::{EvolveError, LayerCoords, ProgressEvent, ProgressSink};
use limn_grid::{ImageVolume, SeedMap, VolumeDims};

use crate::config::{ConfigError, EvolveConfig, SeedSource};
use crate::consistency::{check_field, ConsistencyWarning};
use crate::dump;
use crate::field::{SeedStats, VoxelField};
use crate::inactive::update_inactive_layers;
use crate::metrics::EvolveMetrics;
use crate::snapshot::StateSnapshot;
use crate::solver::{update_active_layer, PassParams};
use crate::transition::{run_transitions, TransitionQueues};

/// Lifecycle of a [`SparseFieldEngine`].
///
/// `Converged` and `Invalid` are terminal: once reached, further `step`
/// calls return `false` without touching the volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Constructed; the band has not been built yet.
    Uninitialized,
    /// Band built, evolution in progress.
    Running,
    /// The mean change fell below the convergence threshold.
    Converged,
    /// The seed was empty or the evolution went numerically unstable.
    Invalid,
}

/// Narrow-band level-set evolution engine.
///
/// Drives an implicit contour toward object boundaries in a 3D volume,
/// touching only the thin band of voxels around the contour. Call
/// [`step`](Self::step) repeatedly until it returns `false`, then inspect
/// [`phase`](Self::phase), [`state_map`](Self::state_map), or
/// [`state_snapshot`](Self::state_snapshot).
pub struct SparseFieldEngine {
    image: Box<dyn ImageVolume>,
    seed: Option<SeedMap>,
    progress: Option<Box<dyn ProgressSink>>,
    config: EvolveConfig,
    dt: f64,
    convergence_factor: f64,
    z_scale: f64,
    seed_intensity: f64,
    field: VoxelField,
    gradients: Vec<f64>,
    queues: TransitionQueues,
    metrics: EvolveMetrics,
    phase: Phase,
    failure: Option<EvolveError>,
}

impl SparseFieldEngine {
    /// Create an engine over `image`, starting from the `seed`
    /// classification, with constructor-time tunables.
    ///
    /// Fails on invalid tunables, on an image/seed extent mismatch, or on
    /// a non-positive slice-spacing ratio. Seed *content* is validated
    /// lazily by the first [`step`](Self::step) call.
    pub fn new(
        image: Box<dyn ImageVolume>,
        seed: SeedMap,
        config: EvolveConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let dims = image.dims();
        if seed.dims() != dims {
            return Err(ConfigError::DimsMismatch {
                image: dims,
                seed: seed.dims(),
            });
        }
        let z_scale = image.z_scale();
        if !z_scale.is_finite() || z_scale <= 0.0 {
            return Err(ConfigError::InvalidZScale { value: z_scale });
        }

        let dt = config.resolved_time_step();
        let convergence_factor = config.convergence_weight * dt;
        let field = VoxelField::new(dims, config.band_half_width);

        Ok(Self {
            image,
            seed: Some(seed),
            progress: None,
            config,
            dt,
            convergence_factor,
            z_scale,
            seed_intensity: 0.0,
            field,
            gradients: Vec::new(),
            queues: TransitionQueues::default(),
            metrics: EvolveMetrics::default(),
            phase: Phase::Uninitialized,
            failure: None,
        })
    }

    /// Attach an observer that receives one event per iteration.
    pub fn set_progress_sink(&mut self, sink: Box<dyn ProgressSink>) {
        self.progress = Some(sink);
    }

    /// Run up to `granularity` iterations.
    ///
    /// Returns `true` while further stepping is meaningful, `false` once
    /// the engine converged or failed. The first call performs the one-time
    /// initialization; an empty seed classification makes it return `false`
    /// immediately with the engine `Invalid`.
    pub fn step(&mut self, granularity: u32) -> bool {
        match self.phase {
            Phase::Invalid | Phase::Converged => return false,
            Phase::Uninitialized => {
                if !self.init() {
                    return false;
                }
            }
            Phase::Running => {}
        }

        let params = PassParams {
            dt: self.dt,
            advection_weight: self.config.advection_weight,
            curvature_weight: self.config.curvature_weight,
            convergence_factor: self.convergence_factor,
            noise_floor: self.config.intensity_noise_floor,
            z_scale: self.z_scale,
            seed_intensity: self.seed_intensity,
        };

        for _ in 0..granularity {
            let outcome = update_active_layer(
                &mut self.field,
                &*self.image,
                &self.gradients,
                &params,
                &mut self.queues,
            );
            run_transitions(&mut self.field, &mut self.queues);
            update_inactive_layers(&mut self.field);

            self.metrics.record_iteration(
                outcome.total_change,
                outcome.updated,
                self.field.layers().sizes(),
                self.field.arena().live_count(),
            );
            self.emit_progress();

            if outcome.converged {
                self.phase = Phase::Converged;
                break;
            }
        }

        // An exploding contour shows up as NaN in the change accumulator.
        // Irrecoverable; stop the engine for good.
        if self.metrics.total_change.is_nan() {
            log::error!("numerical instability: total change became NaN, stopping evolution");
            self.phase = Phase::Invalid;
            self.failure = Some(EvolveError::NumericalInstability);
            self.release_working_state();
            return false;
        }

        if self.phase == Phase::Converged {
            log::info!(
                "converged after {} iterations (mean change {:.3e})",
                self.metrics.iterations,
                self.metrics.mean_change
            );
            self.release_working_state();
            return false;
        }

        true
    }

    /// One-time band construction from the seed classification.
    fn init(&mut self) -> bool {
        let Some(seed) = self.seed.take() else {
            return true;
        };

        let stats = self.field.build_active_layer(&seed, &*self.image);
        log::info!(
            "seed classification: {} zero, {} inside, {} outside",
            stats.zero,
            stats.inside,
            stats.outside
        );

        if stats.zero == 0 && stats.inside == 0 {
            log::error!("no starting shape: seed classification is empty");
            self.phase = Phase::Invalid;
            self.failure = Some(EvolveError::InvalidSeed);
            return false;
        }

        self.seed_intensity = resolve_seed_intensity(&seed, &stats, self.config.seed_source);
        if seed.seed_intensity().is_none() {
            log::info!("derived seed intensity {}", self.seed_intensity);
        }

        self.gradients = self.image.gradient_magnitudes();
        debug_assert_eq!(
            self.gradients.len(),
            self.field.dims().cell_count(),
            "gradient volume extent mismatch"
        );

        self.field.build_inactive_rings();
        self.phase = Phase::Running;
        log::debug!("sparse field initialized, dt = {}", self.dt);
        self.emit_progress();
        true
    }

    fn emit_progress(&mut self) {
        let Some(sink) = self.progress.as_mut() else {
            return;
        };
        let mut layers = Vec::new();
        for layer in self.field.layers().layer_range() {
            let voxels = self
                .field
                .layers()
                .list(layer)
                .iter()
                .map(|&idx| self.field.arena().get(idx).voxel)
                .collect();
            layers.push(LayerCoords { layer, voxels });
        }
        sink.on_iteration(&ProgressEvent {
            iteration: self.metrics.iterations,
            mean_change: self.metrics.mean_change,
            layers,
        });
    }

    fn release_working_state(&mut self) {
        self.field.release_working_state();
        self.gradients = Vec::new();
    }

    /// The engine's lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The terminal failure, if the engine is `Invalid`.
    pub fn failure(&self) -> Option<EvolveError> {
        self.failure
    }

    /// The volume extent.
    pub fn dims(&self) -> VolumeDims {
        self.field.dims()
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &EvolveConfig {
        &self.config
    }

    /// Metrics of the most recent iteration.
    pub fn metrics(&self) -> &EvolveMetrics {
        &self.metrics
    }

    /// The dense per-voxel classification in canonical order: a layer
    /// index for tracked voxels, a far sentinel otherwise. Valid in every
    /// phase, including after termination.
    pub fn state_map(&self) -> &[i32] {
        self.field.state_map()
    }

    /// Snapshot of the tracked-layer classification, or the terminal
    /// failure once the engine is `Invalid`.
    pub fn state_snapshot(&self) -> Result<StateSnapshot, EvolveError> {
        if self.phase == Phase::Invalid {
            return Err(self.failure.unwrap_or(EvolveError::InvalidSeed));
        }
        Ok(StateSnapshot::from_state_map(
            self.field.dims(),
            self.field.state_map(),
        ))
    }

    /// Run the diagnostic invariant sweep, logging and returning every
    /// violation. Never alters engine state.
    pub fn check_consistency(&self) -> Vec<ConsistencyWarning> {
        let warnings = check_field(&self.field);
        for warning in &warnings {
            log::warn!("consistency: {warning}");
        }
        warnings
    }

    /// Write the full state grid as plain text (far sentinels encoded
    /// as ±9).
    pub fn dump_state_map<W: io::Write>(&self, writer: W) -> io::Result<()> {
        dump::dump_state_map(self.field.dims(), self.field.state_map(), writer)
    }
}

/// Explicit seed intensity wins; otherwise the mean over the configured
/// population, falling back to the other population when that one is
/// empty. At least one is non-empty or the engine never gets here.
fn resolve_seed_intensity(seed: &SeedMap, stats: &SeedStats, source: SeedSource) -> f64 {
    if let Some(explicit) = seed.seed_intensity() {
        return explicit;
    }
    let zero_mean = (stats.zero > 0).then(|| stats.zero_intensity / stats.zero as f64);
    let inside_mean = (stats.inside > 0).then(|| stats.inside_intensity / stats.inside as f64);
    let derived = match source {
        SeedSource::Zero => zero_mean.or(inside_mean),
        SeedSource::Inside => inside_mean.or(zero_mean),
    };
    derived.unwrap_or(0.0)
}
