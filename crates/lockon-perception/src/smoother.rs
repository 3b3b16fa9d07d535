//! [`PoseSmoother`] – raw-pose jitter filter.
//!
//! Converts the stream of raw pose samples the tracking engine emits at camera
//! frame rate (noisy, re-estimated every frame) into a stream of visually
//! stable poses, without introducing perceptible lag.
//!
//! # Pipeline
//!
//! Each raw sample passes through three stages, applied independently to
//! position and rotation (with angle normalization for rotation):
//!
//! 1. **Dead zone** – deltas below a small threshold relative to the last
//!    *accepted* pose are treated as sensor noise and discarded outright.
//! 2. **Velocity clamp** – the per-sample velocity relative to the previous
//!    *raw* sample is clamped to a maximum magnitude, suppressing single-frame
//!    misdetection spikes while leaving genuine fast motion intact (the clamp
//!    only looks one step back).
//! 3. **Exponential smoothing** – the accepted value is interpolated toward
//!    the filtered sample by a deliberately small factor.
//!
//! A stability scalar in `[0, 1]` grows with consecutive tracked ticks and
//! relaxes the smoothing factor within a narrow band once the lock is well
//! established.
//!
//! # Example
//!
//! ```rust
//! use lockon_perception::smoother::{PoseSmoother, SmootherConfig};
//! use lockon_types::{Pose, Vec3};
//!
//! let mut smoother = PoseSmoother::new(SmootherConfig::default());
//!
//! // The first sample of a lock passes through unchanged.
//! let first = Pose::new(Vec3::new(0.0, 0.0, 1.0), Vec3::zero());
//! assert_eq!(smoother.ingest(first), Some(first));
//!
//! // Sub-dead-zone jitter is discarded entirely.
//! let jitter = Pose::new(Vec3::new(0.0001, 0.0, 1.0), Vec3::zero());
//! assert_eq!(smoother.ingest(jitter), None);
//! ```

use lockon_types::{Pose, Vec3};
use tracing::trace;

use crate::angles::{normalize_rotation, rotation_delta};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Tunable thresholds for [`PoseSmoother`].
///
/// Defaults are empirically tuned starting points, not load-bearing precise
/// values; retune them against the actual tracking engine in use.
#[derive(Debug, Clone, Copy)]
pub struct SmootherConfig {
    /// Position deltas below this magnitude (length units) are discarded.
    pub position_dead_zone: f32,
    /// Rotation deltas below this magnitude (degrees) are discarded.
    pub rotation_dead_zone_deg: f32,
    /// Maximum position change per update (length units).
    pub max_position_velocity: f32,
    /// Maximum rotation change per update (degrees).
    pub max_rotation_velocity_deg: f32,
    /// Base interpolation factor for position.  Small = heavy smoothing.
    pub position_smoothing: f32,
    /// Base interpolation factor for rotation.
    pub rotation_smoothing: f32,
    /// Extra factor added at full stability.  The effective factor is
    /// `base + stability * band`, hard-capped well below 1.0.
    pub smoothing_relax_band: f32,
    /// Consecutive tracked ticks required before stability starts ramping.
    pub min_stable_frames: u32,
    /// Stability added per tracked tick beyond [`Self::min_stable_frames`].
    pub stability_gain: f32,
    /// Stability removed on a loss after the threshold was reached.
    pub stability_decay: f32,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            position_dead_zone: 0.0005,
            rotation_dead_zone_deg: 0.1,
            max_position_velocity: 0.01,
            max_rotation_velocity_deg: 2.0,
            position_smoothing: 0.05,
            rotation_smoothing: 0.04,
            smoothing_relax_band: 0.03,
            min_stable_frames: 3,
            stability_gain: 0.1,
            stability_decay: 0.05,
        }
    }
}

/// Hard upper bound on the effective smoothing factor.  A factor anywhere
/// near 1.0 would reintroduce the raw jitter the filter exists to remove.
const MAX_SMOOTHING_FACTOR: f32 = 0.25;

// ────────────────────────────────────────────────────────────────────────────
// PoseSmoother
// ────────────────────────────────────────────────────────────────────────────

/// Low-pass filter over raw tracking poses.
///
/// Feed raw samples with [`PoseSmoother::ingest`]; report tracking outcomes
/// with [`PoseSmoother::note_tracked_tick`] / [`PoseSmoother::note_loss`] so
/// the stability ramp can adjust the smoothing factor.  Call
/// [`PoseSmoother::reset`] when a new lock is established.
#[derive(Debug)]
pub struct PoseSmoother {
    config: SmootherConfig,
    /// Last pose accepted through the full pipeline.  `None` until the first
    /// sample of a lock arrives.
    last_accepted: Option<Pose>,
    /// Previous raw sample, used for the one-step velocity clamp.
    last_raw: Option<Pose>,
    /// Confidence in the current lock, in `[0, 1]`.
    stability: f32,
    /// Consecutive tracked ticks since the last loss.
    consecutive_ticks: u32,
    /// `true` once the lock has ever survived `min_stable_frames` ticks.
    reached_threshold: bool,
}

impl PoseSmoother {
    pub fn new(config: SmootherConfig) -> Self {
        Self {
            config,
            last_accepted: None,
            last_raw: None,
            stability: 0.0,
            consecutive_ticks: 0,
            reached_threshold: false,
        }
    }

    /// Clear the filter memory (accepted pose, raw-velocity reference).
    ///
    /// Called on a new lock so the filter snaps to the first raw sample
    /// instead of interpolating from a stale pose.  The stability scalar is
    /// deliberately kept: its own gain/decay rules already handle losses, and
    /// a re-lock bridged by the visibility hysteresis should not forfeit the
    /// confidence built up so far.
    pub fn reset(&mut self) {
        self.last_accepted = None;
        self.last_raw = None;
        self.consecutive_ticks = 0;
    }

    /// Current stability scalar in `[0, 1]`.
    pub fn stability(&self) -> f32 {
        self.stability
    }

    /// Last pose accepted through the pipeline, if any.
    pub fn last_accepted(&self) -> Option<Pose> {
        self.last_accepted
    }

    /// Previous raw sample as retained for the velocity clamp (post-clamp).
    pub fn last_raw(&self) -> Option<Pose> {
        self.last_raw
    }

    /// Record one successful tracking tick.
    ///
    /// Stability starts growing once the lock has survived
    /// `min_stable_frames` consecutive ticks.
    pub fn note_tracked_tick(&mut self) {
        self.consecutive_ticks += 1;
        if self.consecutive_ticks >= self.config.min_stable_frames {
            self.reached_threshold = true;
            self.stability = (self.stability + self.config.stability_gain).min(1.0);
        }
    }

    /// Record a raw tracking loss.
    ///
    /// A loss before the lock ever reached `min_stable_frames` resets
    /// stability to zero; afterwards each loss only decays it by
    /// `stability_decay`.
    pub fn note_loss(&mut self) {
        self.consecutive_ticks = 0;
        if self.reached_threshold {
            self.stability = (self.stability - self.config.stability_decay).max(0.0);
        } else {
            self.stability = 0.0;
        }
    }

    /// Run one raw sample through the pipeline.
    ///
    /// Returns the new smoothed pose, or `None` if the sample fell entirely
    /// inside the dead zone and was discarded (the caller should not update
    /// rendering).  The first sample after construction or [`reset`][Self::reset]
    /// is accepted verbatim.
    pub fn ingest(&mut self, raw: Pose) -> Option<Pose> {
        let raw = Pose::new(raw.position, normalize_rotation(raw.rotation_deg));

        let (accepted, prev_raw) = match (self.last_accepted, self.last_raw) {
            (Some(a), Some(r)) => (a, r),
            _ => {
                // First sample of a lock: snap to it.
                self.last_accepted = Some(raw);
                self.last_raw = Some(raw);
                return Some(raw);
            }
        };

        // ── 1. Dead zone (relative to the last accepted pose) ───────────────
        let pos_delta = raw.position.sub(accepted.position).magnitude();
        let rot_delta = rotation_delta(accepted.rotation_deg, raw.rotation_deg).magnitude();
        let pos_active = pos_delta >= self.config.position_dead_zone;
        let rot_active = rot_delta >= self.config.rotation_dead_zone_deg;
        if !pos_active && !rot_active {
            trace!(pos_delta, rot_delta, "sample inside dead zone; discarded");
            return None;
        }

        // ── 2. Velocity clamp (relative to the previous raw sample) ─────────
        let filtered_position = if pos_active {
            clamp_step(
                prev_raw.position,
                raw.position.sub(prev_raw.position),
                self.config.max_position_velocity,
            )
        } else {
            prev_raw.position
        };
        let filtered_rotation = if rot_active {
            normalize_rotation(clamp_step(
                prev_raw.rotation_deg,
                rotation_delta(prev_raw.rotation_deg, raw.rotation_deg),
                self.config.max_rotation_velocity_deg,
            ))
        } else {
            prev_raw.rotation_deg
        };

        // ── 3. Exponential smoothing toward the filtered sample ─────────────
        let position = if pos_active {
            let step = filtered_position.sub(accepted.position);
            accepted
                .position
                .add(step.scale(self.effective_factor(self.config.position_smoothing)))
        } else {
            accepted.position
        };
        let rotation_deg = if rot_active {
            let step = rotation_delta(accepted.rotation_deg, filtered_rotation);
            normalize_rotation(
                accepted
                    .rotation_deg
                    .add(step.scale(self.effective_factor(self.config.rotation_smoothing))),
            )
        } else {
            accepted.rotation_deg
        };

        let smoothed = Pose::new(position, rotation_deg);
        self.last_accepted = Some(smoothed);
        self.last_raw = Some(Pose::new(filtered_position, filtered_rotation));
        Some(smoothed)
    }

    /// Effective interpolation factor: the base relaxed by stability, bounded
    /// so it can never approach 1.0.
    fn effective_factor(&self, base: f32) -> f32 {
        (base + self.stability * self.config.smoothing_relax_band).min(MAX_SMOOTHING_FACTOR)
    }
}

/// Clamp a single-step delta to `max` magnitude and apply it to `from`.
///
/// Deltas at or below the maximum pass through unchanged; larger ones are
/// scaled back so the effective step is exactly `max` in the same direction.
fn clamp_step(from: Vec3, delta: Vec3, max: f32) -> Vec3 {
    let magnitude = delta.magnitude();
    if magnitude <= max || magnitude == 0.0 {
        from.add(delta)
    } else {
        from.add(delta.scale(max / magnitude))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
