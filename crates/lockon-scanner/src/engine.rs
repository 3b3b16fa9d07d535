//! Generic `TrackingEngine` trait – the boundary to the external tracker.
//!
//! The real tracker is an already-compiled library that consumes the camera
//! stream; nothing in this workspace reimplements it.  Integrations wrap it
//! behind this trait so the scanner can drive candidate attempts and the
//! session can drain its event queue deterministically each poll tick,
//! instead of reacting to ad-hoc callbacks.

use lockon_types::{LockonError, TargetDescriptor, TrackerEvent};

/// Progress of the engine's load of the most recently attempted target.
///
/// The underlying tracker offers no native "give up" signal, so integrations
/// are required to surface an explicit load state rather than forcing callers
/// to poke at engine internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Compiled tracking data is still being fetched/decoded.
    Loading,
    /// The attempted target is loaded and being matched against the feed.
    Ready,
    /// The load failed; the candidate cannot succeed and should be skipped.
    Failed,
}

/// An external image-tracking engine.
///
/// Implementations queue [`TrackerEvent`]s internally; the session drains the
/// queue once per poll tick via [`TrackingEngine::drain_events`], which keeps
/// event ordering and cancellation explicit.
pub trait TrackingEngine {
    /// Begin attempting to match `target` against the live camera feed,
    /// replacing any previously attempted target.
    ///
    /// # Errors
    ///
    /// Returns [`LockonError::CorruptTarget`] if the compiled tracking data
    /// is rejected synchronously (malformed descriptor, decode failure).
    fn attempt_target(&mut self, target: &TargetDescriptor) -> Result<(), LockonError>;

    /// Load progress of the most recently attempted target.
    fn load_state(&self) -> LoadState;

    /// Remove and return every event queued since the last drain, oldest
    /// first.
    fn drain_events(&mut self) -> Vec<TrackerEvent>;
}
