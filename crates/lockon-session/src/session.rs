//! [`ArSession`] – the per-session orchestrator.
//!
//! Owns one [`TargetScanner`], one [`PoseSmoother`], one [`VisibilityGate`],
//! and the [`SessionBus`] the rendering/content layer subscribes to.  One
//! instance exists per AR session; the host's loop drives it by calling
//! [`ArSession::tick`] once per poll interval.
//!
//! # Tick ordering
//!
//! Each tick runs three phases in a fixed order:
//!
//! 1. **Drain** the engine's event queue.  Found/lost signals therefore
//!    always preempt scheduled deadlines: a re-find cancels a pending hide
//!    and a pending candidate switch before either can fire.
//! 2. **Fire** the visibility gate's hide deadline, if it elapsed.
//! 3. **Advance** the scanner (attempt counting, candidate switching).
//!
//! No phase suspends mid-update; the whole tick is synchronous.

use lockon_perception::PoseSmoother;
use lockon_scanner::{ScannerSnapshot, TargetScanner, TrackingEngine};
use lockon_types::{LockonError, Pose, SessionEvent, SessionNotice, TargetDescriptor, TrackerEvent};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bus::{Lane, SessionBus};
use crate::config::SessionConfig;
use crate::hysteresis::VisibilityGate;

const SRC_SCANNER: &str = "lockon-session::scanner";
const SRC_SMOOTHER: &str = "lockon-session::smoother";
const SRC_VISIBILITY: &str = "lockon-session::visibility";

/// One AR session: scanner + smoother + visibility gate behind a bus.
///
/// Construct with [`ArSession::new`], subscribe to [`ArSession::bus`], call
/// [`ArSession::start`] once, then [`ArSession::tick`] at the configured poll
/// interval until [`ArSession::stop`].
pub struct ArSession {
    scanner: TargetScanner,
    smoother: PoseSmoother,
    gate: VisibilityGate,
    bus: SessionBus,
}

impl ArSession {
    /// Build a session over the target inventory.
    ///
    /// # Errors
    ///
    /// Returns [`LockonError::EmptyInventory`] when `targets` is empty.
    pub fn new(targets: Vec<TargetDescriptor>, config: SessionConfig) -> Result<Self, LockonError> {
        config.validate();
        Ok(Self {
            scanner: TargetScanner::new(targets, config.scanner())?,
            smoother: PoseSmoother::new(config.smoother()),
            gate: VisibilityGate::new(config.hide_delay()),
            bus: SessionBus::default(),
        })
    }

    /// A clone of the session bus for subscribing to output events.
    pub fn bus(&self) -> SessionBus {
        self.bus.clone()
    }

    /// Observable scanner state.
    pub fn scanner_state(&self) -> ScannerSnapshot {
        self.scanner.current_state()
    }

    /// Current lock-stability scalar in `[0, 1]`.
    pub fn stability(&self) -> f32 {
        self.smoother.stability()
    }

    /// Whether projected content is currently shown.
    pub fn is_visible(&self) -> bool {
        self.gate.is_visible()
    }

    /// Begin scanning.  Idempotent.
    pub fn start(&mut self, engine: &mut dyn TrackingEngine) {
        self.scanner.start(engine);
    }

    /// Tear the session down: stop the scanner, cancel every pending
    /// deadline, and hide content if it was shown.
    pub fn stop(&mut self) {
        info!("session stopping");
        self.scanner.stop();
        if self.gate.is_visible() {
            self.publish(
                Lane::Pose,
                SRC_VISIBILITY,
                SessionEvent::VisibilityChanged { visible: false },
            );
        }
        self.gate.cancel();
        self.smoother.reset();
    }

    /// Advance the session by one poll tick.
    pub fn tick(&mut self, engine: &mut dyn TrackingEngine) {
        // Phase 1: drain the engine queue so found/lost signals preempt any
        // deadline that would otherwise fire this tick.
        for event in engine.drain_events() {
            match event {
                TrackerEvent::TargetFound { target_id } => self.handle_found(target_id),
                TrackerEvent::TargetLost { target_id } => self.handle_lost(target_id),
                TrackerEvent::PoseUpdate { pose } => self.handle_pose(pose),
                TrackerEvent::EngineError { target_id, message } => {
                    warn!(%target_id, %message, "engine reported corrupt tracking data");
                    self.scanner.fail_candidate(engine, target_id);
                }
            }
        }

        // Phase 2: hide deadline.
        if let Some(visible) = self.gate.tick() {
            self.publish(
                Lane::Pose,
                SRC_VISIBILITY,
                SessionEvent::VisibilityChanged { visible },
            );
        }

        // Phase 3: scan loop.
        self.scanner.tick(engine);
    }

    // -------------------------------------------------------------------------
    // Engine event handlers
    // -------------------------------------------------------------------------

    fn handle_found(&mut self, target_id: Uuid) {
        let Some(target) = self.scanner.find_target(target_id).cloned() else {
            warn!(%target_id, "found event for a target not in the inventory; ignored");
            return;
        };

        let previously_locked = self.scanner.current_state().locked_target;
        self.scanner.lock(target.clone());
        let now_locked = self.scanner.current_state().locked_target;

        if now_locked != Some(target_id) {
            // The scanner refused the lock (idle session); nothing to show.
            return;
        }

        if previously_locked != Some(target_id) {
            if previously_locked.is_some() {
                // Lock replacement: close out the old target's lifecycle
                // before announcing the new one, so subscribers never see
                // nested locks.
                self.publish(Lane::Lifecycle, SRC_SCANNER, SessionEvent::Unlocked);
            }
            // A genuinely new lock: restart the filter and announce it so
            // the content layer can begin fetching this target's bundle.
            self.smoother.reset();
            self.publish(
                Lane::Lifecycle,
                SRC_SCANNER,
                SessionEvent::Locked { target },
            );
        }

        if let Some(visible) = self.gate.on_found() {
            self.publish(
                Lane::Pose,
                SRC_VISIBILITY,
                SessionEvent::VisibilityChanged { visible },
            );
        }
    }

    fn handle_lost(&mut self, target_id: Uuid) {
        if self.scanner.current_state().locked_target != Some(target_id) {
            debug!(%target_id, "lost event for a target that is not locked; ignored");
            return;
        }
        self.scanner.unlock();
        self.smoother.note_loss();
        self.gate.on_lost();
        self.publish(Lane::Lifecycle, SRC_SCANNER, SessionEvent::Unlocked);
    }

    fn handle_pose(&mut self, pose: Pose) {
        self.smoother.note_tracked_tick();
        if !self.gate.is_visible() {
            // Content is hidden; rendering has nothing to apply a pose to.
            return;
        }
        if let Some(smoothed) = self.smoother.ingest(pose) {
            self.publish(
                Lane::Pose,
                SRC_SMOOTHER,
                SessionEvent::SmoothedPose { pose: smoothed },
            );
        }
    }

    /// Best-effort publish: a bus with no subscribers is a normal condition.
    fn publish(&self, lane: Lane, source: &str, event: SessionEvent) {
        let _ = self.bus.publish_to(lane, SessionNotice::new(source, event));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
