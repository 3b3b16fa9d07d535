//! [`TargetScanner`] – candidate-cycling state machine.
//!
//! When no target is locked the scanner walks the target inventory, asking
//! the [`TrackingEngine`] to attempt each candidate in turn until the engine
//! signals a match.  While locked it does nothing; when the lock is released
//! it waits out a short settle delay and resumes cycling.
//!
//! # State machine
//!
//! - `Idle → Scanning` on [`TargetScanner::start`] (session initialization).
//! - `Scanning → Scanning` (candidate switch) once the current candidate has
//!   been attempted for `max_attempts_per_target` poll ticks AND at least
//!   `min_switch_interval` has elapsed since the last switch.  Switching the
//!   active target is an expensive engine operation, so it is rate limited
//!   independently of the attempt counter.
//! - `Scanning → Locked` on a found signal: clears the attempt counter,
//!   cancels the pending switch deadline, records the descriptor.
//! - `Locked → Scanning` on a lost signal, with a `resume_scan_delay` settle
//!   period before cycling actually resumes.
//! - any state `→ Idle` on [`TargetScanner::stop`], cancelling every pending
//!   deadline.
//!
//! The scan loop polls on a fixed short interval rather than waiting for
//! engine callbacks: the engine's own load/attempt cycle has no native
//! "give up" signal, so the scanner imposes its own per-candidate timeout.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut scanner = TargetScanner::new(targets, ScannerConfig::default())?;
//! scanner.start(&mut engine);
//! loop {
//!     scanner.tick(&mut engine); // once per poll interval
//! }
//! ```

use std::time::{Duration, Instant};

use lockon_types::{LockonError, TargetDescriptor};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::{LoadState, TrackingEngine};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Timing and retry knobs for [`TargetScanner`].
#[derive(Debug, Clone, Copy)]
pub struct ScannerConfig {
    /// Poll ticks to spend on one candidate before switching.
    pub max_attempts_per_target: u32,
    /// Minimum wall-clock spacing between candidate switches.
    pub min_switch_interval: Duration,
    /// How long a candidate load may stay in [`LoadState::Loading`] before it
    /// is assumed loaded and normal polling continues.
    pub candidate_switch_timeout: Duration,
    /// Settle period between losing a lock and resuming the scan loop, so a
    /// momentary engine redetection does not thrash.
    pub resume_scan_delay: Duration,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_attempts_per_target: 5,
            min_switch_interval: Duration::from_millis(300),
            candidate_switch_timeout: Duration::from_secs(5),
            resume_scan_delay: Duration::from_millis(500),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public types
// ────────────────────────────────────────────────────────────────────────────

/// The scanner's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Not running; no candidate is in flight.
    Idle,
    /// Cycling candidates against the engine.
    Scanning,
    /// Holding a lock on one target; cycling is suspended.
    Locked,
}

/// Observable scanner state, returned by [`TargetScanner::current_state`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerSnapshot {
    pub state: ScanState,
    pub locked_target: Option<Uuid>,
    pub candidate_index: usize,
    pub attempts: u32,
    /// Raw lost signals since the last successful lock (diagnostic).
    pub consecutive_losses: u32,
    pub total_switches: u64,
    pub total_locks: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// TargetScanner
// ────────────────────────────────────────────────────────────────────────────

/// Cycles the target inventory against the tracking engine until a lock.
///
/// One instance exists per AR session.  All deadlines are plain [`Instant`]
/// fields cleared on state-exiting transitions, so [`TargetScanner::stop`]
/// deterministically guarantees no further work happens.
pub struct TargetScanner {
    targets: Vec<TargetDescriptor>,
    config: ScannerConfig,
    state: ScanState,
    /// Index of the candidate currently in flight (wraps modulo inventory).
    candidate: usize,
    /// Poll ticks spent on the current candidate; reset on every switch.
    attempts: u32,
    /// When the most recent candidate switch happened (rate limiting).
    last_switch: Option<Instant>,
    /// When the in-flight candidate's engine load began; `None` once the
    /// load is confirmed (or assumed) complete.
    switch_started: Option<Instant>,
    /// When scanning may resume after a lost lock.
    resume_at: Option<Instant>,
    locked: Option<TargetDescriptor>,
    consecutive_losses: u32,
    total_switches: u64,
    total_locks: u64,
}

impl TargetScanner {
    /// Create a scanner over `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`LockonError::EmptyInventory`] when `targets` is empty.
    pub fn new(targets: Vec<TargetDescriptor>, config: ScannerConfig) -> Result<Self, LockonError> {
        if targets.is_empty() {
            return Err(LockonError::EmptyInventory);
        }
        Ok(Self {
            targets,
            config,
            state: ScanState::Idle,
            candidate: 0,
            attempts: 0,
            last_switch: None,
            switch_started: None,
            resume_at: None,
            locked: None,
            consecutive_losses: 0,
            total_switches: 0,
            total_locks: 0,
        })
    }

    /// The immutable target inventory.
    pub fn targets(&self) -> &[TargetDescriptor] {
        &self.targets
    }

    /// Look up a descriptor by id.
    pub fn find_target(&self, id: Uuid) -> Option<&TargetDescriptor> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Observable state for diagnostics and tests.
    pub fn current_state(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            state: self.state,
            locked_target: self.locked.as_ref().map(|t| t.id),
            candidate_index: self.candidate,
            attempts: self.attempts,
            consecutive_losses: self.consecutive_losses,
            total_switches: self.total_switches,
            total_locks: self.total_locks,
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Begin scanning.  Idempotent: a scanner that is already scanning or
    /// holding a lock is left untouched.
    pub fn start(&mut self, engine: &mut dyn TrackingEngine) {
        if self.state != ScanState::Idle {
            return;
        }
        info!(candidates = self.targets.len(), "scanner starting");
        self.state = ScanState::Scanning;
        self.begin_attempt(engine);
    }

    /// Stop scanning from any state, cancelling every pending deadline so no
    /// stale tick can fire into a torn-down session.
    pub fn stop(&mut self) {
        self.state = ScanState::Idle;
        self.locked = None;
        self.attempts = 0;
        self.switch_started = None;
        self.resume_at = None;
        self.last_switch = None;
    }

    /// Record that the engine matched `target`.
    ///
    /// Normally driven by a found event; externally triggerable for tests.
    /// No-op when already locked to the same descriptor, and ignored while
    /// idle (a stopped session must not spring back to life on a stale
    /// engine event).
    pub fn lock(&mut self, target: TargetDescriptor) {
        if self.state == ScanState::Idle {
            debug!(target_id = %target.id, "found event while idle; ignored");
            return;
        }
        if let Some(current) = &self.locked
            && current.id == target.id
        {
            return;
        }
        info!(target_id = %target.id, project = %target.project, "target locked");
        self.state = ScanState::Locked;
        self.locked = Some(target);
        self.attempts = 0;
        self.switch_started = None;
        self.resume_at = None;
        self.consecutive_losses = 0;
        self.total_locks += 1;
    }

    /// Record that the engine lost the locked target.
    ///
    /// Begins the resume-after-delay sequence; scanning actually restarts
    /// once `resume_scan_delay` has elapsed.  No-op when not locked.
    pub fn unlock(&mut self) {
        if self.state != ScanState::Locked {
            return;
        }
        let target_id = self.locked.as_ref().map(|t| t.id);
        self.consecutive_losses += 1;
        debug!(
            ?target_id,
            consecutive_losses = self.consecutive_losses,
            "lock released; scan resumes after settle delay"
        );
        self.locked = None;
        self.state = ScanState::Scanning;
        self.attempts = 0;
        self.resume_at = Some(Instant::now() + self.config.resume_scan_delay);
    }

    /// React to an engine decode error for `target_id`.
    ///
    /// Corrupt tracking data cannot succeed on retry, so if the error names
    /// the in-flight candidate its attempt budget is exhausted on the spot
    /// and the scanner advances immediately, bypassing both the per-candidate
    /// tick budget and the switch rate limit.
    pub fn fail_candidate(&mut self, engine: &mut dyn TrackingEngine, target_id: Uuid) {
        if self.state != ScanState::Scanning {
            return;
        }
        if self.targets[self.candidate].id != target_id {
            debug!(%target_id, "engine error for a non-current candidate; ignored");
            return;
        }
        warn!(%target_id, "corrupt tracking data; skipping candidate");
        self.advance_candidate(engine);
    }

    // -------------------------------------------------------------------------
    // Poll tick
    // -------------------------------------------------------------------------

    /// Advance the scan loop by one poll tick.
    ///
    /// Does nothing while idle or locked: the scanner never requests a
    /// candidate switch while a lock is held.
    pub fn tick(&mut self, engine: &mut dyn TrackingEngine) {
        if self.state != ScanState::Scanning {
            return;
        }
        let now = Instant::now();

        // Settle delay after a lost lock.
        if let Some(resume_at) = self.resume_at {
            if now < resume_at {
                return;
            }
            self.resume_at = None;
            debug!("settle delay elapsed; resuming scan");
            self.begin_attempt(engine);
            return;
        }

        // Supervise an in-flight candidate load.
        if let Some(started) = self.switch_started {
            match engine.load_state() {
                LoadState::Failed => {
                    warn!(
                        target_id = %self.targets[self.candidate].id,
                        "candidate load failed; advancing"
                    );
                    self.advance_candidate(engine);
                    return;
                }
                LoadState::Ready => {
                    self.switch_started = None;
                }
                LoadState::Loading => {
                    if now.duration_since(started) >= self.config.candidate_switch_timeout {
                        // The engine gives no definitive "still loading"
                        // signal past this point; assume loaded and let the
                        // per-candidate attempt budget decide.
                        debug!(
                            target_id = %self.targets[self.candidate].id,
                            "candidate load exceeded switch timeout; assuming loaded"
                        );
                        self.switch_started = None;
                    } else {
                        // The attempt budget measures matching ticks, not
                        // load time; it pauses until the load resolves or
                        // the switch timeout fires.
                        return;
                    }
                }
            }
        }

        self.attempts += 1;
        let interval_elapsed = self
            .last_switch
            .is_none_or(|t| now.duration_since(t) >= self.config.min_switch_interval);
        if self.attempts >= self.config.max_attempts_per_target && interval_elapsed {
            self.advance_candidate(engine);
        }
    }

    // -------------------------------------------------------------------------
    // Private helpers
    // -------------------------------------------------------------------------

    /// Attempt the current candidate without advancing the index.  Used on
    /// start and when resuming after a lost lock.
    fn begin_attempt(&mut self, engine: &mut dyn TrackingEngine) {
        self.attempts = 0;
        let target = &self.targets[self.candidate];
        match engine.attempt_target(target) {
            Ok(()) => self.switch_started = Some(Instant::now()),
            Err(e) => {
                warn!(target_id = %target.id, error = %e, "candidate rejected; skipping");
                self.advance_candidate(engine);
            }
        }
    }

    /// Move to the next candidate (wrapping) and hand it to the engine.
    ///
    /// Candidates whose descriptors are rejected synchronously are skipped;
    /// after one full pass with nothing accepted the scanner stays put and
    /// retries on a later tick rather than spinning.
    fn advance_candidate(&mut self, engine: &mut dyn TrackingEngine) {
        let now = Instant::now();
        for _ in 0..self.targets.len() {
            self.candidate = (self.candidate + 1) % self.targets.len();
            self.attempts = 0;
            let target = &self.targets[self.candidate];
            match engine.attempt_target(target) {
                Ok(()) => {
                    debug!(
                        candidate_index = self.candidate,
                        target_id = %target.id,
                        "attempting next candidate"
                    );
                    // A switch is counted only when a candidate is actually
                    // handed to the engine; rejected descriptors are skips.
                    self.last_switch = Some(now);
                    self.total_switches += 1;
                    self.switch_started = Some(now);
                    return;
                }
                Err(e) => {
                    warn!(target_id = %target.id, error = %e, "candidate rejected; skipping");
                }
            }
        }
        warn!("every candidate in the inventory was rejected; retrying next cycle");
        self.switch_started = None;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use lockon_types::TrackerEvent;
    use std::collections::HashSet;

    struct MockEngine {
        /// Every target id handed to `attempt_target`, in order.
        attempted: Vec<Uuid>,
        /// Ids rejected synchronously with a corrupt-data error.
        reject: HashSet<Uuid>,
        state: LoadState,
    }

    impl MockEngine {
        fn new() -> Self {
            Self {
                attempted: Vec::new(),
                reject: HashSet::new(),
                state: LoadState::Ready,
            }
        }
    }

    impl TrackingEngine for MockEngine {
        fn attempt_target(&mut self, target: &TargetDescriptor) -> Result<(), LockonError> {
            self.attempted.push(target.id);
            if self.reject.contains(&target.id) {
                return Err(LockonError::CorruptTarget {
                    target_id: target.id,
                    details: "mock rejection".to_string(),
                });
            }
            Ok(())
        }

        fn load_state(&self) -> LoadState {
            self.state
        }

        fn drain_events(&mut self) -> Vec<TrackerEvent> {
            Vec::new()
        }
    }

    fn descriptor(n: u32) -> TargetDescriptor {
        TargetDescriptor {
            id: Uuid::new_v4(),
            project: "test".to_string(),
            tracking_data_url: format!("mem://target-{n}.mind"),
            media: Vec::new(),
        }
    }

    fn inventory(count: u32) -> Vec<TargetDescriptor> {
        (0..count).map(descriptor).collect()
    }

    /// Config with the rate limit disabled, for deterministic tick tests.
    fn fast_config() -> ScannerConfig {
        ScannerConfig {
            max_attempts_per_target: 5,
            min_switch_interval: Duration::ZERO,
            candidate_switch_timeout: Duration::from_secs(5),
            resume_scan_delay: Duration::from_millis(500),
        }
    }

    // ── Construction ────────────────────────────────────────────────────────

    #[test]
    fn empty_inventory_is_rejected() {
        let result = TargetScanner::new(Vec::new(), ScannerConfig::default());
        assert_eq!(result.err(), Some(LockonError::EmptyInventory));
    }

    #[test]
    fn new_scanner_is_idle() {
        let scanner = TargetScanner::new(inventory(2), ScannerConfig::default()).unwrap();
        let snap = scanner.current_state();
        assert_eq!(snap.state, ScanState::Idle);
        assert_eq!(snap.candidate_index, 0);
        assert!(snap.locked_target.is_none());
    }

    // ── start / stop ────────────────────────────────────────────────────────

    #[test]
    fn start_attempts_first_candidate() {
        let targets = inventory(3);
        let first = targets[0].id;
        let mut scanner = TargetScanner::new(targets, fast_config()).unwrap();
        let mut engine = MockEngine::new();

        scanner.start(&mut engine);
        assert_eq!(scanner.current_state().state, ScanState::Scanning);
        assert_eq!(engine.attempted, vec![first]);
    }

    #[test]
    fn start_is_idempotent() {
        let mut scanner = TargetScanner::new(inventory(2), fast_config()).unwrap();
        let mut engine = MockEngine::new();
        scanner.start(&mut engine);
        scanner.start(&mut engine);
        assert_eq!(engine.attempted.len(), 1, "second start must not re-attempt");
    }

    #[test]
    fn stop_cancels_all_pending_deadlines() {
        let targets = inventory(2);
        let mut scanner = TargetScanner::new(targets.clone(), fast_config()).unwrap();
        let mut engine = MockEngine::new();
        scanner.start(&mut engine);
        scanner.lock(targets[0].clone());
        scanner.unlock(); // arms resume_at

        scanner.stop();
        assert_eq!(scanner.current_state().state, ScanState::Idle);
        assert!(scanner.resume_at.is_none());
        assert!(scanner.switch_started.is_none());

        // Ticking an idle scanner does nothing.
        let attempts_before = engine.attempted.len();
        for _ in 0..10 {
            scanner.tick(&mut engine);
        }
        assert_eq!(engine.attempted.len(), attempts_before);
    }

    // ── Candidate cycling ───────────────────────────────────────────────────

    #[test]
    fn sixteen_ticks_with_three_targets_wraps_back_to_first() {
        // 3 candidates, 5 attempts each, no rate limit: 16 ticks without a
        // found event must switch exactly 3 times (5, 5, 5, 1 remaining) and
        // wrap 0 → 1 → 2 → 0.
        let mut scanner = TargetScanner::new(inventory(3), fast_config()).unwrap();
        let mut engine = MockEngine::new();
        scanner.start(&mut engine);

        for _ in 0..16 {
            scanner.tick(&mut engine);
        }

        let snap = scanner.current_state();
        assert_eq!(snap.total_switches, 3);
        assert_eq!(snap.candidate_index, 0);
        assert_eq!(snap.attempts, 1);
    }

    #[test]
    fn switch_rate_limit_defers_candidate_change() {
        let config = ScannerConfig {
            max_attempts_per_target: 1,
            min_switch_interval: Duration::from_secs(3600),
            ..fast_config()
        };
        let mut scanner = TargetScanner::new(inventory(2), config).unwrap();
        let mut engine = MockEngine::new();
        scanner.start(&mut engine);

        // First switch is allowed (no previous switch recorded).
        scanner.tick(&mut engine);
        assert_eq!(scanner.current_state().candidate_index, 1);

        // Attempts keep exhausting but the interval gate holds the candidate.
        for _ in 0..10 {
            scanner.tick(&mut engine);
        }
        assert_eq!(scanner.current_state().candidate_index, 1);

        // Backdating the last switch releases the gate.
        scanner.last_switch = Some(Instant::now() - Duration::from_secs(3601));
        scanner.tick(&mut engine);
        assert_eq!(scanner.current_state().candidate_index, 0);
    }

    // ── Lock / unlock ───────────────────────────────────────────────────────

    #[test]
    fn never_switches_while_locked() {
        let targets = inventory(3);
        let mut scanner = TargetScanner::new(targets.clone(), fast_config()).unwrap();
        let mut engine = MockEngine::new();
        scanner.start(&mut engine);
        scanner.lock(targets[0].clone());

        let attempted_before = engine.attempted.len();
        for _ in 0..100 {
            scanner.tick(&mut engine);
        }
        let snap = scanner.current_state();
        assert_eq!(snap.state, ScanState::Locked);
        assert_eq!(snap.total_switches, 0);
        assert_eq!(engine.attempted.len(), attempted_before);
    }

    #[test]
    fn lock_records_descriptor_and_clears_attempt_state() {
        let targets = inventory(2);
        let mut scanner = TargetScanner::new(targets.clone(), fast_config()).unwrap();
        let mut engine = MockEngine::new();
        scanner.start(&mut engine);
        scanner.tick(&mut engine);
        scanner.lock(targets[0].clone());

        let snap = scanner.current_state();
        assert_eq!(snap.state, ScanState::Locked);
        assert_eq!(snap.locked_target, Some(targets[0].id));
        assert_eq!(snap.attempts, 0);
        assert_eq!(snap.total_locks, 1);
        assert!(scanner.switch_started.is_none());
    }

    #[test]
    fn relock_same_target_is_noop() {
        let targets = inventory(1);
        let mut scanner = TargetScanner::new(targets.clone(), fast_config()).unwrap();
        let mut engine = MockEngine::new();
        scanner.start(&mut engine);
        scanner.lock(targets[0].clone());
        scanner.lock(targets[0].clone());
        assert_eq!(scanner.current_state().total_locks, 1);
    }

    #[test]
    fn lock_while_idle_is_ignored() {
        let targets = inventory(1);
        let mut scanner = TargetScanner::new(targets.clone(), fast_config()).unwrap();
        scanner.lock(targets[0].clone());
        assert_eq!(scanner.current_state().state, ScanState::Idle);
        assert_eq!(scanner.current_state().total_locks, 0);
    }

    #[test]
    fn unlock_when_not_locked_is_noop() {
        let mut scanner = TargetScanner::new(inventory(1), fast_config()).unwrap();
        scanner.unlock();
        assert_eq!(scanner.current_state().state, ScanState::Idle);
        assert_eq!(scanner.current_state().consecutive_losses, 0);
    }

    #[test]
    fn unlock_waits_out_settle_delay_before_resuming() {
        let targets = inventory(2);
        let mut scanner = TargetScanner::new(targets.clone(), fast_config()).unwrap();
        let mut engine = MockEngine::new();
        scanner.start(&mut engine);
        scanner.lock(targets[0].clone());
        scanner.unlock();

        // Within the settle window no attempt is issued.
        let before = engine.attempted.len();
        scanner.tick(&mut engine);
        assert_eq!(engine.attempted.len(), before);
        assert_eq!(scanner.current_state().state, ScanState::Scanning);

        // Backdating the resume deadline simulates the delay elapsing.
        scanner.resume_at = Some(Instant::now() - Duration::from_millis(1));
        scanner.tick(&mut engine);
        assert_eq!(engine.attempted.len(), before + 1);
        assert_eq!(*engine.attempted.last().unwrap(), targets[0].id);
    }

    #[test]
    fn unlock_increments_consecutive_losses_and_lock_resets_them() {
        let targets = inventory(1);
        let mut scanner = TargetScanner::new(targets.clone(), fast_config()).unwrap();
        let mut engine = MockEngine::new();
        scanner.start(&mut engine);

        scanner.lock(targets[0].clone());
        scanner.unlock();
        scanner.lock(targets[0].clone());
        scanner.unlock();
        assert_eq!(scanner.current_state().consecutive_losses, 1);

        scanner.lock(targets[0].clone());
        assert_eq!(scanner.current_state().consecutive_losses, 0);
    }

    // ── Failure handling ────────────────────────────────────────────────────

    #[test]
    fn engine_error_advances_without_waiting_out_attempts() {
        // Engine error on attempt #1 of candidate 0 must switch to candidate
        // 1 immediately, not after max_attempts_per_target ticks.
        let targets = inventory(3);
        let config = ScannerConfig {
            min_switch_interval: Duration::from_secs(3600), // fail-fast bypasses this
            ..fast_config()
        };
        let mut scanner = TargetScanner::new(targets.clone(), config).unwrap();
        let mut engine = MockEngine::new();
        scanner.start(&mut engine);
        scanner.tick(&mut engine); // attempt #1

        scanner.fail_candidate(&mut engine, targets[0].id);
        let snap = scanner.current_state();
        assert_eq!(snap.candidate_index, 1);
        assert_eq!(snap.attempts, 0);
        assert_eq!(*engine.attempted.last().unwrap(), targets[1].id);
    }

    #[test]
    fn engine_error_for_non_current_candidate_is_ignored() {
        let targets = inventory(2);
        let mut scanner = TargetScanner::new(targets.clone(), fast_config()).unwrap();
        let mut engine = MockEngine::new();
        scanner.start(&mut engine);

        scanner.fail_candidate(&mut engine, targets[1].id);
        assert_eq!(scanner.current_state().candidate_index, 0);
    }

    #[test]
    fn synchronously_rejected_candidate_is_skipped() {
        let targets = inventory(3);
        let mut engine = MockEngine::new();
        engine.reject.insert(targets[1].id);
        let mut scanner = TargetScanner::new(targets.clone(), fast_config()).unwrap();
        scanner.start(&mut engine);

        // Exhaust candidate 0; the switch must land on 2, skipping corrupt 1.
        for _ in 0..5 {
            scanner.tick(&mut engine);
        }
        let snap = scanner.current_state();
        assert_eq!(snap.candidate_index, 2);
        // The skipped descriptor is not a candidate change.
        assert_eq!(snap.total_switches, 1);
    }

    #[test]
    fn all_candidates_rejected_does_not_spin_forever() {
        let targets = inventory(2);
        let mut engine = MockEngine::new();
        engine.reject.insert(targets[0].id);
        engine.reject.insert(targets[1].id);
        let mut scanner = TargetScanner::new(targets, fast_config()).unwrap();
        scanner.start(&mut engine);
        // One pass over the inventory per advance, then give up until later.
        for _ in 0..10 {
            scanner.tick(&mut engine);
        }
        assert_eq!(scanner.current_state().state, ScanState::Scanning);
    }

    #[test]
    fn failed_load_state_advances_immediately() {
        let targets = inventory(2);
        let mut scanner = TargetScanner::new(targets.clone(), fast_config()).unwrap();
        let mut engine = MockEngine::new();
        scanner.start(&mut engine);

        engine.state = LoadState::Failed;
        scanner.tick(&mut engine);
        // The candidate index must have moved on the very first tick.
        assert_eq!(scanner.current_state().candidate_index, 1);
        assert_eq!(*engine.attempted.last().unwrap(), targets[1].id);
    }

    #[test]
    fn attempt_budget_pauses_while_candidate_is_loading() {
        // 5 attempt ticks against a 5 s switch timeout: a slow load must not
        // burn the attempt budget, or the candidate would be cycled away
        // before the timeout could ever matter.
        let targets = inventory(2);
        let mut scanner = TargetScanner::new(targets, fast_config()).unwrap();
        let mut engine = MockEngine::new();
        engine.state = LoadState::Loading;
        scanner.start(&mut engine);

        for _ in 0..20 {
            scanner.tick(&mut engine);
        }
        let snap = scanner.current_state();
        assert_eq!(snap.candidate_index, 0, "loading candidate must not be cycled away");
        assert_eq!(snap.attempts, 0);
        assert_eq!(snap.total_switches, 0);

        // Once the load completes the budget runs as normal.
        engine.state = LoadState::Ready;
        for _ in 0..5 {
            scanner.tick(&mut engine);
        }
        assert_eq!(scanner.current_state().candidate_index, 1);
    }

    #[test]
    fn slow_load_is_assumed_loaded_after_switch_timeout() {
        let targets = inventory(2);
        let config = ScannerConfig {
            candidate_switch_timeout: Duration::from_millis(10),
            ..fast_config()
        };
        let mut scanner = TargetScanner::new(targets, config).unwrap();
        let mut engine = MockEngine::new();
        engine.state = LoadState::Loading;
        scanner.start(&mut engine);

        // Backdate the load start past the timeout.
        scanner.switch_started = Some(Instant::now() - Duration::from_millis(11));
        scanner.tick(&mut engine);
        assert!(
            scanner.switch_started.is_none(),
            "load must be assumed complete after the switch timeout"
        );
        // Normal per-candidate polling continued.
        assert_eq!(scanner.current_state().attempts, 1);
    }
}
