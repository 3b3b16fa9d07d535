//! Headless broadcast bus for session output events.
//!
//! Uses [`tokio::sync::broadcast`] channels so every subscriber receives
//! every notice without any single subscriber blocking the others.
//!
//! # Lanes
//!
//! Traffic is partitioned into two [`Lane`]s so consumers only receive what
//! they care about:
//!
//! | Lane | Typical traffic |
//! |---|---|
//! | [`Lane::Pose`] | High-frequency smoothed poses and visibility flips |
//! | [`Lane::Lifecycle`] | Low-frequency lock/unlock notices that trigger content loading |

use lockon_types::{LockonError, SessionNotice};
use tokio::sync::broadcast;
use tracing::warn;

/// Default per-lane channel capacity (buffered notices before the oldest are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// Routing lanes on the session bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Smoothed pose stream and visibility transitions, at poll-tick rate.
    Pose,
    /// Lock/unlock notices used to kick off media/UI fetches.
    Lifecycle,
}

/// Shared session bus.  Clone it cheaply – all clones share the same
/// underlying broadcast channels.
#[derive(Clone, Debug)]
pub struct SessionBus {
    pose: broadcast::Sender<SessionNotice>,
    lifecycle: broadcast::Sender<SessionNotice>,
}

impl SessionBus {
    /// Create a bus with the given capacity, applied to each lane
    /// independently.
    pub fn new(capacity: usize) -> Self {
        let (pose, _) = broadcast::channel(capacity);
        let (lifecycle, _) = broadcast::channel(capacity);
        Self { pose, lifecycle }
    }

    /// Publish `notice` to a [`Lane`].
    ///
    /// Returns the number of active receivers the notice reached.
    ///
    /// # Errors
    ///
    /// Returns [`LockonError::Channel`] when no subscriber is listening on
    /// the lane.  The session publishes best-effort and ignores this.
    pub fn publish_to(&self, lane: Lane, notice: SessionNotice) -> Result<usize, LockonError> {
        self.lane_sender(lane)
            .send(notice)
            .map_err(|_| LockonError::Channel(format!("no subscribers on lane {lane:?}")))
    }

    /// Subscribe to a [`Lane`].
    pub fn subscribe_to(&self, lane: Lane) -> LaneReceiver {
        LaneReceiver {
            lane,
            receiver: self.lane_sender(lane).subscribe(),
        }
    }

    fn lane_sender(&self, lane: Lane) -> &broadcast::Sender<SessionNotice> {
        match lane {
            Lane::Pose => &self.pose,
            Lane::Lifecycle => &self.lifecycle,
        }
    }
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// An async receiver bound to a single [`Lane`].
pub struct LaneReceiver {
    lane: Lane,
    receiver: broadcast::Receiver<SessionNotice>,
}

impl LaneReceiver {
    /// Wait for the next notice on this lane.
    ///
    /// A slow subscriber that falls behind sees
    /// [`broadcast::error::RecvError::Lagged`]; the number of dropped
    /// notices is logged and the caller decides whether to continue.
    pub async fn recv(&mut self) -> Result<SessionNotice, broadcast::error::RecvError> {
        match self.receiver.recv().await {
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(lane = ?self.lane, lagged_by = n, "session bus subscriber lagged");
                Err(broadcast::error::RecvError::Lagged(n))
            }
            other => other,
        }
    }

    /// Non-blocking receive, for use inside synchronous tick loops.
    pub fn try_recv(&mut self) -> Result<SessionNotice, broadcast::error::TryRecvError> {
        self.receiver.try_recv()
    }

    /// The [`Lane`] this receiver is bound to.
    pub fn lane(&self) -> Lane {
        self.lane
    }
}
