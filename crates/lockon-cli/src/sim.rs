//! Simulated tracking engine for the demo loop.
//!
//! Plays the role of the native image-tracking engine: it loads tracking
//! data for whichever candidate the scanner points it at, "sees" one
//! scripted candidate after a configurable number of ticks, then streams
//! jittered pose updates with an optional transient occlusion mid-stream.
//! Candidates listed in [`SimOptions::corrupt_candidates`] fail their load
//! and report an engine error instead.

use lockon_scanner::{LoadState, TrackingEngine};
use lockon_types::{LockonError, Pose, TargetDescriptor, TrackerEvent, Vec3};
use rand::prelude::*;
use std::collections::VecDeque;
use tracing::debug;
use uuid::Uuid;

use crate::config::SimOptions;

/// Build a synthetic target inventory for the demo.
pub fn synthetic_inventory(count: usize) -> Vec<TargetDescriptor> {
    (0..count)
        .map(|n| TargetDescriptor {
            id: Uuid::new_v4(),
            project: "demo".to_string(),
            tracking_data_url: format!("sim://targets/poster-{n}.mind"),
            media: Vec::new(),
        })
        .collect()
}

/// A scripted [`TrackingEngine`] driven one [`SimulatedEngine::step`] per tick.
pub struct SimulatedEngine {
    options: SimOptions,
    inventory: Vec<TargetDescriptor>,
    queue: VecDeque<TrackerEvent>,
    /// Candidate the scanner most recently pointed us at.
    current: Option<(usize, Uuid)>,
    load_state: LoadState,
    /// Ticks spent looking at the visible candidate without a detection yet.
    ticks_on_visible: u32,
    tracking: Option<Uuid>,
    poses_streamed: u32,
    drop_remaining: u32,
    anchor: Pose,
    rng: ThreadRng,
}

impl SimulatedEngine {
    pub fn new(options: SimOptions, inventory: Vec<TargetDescriptor>) -> Self {
        Self {
            options,
            inventory,
            queue: VecDeque::new(),
            current: None,
            load_state: LoadState::Ready,
            ticks_on_visible: 0,
            tracking: None,
            poses_streamed: 0,
            drop_remaining: 0,
            anchor: Pose::new(Vec3::new(0.0, 0.0, 0.6), Vec3::new(0.0, 15.0, 0.0)),
            rng: rand::thread_rng(),
        }
    }

    /// Advance the simulation by one tick, queueing whatever the "camera"
    /// produced for the session to drain.
    pub fn step(&mut self) {
        let Some((index, target_id)) = self.current else {
            return;
        };

        if self.options.corrupt_candidates.contains(&index) {
            if self.load_state != LoadState::Failed {
                self.load_state = LoadState::Failed;
                self.queue.push_back(TrackerEvent::EngineError {
                    target_id,
                    message: format!("unreadable feature data for candidate {index}"),
                });
            }
            return;
        }

        // Loads complete one tick after the attempt starts.
        if self.load_state == LoadState::Loading {
            self.load_state = LoadState::Ready;
        }

        if let Some(tracked) = self.tracking {
            self.step_tracked(tracked);
            return;
        }

        if index == self.options.visible_candidate {
            self.ticks_on_visible += 1;
            if self.ticks_on_visible >= self.options.attempts_before_found {
                debug!(%target_id, "simulated camera acquired the target");
                self.tracking = Some(target_id);
                self.poses_streamed = 0;
                self.queue.push_back(TrackerEvent::TargetFound { target_id });
            }
        }
    }

    fn step_tracked(&mut self, target_id: Uuid) {
        if self.drop_remaining > 0 {
            self.drop_remaining -= 1;
            if self.drop_remaining == 0 {
                debug!(%target_id, "occlusion cleared; target re-acquired");
                self.queue.push_back(TrackerEvent::TargetFound { target_id });
            }
            return;
        }

        self.poses_streamed += 1;
        if self.options.poses_before_drop > 0 && self.poses_streamed == self.options.poses_before_drop
        {
            debug!(%target_id, "simulated occlusion; tracking dropped");
            self.drop_remaining = self.options.drop_duration_ticks.max(1);
            self.queue.push_back(TrackerEvent::TargetLost { target_id });
            return;
        }

        let pose = self.jittered_pose();
        self.queue.push_back(TrackerEvent::PoseUpdate { pose });
    }

    /// Anchor pose plus hand-shake noise, with a slow sideways drift.
    fn jittered_pose(&mut self) -> Pose {
        let drift = self.poses_streamed as f32 * 0.0004;
        let j = |rng: &mut ThreadRng| rng.gen_range(-0.002..0.002);
        let r = |rng: &mut ThreadRng| rng.gen_range(-0.3..0.3);
        Pose::new(
            Vec3::new(
                self.anchor.position.x + drift + j(&mut self.rng),
                self.anchor.position.y + j(&mut self.rng),
                self.anchor.position.z + j(&mut self.rng),
            ),
            Vec3::new(
                self.anchor.rotation_deg.x + r(&mut self.rng),
                self.anchor.rotation_deg.y + r(&mut self.rng),
                self.anchor.rotation_deg.z + r(&mut self.rng),
            ),
        )
    }
}

impl TrackingEngine for SimulatedEngine {
    fn attempt_target(&mut self, target: &TargetDescriptor) -> Result<(), LockonError> {
        let index = self
            .inventory
            .iter()
            .position(|t| t.id == target.id)
            .ok_or_else(|| LockonError::CorruptTarget {
                target_id: target.id,
                details: "target not in the simulated inventory".to_string(),
            })?;

        if self.current.map(|(_, id)| id) != Some(target.id) {
            self.current = Some((index, target.id));
            self.load_state = LoadState::Loading;
            self.ticks_on_visible = 0;
        }
        Ok(())
    }

    fn load_state(&self) -> LoadState {
        self.load_state
    }

    fn drain_events(&mut self) -> Vec<TrackerEvent> {
        self.queue.drain(..).collect()
    }
}
