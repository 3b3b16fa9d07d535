use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// What kind of content a [`MediaItem`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

/// One piece of content attached to a target's media bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Original filename, e.g. `"mascot_idle.png"`.
    pub filename: String,
    pub kind: MediaKind,
    /// Where the content can be fetched from (URL or path).
    pub locator: String,
}

/// An opaque handle to one compiled image-tracking target plus its associated
/// media bundle.
///
/// Descriptors are loaded once at session start from an external inventory and
/// are immutable for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    pub id: Uuid,
    /// Owning user / project scope, e.g. `"orange-demo"`.
    pub project: String,
    /// Locator for the compiled tracking data the engine loads.
    pub tracking_data_url: String,
    /// Ordered content bundle shown once the target locks.
    pub media: Vec<MediaItem>,
}

/// A 3-D vector used for both positions (length units) and rotations
/// (degrees, one angle per axis).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Euclidean length.
    pub fn magnitude(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

/// A momentary pose reported by the tracking engine: position in length units,
/// rotation as per-axis Euler angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation_deg: Vec3,
}

impl Pose {
    pub fn new(position: Vec3, rotation_deg: Vec3) -> Self {
        Self {
            position,
            rotation_deg,
        }
    }
}

/// Events the external tracking engine delivers to the session.
///
/// The engine queues these internally; the session drains the queue at the
/// start of every poll tick so that found/lost signals are always processed
/// before any scheduled deadline fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum TrackerEvent {
    /// The engine matched the target it was attempting.
    TargetFound { target_id: Uuid },
    /// The engine can no longer see the matched target.
    TargetLost { target_id: Uuid },
    /// Continuous pose stream, delivered while a target is matched.
    PoseUpdate { pose: Pose },
    /// The engine failed to decode the target's compiled tracking data.
    EngineError { target_id: Uuid, message: String },
}

/// Events the session exposes to the rendering / content layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Projected content should be shown or hidden.  Fires only on actual
    /// transitions, after the hide-delay hysteresis has been applied.
    VisibilityChanged { visible: bool },
    /// A filtered pose suitable for rendering.  Delivered only while visible.
    SmoothedPose { pose: Pose },
    /// The scanner locked onto a target; content loading may begin.
    Locked { target: TargetDescriptor },
    /// The raw lock was released.  Visibility may persist until the
    /// hide delay elapses.
    Unlocked,
}

/// Bus envelope for a [`SessionEvent`], carrying provenance metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionNotice {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. `"lockon-session::visibility"`
    pub source: String,
    pub event: SessionEvent,
}

impl SessionNotice {
    /// Wrap `event` with a fresh id and the current timestamp.
    pub fn new(source: impl Into<String>, event: SessionEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            event,
        }
    }
}

/// Failures local to the scanning / smoothing component.
///
/// None of these are user-fatal: the session absorbs them (logs, advances
/// state) and degrades to "still scanning" rather than halting.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LockonError {
    #[error("corrupt tracking data for target {target_id}: {details}")]
    CorruptTarget { target_id: Uuid, details: String },

    #[error("candidate switch for target {target_id} timed out after {elapsed_ms} ms")]
    SwitchTimeout { target_id: Uuid, elapsed_ms: u64 },

    #[error("target inventory is empty; nothing to scan")]
    EmptyInventory,

    #[error("session bus error: {0}")]
    Channel(String),

    #[error("configuration error: {0}")]
    Config(String),
}
