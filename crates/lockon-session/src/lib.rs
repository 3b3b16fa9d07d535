//! `lockon-session` – Session Orchestration
//!
//! Glues the scanner, the pose smoother, and the visibility hysteresis into
//! one per-session object driven by a single poll loop.  All logic is
//! cooperative and single-threaded: engine events are drained at the start of
//! every tick, scheduled deadlines are plain `Instant` fields, and nothing
//! suspends mid-update.
//!
//! # Modules
//!
//! - [`bus`] – [`SessionBus`][bus::SessionBus]: broadcast channels the
//!   rendering/content layer subscribes to, split into a high-frequency pose
//!   lane and a low-frequency lifecycle lane.
//! - [`hysteresis`] – [`VisibilityGate`][hysteresis::VisibilityGate]: delays
//!   hide-on-loss so transient tracking drops do not flicker the content.
//! - [`config`] – [`SessionConfig`][config::SessionConfig]: every tunable of
//!   the scanner/smoother/gate in one typed structure with documented
//!   defaults.
//! - [`session`] – [`ArSession`][session::ArSession]: the tick loop itself.

pub mod bus;
pub mod config;
pub mod hysteresis;
pub mod session;

pub use bus::{Lane, LaneReceiver, SessionBus};
pub use config::SessionConfig;
pub use hysteresis::VisibilityGate;
pub use session::ArSession;
