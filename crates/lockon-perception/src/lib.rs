//! `lockon-perception` – Pose Filtering
//!
//! Pure filtering math for the AR session: no timers, no I/O, no engine
//! knowledge.  Raw poses go in, render-stable poses come out.
//!
//! # Modules
//!
//! - [`angles`] – normalization of rotation angles and deltas into
//!   (−180°, +180°] so that smoothing math never sees a 0°/360° seam.
//! - [`smoother`] – [`PoseSmoother`][smoother::PoseSmoother]: the
//!   dead-zone → velocity-clamp → exponential-smoothing pipeline, plus the
//!   stability ramp that relaxes smoothing once a lock is well established.

pub mod angles;
pub mod smoother;

pub use angles::{delta_deg, normalize_deg};
pub use smoother::{PoseSmoother, SmootherConfig};
