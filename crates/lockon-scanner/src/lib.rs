//! `lockon-scanner` – Target Scanning
//!
//! Cycles candidate image targets against the external tracking engine until
//! it reports a match, then holds the lock until the engine loses it.
//!
//! # Modules
//!
//! - [`engine`] – [`TrackingEngine`][engine::TrackingEngine]: the trait
//!   boundary to the external tracker, including the explicit
//!   [`LoadState`][engine::LoadState] signal used to distinguish "still
//!   loading" from "silently failed".
//! - [`scanner`] – [`TargetScanner`][scanner::TargetScanner]: the
//!   `Idle / Scanning / Locked` state machine with per-candidate attempt
//!   timeouts, switch rate limiting, fail-fast on corrupt tracking data, and
//!   the resume-after-delay sequence that follows a lost lock.

pub mod engine;
pub mod scanner;

pub use engine::{LoadState, TrackingEngine};
pub use scanner::{ScanState, ScannerConfig, ScannerSnapshot, TargetScanner};
