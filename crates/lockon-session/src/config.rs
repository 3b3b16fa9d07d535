//! [`SessionConfig`] – one typed structure for every tunable.
//!
//! The source constants here are empirically tuned starting points; treat
//! them as defaults to retune against the actual tracking engine, not as
//! precise values.

use std::time::Duration;

use lockon_perception::SmootherConfig;
use lockon_scanner::ScannerConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// All recognized tuning options for an AR session.
///
/// Serializable so the CLI can persist it to `config.toml`; every field has a
/// documented default and may be omitted from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Poll ticks to spend on one candidate before switching.  Default 5.
    #[serde(default = "default_max_attempts")]
    pub max_attempts_per_target: u32,

    /// Minimum spacing between candidate switches, ms.  Default 300.
    #[serde(default = "default_min_switch_interval_ms")]
    pub min_switch_interval_ms: u64,

    /// Budget for a candidate's engine load, ms.  Default 5000.
    #[serde(default = "default_candidate_switch_timeout_ms")]
    pub candidate_switch_timeout_ms: u64,

    /// Scan-loop poll cadence, ms.  Default 50.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Position dead zone, length units.  Default 0.0005.
    #[serde(default = "default_position_dead_zone")]
    pub position_dead_zone: f32,

    /// Rotation dead zone, degrees.  Default 0.1.
    #[serde(default = "default_rotation_dead_zone_deg")]
    pub rotation_dead_zone_deg: f32,

    /// Maximum position change per update, length units.  Default 0.01.
    #[serde(default = "default_max_position_velocity")]
    pub max_position_velocity: f32,

    /// Maximum rotation change per update, degrees.  Default 2.0.
    #[serde(default = "default_max_rotation_velocity_deg")]
    pub max_rotation_velocity_deg: f32,

    /// Base position smoothing factor.  Default 0.05.
    #[serde(default = "default_position_smoothing")]
    pub position_smoothing: f32,

    /// Base rotation smoothing factor.  Default 0.04.
    #[serde(default = "default_rotation_smoothing")]
    pub rotation_smoothing: f32,

    /// Consecutive tracked ticks before stability starts ramping.  Default 3.
    #[serde(default = "default_min_stable_frames")]
    pub min_stable_frames: u32,

    /// Hysteresis before hiding content after a raw loss, ms.  Default 1500.
    /// Must exceed `resume_scan_delay_ms`.
    #[serde(default = "default_hide_delay_ms")]
    pub hide_delay_ms: u64,

    /// Settle delay between a lost lock and scan resume, ms.  Default 500.
    #[serde(default = "default_resume_scan_delay_ms")]
    pub resume_scan_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    5
}
fn default_min_switch_interval_ms() -> u64 {
    300
}
fn default_candidate_switch_timeout_ms() -> u64 {
    5000
}
fn default_poll_interval_ms() -> u64 {
    50
}
fn default_position_dead_zone() -> f32 {
    0.0005
}
fn default_rotation_dead_zone_deg() -> f32 {
    0.1
}
fn default_max_position_velocity() -> f32 {
    0.01
}
fn default_max_rotation_velocity_deg() -> f32 {
    2.0
}
fn default_position_smoothing() -> f32 {
    0.05
}
fn default_rotation_smoothing() -> f32 {
    0.04
}
fn default_min_stable_frames() -> u32 {
    3
}
fn default_hide_delay_ms() -> u64 {
    1500
}
fn default_resume_scan_delay_ms() -> u64 {
    500
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_attempts_per_target: default_max_attempts(),
            min_switch_interval_ms: default_min_switch_interval_ms(),
            candidate_switch_timeout_ms: default_candidate_switch_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            position_dead_zone: default_position_dead_zone(),
            rotation_dead_zone_deg: default_rotation_dead_zone_deg(),
            max_position_velocity: default_max_position_velocity(),
            max_rotation_velocity_deg: default_max_rotation_velocity_deg(),
            position_smoothing: default_position_smoothing(),
            rotation_smoothing: default_rotation_smoothing(),
            min_stable_frames: default_min_stable_frames(),
            hide_delay_ms: default_hide_delay_ms(),
            resume_scan_delay_ms: default_resume_scan_delay_ms(),
        }
    }
}

impl SessionConfig {
    /// The scanner's view of this configuration.
    pub fn scanner(&self) -> ScannerConfig {
        ScannerConfig {
            max_attempts_per_target: self.max_attempts_per_target,
            min_switch_interval: Duration::from_millis(self.min_switch_interval_ms),
            candidate_switch_timeout: Duration::from_millis(self.candidate_switch_timeout_ms),
            resume_scan_delay: Duration::from_millis(self.resume_scan_delay_ms),
        }
    }

    /// The smoother's view of this configuration.
    pub fn smoother(&self) -> SmootherConfig {
        SmootherConfig {
            position_dead_zone: self.position_dead_zone,
            rotation_dead_zone_deg: self.rotation_dead_zone_deg,
            max_position_velocity: self.max_position_velocity,
            max_rotation_velocity_deg: self.max_rotation_velocity_deg,
            position_smoothing: self.position_smoothing,
            rotation_smoothing: self.rotation_smoothing,
            min_stable_frames: self.min_stable_frames,
            ..SmootherConfig::default()
        }
    }

    /// Hysteresis before hiding content.
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    /// Scan-loop poll cadence.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Warn about tunings that defeat the design.  The hide delay exists to
    /// bridge engine hiccups while the scanner is still settling, so it must
    /// outlast the resume-scan delay.
    pub fn validate(&self) {
        if self.hide_delay_ms <= self.resume_scan_delay_ms {
            warn!(
                hide_delay_ms = self.hide_delay_ms,
                resume_scan_delay_ms = self.resume_scan_delay_ms,
                "hide_delay_ms should exceed resume_scan_delay_ms; content may flicker"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.max_attempts_per_target, 5);
        assert_eq!(cfg.min_switch_interval_ms, 300);
        assert_eq!(cfg.poll_interval_ms, 50);
        assert_eq!(cfg.hide_delay_ms, 1500);
        assert_eq!(cfg.resume_scan_delay_ms, 500);
        assert!(cfg.hide_delay_ms > cfg.resume_scan_delay_ms);
    }

    #[test]
    fn partial_toml_like_json_fills_defaults() {
        // Only one field specified; the rest must come from defaults.
        let cfg: SessionConfig = serde_json::from_str(r#"{"poll_interval_ms": 16}"#).unwrap();
        assert_eq!(cfg.poll_interval_ms, 16);
        assert_eq!(cfg.max_attempts_per_target, 5);
        assert!((cfg.position_smoothing - 0.05).abs() < f32::EPSILON);
    }

    #[test]
    fn scanner_view_converts_durations() {
        let cfg = SessionConfig::default();
        let sc = cfg.scanner();
        assert_eq!(sc.min_switch_interval, Duration::from_millis(300));
        assert_eq!(sc.resume_scan_delay, Duration::from_millis(500));
        assert_eq!(sc.max_attempts_per_target, 5);
    }

    #[test]
    fn smoother_view_carries_thresholds() {
        let cfg = SessionConfig {
            position_dead_zone: 0.001,
            rotation_smoothing: 0.1,
            min_stable_frames: 4,
            ..SessionConfig::default()
        };
        let sm = cfg.smoother();
        assert!((sm.position_dead_zone - 0.001).abs() < f32::EPSILON);
        assert!((sm.rotation_smoothing - 0.1).abs() < f32::EPSILON);
        assert_eq!(sm.min_stable_frames, 4);
        // Ramp gain/decay come from the smoother's own defaults.
        assert!((sm.stability_gain - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn roundtrip_preserves_all_fields() {
        let cfg = SessionConfig {
            hide_delay_ms: 2000,
            ..SessionConfig::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
