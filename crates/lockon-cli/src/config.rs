//! CLI configuration – reads/writes `~/.lockon/config.toml`.

use lockon_session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Options for the simulated tracking engine the demo loop drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimOptions {
    /// Number of synthetic targets in the inventory.
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    /// Candidate index the simulated camera eventually "sees".
    #[serde(default = "default_visible_candidate")]
    pub visible_candidate: usize,

    /// Attempts spent on the visible candidate before detection fires.
    #[serde(default = "default_attempts_before_found")]
    pub attempts_before_found: u32,

    /// Pose updates streamed before a transient tracking drop, 0 = never drop.
    #[serde(default = "default_poses_before_drop")]
    pub poses_before_drop: u32,

    /// Ticks the transient drop lasts before the target is re-found.
    #[serde(default = "default_drop_duration_ticks")]
    pub drop_duration_ticks: u32,

    /// Candidate indices whose tracking data is corrupt.
    #[serde(default)]
    pub corrupt_candidates: Vec<usize>,
}

fn default_target_count() -> usize {
    3
}
fn default_visible_candidate() -> usize {
    1
}
fn default_attempts_before_found() -> u32 {
    3
}
fn default_poses_before_drop() -> u32 {
    40
}
fn default_drop_duration_ticks() -> u32 {
    4
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            target_count: default_target_count(),
            visible_candidate: default_visible_candidate(),
            attempts_before_found: default_attempts_before_found(),
            poses_before_drop: default_poses_before_drop(),
            drop_duration_ticks: default_drop_duration_ticks(),
            corrupt_candidates: Vec::new(),
        }
    }
}

/// Persisted user configuration stored in `~/.lockon/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Session tuning (scan budgets, filter thresholds, hide delay).
    #[serde(default)]
    pub session: SessionConfig,

    /// Demo-loop simulation script.
    #[serde(default)]
    pub sim: SimOptions,
}

/// Return the path to `~/.lockon/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".lockon").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `LOCKON_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `LOCKON_POLL_INTERVAL_MS` | `session.poll_interval_ms` |
/// | `LOCKON_HIDE_DELAY_MS` | `session.hide_delay_ms` |
/// | `LOCKON_MAX_ATTEMPTS` | `session.max_attempts_per_target` |
/// | `LOCKON_TARGETS` | `sim.target_count` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("LOCKON_POLL_INTERVAL_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.session.poll_interval_ms = ms;
    }
    if let Ok(v) = std::env::var("LOCKON_HIDE_DELAY_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.session.hide_delay_ms = ms;
    }
    if let Ok(v) = std::env::var("LOCKON_MAX_ATTEMPTS")
        && let Ok(n) = v.parse::<u32>()
    {
        cfg.session.max_attempts_per_target = n;
    }
    if let Ok(v) = std::env::var("LOCKON_TARGETS")
        && let Ok(n) = v.parse::<usize>()
    {
        cfg.sim.target_count = n;
    }
}

/// Save the config to disk, creating `~/.lockon/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw).map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}
