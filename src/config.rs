//! TOML-based engine configuration.
//!
//! Every escalation constant is configuration, not hard-coded behavior:
//! window size, soft/hard thresholds, arm and auto-hide durations, cue
//! volumes, rare-cue selection, asset base path and takeover destination.
//! Defaults reproduce the most complete deployed variant.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Sliding-window and phase-transition constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Trailing interval over which qualifying inputs are counted (ms).
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    /// Window length at which the soft warning fires.
    #[serde(default = "default_soft_threshold")]
    pub soft_threshold: usize,
    /// Window length at which the hard lockout fires directly.
    #[serde(default = "default_hard_threshold")]
    pub hard_threshold: usize,
    /// How long after the soft warning extra clicks count toward hard (ms).
    #[serde(default = "default_soft_arm_ms")]
    pub soft_arm_ms: u64,
    /// Extra clicks past the soft baseline that fire hard while armed.
    #[serde(default = "default_hard_after_soft")]
    pub hard_after_soft: usize,
    /// Soft overlay auto-hide delay (ms).
    #[serde(default = "default_soft_autohide_ms")]
    pub soft_autohide_ms: u64,
    /// Minimum time the soft overlay swallows dismissal taps (ms).
    #[serde(default = "default_soft_lock_ms")]
    pub soft_lock_ms: u64,
}

/// How the rare click variant is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RareMode {
    /// Every `rare_rate`-th qualifying cue.
    Deterministic,
    /// Each qualifying cue with probability 1/`rare_rate` (seeded PCG).
    Probabilistic,
}

/// Cue playback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_click_volume")]
    pub click_volume: f32,
    #[serde(default = "default_rare_volume")]
    pub rare_volume: f32,
    #[serde(default = "default_warn_volume")]
    pub warn_volume: f32,
    /// Minimum gap between plain click cues (ms); rare and warn are exempt.
    #[serde(default = "default_click_min_gap_ms")]
    pub click_min_gap_ms: u64,
    /// One rare cue per this many qualifying cues.
    #[serde(default = "default_rare_rate")]
    pub rare_rate: u32,
    #[serde(default = "default_rare_mode")]
    pub rare_mode: RareMode,
    /// Seed for the probabilistic rare mode.
    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,
}

/// Hard-lockout takeover configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeoverConfig {
    /// Destination embedded (or navigated to) when the takeover fires.
    #[serde(default = "default_destination")]
    pub destination: String,
    /// Added to the warn cue duration before the takeover fires (ms).
    #[serde(default = "default_warn_tail_ms")]
    pub warn_tail_ms: u64,
    /// Takeover delay when the warn cue duration is unknown (ms).
    #[serde(default = "default_warn_fallback_ms")]
    pub warn_fallback_ms: u64,
    /// Lower clamp on the takeover delay (ms).
    #[serde(default = "default_warn_delay_min_ms")]
    pub warn_delay_min_ms: u64,
    /// Upper clamp on the takeover delay (ms).
    #[serde(default = "default_warn_delay_max_ms")]
    pub warn_delay_max_ms: u64,
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub escalation: EscalationConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub takeover: TakeoverConfig,
    /// Base path under which cue and image assets are resolved.
    #[serde(default = "default_asset_base")]
    pub asset_base: String,
}

// Default functions
fn default_window_ms() -> u64 {
    8_000
}
fn default_soft_threshold() -> usize {
    30
}
fn default_hard_threshold() -> usize {
    50
}
fn default_soft_arm_ms() -> u64 {
    7_000
}
fn default_hard_after_soft() -> usize {
    18
}
fn default_soft_autohide_ms() -> u64 {
    3_200
}
fn default_soft_lock_ms() -> u64 {
    2_000
}
fn default_click_volume() -> f32 {
    0.3
}
fn default_rare_volume() -> f32 {
    0.4
}
fn default_warn_volume() -> f32 {
    0.8
}
fn default_click_min_gap_ms() -> u64 {
    90
}
fn default_rare_rate() -> u32 {
    50
}
fn default_rare_mode() -> RareMode {
    RareMode::Deterministic
}
fn default_rng_seed() -> u64 {
    0x5eed_c11c
}
fn default_destination() -> String {
    "https://www.youtube.com/embed/TscaT-2aIKc?autoplay=1".into()
}
fn default_warn_tail_ms() -> u64 {
    200
}
fn default_warn_fallback_ms() -> u64 {
    7_000
}
fn default_warn_delay_min_ms() -> u64 {
    1_800
}
fn default_warn_delay_max_ms() -> u64 {
    10_000
}
fn default_asset_base() -> String {
    String::new()
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            soft_threshold: default_soft_threshold(),
            hard_threshold: default_hard_threshold(),
            soft_arm_ms: default_soft_arm_ms(),
            hard_after_soft: default_hard_after_soft(),
            soft_autohide_ms: default_soft_autohide_ms(),
            soft_lock_ms: default_soft_lock_ms(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            click_volume: default_click_volume(),
            rare_volume: default_rare_volume(),
            warn_volume: default_warn_volume(),
            click_min_gap_ms: default_click_min_gap_ms(),
            rare_rate: default_rare_rate(),
            rare_mode: default_rare_mode(),
            rng_seed: default_rng_seed(),
        }
    }
}

impl Default for TakeoverConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            warn_tail_ms: default_warn_tail_ms(),
            warn_fallback_ms: default_warn_fallback_ms(),
            warn_delay_min_ms: default_warn_delay_min_ms(),
            warn_delay_max_ms: default_warn_delay_max_ms(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            escalation: EscalationConfig::default(),
            audio: AudioConfig::default(),
            takeover: TakeoverConfig::default(),
            asset_base: default_asset_base(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from a TOML file, returning defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Check cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.escalation.window_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "escalation.window_ms".into(),
                message: "must be positive".into(),
            });
        }
        if self.escalation.soft_threshold == 0 || self.escalation.hard_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                key: "escalation.soft_threshold".into(),
                message: "thresholds must be positive".into(),
            });
        }
        if self.escalation.soft_threshold >= self.escalation.hard_threshold {
            return Err(ConfigError::InvalidValue {
                key: "escalation.hard_threshold".into(),
                message: format!(
                    "must exceed soft_threshold ({})",
                    self.escalation.soft_threshold
                ),
            });
        }
        if self.audio.rare_rate == 0 {
            return Err(ConfigError::InvalidValue {
                key: "audio.rare_rate".into(),
                message: "must be positive".into(),
            });
        }
        if self.takeover.warn_delay_min_ms > self.takeover.warn_delay_max_ms {
            return Err(ConfigError::InvalidValue {
                key: "takeover.warn_delay_min_ms".into(),
                message: "must not exceed warn_delay_max_ms".into(),
            });
        }
        Ok(())
    }
}
