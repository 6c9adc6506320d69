use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::availability::RetryPolicy;
use crate::timecode::DEFAULT_DURATION_SECS;

/// Tunables for the synchronization engine. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum spacing between scroll computations.
    pub throttle_ms: u64,
    /// Width of the ticker time window, in seconds.
    pub window_width: f64,
    /// Fraction of the remaining gap closed per frame by the follow loop.
    pub smoothing_gain: f64,
    /// Gap (seconds) below which the follow loop leaves the play head alone.
    pub settle_epsilon: f64,
    pub fallback_viewport_height: f64,
    pub default_duration_secs: u32,
    pub retry: RetryPolicy,
    /// Viewport inset applied before intersection tests (negative shrinks).
    pub root_margin: f64,
    pub visibility_threshold: f64,
    pub annotation_font_size: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 16,
            window_width: 120.0,
            smoothing_gain: 0.15,
            settle_epsilon: 0.05,
            fallback_viewport_height: 600.0,
            default_duration_secs: DEFAULT_DURATION_SECS,
            retry: RetryPolicy::default(),
            root_margin: -10.0,
            visibility_threshold: 0.1,
            annotation_font_size: 40.0,
        }
    }
}

impl EngineConfig {
    /// Loads overrides from `path` when given; otherwise returns defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let data = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {:?}", path))?;
                Self::from_json(&data)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("failed to parse config JSON")
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.window_width > 0.0,
            "window_width must be positive, got {}",
            self.window_width
        );
        ensure!(
            self.smoothing_gain > 0.0 && self.smoothing_gain <= 1.0,
            "smoothing_gain must lie in (0, 1], got {}",
            self.smoothing_gain
        );
        ensure!(
            self.settle_epsilon >= 0.0,
            "settle_epsilon must be non-negative"
        );
        ensure!(
            (0.0..=1.0).contains(&self.visibility_threshold),
            "visibility_threshold must lie in [0, 1]"
        );
        ensure!(
            self.default_duration_secs > 0,
            "default_duration_secs must be positive"
        );
        Ok(())
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}
