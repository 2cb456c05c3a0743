use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::stats::loess::LoessConfig;

// ---------------------------------------------------------------------------
// Engine configuration
// ---------------------------------------------------------------------------

/// Tunables shared by every linked view.
///
/// ```json
/// { "settleWindowMs": 250, "loess": { "bandwidth": 0.2, "steps": 100, "confidence": 0.95 } }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// How long an empty or all-rows brush is held back before it commits.
    pub settle_window_ms: u64,
    pub loess: LoessConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settle_window_ms: 250,
            loess: LoessConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text).context("parsing engine config")?;
        Ok(config.sanitized())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_window_ms)
    }

    /// Clamp values the smoother cannot use.
    pub fn sanitized(mut self) -> Self {
        let defaults = LoessConfig::default();
        let loess = &mut self.loess;
        if !(loess.bandwidth > 0.0 && loess.bandwidth <= 1.0) {
            log::warn!("loess bandwidth {} out of (0, 1], using {}", loess.bandwidth, defaults.bandwidth);
            loess.bandwidth = defaults.bandwidth;
        }
        if !(loess.confidence > 0.0 && loess.confidence < 1.0) {
            log::warn!("loess confidence {} out of (0, 1), using {}", loess.confidence, defaults.confidence);
            loess.confidence = defaults.confidence;
        }
        if loess.steps == 0 {
            log::warn!("loess steps must be at least 1, using {}", defaults.steps);
            loess.steps = defaults.steps;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{"loess":{"steps":10}}"#).unwrap();
        assert_eq!(config.settle_window_ms, 250);
        assert_eq!(config.loess.steps, 10);
        assert_eq!(config.loess.bandwidth, 0.2);
    }

    #[test]
    fn invalid_values_are_replaced() {
        let config =
            EngineConfig::from_json_str(r#"{"loess":{"bandwidth":0,"confidence":1.5,"steps":0}}"#)
                .unwrap();
        assert_eq!(config.loess, LoessConfig::default());
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(EngineConfig::from_json_str("{").is_err());
        assert!(EngineConfig::load(Path::new("/nonexistent/brushlink.json")).is_err());
    }
}
