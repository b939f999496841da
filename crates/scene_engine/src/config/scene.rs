//! Scene graph configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Config, ConfigError};

/// Defaults applied by the node tree and the frame driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Whether new nodes inherit their parent's orientation
    pub default_inherit_orientation: bool,

    /// Whether new nodes inherit their parent's scale
    pub default_inherit_scale: bool,

    /// Start new nodes with update notifications suppressed
    pub suppress_update_events: bool,

    /// Prefix for generated node names
    pub unnamed_node_prefix: String,

    /// Window over which frame times are averaged, in seconds
    pub frame_smoothing_period: f32,

    /// Initial billboard pool size for new billboard sets
    pub billboard_pool_size: usize,

    /// Whether billboard pools grow when exhausted
    pub billboard_auto_extend: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            default_inherit_orientation: true,
            default_inherit_scale: true,
            suppress_update_events: false,
            unnamed_node_prefix: "Unnamed_".to_string(),
            frame_smoothing_period: 0.0,
            billboard_pool_size: 20,
            billboard_auto_extend: true,
        }
    }
}

impl Config for SceneConfig {}

impl SceneConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.frame_smoothing_period.is_finite() || self.frame_smoothing_period < 0.0 {
            return Err(ConfigError::Invalid {
                field: "frame_smoothing_period",
                reason: format!("must be a finite, non-negative number of seconds, got {}", self.frame_smoothing_period),
            });
        }
        if self.unnamed_node_prefix.is_empty() {
            return Err(ConfigError::Invalid {
                field: "unnamed_node_prefix",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Smoothing window as a duration
    pub fn frame_smoothing(&self) -> Duration {
        Duration::from_secs_f32(self.frame_smoothing_period.max(0.0))
    }
}
