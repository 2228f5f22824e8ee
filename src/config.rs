//! Tuning knobs for event fan-out and cache retention.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Runtime configuration for registries, pools and managers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Capacity of each source-event broadcast channel.
    pub event_channel_capacity: usize,
    /// Capacity of the per-manager render-request channel.
    pub render_channel_capacity: usize,
    /// Bound on valid timestamps a pool cache retains; on publication the
    /// oldest entries are collapsed into a floor entry once exceeded.
    pub max_retained_frames: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: 256,
            render_channel_capacity: 64,
            max_retained_frames: 32,
        }
    }
}

impl CoreConfig {
    /// Build a configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(capacity) = std::env::var("VOXELVIEW_EVENT_CHANNEL_CAPACITY") {
            config.event_channel_capacity = capacity.parse().map_err(|e| {
                CoreError::Configuration(format!("Invalid event_channel_capacity: {e}"))
            })?;
        }

        if let Ok(capacity) = std::env::var("VOXELVIEW_RENDER_CHANNEL_CAPACITY") {
            config.render_channel_capacity = capacity.parse().map_err(|e| {
                CoreError::Configuration(format!("Invalid render_channel_capacity: {e}"))
            })?;
        }

        if let Ok(frames) = std::env::var("VOXELVIEW_MAX_RETAINED_FRAMES") {
            config.max_retained_frames = frames.parse().map_err(|e| {
                CoreError::Configuration(format!("Invalid max_retained_frames: {e}"))
            })?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Reject configurations that would stall event delivery outright.
    pub fn validate(&self) -> Result<()> {
        if self.event_channel_capacity == 0 {
            return Err(CoreError::Configuration(
                "event_channel_capacity must be greater than zero".to_string(),
            ));
        }
        if self.render_channel_capacity == 0 {
            return Err(CoreError::Configuration(
                "render_channel_capacity must be greater than zero".to_string(),
            ));
        }
        if self.max_retained_frames == 0 {
            return Err(CoreError::Configuration(
                "max_retained_frames must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
