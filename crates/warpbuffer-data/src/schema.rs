//! Serde structs for the settings file.
//!
//! Every field has a default, so an empty file (or a missing one) yields the
//! stock configuration.

use serde::Deserialize;
use warpbuffer_power::config::{DEFAULT_BUFFER_SCALE, DEFAULT_WARP_THRESHOLD};

/// Base name of the settings file, without extension.
pub const SETTINGS_BASE_NAME: &str = "settings";

/// On-disk settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsData {
    /// Multiplier applied to one tick of consumption.
    #[serde(default = "default_buffer_scaling")]
    pub buffer_scaling: f64,
    /// Warp rate at or above which analytic mode is used.
    #[serde(default = "default_time_warp_limit")]
    pub time_warp_limit: f64,
    /// Resource to buffer. Electric charge when absent.
    #[serde(default)]
    pub resource: Option<String>,
}

fn default_buffer_scaling() -> f64 {
    DEFAULT_BUFFER_SCALE
}

fn default_time_warp_limit() -> f64 {
    DEFAULT_WARP_THRESHOLD
}

impl Default for SettingsData {
    fn default() -> Self {
        Self {
            buffer_scaling: default_buffer_scaling(),
            time_warp_limit: default_time_warp_limit(),
            resource: None,
        }
    }
}
