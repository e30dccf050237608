//! Resolved buffering configuration.
//!
//! Values arrive here already validated (see the `warpbuffer-data` crate);
//! nothing in this crate re-checks them.

use serde::{Deserialize, Serialize};
use warpbuffer_core::fixed::Fixed64;
use warpbuffer_core::vessel::ELECTRIC_CHARGE;

/// Default multiplier applied to one tick of consumption.
pub const DEFAULT_BUFFER_SCALE: f64 = 1.5;

/// Default warp rate at which analytic mode starts.
pub const DEFAULT_WARP_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Margin applied to one tick of consumption when sizing the buffer.
    pub buffer_scale: Fixed64,
    /// Warp multiplier at or above which analytic mode is used.
    pub warp_threshold: Fixed64,
    /// Resource the buffer manages.
    pub resource: String,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            buffer_scale: Fixed64::from_num(DEFAULT_BUFFER_SCALE),
            warp_threshold: Fixed64::from_num(DEFAULT_WARP_THRESHOLD),
            resource: ELECTRIC_CHARGE.to_string(),
        }
    }
}

impl BufferConfig {
    pub fn new(buffer_scale: Fixed64, warp_threshold: Fixed64) -> Self {
        Self {
            buffer_scale,
            warp_threshold,
            ..Self::default()
        }
    }

    /// Same config tracking a different resource.
    pub fn with_resource(mut self, resource: &str) -> Self {
        self.resource = resource.to_string();
        self
    }
}
