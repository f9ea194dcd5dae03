//! Tunable constants for the editor.

use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Editor configuration.
///
/// Every field has a default, so a partial JSON document is enough to
/// override a single threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Size given to every new box.
    pub box_size: Size,
    /// Maximum vertical gap between facing edges for a snap.
    pub snap_distance: f64,
    /// Maximum horizontal offset between box centers for a snap.
    pub align_tolerance: f64,
    /// How far a bump tip sticks out of the box edge. Also the margin used
    /// when picking the box under a line endpoint.
    pub bump_radius: f64,
    /// Grab radius around a connection's endpoint tips.
    pub endpoint_grab_radius: f64,
    /// Hit tolerance around a connection's segment.
    pub line_hit_tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            box_size: Size::new(100.0, 60.0),
            snap_distance: 20.0,
            align_tolerance: 30.0,
            bump_radius: 6.0,
            endpoint_grab_radius: 12.0,
            line_hit_tolerance: 8.0,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON, filling gaps with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
