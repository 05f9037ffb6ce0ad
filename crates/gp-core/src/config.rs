//! Tunable constants for the canvas engine.
//!
//! Every geometric and interaction constant lives here so a host can
//! override them (the wasm bridge accepts a JSON document). `Default`
//! reproduces the reference look.

use crate::model::Color;
use serde::{Deserialize, Serialize};

/// Lower zoom bound.
pub const MIN_SCALE: f64 = 0.25;
/// Upper zoom bound.
pub const MAX_SCALE: f64 = 5.0;
/// Multiplicative step for wheel and zoom buttons.
pub const ZOOM_STEP: f64 = 1.1;
/// Distance between neighbouring edges of a parallel bundle (content units).
pub const BUNDLE_GAP: f64 = 14.0;
/// Extra push of the quadratic control point, as a multiple of the offset.
pub const CONTROL_BOOST: f64 = 1.2;
/// Clickable edge thickness in screen pixels.
pub const HIT_TARGET_PX: f64 = 24.0;
/// Visual edge stroke width (content units).
pub const STROKE_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub zoom_step: f64,

    /// Bundle spacing between parallel edges.
    pub bundle_gap: f64,
    pub control_boost: f64,
    pub hit_target_px: f64,
    pub stroke_width: f64,
    /// Labels sit this far above their anchor point.
    pub label_lift: f64,

    /// Self-loop endpoint angles in degrees, clockwise from +x.
    pub loop_start_deg: f64,
    pub loop_end_deg: f64,
    /// Self-loop control points sit `radius * loop_reach` from the center.
    pub loop_reach: f64,

    pub arrow_length: f64,
    pub arrow_half_width: f64,

    /// Screen-pixel movement that turns a press into a drag.
    pub drag_threshold_px: f64,

    pub node_radius: f64,
    pub node_color: Color,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            zoom_step: ZOOM_STEP,
            bundle_gap: BUNDLE_GAP,
            control_boost: CONTROL_BOOST,
            hit_target_px: HIT_TARGET_PX,
            stroke_width: STROKE_WIDTH,
            label_lift: 8.0,
            loop_start_deg: 220.0,
            loop_end_deg: 320.0,
            loop_reach: 2.2,
            arrow_length: 10.0,
            arrow_half_width: 5.0,
            drag_threshold_px: 2.0,
            node_radius: 20.0,
            node_color: Color::rgb(0x4F, 0x46, 0xE5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: CanvasConfig = serde_json::from_str(r##"{"bundleGap": 20, "nodeColor": "#FF0000"}"##).unwrap();
        assert_eq!(cfg.bundle_gap, 20.0);
        assert_eq!(cfg.node_color, Color::rgb(255, 0, 0));
        assert_eq!(cfg.max_scale, MAX_SCALE);
        assert_eq!(cfg.loop_reach, 2.2);
    }
}
