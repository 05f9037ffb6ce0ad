//! Screen ↔ content coordinate mapping.
//!
//! `screen = content * scale + offset`. Only zoom and pan gestures mutate
//! the viewport; graph edits never do.

use crate::config::CanvasConfig;
use crate::zoom_input::parse_zoom_percent;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Snapshot for zoom-percentage UIs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Direction of a wheel notch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    In,
    Out,
}

impl WheelDirection {
    /// Browser convention: negative `deltaY` scrolls up, which zooms in.
    pub fn from_delta(delta_y: f64) -> Self {
        if delta_y < 0.0 { Self::In } else { Self::Out }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportTransform {
    scale: f64,
    offset: Vec2,
    min_scale: f64,
    max_scale: f64,
    zoom_step: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::new(&CanvasConfig::default())
    }
}

impl ViewportTransform {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_step: config.zoom_step,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn state(&self) -> ViewportState {
        ViewportState {
            scale: self.scale,
            offset_x: self.offset.x,
            offset_y: self.offset.y,
        }
    }

    /// Restore a previously captured state; the scale is clamped.
    pub fn set_state(&mut self, state: ViewportState) {
        self.scale = self.clamp_scale(state.scale);
        self.offset = Vec2::new(state.offset_x, state.offset_y);
    }

    pub fn to_content(&self, screen: Point) -> Point {
        ((screen.to_vec2() - self.offset) / self.scale).to_point()
    }

    pub fn to_screen(&self, content: Point) -> Point {
        (content.to_vec2() * self.scale + self.offset).to_point()
    }

    /// Content → screen as an affine map, for renderers.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// Zoom by `factor`, keeping the content point under `anchor` fixed.
    pub fn zoom_at(&mut self, factor: f64, anchor: Point) {
        let new_scale = self.clamp_scale(self.scale * factor);
        let anchor_content = self.to_content(anchor);
        self.offset = anchor.to_vec2() - anchor_content.to_vec2() * new_scale;
        self.scale = new_scale;
        log::trace!("zoom -> {:.3} at ({:.1}, {:.1})", new_scale, anchor.x, anchor.y);
    }

    /// One wheel notch anchored at the pointer.
    pub fn wheel(&mut self, direction: WheelDirection, pointer: Point) {
        let factor = match direction {
            WheelDirection::In => self.zoom_step,
            WheelDirection::Out => 1.0 / self.zoom_step,
        };
        self.zoom_at(factor, pointer);
    }

    pub fn zoom_in(&mut self, canvas_center: Point) {
        self.zoom_at(self.zoom_step, canvas_center);
    }

    pub fn zoom_out(&mut self, canvas_center: Point) {
        self.zoom_at(1.0 / self.zoom_step, canvas_center);
    }

    /// Back to 100% with the content origin at the screen origin.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.offset = Vec2::ZERO;
    }

    /// Text the zoom box should show for the current scale.
    pub fn percent_label(&self) -> String {
        format!("{}", (self.scale * 100.0).round())
    }

    /// Apply text typed into the zoom box, anchored at `canvas_center`.
    ///
    /// Returns the text the box should display afterwards. Input that is
    /// not a number leaves the viewport untouched and reverts the box.
    pub fn apply_percent_input(&mut self, text: &str, canvas_center: Point) -> String {
        match parse_zoom_percent(text) {
            Ok(percent) => {
                let target = (percent / 100.0).clamp(self.min_scale, self.max_scale);
                self.zoom_at(target / self.scale, canvas_center);
            }
            Err(err) => log::debug!("zoom input rejected: {err}"),
        }
        self.percent_label()
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}
