//! Drawing surface abstraction.
//!
//! Draw primitives only talk to this trait, so the same code paints into the
//! retained egui display list of the viewer and into recording surfaces in tests.

use egui::{Color32, Stroke};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// End style of open polylines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

/// Font size and colours of overlay labels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color32,
    /// Halo drawn behind the glyphs for contrast against the model
    pub outline: Option<Color32>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 14.0,
            color: Color32::WHITE,
            outline: Some(Color32::BLACK),
        }
    }
}

/// 2D surface the overlay paints on
pub trait DrawSurface {
    /// Forget everything drawn so far
    fn clear(&mut self);

    fn polyline(&mut self, points: &[Vec2], closed: bool, stroke: Stroke, cap: LineCap);

    /// Fill a simple polygon; `holes` are cut out of it
    fn fill_polygon(&mut self, outer: &[Vec2], holes: &[Vec<Vec2>], fill: Color32);

    fn circle(&mut self, center: Vec2, radius: f32, fill: Color32, stroke: Stroke);

    /// Arc from `start_angle` to `end_angle` (radians, screen space)
    fn arc(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32, stroke: Stroke);

    /// Thick segment whose colour blends from `from_color` to `to_color`
    fn gradient_segment(
        &mut self,
        from: Vec2,
        to: Vec2,
        width: f32,
        from_color: Color32,
        to_color: Color32,
    );

    /// Text centred on `center`, rotated by `angle` radians
    fn text(&mut self, center: Vec2, text: &str, style: &TextStyle, angle: f32);

    /// Rendered width of `text` in pixels
    fn measure_text(&self, text: &str, style: &TextStyle) -> f32;
}
