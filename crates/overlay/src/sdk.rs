//! Boundary to the rendering SDK.
//!
//! The overlay never projects or measures anything itself: it asks the SDK for
//! draw products and screen positions. Everything here is single-threaded; the
//! async methods are awaited cooperatively on the UI thread and cannot be
//! cancelled once started.

use glam::{Vec2, Vec3};
use shared::{DrawProduct, DuoResult, MeasureEntity, RenderState, SdkError};

use crate::helpers::{centroid2, perpendicular};

/// Options forwarded to draw conversions
#[derive(Debug, Clone, PartialEq)]
pub struct DrawSettings {
    /// Distance between tick labels along long segments, in world units
    pub segment_label_interval: Option<f32>,
    /// Decimals shown in length labels
    pub label_decimals: usize,
    pub unit_suffix: String,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            segment_label_interval: None,
            label_decimals: 3,
            unit_suffix: "m".into(),
        }
    }
}

impl DrawSettings {
    pub fn format_length(&self, value: f64) -> String {
        format!("{value:.prec$} {}", self.unit_suffix, prec = self.label_decimals)
    }
}

/// Screen-space normal of a projected line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalInfo {
    pub position: Vec2,
    pub normal: Vec2,
}

/// Projection services of the SDK
pub trait Projector {
    /// Current camera and viewport
    fn render_state(&self) -> RenderState;

    /// Project world points to screen. `None` when any point cannot be projected.
    fn to_marker_points(&self, points: &[Vec3]) -> Option<Vec<Vec2>>;

    /// Screen normal of `line`, oriented away from the product's projected centre
    fn get_2d_normal(&self, product: &DrawProduct, line: (Vec3, Vec3)) -> Option<NormalInfo> {
        let (a, b) = match self.to_marker_points(&[line.0, line.1])?.as_slice() {
            [a, b] => (*a, *b),
            _ => return None,
        };
        let dir = (b - a).try_normalize()?;
        let position = (a + b) * 0.5;
        let mut normal = perpendicular(dir);

        let projected: Vec<Vec2> = product
            .parts()
            .filter_map(|p| p.vertices2d.as_ref())
            .flatten()
            .copied()
            .collect();
        if let Some(center) = centroid2(&projected) {
            if normal.dot(position - center) < 0.0 {
                normal = -normal;
            }
        }
        Some(NormalInfo { position, normal })
    }
}

/// Measurement and draw-conversion services of the SDK
#[allow(async_fn_in_trait)]
pub trait MeasureSdk: Projector {
    /// Convert an entity into projected geometry. Potentially expensive.
    async fn get_draw_entity(
        &self,
        entity: &MeasureEntity,
        settings: &DrawSettings,
    ) -> Result<Option<DrawProduct>, SdkError>;

    /// Convert a duo-measurement result into projected geometry
    async fn get_draw_measure_result(
        &self,
        result: &DuoResult,
        settings: &DrawSettings,
    ) -> Result<Option<DrawProduct>, SdkError>;

    /// Measure two entities against each other
    async fn measure_pair(
        &self,
        a: &MeasureEntity,
        b: &MeasureEntity,
    ) -> Result<Option<DuoResult>, SdkError>;

    /// Re-project an existing product onto the current camera in place
    fn update_product(&self, product: &mut DrawProduct);

    /// Build a product from raw world points (area and point-line tools)
    fn get_draw_object_from_points(
        &self,
        points: &[Vec3],
        closed: bool,
        filled: bool,
    ) -> Option<DrawProduct>;
}
