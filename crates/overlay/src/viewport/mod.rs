//! Viewport panel: camera input, wireframe of the demo scene, overlay canvas and marker glyphs

mod camera;
pub mod picking;

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui};
use glam::{Vec2, Vec3};
use measure_overlay_lib::engine2d::ShapeCanvas;
use measure_overlay_lib::fixtures::FakeGeometry;
use measure_overlay_lib::helpers::to_pos2;
use measure_overlay_lib::measure::MarkerTransforms;
use shared::{ObjectId, RenderState};

use camera::ArcBallCamera;
use picking::Ray;

const WIRE_COLOR: Color32 = Color32::from_rgb(120, 120, 130);
const CYLINDER_SEGMENTS: usize = 24;
/// Half size of a marker glyph's hit box, in pixels
pub const MARKER_RADIUS: f32 = 10.0;

/// Input gathered from the viewport this frame, in viewport-local pixels
pub struct ViewportInput {
    pub rect: Rect,
    /// Camera rotated, zoomed or panned
    pub moved: bool,
    /// Pointer is being dragged
    pub dragging: bool,
    pub hover: Option<Vec2>,
    pub click: Option<Vec2>,
}

/// 3D viewport drawn with the egui painter
pub struct ViewportPanel {
    camera: ArcBallCamera,
    size: Vec2,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            camera: ArcBallCamera::new(),
            size: Vec2::ONE,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn render_state(&self) -> RenderState {
        self.camera.render_state(self.size)
    }

    pub fn screen_ray(&self, pixel: Vec2) -> Ray {
        self.camera.screen_ray(pixel, self.size)
    }

    /// Reset orbit and zoom, keep the projection
    pub fn reset_camera(&mut self) {
        self.camera = ArcBallCamera {
            kind: self.camera.kind,
            ..ArcBallCamera::new()
        };
    }

    pub fn toggle_projection(&mut self) {
        self.camera.toggle_projection();
    }

    /// Allocate the viewport and apply camera input
    pub fn interact(&mut self, ui: &mut Ui) -> ViewportInput {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let size = Vec2::new(rect.width(), rect.height()).max(Vec2::ONE);
        let mut moved = size != self.size;
        self.size = size;

        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            self.camera.rotate(delta.x * 0.4, delta.y * 0.4);
            moved = true;
        }
        if response.dragged_by(egui::PointerButton::Middle) || response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.drag_delta();
            self.camera.pan(delta.x, delta.y);
            moved = true;
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.camera.zoom(scroll * 0.002);
                moved = true;
            }
        }

        let local = |p: Pos2| Vec2::new(p.x - rect.min.x, p.y - rect.min.y);
        ViewportInput {
            rect,
            moved,
            dragging: response.dragged(),
            hover: response.hover_pos().map(local),
            click: response
                .clicked_by(egui::PointerButton::Primary)
                .then(|| response.interact_pointer_pos())
                .flatten()
                .map(local),
        }
    }

    /// Paint scene wireframe, the retained overlay and the marker glyphs
    pub fn paint(
        &self,
        ui: &Ui,
        rect: Rect,
        scene: &[(ObjectId, FakeGeometry)],
        project: impl Fn(Vec3) -> Option<Vec2>,
        canvas: &ShapeCanvas,
        markers: &MarkerTransforms,
        marker_color: Color32,
    ) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(24, 24, 28));

        let origin = rect.min.to_vec2();
        let stroke = Stroke::new(1.0, WIRE_COLOR);
        let polyline = |points: &[Vec3], closed: bool| {
            let projected: Vec<Pos2> = points
                .iter()
                .filter_map(|p| project(*p))
                .map(|p| to_pos2(p) + origin)
                .collect();
            if projected.len() < points.len() {
                return;
            }
            for w in projected.windows(2) {
                painter.line_segment([w[0], w[1]], stroke);
            }
            if closed && projected.len() > 2 {
                painter.line_segment([projected[projected.len() - 1], projected[0]], stroke);
            }
        };

        for (_, geometry) in scene {
            match geometry {
                FakeGeometry::Edge(a, b) => polyline(&[*a, *b], false),
                FakeGeometry::Curve(points) => polyline(points, false),
                FakeGeometry::Plane(outline) => polyline(outline, true),
                FakeGeometry::Cylinder { start, end, radius } => {
                    polyline(&[*start, *end], false);
                    let axis = (*end - *start).normalize_or_zero();
                    if axis == Vec3::ZERO {
                        continue;
                    }
                    let u = axis.any_orthonormal_vector();
                    let v = axis.cross(u);
                    for centre in [*start, *end] {
                        let ring: Vec<Vec3> = (0..CYLINDER_SEGMENTS)
                            .map(|i| {
                                let t = i as f32 / CYLINDER_SEGMENTS as f32 * std::f32::consts::TAU;
                                centre + (u * t.cos() + v * t.sin()) * *radius
                            })
                            .collect();
                        polyline(&ring, true);
                    }
                }
            }
        }

        canvas.paint(&painter, rect.min);

        for (id, _) in markers.iter() {
            let Some(position) = markers.position(id) else {
                continue;
            };
            let centre = to_pos2(position) + origin;
            painter.circle_filled(centre, MARKER_RADIUS, marker_color);
            painter.text(
                centre,
                Align2::CENTER_CENTER,
                glyph(id),
                FontId::proportional(12.0),
                Color32::BLACK,
            );
        }
    }
}

/// Symbol shown on a marker glyph
fn glyph(id: &str) -> &'static str {
    if id.starts_with("infoMeasure") {
        "i"
    } else if id.starts_with("undo") {
        "↩"
    } else if id.starts_with("finalize") {
        "✔"
    } else if let Some(rest) = id.strip_prefix("removeMeasureResult") {
        match rest.split('-').next() {
            Some("X") => "x",
            Some("Y") => "y",
            Some("Z") => "z",
            Some("Planar") => "p",
            Some("Normal") => "n",
            _ => "×",
        }
    } else {
        "×"
    }
}

/// Id of the visible marker under `pixel`
pub fn marker_at(markers: &MarkerTransforms, pixel: Vec2) -> Option<String> {
    markers
        .iter()
        .filter_map(|(id, _)| markers.position(id).map(|p| (id, p.distance(pixel))))
        .filter(|(_, d)| *d <= MARKER_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use measure_overlay_lib::measure::MarkerHost;

    #[test]
    fn test_marker_hit_uses_anchor() {
        let mut markers = MarkerTransforms::new();
        markers.set_translate("removeMeasure-0", Vec2::new(100.0, 100.0));
        markers.set_translate("infoMeasure-0", Vec2::new(-1000.0, -1000.0));

        // anchor = translate + (100, 98)
        assert_eq!(marker_at(&markers, Vec2::new(203.0, 198.0)).as_deref(), Some("removeMeasure-0"));
        assert_eq!(marker_at(&markers, Vec2::new(100.0, 100.0)), None);
        assert_eq!(marker_at(&markers, Vec2::ZERO), None);
    }

    #[test]
    fn test_axis_glyphs() {
        assert_eq!(glyph("removeMeasureResultZ-3"), "z");
        assert_eq!(glyph("removeMeasureResult-3"), "×");
        assert_eq!(glyph("undoArea"), "↩");
        assert_eq!(glyph("removeArea"), "×");
    }
}
