//! Draw primitives: paint projected draw products onto a [`DrawSurface`].
//!
//! Every routine works on the 2D vertices the SDK already projected; 3D
//! vertices are only consulted for visibility decisions (edge-on angles,
//! slope direction).

use std::f32::consts::{PI, TAU};

use egui::{Color32, Stroke};
use glam::{Vec2, Vec3};
use shared::{DrawObject, DrawObjectKind, DrawPart, DrawProduct, DrawType, PartText};
use tracing::trace;

use super::camera::CameraState;
use super::surface::{DrawSurface, LineCap, TextStyle};
use crate::helpers::{centroid2, open_loop, perpendicular, to_color32, upright_angle};

/// |view · normal| below this means the angle plane is seen edge-on
const ANGLE_EDGE_ON_DOT: f32 = 0.1;
const ANGLE_MIN_RAY_PX: f32 = 40.0;
const ANGLE_MAX_ARC_PX: f32 = 50.0;
const ANGLE_MAX_ARC_DISTANCE_RATIO: f32 = 0.1;
/// Free space a segment label needs besides its own width
const LABEL_MARGIN_PX: f32 = 20.0;
const CYLINDER_WIDTH_FACTOR: f32 = 4.0;
const SLOPE_EPSILON: f32 = 1e-3;

/// Colours of point markers along a part
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointColors {
    pub start: Color32,
    pub middle: Color32,
    pub end: Color32,
}

/// Colour scheme for one category of overlay geometry
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSettings {
    pub line_color: Color32,
    pub fill_color: Option<Color32>,
    pub outline_color: Option<Color32>,
    pub point_color: PointColors,
    /// Draw intermediate points of vertex parts, not only the ends
    pub display_all_points: bool,
    /// Draw cylinders as a shaded tube with end caps
    pub complex_cylinder: bool,
    pub cylinder_low: Color32,
    pub cylinder_high: Color32,
    /// Arrowheads on sloped segments, pointing downhill
    pub slope_arrows: bool,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            line_color: Color32::from_rgb(255, 200, 50),
            fill_color: None,
            outline_color: Some(Color32::from_black_alpha(160)),
            point_color: PointColors {
                start: Color32::from_rgb(0, 200, 255),
                middle: Color32::WHITE,
                end: Color32::from_rgb(255, 120, 0),
            },
            display_all_points: true,
            complex_cylinder: true,
            cylinder_low: Color32::from_rgb(220, 50, 50),
            cylinder_high: Color32::from_rgb(50, 200, 80),
            slope_arrows: false,
        }
    }
}

/// Label settings; labels are only drawn when these are supplied
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextSettings {
    pub style: TextStyle,
}

/// Draw every object of `product`
#[allow(clippy::too_many_arguments)]
pub fn draw_product(
    surface: &mut impl DrawSurface,
    camera: &CameraState,
    product: &DrawProduct,
    colors: &ColorSettings,
    pixel_width: f32,
    text: Option<&TextSettings>,
    line_cap: Option<LineCap>,
) {
    let cap = line_cap.unwrap_or_default();
    for object in &product.objects {
        let lateral = if colors.complex_cylinder && object.kind == DrawObjectKind::Cylinder {
            draw_cylinder(surface, object, colors, pixel_width, text)
        } else {
            None
        };
        for (i, part) in object.parts.iter().enumerate() {
            if Some(i) == lateral {
                continue;
            }
            draw_part(surface, camera, part, colors, pixel_width, text, cap);
        }
    }
}

/// Draw a single part. Returns whether anything was painted.
pub fn draw_part(
    surface: &mut impl DrawSurface,
    camera: &CameraState,
    part: &DrawPart,
    colors: &ColorSettings,
    pixel_width: f32,
    text: Option<&TextSettings>,
    cap: LineCap,
) -> bool {
    match part.draw_type {
        DrawType::Angle => draw_angle(surface, camera, part, colors, pixel_width, text),
        DrawType::Text => text.is_some_and(|t| draw_texts(surface, part, t)),
        DrawType::Lines | DrawType::Filled => {
            let drawn = draw_lines_or_polygon(surface, part, colors, pixel_width, cap);
            if let Some(t) = text {
                draw_texts(surface, part, t);
            }
            drawn
        }
        DrawType::Vertex => draw_points(surface, part, colors, pixel_width),
    }
}

/// Shaded lateral surface plus end caps. Returns the index of the part used as the axis line.
fn draw_cylinder(
    surface: &mut impl DrawSurface,
    object: &DrawObject,
    colors: &ColorSettings,
    pixel_width: f32,
    text: Option<&TextSettings>,
) -> Option<usize> {
    let index = object
        .parts
        .iter()
        .position(|p| p.draw_type == DrawType::Lines && p.screen_endpoints().is_some())?;
    let line = &object.parts[index];
    let (start, end) = line.screen_endpoints()?;

    let (start_color, end_color) = match line.elevation {
        Some(e) if e.is_descending() => (colors.cylinder_high, colors.cylinder_low),
        _ => (colors.cylinder_low, colors.cylinder_high),
    };

    let width = pixel_width * CYLINDER_WIDTH_FACTOR;
    surface.gradient_segment(start, end, width, start_color, end_color);
    let cap_stroke = Stroke::new(pixel_width, colors.line_color);
    surface.circle(start, width * 0.5, start_color, cap_stroke);
    surface.circle(end, width * 0.5, end_color, cap_stroke);

    if let Some(t) = text {
        draw_texts(surface, line, t);
    }
    Some(index)
}

fn draw_lines_or_polygon(
    surface: &mut impl DrawSurface,
    part: &DrawPart,
    colors: &ColorSettings,
    pixel_width: f32,
    cap: LineCap,
) -> bool {
    let Some(pts) = part.vertices2d.as_deref() else {
        return false;
    };
    if pts.len() < 2 {
        return false;
    }
    let filled = part.draw_type == DrawType::Filled;
    let holes: Vec<Vec<Vec2>> = part
        .voids
        .iter()
        .filter_map(|v| v.vertices2d.clone())
        .collect();

    if filled {
        if let Some(fill) = colors.fill_color {
            surface.fill_polygon(open_loop(pts), &holes, fill);
        }
    }

    if let Some(outline) = colors.outline_color {
        let stroke = Stroke::new(pixel_width + 2.0, outline);
        surface.polyline(pts, filled, stroke, cap);
        for hole in &holes {
            surface.polyline(hole, true, stroke, cap);
        }
    }

    let stroke = Stroke::new(pixel_width, colors.line_color);
    match part.vertex_colors.as_deref() {
        Some(segment_colors) if !segment_colors.is_empty() => {
            let mut segments: Vec<[Vec2; 2]> = pts.windows(2).map(|w| [w[0], w[1]]).collect();
            if filled && pts.first() != pts.last() {
                segments.push([pts[pts.len() - 1], pts[0]]);
            }
            for (i, seg) in segments.iter().enumerate() {
                let color = segment_colors
                    .get(i)
                    .map(|c| to_color32(*c))
                    .unwrap_or(colors.line_color);
                surface.polyline(seg, false, Stroke::new(pixel_width, color), cap);
            }
        }
        _ => surface.polyline(pts, filled, stroke, cap),
    }

    for hole in &holes {
        surface.polyline(hole, true, stroke, cap);
    }

    if colors.slope_arrows {
        draw_slope_arrows(surface, part, pts, colors, pixel_width);
    }
    true
}

/// Arrowheads on segments whose slope differs from the previous segment
fn draw_slope_arrows(
    surface: &mut impl DrawSurface,
    part: &DrawPart,
    pts: &[Vec2],
    colors: &ColorSettings,
    pixel_width: f32,
) {
    let verts = &part.vertices3d;
    if verts.len() != pts.len() {
        return;
    }
    let size = pixel_width * 3.0 + 6.0;
    let mut prev_slope: Option<f32> = None;

    for i in 0..pts.len() - 1 {
        let (a3, b3) = (verts[i], verts[i + 1]);
        let run = a3.truncate().distance(b3.truncate());
        let rise = b3.z - a3.z;
        if run <= f32::EPSILON {
            prev_slope = None;
            continue;
        }
        let slope = rise / run;
        let changed = prev_slope.map_or(true, |p| (p - slope).abs() > SLOPE_EPSILON);
        prev_slope = Some(slope);
        if !changed || slope.abs() <= SLOPE_EPSILON {
            continue;
        }

        let seg = pts[i + 1] - pts[i];
        let len = seg.length();
        if len < size * 3.0 {
            continue;
        }
        let downhill = if rise < 0.0 { seg / len } else { -seg / len };
        let tip = (pts[i] + pts[i + 1]) * 0.5 + downhill * (size * 0.5);
        let base = tip - downhill * size;
        let side = perpendicular(downhill) * (size * 0.5);
        surface.fill_polygon(&[tip, base + side, base - side], &[], colors.line_color);
    }
}

fn draw_points(
    surface: &mut impl DrawSurface,
    part: &DrawPart,
    colors: &ColorSettings,
    pixel_width: f32,
) -> bool {
    let Some(pts) = part.vertices2d.as_deref() else {
        return false;
    };
    if pts.is_empty() {
        return false;
    }
    let radius = pixel_width * 1.5 + 2.0;
    let outline = Stroke::new(1.0, colors.outline_color.unwrap_or(Color32::BLACK));
    let last = pts.len() - 1;
    for (i, p) in pts.iter().enumerate() {
        let fill = if i == 0 {
            colors.point_color.start
        } else if i == last {
            colors.point_color.end
        } else if colors.display_all_points {
            colors.point_color.middle
        } else {
            continue;
        };
        surface.circle(*p, radius, fill, outline);
    }
    true
}

/// Draw the labels of a part. Returns whether any label fit.
pub fn draw_texts(surface: &mut impl DrawSurface, part: &DrawPart, text: &TextSettings) -> bool {
    let (Some(pts), Some(label)) = (part.vertices2d.as_deref(), part.text.as_ref()) else {
        return false;
    };
    match label {
        PartText::Label(s) => match pts.len() {
            0 => false,
            1 => {
                surface.text(pts[0] - Vec2::new(0.0, LABEL_MARGIN_PX), s, &text.style, 0.0);
                true
            }
            2 => draw_segment_label(surface, pts[0], pts[1], s, &text.style),
            _ => match centroid2(open_loop(pts)) {
                Some(center) => {
                    surface.text(center, s, &text.style, 0.0);
                    true
                }
                None => false,
            },
        },
        PartText::Segments(labels) => {
            let mut drawn = false;
            for (i, label) in labels.iter().enumerate() {
                if label.is_empty() {
                    continue;
                }
                if let (Some(a), Some(b)) = (pts.get(i), pts.get(i + 1)) {
                    drawn |= draw_segment_label(surface, *a, *b, label, &text.style);
                }
            }
            drawn
        }
    }
}

fn draw_segment_label(
    surface: &mut impl DrawSurface,
    a: Vec2,
    b: Vec2,
    label: &str,
    style: &TextStyle,
) -> bool {
    let seg = b - a;
    let width = surface.measure_text(label, style);
    if seg.length() < LABEL_MARGIN_PX + width {
        trace!("label '{label}' does not fit on {:.1}px segment", seg.length());
        return false;
    }
    surface.text((a + b) * 0.5, label, style, upright_angle(seg));
    true
}

/// Arc between the two rays of an angle part: vertices are `[vertex, a, b]`
fn draw_angle(
    surface: &mut impl DrawSurface,
    camera: &CameraState,
    part: &DrawPart,
    colors: &ColorSettings,
    pixel_width: f32,
    text: Option<&TextSettings>,
) -> bool {
    let Some(pts) = part.vertices2d.as_deref() else {
        return false;
    };
    if pts.len() < 3 || part.vertices3d.len() < 3 {
        return false;
    }
    let vertex = part.vertices3d[0];
    let ray_a = part.vertices3d[1] - vertex;
    let ray_b = part.vertices3d[2] - vertex;

    if camera.is_perspective() {
        let normal = ray_a.cross(ray_b).normalize_or_zero();
        if normal == Vec3::ZERO {
            return false;
        }
        if camera.view_direction_to(vertex).dot(normal).abs() < ANGLE_EDGE_ON_DOT {
            trace!("angle plane seen edge-on");
            return false;
        }
    }

    let center = pts[0];
    let da = pts[1] - center;
    let db = pts[2] - center;
    let (la, lb) = (da.length(), db.length());
    if la < ANGLE_MIN_RAY_PX || lb < ANGLE_MIN_RAY_PX {
        return false;
    }

    let radius = (la.min(lb) * 0.5).min(ANGLE_MAX_ARC_PX);
    let (ray_px, ray_world) = if la <= lb {
        (la, ray_a.length())
    } else {
        (lb, ray_b.length())
    };
    let arc_world = radius * ray_world / ray_px;
    if arc_world > camera.distance_to(vertex) * ANGLE_MAX_ARC_DISTANCE_RATIO {
        trace!("angle arc too large for camera distance");
        return false;
    }

    let start = da.y.atan2(da.x);
    let mut sweep = db.y.atan2(db.x) - start;
    if sweep > PI {
        sweep -= TAU;
    } else if sweep < -PI {
        sweep += TAU;
    }
    surface.arc(
        center,
        radius,
        start,
        start + sweep,
        Stroke::new(pixel_width, colors.line_color),
    );

    if let (Some(t), Some(PartText::Label(label))) = (text, part.text.as_ref()) {
        let mid = start + sweep * 0.5;
        let pos = center + Vec2::new(mid.cos(), mid.sin()) * (radius + t.style.size);
        surface.text(pos, label, &t.style, 0.0);
    }
    true
}
