//! Retained egui display list used as the overlay canvas.
//!
//! The overlay only repaints when a refresh commits, while egui paints every
//! frame, so the last drawn frame is kept as a list of shapes and replayed by
//! the viewport until the next successful draw.

use std::sync::Arc;

use egui::emath::Rot2;
use egui::epaint::text::Galley;
use egui::epaint::{Mesh, TextShape};
use egui::{Color32, FontId, Shape, Stroke};
use glam::Vec2;
use tracing::trace;

use super::surface::{DrawSurface, LineCap, TextStyle};
use crate::error::{OverlayError, Result};
use crate::helpers::to_pos2;

const ARC_SEGMENTS_PER_RADIAN: f32 = 12.0;
const FALLBACK_CHAR_WIDTH: f32 = 0.6;

/// Canvas that records egui shapes in viewport-local coordinates
#[derive(Default)]
pub struct ShapeCanvas {
    shapes: Vec<Shape>,
    size: Vec2,
    /// Needed for text layout; without it labels are measured approximately and skipped
    ctx: Option<egui::Context>,
}

impl ShapeCanvas {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            shapes: Vec::new(),
            size: Vec2::ZERO,
            ctx: Some(ctx),
        }
    }

    /// Canvas without font access (headless use)
    pub fn headless() -> Self {
        Self::default()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Match the viewport size; a new size discards the retained frame
    pub fn resize(&mut self, size: Vec2) -> bool {
        if self.size == size {
            return false;
        }
        self.size = size;
        self.shapes.clear();
        true
    }

    /// Replay the retained frame with its origin at `origin`
    pub fn paint(&self, painter: &egui::Painter, origin: egui::Pos2) {
        let offset = origin.to_vec2();
        painter.extend(self.shapes.iter().cloned().map(|mut shape| {
            shape.translate(offset);
            shape
        }));
    }

    fn layout(&self, text: &str, style: &TextStyle, color: Color32) -> Option<Arc<Galley>> {
        let ctx = self.ctx.as_ref()?;
        Some(ctx.fonts(|fonts| {
            fonts.layout_no_wrap(text.to_owned(), FontId::proportional(style.size), color)
        }))
    }
}

impl DrawSurface for ShapeCanvas {
    fn clear(&mut self) {
        self.shapes.clear();
    }

    fn polyline(&mut self, points: &[Vec2], closed: bool, stroke: Stroke, cap: LineCap) {
        if points.len() < 2 {
            return;
        }
        let pts: Vec<egui::Pos2> = points.iter().copied().map(to_pos2).collect();
        if cap == LineCap::Round && !closed {
            let r = stroke.width * 0.5;
            for end in [pts[0], pts[pts.len() - 1]] {
                self.shapes.push(Shape::circle_filled(end, r, stroke.color));
            }
        }
        if closed {
            self.shapes.push(Shape::closed_line(pts, stroke));
        } else {
            self.shapes.push(Shape::line(pts, stroke));
        }
    }

    fn fill_polygon(&mut self, outer: &[Vec2], holes: &[Vec<Vec2>], fill: Color32) {
        match triangulate(outer, holes, fill) {
            Ok(mesh) => self.shapes.push(Shape::mesh(mesh)),
            Err(err) => trace!("skipping fill: {err}"),
        }
    }

    fn circle(&mut self, center: Vec2, radius: f32, fill: Color32, stroke: Stroke) {
        let c = to_pos2(center);
        if fill != Color32::TRANSPARENT {
            self.shapes.push(Shape::circle_filled(c, radius, fill));
        }
        if stroke.width > 0.0 {
            self.shapes.push(Shape::circle_stroke(c, radius, stroke));
        }
    }

    fn arc(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32, stroke: Stroke) {
        let sweep = end_angle - start_angle;
        let steps = ((sweep.abs() * ARC_SEGMENTS_PER_RADIAN).ceil() as usize).max(2);
        let pts: Vec<egui::Pos2> = (0..=steps)
            .map(|i| {
                let a = start_angle + sweep * (i as f32 / steps as f32);
                to_pos2(center + Vec2::new(a.cos(), a.sin()) * radius)
            })
            .collect();
        self.shapes.push(Shape::line(pts, stroke));
    }

    fn gradient_segment(
        &mut self,
        from: Vec2,
        to: Vec2,
        width: f32,
        from_color: Color32,
        to_color: Color32,
    ) {
        let Some(dir) = (to - from).try_normalize() else {
            return;
        };
        let side = Vec2::new(-dir.y, dir.x) * (width * 0.5);
        let mut mesh = Mesh::default();
        mesh.colored_vertex(to_pos2(from + side), from_color);
        mesh.colored_vertex(to_pos2(from - side), from_color);
        mesh.colored_vertex(to_pos2(to - side), to_color);
        mesh.colored_vertex(to_pos2(to + side), to_color);
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(0, 2, 3);
        self.shapes.push(Shape::mesh(mesh));
    }

    fn text(&mut self, center: Vec2, text: &str, style: &TextStyle, angle: f32) {
        let Some(galley) = self.layout(text, style, style.color) else {
            trace!("no font context, label '{text}' skipped");
            return;
        };
        let half = galley.size() * 0.5;
        let rot = Rot2::from_angle(angle);
        let top_left = to_pos2(center) - rot * half;

        if let Some(outline) = style.outline {
            if let Some(halo) = self.layout(text, style, outline) {
                let offsets = [
                    egui::vec2(1.0, 0.0),
                    egui::vec2(-1.0, 0.0),
                    egui::vec2(0.0, 1.0),
                    egui::vec2(0.0, -1.0),
                ];
                for offset in offsets {
                    self.shapes.push(Shape::Text(
                        TextShape::new(top_left + offset, halo.clone(), outline).with_angle(angle),
                    ));
                }
            }
        }
        self.shapes.push(Shape::Text(
            TextShape::new(top_left, galley, style.color).with_angle(angle),
        ));
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> f32 {
        match self.layout(text, style, style.color) {
            Some(galley) => galley.size().x,
            None => text.chars().count() as f32 * style.size * FALLBACK_CHAR_WIDTH,
        }
    }
}

/// Ear-clip a polygon with holes into a single-colour mesh
fn triangulate(outer: &[Vec2], holes: &[Vec<Vec2>], fill: Color32) -> Result<Mesh> {
    if outer.len() < 3 {
        return Err(OverlayError::Degenerate(format!(
            "polygon with {} vertices",
            outer.len()
        )));
    }

    let hole_len: usize = holes.iter().map(|h| h.len()).sum();
    let mut coords = Vec::with_capacity((outer.len() + hole_len) * 2);
    for p in outer {
        coords.push(p.x as f64);
        coords.push(p.y as f64);
    }
    let mut hole_indices = Vec::with_capacity(holes.len());
    for hole in holes.iter().filter(|h| h.len() >= 3) {
        hole_indices.push(coords.len() / 2);
        for p in hole {
            coords.push(p.x as f64);
            coords.push(p.y as f64);
        }
    }

    let indices = earcutr::earcut(&coords, &hole_indices, 2)
        .map_err(|e| OverlayError::Triangulation(format!("{:?}", e)))?;

    let mut mesh = Mesh::default();
    for xy in coords.chunks_exact(2) {
        mesh.colored_vertex(egui::pos2(xy[0] as f32, xy[1] as f32), fill);
    }
    for tri in indices.chunks_exact(3) {
        mesh.add_triangle(tri[0] as u32, tri[1] as u32, tri[2] as u32);
    }
    Ok(mesh)
}
