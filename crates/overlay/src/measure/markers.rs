//! Moves marker glyphs to the positions of the last committed frame.
//!
//! Glyphs are authored on a 200×200 box centred at (100, 100). The translate
//! subtracts (100, 98), so a glyph's centre lands 2 px below its anchor point.
//! Markers without a position are parked off-screen instead of being removed,
//! so hosts never create or destroy glyphs per frame.

use std::collections::BTreeMap;

use glam::Vec2;
use shared::AxisName;

use super::positions::{InteractionPositions, ShapeMarkers};

/// Translate applied to markers that have no position this frame
pub const HIDDEN: Vec2 = Vec2::new(-1000.0, -1000.0);

const ANCHOR_OFFSET: Vec2 = Vec2::new(100.0, 98.0);

/// Something that owns marker glyphs addressed by id
pub trait MarkerHost {
    fn set_translate(&mut self, id: &str, translate: Vec2);
}

pub fn marker_translate(position: Option<Vec2>) -> Vec2 {
    match position {
        Some(p) => p - ANCHOR_OFFSET,
        None => HIDDEN,
    }
}

pub fn remove_marker_id(index: usize) -> String {
    format!("removeMeasure-{index}")
}

pub fn info_marker_id(index: usize) -> String {
    format!("infoMeasure-{index}")
}

pub fn axis_marker_id(axis: AxisName, index: usize) -> String {
    let suffix = match axis {
        AxisName::Result => "",
        AxisName::XyPlane => "Planar",
        AxisName::XAxis => "X",
        AxisName::YAxis => "Y",
        AxisName::ZAxis => "Z",
        AxisName::Normal => "Normal",
    };
    format!("removeMeasureResult{suffix}-{index}")
}

/// Place every marker of `positions` on `host`
pub fn move_interaction_markers(host: &mut impl MarkerHost, positions: &InteractionPositions) {
    for (i, set) in positions.sets.iter().enumerate() {
        host.set_translate(&remove_marker_id(i), marker_translate(set.remove));
        host.set_translate(&info_marker_id(i), marker_translate(set.info));
    }
    for (i, result) in positions.results.iter().enumerate() {
        for axis in AxisName::ALL {
            let position = result.axes.get(&axis).copied();
            host.set_translate(&axis_marker_id(axis, i), marker_translate(position));
        }
    }
    move_shape_markers(host, "Area", &positions.area);
    move_shape_markers(host, "PointLine", &positions.point_line);
}

fn move_shape_markers(host: &mut impl MarkerHost, tool: &str, markers: &ShapeMarkers) {
    host.set_translate(&format!("remove{tool}"), marker_translate(markers.remove));
    host.set_translate(&format!("undo{tool}"), marker_translate(markers.undo));
    host.set_translate(&format!("finalize{tool}"), marker_translate(markers.finalize));
}

/// Marker translates keyed by id, the way an SVG layer holds them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerTransforms {
    translates: BTreeMap<String, Vec2>,
}

impl MarkerTransforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Vec2> {
        self.translates.get(id).copied()
    }

    /// SVG transform attribute of a marker
    pub fn transform(&self, id: &str) -> Option<String> {
        self.get(id)
            .map(|t| format!("translate({}, {})", t.x, t.y))
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.get(id).is_some_and(|t| t != HIDDEN)
    }

    /// Screen point a visible marker is anchored to
    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.get(id)
            .filter(|t| *t != HIDDEN)
            .map(|t| t + ANCHOR_OFFSET)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Vec2)> {
        self.translates.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.translates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translates.is_empty()
    }

    /// Forget glyphs of measurements that no longer exist
    pub fn clear(&mut self) {
        self.translates.clear();
    }
}

impl MarkerHost for MarkerTransforms {
    fn set_translate(&mut self, id: &str, translate: Vec2) {
        self.translates.insert(id.to_string(), translate);
    }
}
