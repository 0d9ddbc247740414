//! Marker clicks and tool actions

use glam::Vec3;
use measure_overlay_lib::state::MeasureState;
use shared::AxisName;

/// Active pointer tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tool {
    #[default]
    Measure,
    Area,
    PointLine,
}

impl Tool {
    pub fn label(&self) -> &'static str {
        match self {
            Tool::Measure => "Measure",
            Tool::Area => "Area",
            Tool::PointLine => "Point line",
        }
    }
}

/// What a clicked marker glyph asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerAction {
    RemoveSet(usize),
    Info(usize),
    HideAxis(usize, AxisName),
    Remove(Tool),
    Undo(Tool),
    Finalize(Tool),
}

fn indexed(id: &str, prefix: &str) -> Option<usize> {
    id.strip_prefix(prefix)?.strip_prefix('-')?.parse().ok()
}

fn shape_tool(name: &str) -> Option<Tool> {
    match name {
        "Area" => Some(Tool::Area),
        "PointLine" => Some(Tool::PointLine),
        _ => None,
    }
}

/// Map a marker id back to its action
pub fn parse_marker(id: &str) -> Option<MarkerAction> {
    if let Some(rest) = id.strip_prefix("removeMeasureResult") {
        let (suffix, index) = rest.split_once('-')?;
        let axis = match suffix {
            "" => AxisName::Result,
            "Planar" => AxisName::XyPlane,
            "X" => AxisName::XAxis,
            "Y" => AxisName::YAxis,
            "Z" => AxisName::ZAxis,
            "Normal" => AxisName::Normal,
            _ => return None,
        };
        return Some(MarkerAction::HideAxis(index.parse().ok()?, axis));
    }
    if let Some(index) = indexed(id, "removeMeasure") {
        return Some(MarkerAction::RemoveSet(index));
    }
    if let Some(index) = indexed(id, "infoMeasure") {
        return Some(MarkerAction::Info(index));
    }
    if let Some(tool) = id.strip_prefix("remove").and_then(shape_tool) {
        return Some(MarkerAction::Remove(tool));
    }
    if let Some(tool) = id.strip_prefix("undo").and_then(shape_tool) {
        return Some(MarkerAction::Undo(tool));
    }
    id.strip_prefix("finalize")
        .and_then(shape_tool)
        .map(MarkerAction::Finalize)
}

/// Area of a polygon projected on the XY plane
pub fn polygon_area(points: &[Vec3]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice.abs() * 0.5
}

pub fn polyline_length(points: &[Vec3]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

fn undo_point(state: &mut MeasureState, tool: Tool) {
    match tool {
        Tool::Area => {
            state.undo_area_point();
        }
        Tool::PointLine => {
            state.undo_point_line_point();
        }
        Tool::Measure => {}
    }
}

/// Undo the last point of the active tool
pub fn undo(state: &mut MeasureState, tool: Tool) -> bool {
    let before = (state.area().len(), state.point_line().len());
    undo_point(state, tool);
    before != (state.area().len(), state.point_line().len())
}

/// Apply a marker action; returns true when the measurement state changed
pub fn apply_marker(action: MarkerAction, state: &mut MeasureState, tool: &mut Tool, info: &mut Option<usize>) -> bool {
    match action {
        MarkerAction::RemoveSet(index) => {
            if *info == Some(index) {
                *info = None;
            }
            state.remove_set(index).is_some()
        }
        MarkerAction::Info(index) => {
            *info = Some(index);
            false
        }
        MarkerAction::HideAxis(index, axis) => state.toggle_axis(index, axis),
        MarkerAction::Remove(Tool::Area) => {
            state.clear_area();
            true
        }
        MarkerAction::Remove(Tool::PointLine) => {
            state.clear_point_line();
            true
        }
        MarkerAction::Remove(Tool::Measure) => false,
        MarkerAction::Undo(which) => undo(state, which),
        MarkerAction::Finalize(Tool::Area) => {
            tracing::info!(
                points = state.area().len(),
                area = polygon_area(state.area()),
                "area finished"
            );
            state.clear_area();
            *tool = Tool::Measure;
            true
        }
        MarkerAction::Finalize(Tool::PointLine) => {
            tracing::info!(
                points = state.point_line().len(),
                length = polyline_length(state.point_line()),
                "point line finished"
            );
            state.clear_point_line();
            *tool = Tool::Measure;
            true
        }
        MarkerAction::Finalize(Tool::Measure) => false,
    }
}
