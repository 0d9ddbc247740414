//! Screen positions of the interaction markers (remove, info, undo, finalize).
//!
//! Pure functions of committed draw products and the camera. A marker that
//! cannot be placed (too far away, too short on screen, not projectable) is
//! `None`: hidden, never moved to a fallback spot.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use shared::{ActiveAxis, AxisName, DrawObjectKind, DrawProduct, MeasurementId};
use tracing::trace;

use super::frame::{ResultFrame, SetFrame};
use crate::engine2d::CameraState;
use crate::helpers::{centroid2, centroid3, open_loop, perpendicular};
use crate::sdk::Projector;

/// Planes farther than this (world units) get no markers
pub const PLANE_MAX_DISTANCE: f32 = 100.0;
/// Segments must be longer than this on screen to get markers
pub const SEGMENT_MIN_PX: f32 = 110.0;
/// Axis segments must be longer than this to count as long
pub const AXIS_MIN_PX: f32 = 120.0;

const AXIS_OFFSET_PX: f32 = 55.0;
const MARKER_SPACING_PX: f32 = 25.0;
const SEGMENT_NORMAL_OFFSET_PX: f32 = 20.0;

/// Markers of one measure set
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SetMarkers {
    pub key: String,
    pub remove: Option<Vec2>,
    pub info: Option<Vec2>,
}

/// Per-axis remove markers of one duo measurement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultMarkers {
    pub id: Option<MeasurementId>,
    pub axes: BTreeMap<AxisName, Vec2>,
}

/// Markers of an in-progress area or point-line
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeMarkers {
    pub remove: Option<Vec2>,
    pub undo: Option<Vec2>,
    pub finalize: Option<Vec2>,
}

/// All marker positions of one frame.
///
/// `sets` and `results` have exactly one record per input set/result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionPositions {
    pub sets: Vec<SetMarkers>,
    pub results: Vec<ResultMarkers>,
    pub area: ShapeMarkers,
    pub point_line: ShapeMarkers,
}

impl InteractionPositions {
    pub fn remove(&self) -> Vec<Option<Vec2>> {
        self.sets.iter().map(|s| s.remove).collect()
    }

    pub fn info(&self) -> Vec<Option<Vec2>> {
        self.sets.iter().map(|s| s.info).collect()
    }

    pub fn remove_axis(&self, index: usize, axis: AxisName) -> Option<Vec2> {
        self.results.get(index)?.axes.get(&axis).copied()
    }
}

/// Compute every marker of a committed frame
pub fn compute_positions(
    projector: &impl Projector,
    camera: &CameraState,
    sets: &[SetFrame],
    results: &[Option<ResultFrame>],
    area: &[Vec3],
    point_line: &[Vec3],
    point_line_product: Option<&DrawProduct>,
) -> InteractionPositions {
    let sets = sets
        .iter()
        .map(|set| {
            let (remove, info) = match set.single_product() {
                Some(product) => entity_markers(projector, camera, product),
                None => (None, None),
            };
            SetMarkers {
                key: set.key.clone(),
                remove,
                info,
            }
        })
        .collect();

    let results = results
        .iter()
        .map(|result| match result {
            Some(ResultFrame {
                id,
                product: Some(product),
                active_axis,
            }) => ResultMarkers {
                id: Some(*id),
                axes: axis_markers(product, active_axis),
            },
            Some(r) => ResultMarkers {
                id: Some(r.id),
                axes: BTreeMap::new(),
            },
            None => ResultMarkers::default(),
        })
        .collect();

    InteractionPositions {
        sets,
        results,
        area: area_markers(projector, area),
        point_line: point_line_markers(projector, point_line_product, point_line),
    }
}

/// Remove and info marker of a single-entity measurement
pub fn entity_markers(
    projector: &impl Projector,
    camera: &CameraState,
    product: &DrawProduct,
) -> (Option<Vec2>, Option<Vec2>) {
    let placed = match product.primary_kind() {
        Some(DrawObjectKind::Plane) => plane_markers(projector, camera, product),
        Some(DrawObjectKind::Cylinder | DrawObjectKind::CurveSegment | DrawObjectKind::Edge) => {
            segment_markers(product)
        }
        Some(DrawObjectKind::Vertex) => vertex_markers(product),
        _ => None,
    };
    match placed {
        Some((remove, info)) => (Some(remove), info),
        None => (None, None),
    }
}

fn plane_markers(
    projector: &impl Projector,
    camera: &CameraState,
    product: &DrawProduct,
) -> Option<(Vec2, Option<Vec2>)> {
    let outline = product.objects.first()?.parts.last()?;
    let center = centroid3(open_loop(&outline.vertices3d))?;
    let distance = camera.distance_to(center);
    if distance >= PLANE_MAX_DISTANCE {
        trace!("plane centre {distance:.1} units away, markers hidden");
        return None;
    }
    let remove = *projector.to_marker_points(&[center])?.first()?;
    Some((remove, Some(remove + Vec2::X * MARKER_SPACING_PX)))
}

fn segment_markers(product: &DrawProduct) -> Option<(Vec2, Option<Vec2>)> {
    let part = product.objects.first()?.parts.first()?;
    let (start, end) = part.screen_endpoints()?;
    let seg = end - start;
    let len = seg.length();
    if len <= SEGMENT_MIN_PX {
        trace!("segment {len:.1}px on screen, markers hidden");
        return None;
    }
    let dir = seg / len;
    // Keep markers above the line
    let mut normal = perpendicular(dir);
    if normal.y > 0.0 {
        normal = -normal;
    }
    let remove = (start + end) * 0.5 + normal * SEGMENT_NORMAL_OFFSET_PX;
    Some((remove, Some(remove + dir * MARKER_SPACING_PX)))
}

fn vertex_markers(product: &DrawProduct) -> Option<(Vec2, Option<Vec2>)> {
    let point = product
        .parts()
        .find_map(|p| p.vertices2d.as_ref()?.first().copied())?;
    Some((point + Vec2::X * MARKER_SPACING_PX, None))
}

/// Per-axis remove markers of a duo measurement.
///
/// Markers sit 55px past the start of their axis segment. Every active axis
/// longer than [`AXIS_MIN_PX`] gets one. Until such a long axis is seen, the
/// longest short axis holds the only marker; the first long axis discards it.
pub fn axis_markers(product: &DrawProduct, active: &ActiveAxis) -> BTreeMap<AxisName, Vec2> {
    let mut markers = BTreeMap::new();
    let mut found_long = false;
    let mut short_len = 0.0_f32;

    for part in product.parts() {
        let Some(axis) = part.name().and_then(AxisName::from_part_name) else {
            continue;
        };
        if !active.is_active(axis) {
            continue;
        }
        let Some((start, end)) = part.screen_endpoints() else {
            continue;
        };
        let seg = end - start;
        let len = seg.length();
        if len > AXIS_MIN_PX {
            if !found_long {
                markers.clear();
                found_long = true;
            }
            markers.insert(axis, start + seg / len * AXIS_OFFSET_PX);
        } else if !found_long && len > short_len {
            markers.clear();
            short_len = len;
            markers.insert(axis, start + seg / len * AXIS_OFFSET_PX);
        }
    }
    markers
}

/// Markers of the area tool: undo after the first point, finalize and remove from three
pub fn area_markers(projector: &impl Projector, points: &[Vec3]) -> ShapeMarkers {
    let Some(pts) = projector.to_marker_points(points) else {
        return ShapeMarkers::default();
    };
    let Some(last) = pts.last().copied() else {
        return ShapeMarkers::default();
    };
    let closed = pts.len() >= 3;
    ShapeMarkers {
        remove: if closed { centroid2(&pts) } else { None },
        undo: Some(last + Vec2::X * MARKER_SPACING_PX),
        finalize: closed.then(|| last + Vec2::X * MARKER_SPACING_PX * 2.0),
    }
}

/// Markers of the point-line tool, pushed off the last segment along its screen normal
pub fn point_line_markers(
    projector: &impl Projector,
    product: Option<&DrawProduct>,
    points: &[Vec3],
) -> ShapeMarkers {
    let Some(pts) = projector.to_marker_points(points) else {
        return ShapeMarkers::default();
    };
    let (Some(first), Some(last)) = (pts.first().copied(), pts.last().copied()) else {
        return ShapeMarkers::default();
    };
    let remove = Some(first - Vec2::X * MARKER_SPACING_PX);

    let normal = match (points, product) {
        ([.., a, b], Some(product)) => projector.get_2d_normal(product, (*a, *b)),
        _ => None,
    };
    match normal {
        Some(info) => ShapeMarkers {
            remove,
            undo: Some(last + info.normal * MARKER_SPACING_PX),
            finalize: Some(last + info.normal * MARKER_SPACING_PX * 2.0),
        },
        None => ShapeMarkers {
            remove,
            undo: Some(last + Vec2::X * MARKER_SPACING_PX),
            finalize: None,
        },
    }
}
