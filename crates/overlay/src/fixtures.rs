//! Factory functions and test doubles.
//!
//! `FakeSdk` stands in for the rendering SDK: it projects with a simple pinhole
//! or orthographic camera and converts entities from a tiny in-memory scene.
//! `GatedSdk` holds conversions until the test opens a gate, and
//! `RecordingSurface` records draw calls instead of painting.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};

use egui::{Color32, Stroke};
use glam::{Vec2, Vec3};
use shared::*;
use tokio::sync::oneshot;

use crate::engine2d::{DrawSurface, LineCap, TextStyle};
use crate::sdk::{DrawSettings, MeasureSdk, Projector};

// ── Entity factories ────────────────────────────────────────────

/// Entity with explicit identity
pub fn entity(object_id: ObjectId, instance_index: u32, path_index: Option<u32>, draw_kind: DrawKind) -> MeasureEntity {
    MeasureEntity {
        object_id,
        instance_index,
        path_index,
        draw_kind,
        position: Vec3::ZERO,
        settings: None,
    }
}

/// Picked vertex at `position`
pub fn vertex_entity(object_id: ObjectId, position: Vec3) -> MeasureEntity {
    MeasureEntity {
        position,
        ..entity(object_id, 0, None, DrawKind::Vertex)
    }
}

pub fn edge_entity(object_id: ObjectId, path_index: u32) -> MeasureEntity {
    entity(object_id, 0, Some(path_index), DrawKind::Edge)
}

pub fn face_entity(object_id: ObjectId, path_index: u32) -> MeasureEntity {
    entity(object_id, 0, Some(path_index), DrawKind::Face)
}

pub fn cylinder_entity(object_id: ObjectId, path_index: u32, mode: CylinderMeasure) -> MeasureEntity {
    MeasureEntity {
        settings: Some(MeasureSettings {
            cylinder_measure: Some(mode),
        }),
        ..entity(object_id, 0, Some(path_index), DrawKind::Curve)
    }
}

/// Duo result between two points
pub fn duo_result(id: MeasurementId, from: Vec3, to: Vec3) -> DuoResult {
    let d = (to - from).as_dvec3();
    DuoResult {
        id,
        from,
        to,
        distance: d.length(),
        distance_x: d.x.abs(),
        distance_y: d.y.abs(),
        distance_z: d.z.abs(),
        planar_distance: d.truncate().length(),
        normal_distance: None,
        angle: None,
    }
}

// ── Product factories ───────────────────────────────────────────

fn single_object(kind: DrawProductKind, object: DrawObjectKind, parts: Vec<DrawPart>) -> DrawProduct {
    DrawProduct {
        kind,
        objects: vec![DrawObject { kind: object, parts }],
    }
}

/// Unprojected edge between two world points
pub fn edge_product(a: Vec3, b: Vec3) -> DrawProduct {
    single_object(
        DrawProductKind::Basic,
        DrawObjectKind::Edge,
        vec![DrawPart::new(DrawType::Lines, vec![a, b], None)],
    )
}

/// Horizontal square outline of side `size` around `center`, closed loop
pub fn plane_product(center: Vec3, size: f32) -> DrawProduct {
    let h = size * 0.5;
    let corners = vec![
        center + Vec3::new(-h, -h, 0.0),
        center + Vec3::new(h, -h, 0.0),
        center + Vec3::new(h, h, 0.0),
        center + Vec3::new(-h, h, 0.0),
        center + Vec3::new(-h, -h, 0.0),
    ];
    single_object(
        DrawProductKind::Basic,
        DrawObjectKind::Plane,
        vec![DrawPart::new(DrawType::Filled, corners, None)],
    )
}

/// Product with a single screen-space segment from `a` to `b`
pub fn screen_product(kind: DrawObjectKind, a: Vec2, b: Vec2) -> DrawProduct {
    let draw_type = match kind {
        DrawObjectKind::Vertex => DrawType::Vertex,
        _ => DrawType::Lines,
    };
    single_object(
        DrawProductKind::Basic,
        kind,
        vec![DrawPart::new(draw_type, vec![Vec3::ZERO, Vec3::X], Some(vec![a, b]))],
    )
}

/// Named axis part of a duo result, already projected
pub fn axis_part(axis: AxisName, a: Vec2, b: Vec2) -> DrawPart {
    DrawPart::new(DrawType::Lines, vec![Vec3::ZERO, Vec3::X], Some(vec![a, b])).with_name(axis.part_name())
}

pub fn result_product(parts: Vec<DrawPart>) -> DrawProduct {
    single_object(DrawProductKind::MeasureResult, DrawObjectKind::Complex, parts)
}

// ── Fake SDK ────────────────────────────────────────────────────

const NEAR: f32 = 0.01;

/// Geometry of a scene object known to the fake SDK
#[derive(Debug, Clone, PartialEq)]
pub enum FakeGeometry {
    Edge(Vec3, Vec3),
    Curve(Vec<Vec3>),
    /// Cylinder axis from bottom to top centre
    Cylinder { start: Vec3, end: Vec3, radius: f32 },
    /// Planar face outline, open loop
    Plane(Vec<Vec3>),
}

/// In-memory stand-in for the rendering SDK
pub struct FakeSdk {
    render_state: Cell<RenderState>,
    scene: RefCell<HashMap<ObjectId, FakeGeometry>>,
    failing: RefCell<HashSet<ObjectId>>,
    measurement_ids: RefCell<HashMap<(String, String), MeasurementId>>,
    draw_entity_calls: Cell<usize>,
    draw_result_calls: Cell<usize>,
    update_calls: Cell<usize>,
    last_draw_settings: RefCell<Option<DrawSettings>>,
}

impl Default for FakeSdk {
    fn default() -> Self {
        Self::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
    }
}

impl FakeSdk {
    /// Pinhole camera at `position` looking at `target`
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self::with_camera(CameraParams::look_at(CameraKind::Pinhole, position, target))
    }

    /// Orthographic camera showing `height` world units vertically
    pub fn orthographic(position: Vec3, target: Vec3, height: f32) -> Self {
        Self::with_camera(CameraParams {
            fov: height,
            ..CameraParams::look_at(CameraKind::Orthographic, position, target)
        })
    }

    fn with_camera(camera: CameraParams) -> Self {
        Self {
            render_state: Cell::new(RenderState {
                camera,
                ..RenderState::default()
            }),
            scene: RefCell::new(HashMap::new()),
            failing: RefCell::new(HashSet::new()),
            measurement_ids: RefCell::new(HashMap::new()),
            draw_entity_calls: Cell::new(0),
            draw_result_calls: Cell::new(0),
            update_calls: Cell::new(0),
            last_draw_settings: RefCell::new(None),
        }
    }

    /// Move the camera, keeping its projection kind and fov
    pub fn set_camera(&self, position: Vec3, target: Vec3) {
        let mut state = self.render_state.get();
        let kind = state.camera.kind;
        state.camera = CameraParams {
            fov: state.camera.fov,
            far: state.camera.far,
            ..CameraParams::look_at(kind, position, target)
        };
        self.render_state.set(state);
    }

    pub fn set_render_state(&self, state: RenderState) {
        self.render_state.set(state);
    }

    pub fn set_viewport(&self, viewport: Vec2) {
        let mut state = self.render_state.get();
        state.viewport = viewport;
        self.render_state.set(state);
    }

    pub fn add_geometry(&self, object_id: ObjectId, geometry: FakeGeometry) {
        self.scene.borrow_mut().insert(object_id, geometry);
    }

    /// Make conversions of `object_id` fail
    pub fn fail_object(&self, object_id: ObjectId) {
        self.failing.borrow_mut().insert(object_id);
    }

    pub fn recover_object(&self, object_id: ObjectId) {
        self.failing.borrow_mut().remove(&object_id);
    }

    pub fn draw_entity_calls(&self) -> usize {
        self.draw_entity_calls.get()
    }

    pub fn draw_result_calls(&self) -> usize {
        self.draw_result_calls.get()
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.get()
    }

    /// Settings passed to the most recent draw conversion
    pub fn last_draw_settings(&self) -> Option<DrawSettings> {
        self.last_draw_settings.borrow().clone()
    }

    /// Project one world point
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        let state = self.render_state.get();
        let camera = state.camera;
        let view = camera.rotation.inverse() * (point - camera.position);
        let half = state.viewport * 0.5;
        match camera.kind {
            CameraKind::Pinhole => {
                if view.z > -NEAR {
                    return None;
                }
                let focal = half.y / (camera.fov.to_radians() * 0.5).tan();
                let depth = -view.z;
                Some(Vec2::new(
                    half.x + focal * view.x / depth,
                    half.y - focal * view.y / depth,
                ))
            }
            CameraKind::Orthographic => {
                let scale = state.viewport.y / camera.fov;
                Some(Vec2::new(half.x + view.x * scale, half.y - view.y * scale))
            }
        }
    }

    fn project_part(&self, part: &mut DrawPart) {
        part.vertices2d = self.to_marker_points(&part.vertices3d);
        for void in &mut part.voids {
            void.vertices2d = self.to_marker_points(&void.vertices3d);
        }
    }

    fn projected(&self, mut product: DrawProduct) -> DrawProduct {
        for part in product.parts_mut() {
            self.project_part(part);
        }
        product
    }

    fn entity_product(&self, entity: &MeasureEntity, settings: &DrawSettings) -> DrawProduct {
        let geometry = self.scene.borrow().get(&entity.object_id).cloned();
        let label = |len: f32| PartText::Label(settings.format_length(f64::from(len)));
        match (entity.draw_kind, geometry) {
            (DrawKind::Vertex, _) | (_, None) => single_object(
                DrawProductKind::Vertex,
                DrawObjectKind::Vertex,
                vec![DrawPart::new(DrawType::Vertex, vec![entity.position], None)],
            ),
            (_, Some(FakeGeometry::Edge(a, b))) => single_object(
                DrawProductKind::Basic,
                DrawObjectKind::Edge,
                vec![DrawPart::new(DrawType::Lines, vec![a, b], None).with_text(label(a.distance(b)))],
            ),
            (_, Some(FakeGeometry::Curve(points))) => single_object(
                DrawProductKind::Basic,
                DrawObjectKind::CurveSegment,
                vec![DrawPart::new(DrawType::Lines, points, None)],
            ),
            (_, Some(FakeGeometry::Cylinder { start, end, radius })) => {
                let offset = match entity.settings.as_ref().and_then(|s| s.cylinder_measure) {
                    Some(CylinderMeasure::Top) => Vec3::Z * radius,
                    Some(CylinderMeasure::Bottom) => Vec3::NEG_Z * radius,
                    _ => Vec3::ZERO,
                };
                let (a, b) = (start + offset, end + offset);
                let mut axis = DrawPart::new(DrawType::Lines, vec![a, b], None)
                    .with_text(PartText::Label(format!(
                    "Ø {}",
                    settings.format_length(f64::from(radius * 2.0))
                )));
                axis.elevation = Some(ElevationInfo {
                    from: f64::from(a.z),
                    to: f64::from(b.z),
                    horizontal_display: false,
                });
                single_object(DrawProductKind::Basic, DrawObjectKind::Cylinder, vec![axis])
            }
            (_, Some(FakeGeometry::Plane(mut outline))) => {
                if let Some(first) = outline.first().copied() {
                    outline.push(first);
                }
                single_object(
                    DrawProductKind::Basic,
                    DrawObjectKind::Plane,
                    vec![DrawPart::new(DrawType::Filled, outline, None)],
                )
            }
        }
    }
}

impl Projector for FakeSdk {
    fn render_state(&self) -> RenderState {
        self.render_state.get()
    }

    fn to_marker_points(&self, points: &[Vec3]) -> Option<Vec<Vec2>> {
        points.iter().map(|p| self.project(*p)).collect()
    }
}

impl MeasureSdk for FakeSdk {
    async fn get_draw_entity(
        &self,
        entity: &MeasureEntity,
        settings: &DrawSettings,
    ) -> Result<Option<DrawProduct>, SdkError> {
        self.draw_entity_calls.set(self.draw_entity_calls.get() + 1);
        self.last_draw_settings.replace(Some(settings.clone()));
        if self.failing.borrow().contains(&entity.object_id) {
            return Err(SdkError::Conversion(format!("object {}", entity.object_id)));
        }
        Ok(Some(self.projected(self.entity_product(entity, settings))))
    }

    async fn get_draw_measure_result(
        &self,
        result: &DuoResult,
        settings: &DrawSettings,
    ) -> Result<Option<DrawProduct>, SdkError> {
        self.draw_result_calls.set(self.draw_result_calls.get() + 1);
        self.last_draw_settings.replace(Some(settings.clone()));
        let (from, to) = (result.from, result.to);
        let along_x = Vec3::new(to.x, from.y, from.z);
        let along_xy = Vec3::new(to.x, to.y, from.z);
        let segment = |axis: AxisName, a: Vec3, b: Vec3, value: f64| {
            DrawPart::new(DrawType::Lines, vec![a, b], None)
                .with_name(axis.part_name())
                .with_text(PartText::Label(settings.format_length(value)))
        };
        let parts = vec![
            segment(AxisName::Result, from, to, result.distance),
            segment(AxisName::XAxis, from, along_x, result.distance_x),
            segment(AxisName::YAxis, along_x, along_xy, result.distance_y),
            segment(AxisName::ZAxis, along_xy, to, result.distance_z),
            segment(AxisName::XyPlane, from, along_xy, result.planar_distance),
        ];
        Ok(Some(self.projected(result_product(parts))))
    }

    async fn measure_pair(
        &self,
        a: &MeasureEntity,
        b: &MeasureEntity,
    ) -> Result<Option<DuoResult>, SdkError> {
        let pair = (a.key(), b.key());
        let id = {
            let mut ids = self.measurement_ids.borrow_mut();
            let next = ids.len() as MeasurementId + 1;
            *ids.entry(pair).or_insert(next)
        };
        Ok(Some(duo_result(id, a.position, b.position)))
    }

    fn update_product(&self, product: &mut DrawProduct) {
        self.update_calls.set(self.update_calls.get() + 1);
        for part in product.parts_mut() {
            self.project_part(part);
        }
    }

    fn get_draw_object_from_points(
        &self,
        points: &[Vec3],
        closed: bool,
        filled: bool,
    ) -> Option<DrawProduct> {
        if points.is_empty() {
            return None;
        }
        let mut vertices = points.to_vec();
        if closed && points.len() > 2 {
            vertices.push(points[0]);
        }
        let draw_type = if filled { DrawType::Filled } else { DrawType::Lines };
        let product = single_object(
            DrawProductKind::Basic,
            DrawObjectKind::Complex,
            vec![DrawPart::new(draw_type, vertices, None)],
        );
        Some(self.projected(product))
    }
}

// ── Gated SDK ───────────────────────────────────────────────────

/// Fake SDK whose entity conversions wait on gates opened by the test.
///
/// Each `get_draw_entity` call takes the next queued gate; calls find no gate
/// once the queue is empty and complete immediately.
pub struct GatedSdk {
    inner: FakeSdk,
    gates: RefCell<VecDeque<oneshot::Receiver<()>>>,
}

impl GatedSdk {
    pub fn new(inner: FakeSdk) -> Self {
        Self {
            inner,
            gates: RefCell::new(VecDeque::new()),
        }
    }

    pub fn inner(&self) -> &FakeSdk {
        &self.inner
    }

    /// Queue a gate for the next conversion; send on the returned sender to open it
    pub fn gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push_back(rx);
        tx
    }
}

impl Projector for GatedSdk {
    fn render_state(&self) -> RenderState {
        self.inner.render_state()
    }

    fn to_marker_points(&self, points: &[Vec3]) -> Option<Vec<Vec2>> {
        self.inner.to_marker_points(points)
    }
}

impl MeasureSdk for GatedSdk {
    async fn get_draw_entity(
        &self,
        entity: &MeasureEntity,
        settings: &DrawSettings,
    ) -> Result<Option<DrawProduct>, SdkError> {
        let gate = self.gates.borrow_mut().pop_front();
        if let Some(gate) = gate {
            // A dropped sender opens the gate too
            let _ = gate.await;
        }
        self.inner.get_draw_entity(entity, settings).await
    }

    async fn get_draw_measure_result(
        &self,
        result: &DuoResult,
        settings: &DrawSettings,
    ) -> Result<Option<DrawProduct>, SdkError> {
        self.inner.get_draw_measure_result(result, settings).await
    }

    async fn measure_pair(
        &self,
        a: &MeasureEntity,
        b: &MeasureEntity,
    ) -> Result<Option<DuoResult>, SdkError> {
        self.inner.measure_pair(a, b).await
    }

    fn update_product(&self, product: &mut DrawProduct) {
        self.inner.update_product(product);
    }

    fn get_draw_object_from_points(
        &self,
        points: &[Vec3],
        closed: bool,
        filled: bool,
    ) -> Option<DrawProduct> {
        self.inner.get_draw_object_from_points(points, closed, filled)
    }
}

// ── Recording surface ───────────────────────────────────────────

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Polyline {
        points: Vec<Vec2>,
        closed: bool,
        stroke: Stroke,
    },
    FillPolygon {
        outer: Vec<Vec2>,
        holes: usize,
        fill: Color32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        fill: Color32,
    },
    Arc {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
    },
    Gradient {
        from: Vec2,
        to: Vec2,
        from_color: Color32,
        to_color: Color32,
    },
    Text {
        center: Vec2,
        text: String,
        angle: f32,
    },
}

/// Surface that records calls of the current frame.
///
/// Text is measured as a fixed width per character.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
    /// Number of times the surface was cleared
    pub frames: usize,
    pub char_width: f32,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            frames: 0,
            char_width: 7.0,
        }
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of every label drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }
}

impl DrawSurface for RecordingSurface {
    fn clear(&mut self) {
        self.calls.clear();
        self.frames += 1;
    }

    fn polyline(&mut self, points: &[Vec2], closed: bool, stroke: Stroke, _cap: LineCap) {
        self.calls.push(DrawCall::Polyline {
            points: points.to_vec(),
            closed,
            stroke,
        });
    }

    fn fill_polygon(&mut self, outer: &[Vec2], holes: &[Vec<Vec2>], fill: Color32) {
        self.calls.push(DrawCall::FillPolygon {
            outer: outer.to_vec(),
            holes: holes.len(),
            fill,
        });
    }

    fn circle(&mut self, center: Vec2, radius: f32, fill: Color32, _stroke: Stroke) {
        self.calls.push(DrawCall::Circle { center, radius, fill });
    }

    fn arc(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32, _stroke: Stroke) {
        self.calls.push(DrawCall::Arc {
            center,
            radius,
            start: start_angle,
            end: end_angle,
        });
    }

    fn gradient_segment(&mut self, from: Vec2, to: Vec2, _width: f32, from_color: Color32, to_color: Color32) {
        self.calls.push(DrawCall::Gradient {
            from,
            to,
            from_color,
            to_color,
        });
    }

    fn text(&mut self, center: Vec2, text: &str, _style: &TextStyle, angle: f32) {
        self.calls.push(DrawCall::Text {
            center,
            text: text.to_string(),
            angle,
        });
    }

    fn measure_text(&self, text: &str, _style: &TextStyle) -> f32 {
        text.chars().count() as f32 * self.char_width
    }
}
