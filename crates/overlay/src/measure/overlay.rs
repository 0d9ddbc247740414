//! Frame orchestrator: refresh the caches, paint the committed frame, move markers.
//!
//! One `MeasureOverlay` owns the caches of one overlay surface. All methods take
//! `&self` so several refreshes can be in flight on the same thread; a refresh
//! only commits if no newer one started while it was awaiting the SDK.

use std::cell::{Cell, RefCell};

use egui::Color32;
use glam::{Vec2, Vec3};
use shared::{ActiveAxis, AxisName, DrawProduct, MeasureEntity, MeasurementId};
use tracing::{debug, trace, warn};

use super::cache::{Generation, ProductCache, ResultCache, ResultEntry};
use super::duo::DuoMeasurement;
use super::frame::{set_key, MeasureSet, MemberFrame, OverlayFrame, ResultFrame, SetFrame};
use super::markers::{move_interaction_markers, MarkerHost};
use super::positions::{compute_positions, InteractionPositions};
use crate::engine2d::{
    draw_product, CameraState, ColorSettings, DrawSurface, LineCap, TextSettings,
};
use crate::error::Result;
use crate::sdk::{DrawSettings, MeasureSdk};

/// Read-only inputs of one refresh, taken from UI state
#[derive(Debug, Clone, Default)]
pub struct OverlayInput {
    pub sets: Vec<MeasureSet>,
    /// One slot per duo measurement
    pub results: Vec<Option<DuoMeasurement>>,
    /// Entity under the pointer, redrawn every pass
    pub hover: Option<MeasureEntity>,
    pub area: Vec<Vec3>,
    pub point_line: Vec<Vec3>,
    pub draw_settings: DrawSettings,
}

/// Colours and widths per category of overlay geometry
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub entity: ColorSettings,
    pub result: ColorSettings,
    pub hover: ColorSettings,
    pub area: ColorSettings,
    pub point_line: ColorSettings,
    pub text: TextSettings,
    pub pixel_width: f32,
    pub line_cap: LineCap,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        let entity = ColorSettings::default();
        Self {
            result: ColorSettings {
                line_color: Color32::from_rgb(80, 170, 255),
                ..entity.clone()
            },
            hover: ColorSettings {
                line_color: Color32::from_rgb(255, 255, 255),
                outline_color: None,
                ..entity.clone()
            },
            area: ColorSettings {
                fill_color: Some(Color32::from_rgba_unmultiplied(255, 200, 50, 60)),
                ..entity.clone()
            },
            point_line: ColorSettings {
                slope_arrows: true,
                ..entity.clone()
            },
            entity,
            text: TextSettings::default(),
            pixel_width: 2.0,
            line_cap: LineCap::Round,
        }
    }
}

/// Everything a refresh built; becomes visible only on commit
struct Pass {
    products: ProductCache,
    results: ResultCache,
    frame: OverlayFrame,
}

/// Overlay pipeline of one surface
pub struct MeasureOverlay<S> {
    sdk: S,
    style: OverlayStyle,
    tracer: bool,
    generation: Generation,
    products: RefCell<ProductCache>,
    results: RefCell<ResultCache>,
    frame: RefCell<Option<OverlayFrame>>,
    pointer: Cell<Option<Vec2>>,
    pointer_moved: Cell<bool>,
    stale_drops: Cell<u64>,
    failures: Cell<u64>,
}

impl<S: MeasureSdk> MeasureOverlay<S> {
    pub fn new(sdk: S, style: OverlayStyle) -> Self {
        Self {
            sdk,
            style,
            tracer: false,
            generation: Generation::new(),
            products: RefCell::new(ProductCache::new()),
            results: RefCell::new(ResultCache::new()),
            frame: RefCell::new(None),
            pointer: Cell::new(None),
            pointer_moved: Cell::new(false),
            stale_drops: Cell::new(0),
            failures: Cell::new(0),
        }
    }

    /// Redraw on idle frames after pointer movement, for tracer tools
    pub fn with_tracer(mut self, enabled: bool) -> Self {
        self.tracer = enabled;
        self
    }

    pub fn set_tracer(&mut self, enabled: bool) {
        self.tracer = enabled;
    }

    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: OverlayStyle) {
        self.style = style;
    }

    /// Generation of the most recently started refresh
    pub fn generation(&self) -> u64 {
        self.generation.current()
    }

    /// Last committed frame
    pub fn frame(&self) -> Option<OverlayFrame> {
        self.frame.borrow().clone()
    }

    pub fn positions(&self) -> Option<InteractionPositions> {
        self.frame.borrow().as_ref().map(|f| f.positions.clone())
    }

    pub fn cached_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.products.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn cached_generation(&self, key: &str) -> Option<u64> {
        self.products
            .borrow()
            .get(&key.to_string())
            .map(|e| e.generation)
    }

    pub fn cached_result_ids(&self) -> Vec<MeasurementId> {
        let mut ids: Vec<MeasurementId> = self.results.borrow().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Refreshes discarded because a newer one had started
    pub fn stale_drops(&self) -> u64 {
        self.stale_drops.get()
    }

    /// Refreshes aborted by an SDK failure
    pub fn failures(&self) -> u64 {
        self.failures.get()
    }

    // ── Refresh ─────────────────────────────────────────────

    /// Refresh all products for `input`.
    ///
    /// Returns `true` when the refresh committed. Stale and failed refreshes
    /// return `false` and leave the previous frame in place.
    pub async fn update(&self, input: &OverlayInput) -> bool {
        let generation = self.generation.begin();
        let pass = self.refresh(input, generation).await;

        if !self.generation.is_current(generation) {
            self.stale_drops.set(self.stale_drops.get() + 1);
            debug!(
                generation,
                current = self.generation.current(),
                "dropping stale overlay refresh"
            );
            return false;
        }

        match pass {
            Ok(pass) => {
                self.commit(pass, input);
                true
            }
            Err(err) => {
                self.failures.set(self.failures.get() + 1);
                warn!(generation, "overlay refresh failed: {err}");
                false
            }
        }
    }

    async fn refresh(&self, input: &OverlayInput, generation: u64) -> Result<Pass> {
        let settings = &input.draw_settings;

        let mut products = ProductCache::new();
        let mut sets = Vec::with_capacity(input.sets.len());
        for set in &input.sets {
            let mut members = Vec::with_capacity(set.len());
            for entity in set {
                let key = entity.key();
                let product = match products.get(&key) {
                    Some(entry) if !entity.is_vertex() => entry.value.clone(),
                    _ => self.entity_product(entity, settings).await?,
                };
                if !entity.is_vertex() {
                    products.insert(key.clone(), product.clone(), generation);
                }
                members.push(MemberFrame { key, product });
            }
            sets.push(SetFrame {
                key: set_key(set),
                members,
            });
        }

        let mut results = ResultCache::new();
        let mut result_frames = Vec::with_capacity(input.results.len());
        for duo in &input.results {
            let Some(duo) = duo else {
                result_frames.push(None);
                continue;
            };
            let id = duo.result.id;
            let product = match results.get(&id) {
                Some(entry) => entry.value.product.clone(),
                None => self.result_product(duo, settings).await?,
            };
            results.insert(
                id,
                ResultEntry {
                    product: product.clone(),
                    active_axis: duo.active_axis,
                },
                generation,
            );
            result_frames.push(Some(ResultFrame {
                id,
                product,
                active_axis: duo.active_axis,
            }));
        }

        let hover = match &input.hover {
            Some(entity) => self.sdk.get_draw_entity(entity, settings).await?,
            None => None,
        };

        let area = if input.area.is_empty() {
            None
        } else {
            let closed = input.area.len() >= 3;
            self.sdk
                .get_draw_object_from_points(&input.area, closed, closed)
        };
        let point_line = if input.point_line.is_empty() {
            None
        } else {
            self.sdk
                .get_draw_object_from_points(&input.point_line, false, false)
        };

        Ok(Pass {
            products,
            results,
            frame: OverlayFrame {
                generation,
                sets,
                results: result_frames,
                hover,
                area,
                point_line,
                positions: InteractionPositions::default(),
            },
        })
    }

    /// Re-project the cached product of `entity`, or convert it when there is none.
    /// Vertices are always converted.
    async fn entity_product(
        &self,
        entity: &MeasureEntity,
        settings: &DrawSettings,
    ) -> Result<Option<DrawProduct>> {
        if !entity.is_vertex() {
            let cached = self.products.borrow().reusable(&entity.key()).cloned();
            if let Some(mut product) = cached {
                self.sdk.update_product(&mut product);
                trace!(key = %entity.key(), "re-projected cached product");
                return Ok(Some(product));
            }
        }
        debug!(key = %entity.key(), "converting entity");
        Ok(self.sdk.get_draw_entity(entity, settings).await?)
    }

    async fn result_product(
        &self,
        duo: &DuoMeasurement,
        settings: &DrawSettings,
    ) -> Result<Option<DrawProduct>> {
        let cached = self.results.borrow().reusable(duo.result.id).cloned();
        if let Some(mut product) = cached {
            self.sdk.update_product(&mut product);
            return Ok(Some(product));
        }
        debug!(id = duo.result.id, "converting duo result");
        Ok(self.sdk.get_draw_measure_result(&duo.result, settings).await?)
    }

    fn commit(&self, mut pass: Pass, input: &OverlayInput) {
        let camera = CameraState::from_render_state(&self.sdk.render_state());
        pass.frame.positions = compute_positions(
            &self.sdk,
            &camera,
            &pass.frame.sets,
            &pass.frame.results,
            &input.area,
            &input.point_line,
            pass.frame.point_line.as_ref(),
        );

        let evicted = self.products.borrow().missing_from(&pass.products);
        let evicted_results = self.results.borrow().missing_from(&pass.results);
        debug!(
            generation = pass.frame.generation,
            products = pass.products.len(),
            results = pass.results.len(),
            evicted = evicted + evicted_results,
            "overlay refresh committed"
        );

        self.products.replace(pass.products);
        self.results.replace(pass.results);
        self.frame.replace(Some(pass.frame));
    }

    // ── Draw ────────────────────────────────────────────────

    /// Paint the committed frame. Returns `false` before the first commit.
    pub fn draw(&self, surface: &mut impl DrawSurface) -> bool {
        let frame = self.frame.borrow();
        let Some(frame) = frame.as_ref() else {
            return false;
        };
        let camera = CameraState::from_render_state(&self.sdk.render_state());
        let style = &self.style;
        let text = Some(&style.text);
        let cap = Some(style.line_cap);

        surface.clear();
        for set in &frame.sets {
            for product in set.members.iter().filter_map(|m| m.product.as_ref()) {
                draw_product(surface, &camera, product, &style.entity, style.pixel_width, text, cap);
            }
        }
        for result in frame.results.iter().flatten() {
            if let Some(product) = &result.product {
                let visible = visible_result(product, &result.active_axis);
                draw_product(surface, &camera, &visible, &style.result, style.pixel_width, text, cap);
            }
        }
        if let Some(product) = &frame.area {
            draw_product(surface, &camera, product, &style.area, style.pixel_width, text, cap);
        }
        if let Some(product) = &frame.point_line {
            draw_product(surface, &camera, product, &style.point_line, style.pixel_width, text, cap);
        }
        if let Some(product) = &frame.hover {
            draw_product(surface, &camera, product, &style.hover, style.pixel_width, None, cap);
        }
        true
    }

    /// Move marker glyphs to the committed positions
    pub fn move_markers(&self, host: &mut impl MarkerHost) -> bool {
        match self.frame.borrow().as_ref() {
            Some(frame) => {
                move_interaction_markers(host, &frame.positions);
                true
            }
            None => false,
        }
    }

    /// Update, then draw and move markers if the update committed
    pub async fn render(
        &self,
        input: &OverlayInput,
        surface: &mut impl DrawSurface,
        host: &mut impl MarkerHost,
    ) -> bool {
        if !self.update(input).await {
            return false;
        }
        self.draw(surface);
        self.move_markers(host);
        true
    }

    // ── Animation ───────────────────────────────────────────

    /// Record the pointer position for tracer redraws
    pub fn set_pointer(&self, pointer: Vec2) {
        if self.pointer.get() != Some(pointer) {
            self.pointer.set(Some(pointer));
            self.pointer_moved.set(true);
        }
    }

    /// Animation-loop entry point.
    ///
    /// Renders only when the camera `moved`, or on an `idle_frame` after the
    /// pointer moved while tracing. Other frames are skipped without touching
    /// the SDK.
    pub async fn animate(
        &self,
        moved: bool,
        idle_frame: bool,
        input: &OverlayInput,
        surface: &mut impl DrawSurface,
        host: &mut impl MarkerHost,
    ) -> bool {
        let tracer_redraw = self.tracer && idle_frame && self.pointer_moved.get();
        if !moved && !tracer_redraw {
            trace!("animation frame skipped");
            return false;
        }
        self.pointer_moved.set(false);
        self.render(input, surface, host).await
    }
}

/// Copy of a result product without the parts of hidden axes
fn visible_result(product: &DrawProduct, active: &ActiveAxis) -> DrawProduct {
    let mut visible = product.clone();
    for object in &mut visible.objects {
        object.parts.retain(|part| {
            part.name()
                .and_then(AxisName::from_part_name)
                .map_or(true, |axis| active.is_active(axis))
        });
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{edge_entity, vertex_entity, DrawCall, FakeGeometry, FakeSdk, RecordingSurface};
    use crate::measure::markers::MarkerTransforms;

    fn sdk_with_edge(object_id: u32) -> FakeSdk {
        let sdk = FakeSdk::default();
        sdk.add_geometry(object_id, FakeGeometry::Edge(Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)));
        sdk
    }

    fn input_for(sets: Vec<MeasureSet>) -> OverlayInput {
        OverlayInput {
            sets,
            ..OverlayInput::default()
        }
    }

    #[tokio::test]
    async fn test_cached_product_is_reprojected() {
        let overlay = MeasureOverlay::new(sdk_with_edge(1), OverlayStyle::default());
        let input = input_for(vec![vec![edge_entity(1, 0)]]);

        assert!(overlay.update(&input).await);
        assert!(overlay.update(&input).await);
        assert!(overlay.update(&input).await);

        assert_eq!(overlay.sdk().draw_entity_calls(), 1);
        assert_eq!(overlay.sdk().update_calls(), 2);
        assert_eq!(overlay.cached_generation("1_0_0"), Some(3));
    }

    #[tokio::test]
    async fn test_vertex_is_always_converted() {
        let overlay = MeasureOverlay::new(FakeSdk::default(), OverlayStyle::default());
        let input = input_for(vec![vec![vertex_entity(5, Vec3::ZERO)]]);

        assert!(overlay.update(&input).await);
        assert!(overlay.update(&input).await);

        assert_eq!(overlay.sdk().draw_entity_calls(), 2);
        assert!(overlay.cached_keys().is_empty());
        let frame = overlay.frame().unwrap();
        assert!(frame.sets[0].members[0].product.is_some());
    }

    #[tokio::test]
    async fn test_hover_is_converted_every_pass() {
        let overlay = MeasureOverlay::new(sdk_with_edge(1), OverlayStyle::default());
        let input = OverlayInput {
            hover: Some(edge_entity(1, 0)),
            ..OverlayInput::default()
        };
        assert!(overlay.update(&input).await);
        assert!(overlay.update(&input).await);
        assert_eq!(overlay.sdk().draw_entity_calls(), 2);
        assert!(overlay.frame().unwrap().hover.is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_frame() {
        let sdk = sdk_with_edge(1);
        sdk.add_geometry(2, FakeGeometry::Edge(Vec3::ZERO, Vec3::Y));
        let overlay = MeasureOverlay::new(sdk, OverlayStyle::default());

        let first = input_for(vec![vec![edge_entity(1, 0)]]);
        assert!(overlay.update(&first).await);
        let committed = overlay.frame();

        overlay.sdk().fail_object(2);
        let second = input_for(vec![vec![edge_entity(1, 0)], vec![edge_entity(2, 0)]]);
        assert!(!overlay.update(&second).await);

        assert_eq!(overlay.failures(), 1);
        assert_eq!(overlay.frame(), committed);
        assert_eq!(overlay.cached_keys(), vec!["1_0_0".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_key_is_evicted() {
        let sdk = sdk_with_edge(1);
        sdk.add_geometry(2, FakeGeometry::Edge(Vec3::ZERO, Vec3::Y));
        let overlay = MeasureOverlay::new(sdk, OverlayStyle::default());

        let both = input_for(vec![vec![edge_entity(1, 0)], vec![edge_entity(2, 0)]]);
        assert!(overlay.update(&both).await);
        assert_eq!(overlay.cached_keys(), vec!["1_0_0".to_string(), "2_0_0".to_string()]);

        let one = input_for(vec![vec![edge_entity(2, 0)]]);
        assert!(overlay.update(&one).await);
        assert_eq!(overlay.cached_keys(), vec!["2_0_0".to_string()]);
    }

    #[tokio::test]
    async fn test_draw_before_commit_is_noop() {
        let overlay = MeasureOverlay::new(FakeSdk::default(), OverlayStyle::default());
        let mut surface = RecordingSurface::new();
        let mut markers = MarkerTransforms::new();
        assert!(!overlay.draw(&mut surface));
        assert!(!overlay.move_markers(&mut markers));
        assert!(surface.calls.is_empty());
        assert!(markers.is_empty());
    }

    #[tokio::test]
    async fn test_animate_skips_unmoved_frames() {
        let overlay = MeasureOverlay::new(sdk_with_edge(1), OverlayStyle::default());
        let input = input_for(vec![vec![edge_entity(1, 0)]]);
        let mut surface = RecordingSurface::new();
        let mut markers = MarkerTransforms::new();

        assert!(!overlay.animate(false, true, &input, &mut surface, &mut markers).await);
        assert_eq!(overlay.generation(), 0);

        assert!(overlay.animate(true, false, &input, &mut surface, &mut markers).await);
        assert_eq!(overlay.generation(), 1);
        assert_eq!(surface.frames, 1);
        assert!(markers.is_visible("removeMeasure-0"));
    }

    #[tokio::test]
    async fn test_tracer_redraws_on_idle_after_pointer_move() {
        let overlay = MeasureOverlay::new(sdk_with_edge(1), OverlayStyle::default()).with_tracer(true);
        let input = input_for(vec![vec![edge_entity(1, 0)]]);
        let mut surface = RecordingSurface::new();
        let mut markers = MarkerTransforms::new();

        overlay.set_pointer(Vec2::new(10.0, 10.0));
        assert!(!overlay.animate(false, false, &input, &mut surface, &mut markers).await);
        assert!(overlay.animate(false, true, &input, &mut surface, &mut markers).await);
        // Pointer unchanged since the last redraw
        assert!(!overlay.animate(false, true, &input, &mut surface, &mut markers).await);
        overlay.set_pointer(Vec2::new(10.0, 10.0));
        assert!(!overlay.animate(false, true, &input, &mut surface, &mut markers).await);
        overlay.set_pointer(Vec2::new(12.0, 10.0));
        assert!(overlay.animate(false, true, &input, &mut surface, &mut markers).await);
    }

    #[tokio::test]
    async fn test_hidden_axis_parts_are_not_drawn() {
        use crate::measure::duo::compute_duo_results;

        let sdk = FakeSdk::default();
        let sets = vec![vec![vertex_entity(1, Vec3::ZERO), vertex_entity(2, Vec3::new(3.0, 4.0, 0.0))]];
        let only_result = ActiveAxis {
            x: false,
            y: false,
            z: false,
            planar: false,
            result: true,
        };
        let results = compute_duo_results(&sdk, &sets, |_| only_result).await.unwrap();
        let overlay = MeasureOverlay::new(sdk, OverlayStyle::default());
        let input = OverlayInput {
            results,
            ..OverlayInput::default()
        };
        assert!(overlay.update(&input).await);

        let mut surface = RecordingSurface::new();
        assert!(overlay.draw(&mut surface));
        // Only the result line and its outline are stroked
        let strokes = surface.count(|c| matches!(c, DrawCall::Polyline { .. }));
        assert_eq!(strokes, 2);
        let positions = overlay.positions().unwrap();
        assert_eq!(positions.results.len(), 1);
        assert!(positions.results[0]
            .axes
            .keys()
            .all(|axis| matches!(axis, AxisName::Result | AxisName::Normal)));
    }
}
