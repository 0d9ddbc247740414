//! Headless harness: drives the overlay pipeline without a window.
//!
//! Owns the measurement state, an overlay over the fake SDK, a recording
//! surface and the marker transforms, and runs frames the way the viewer's
//! animation loop does.

use glam::{Vec2, Vec3};
use shared::{AxisName, MeasureEntity};

use crate::error::Result;
use crate::fixtures::{FakeGeometry, FakeSdk, RecordingSurface};
use crate::measure::{compute_duo_results, MarkerTransforms, MeasureOverlay, OverlayFrame};
use crate::state::{MeasureState, OverlaySettings};

/// Headless overlay driver for tests
pub struct OverlayHarness {
    pub state: MeasureState,
    pub settings: OverlaySettings,
    pub surface: RecordingSurface,
    pub markers: MarkerTransforms,
    overlay: MeasureOverlay<FakeSdk>,
    /// State version the duo results were computed for
    duo_version: Option<u64>,
}

impl Default for OverlayHarness {
    fn default() -> Self {
        Self::new(FakeSdk::default())
    }
}

impl OverlayHarness {
    pub fn new(sdk: FakeSdk) -> Self {
        let settings = OverlaySettings::default();
        let overlay = MeasureOverlay::new(sdk, settings.style()).with_tracer(settings.tracer);
        Self {
            state: MeasureState::default(),
            settings,
            surface: RecordingSurface::new(),
            markers: MarkerTransforms::new(),
            overlay,
            duo_version: None,
        }
    }

    pub fn sdk(&self) -> &FakeSdk {
        self.overlay.sdk()
    }

    pub fn overlay(&self) -> &MeasureOverlay<FakeSdk> {
        &self.overlay
    }

    // ── Scene and camera ──────────────────────────────────────

    pub fn add_geometry(&self, object_id: u32, geometry: FakeGeometry) {
        self.sdk().add_geometry(object_id, geometry);
    }

    pub fn move_camera(&self, position: Vec3, target: Vec3) {
        self.sdk().set_camera(position, target);
    }

    // ── Selection ─────────────────────────────────────────────

    pub fn select(&mut self, entity: MeasureEntity) -> Option<usize> {
        self.state.select_entity(entity)
    }

    /// Select two entities as one pinned pair
    pub fn select_pair(&mut self, a: MeasureEntity, b: MeasureEntity) -> Option<usize> {
        let index = self.state.select_entity(a)?;
        self.state.pin(index);
        let paired = self.state.select_entity(b);
        self.state.unpin();
        paired
    }

    pub fn toggle_axis(&mut self, index: usize, axis: AxisName) -> bool {
        self.state.toggle_axis(index, axis)
    }

    // ── Frames ────────────────────────────────────────────────

    /// Recompute duo results if the selection changed since the last time
    pub async fn sync_duo_results(&mut self) -> Result<()> {
        if self.duo_version == Some(self.state.version()) {
            return Ok(());
        }
        let state = &self.state;
        let results = compute_duo_results(self.overlay.sdk(), state.sets(), |i| state.axis(i)).await?;
        self.state.set_duo_results(results);
        self.duo_version = Some(self.state.version());
        Ok(())
    }

    /// Run one animation frame; `moved` reports camera movement
    pub async fn frame(&mut self, moved: bool) -> Result<bool> {
        self.sync_duo_results().await?;
        let input = self.state.overlay_input(self.settings.draw_settings());
        // Glyphs of removed measurements disappear with the old transforms
        let mut markers = MarkerTransforms::new();
        let drawn = self
            .overlay
            .animate(moved, true, &input, &mut self.surface, &mut markers)
            .await;
        if drawn {
            self.markers = markers;
        }
        Ok(drawn)
    }

    /// Frame after a selection or settings change
    pub async fn refresh(&mut self) -> Result<bool> {
        self.frame(true).await
    }

    pub fn set_pointer(&self, pointer: Vec2) {
        self.overlay.set_pointer(pointer);
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn last_frame(&self) -> Option<OverlayFrame> {
        self.overlay.frame()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.surface.texts()
    }

    pub fn marker_visible(&self, id: &str) -> bool {
        self.markers.is_visible(id)
    }

    pub fn marker_position(&self, id: &str) -> Option<Vec2> {
        self.markers.position(id)
    }
}
