//! Main application module

mod actions;
mod keyboard;
mod panels;
mod scene;
mod styles;

use eframe::egui;
use measure_overlay_lib::engine2d::ShapeCanvas;
use measure_overlay_lib::fixtures::{FakeGeometry, FakeSdk};
use measure_overlay_lib::measure::{compute_duo_results, MarkerTransforms, MeasureOverlay};
use measure_overlay_lib::state::{MeasureState, OverlaySettings};
use shared::ObjectId;
use tokio::runtime::Runtime;

use crate::viewport::picking::pick_entity;
use crate::viewport::{marker_at, ViewportInput, ViewportPanel};
use actions::{apply_marker, parse_marker, Tool};

/// Measurement overlay viewer over the demo scene
pub struct OverlayApp {
    state: MeasureState,
    settings: OverlaySettings,
    viewport: ViewportPanel,
    /// Single-threaded runtime the overlay futures are driven on
    runtime: Runtime,
    overlay: MeasureOverlay<FakeSdk>,
    canvas: ShapeCanvas,
    markers: MarkerTransforms,
    scene: Vec<(ObjectId, FakeGeometry)>,
    tool: Tool,
    /// Measurement shown in the info window
    info: Option<usize>,
    show_settings: bool,
    /// State version the duo results belong to
    duo_version: Option<u64>,
    /// Selection, tool or style changed since the last render
    dirty: bool,
}

impl OverlayApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: OverlaySettings) -> std::io::Result<Self> {
        styles::configure_styles(&cc.egui_ctx);

        let runtime = overlay_runtime()?;
        let (overlay, scene) = demo_overlay(&settings);

        Ok(Self {
            state: MeasureState::default(),
            settings,
            viewport: ViewportPanel::new(),
            runtime,
            overlay,
            canvas: ShapeCanvas::new(cc.egui_ctx.clone()),
            markers: MarkerTransforms::new(),
            scene,
            tool: Tool::default(),
            info: None,
            show_settings: false,
            duo_version: None,
            dirty: true,
        })
    }

    fn sync_duo_results(&mut self) {
        if self.duo_version == Some(self.state.version()) {
            return;
        }
        let state = &self.state;
        let computed = self
            .runtime
            .block_on(compute_duo_results(self.overlay.sdk(), state.sets(), |i| state.axis(i)));
        match computed {
            Ok(results) => self.state.set_duo_results(results),
            Err(e) => tracing::warn!("duo measurement failed: {e}"),
        }
        self.duo_version = Some(self.state.version());
        self.dirty = true;
    }

    /// Hover and click handling in viewport-local pixels
    fn handle_pointer(&mut self, input: &ViewportInput) {
        let sdk = self.overlay.sdk();
        let project = |p| sdk.project(p);

        if let Some(pointer) = input.hover {
            self.overlay.set_pointer(pointer);
        }
        let hover = match (self.tool, input.dragging) {
            (Tool::Measure, false) => input
                .hover
                .and_then(|p| pick_entity(&self.scene, project, p, self.settings.pick_tolerance)),
            _ => None,
        };
        if hover != self.state.hover {
            self.state.hover = hover;
            self.dirty = true;
        }

        let Some(pixel) = input.click else {
            return;
        };
        if let Some(action) = marker_at(&self.markers, pixel).and_then(|id| parse_marker(&id)) {
            self.dirty |= apply_marker(action, &mut self.state, &mut self.tool, &mut self.info);
            return;
        }
        match self.tool {
            Tool::Measure => {
                if let Some(entity) = pick_entity(&self.scene, project, pixel, self.settings.pick_tolerance) {
                    tracing::debug!(key = %entity.key(), "picked");
                    self.dirty |= self.state.select_entity(entity).is_some();
                }
            }
            Tool::Area | Tool::PointLine => {
                let snapped = pick_entity(&self.scene, project, pixel, self.settings.snap_tolerance)
                    .filter(|e| e.is_vertex())
                    .map(|e| e.position);
                let Some(point) = snapped.or_else(|| self.viewport.screen_ray(pixel).intersect_ground()) else {
                    return;
                };
                if self.tool == Tool::Area {
                    self.state.add_area_point(point);
                } else {
                    self.state.add_point_line_point(point);
                }
                self.dirty = true;
            }
        }
    }

    fn show_viewport(&mut self, ui: &mut egui::Ui, camera_changed: bool) {
        let input = self.viewport.interact(ui);
        self.overlay.sdk().set_render_state(self.viewport.render_state());
        let resized = self.canvas.resize(self.viewport.size());

        self.handle_pointer(&input);
        self.sync_duo_results();

        let moved = camera_changed || input.moved || resized || self.dirty;
        let overlay_input = self.state.overlay_input(self.settings.draw_settings());
        // Glyphs of removed measurements disappear with the old transforms
        let mut markers = MarkerTransforms::new();
        let drawn = self.runtime.block_on(self.overlay.animate(
            moved,
            !input.dragging,
            &overlay_input,
            &mut self.canvas,
            &mut markers,
        ));
        if drawn {
            self.markers = markers;
        }
        self.dirty = false;

        let sdk = self.overlay.sdk();
        self.viewport.paint(
            ui,
            input.rect,
            &self.scene,
            |p| sdk.project(p),
            &self.canvas,
            &self.markers,
            self.settings.marker_color(),
        );

        if self.settings.tracer && input.hover.is_some() {
            ui.ctx().request_repaint();
        }
    }
}

/// Single-threaded runtime the overlay refreshes are blocked on
fn overlay_runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread().build()
}

/// Overlay over a fake SDK that knows the demo scene
fn demo_overlay(settings: &OverlaySettings) -> (MeasureOverlay<FakeSdk>, Vec<(ObjectId, FakeGeometry)>) {
    let scene = scene::demo_scene();
    let sdk = FakeSdk::default();
    scene::install(&sdk, &scene);
    let overlay = MeasureOverlay::new(sdk, settings.style()).with_tracer(settings.tracer);
    (overlay, scene)
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let keys = keyboard::handle_keyboard(ctx, &mut self.state, &mut self.tool, &mut self.viewport);
        self.dirty |= keys.state_changed;

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("View", |ui| {
                    if ui.button("Reset camera").clicked() {
                        self.viewport.reset_camera();
                        self.dirty = true;
                        ui.close_menu();
                    }
                    if ui.button("Toggle projection").clicked() {
                        self.viewport.toggle_projection();
                        self.dirty = true;
                        ui.close_menu();
                    }
                });
                if ui.button("Settings").clicked() {
                    self.show_settings = !self.show_settings;
                }
            });
        });

        if panels::settings_window(ctx, &mut self.show_settings, &mut self.settings) {
            self.overlay.set_style(self.settings.style());
            self.overlay.set_tracer(self.settings.tracer);
            self.dirty = true;
        }
        panels::info_window(ctx, &self.state, &mut self.info);

        // ── Status bar ────────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("Tool: {}", self.tool.label()));
                ui.separator();
                ui.label(format!("Generation {}", self.overlay.generation()));
                if self.overlay.failures() > 0 {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, format!("{} failed refreshes", self.overlay.failures()));
                }
            });
        });

        egui::SidePanel::left("measurements")
            .default_width(260.0)
            .show(ctx, |ui| {
                self.dirty |= panels::measurements_panel(ui, &mut self.state, &mut self.tool, &mut self.info);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.show_viewport(ui, keys.camera_changed));
    }
}
