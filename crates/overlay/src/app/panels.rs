//! Side panel, settings window and measurement info window

use eframe::egui;
use measure_overlay_lib::measure::set_key;
use measure_overlay_lib::state::{MeasureState, OverlaySettings};
use shared::AxisName;

use super::actions::{polygon_area, polyline_length, Tool};

const AXES: [(AxisName, &str); 5] = [
    (AxisName::Result, "result"),
    (AxisName::XAxis, "x"),
    (AxisName::YAxis, "y"),
    (AxisName::ZAxis, "z"),
    (AxisName::XyPlane, "xy"),
];

/// Tool picker and list of measurements; returns true when the state changed
pub fn measurements_panel(ui: &mut egui::Ui, state: &mut MeasureState, tool: &mut Tool, info: &mut Option<usize>) -> bool {
    let mut changed = false;

    ui.heading("Tools");
    ui.horizontal(|ui| {
        for option in [Tool::Measure, Tool::Area, Tool::PointLine] {
            changed |= ui.selectable_value(&mut *tool, option, option.label()).changed();
        }
    });
    match tool {
        Tool::Area => {
            ui.label(format!("{} points, {:.3} m²", state.area().len(), polygon_area(state.area())));
        }
        Tool::PointLine => {
            ui.label(format!(
                "{} points, {:.3} m",
                state.point_line().len(),
                polyline_length(state.point_line())
            ));
        }
        Tool::Measure => {}
    }

    ui.separator();
    ui.heading("Measurements");
    if state.sets().is_empty() {
        ui.weak("Click an edge, face or vertex");
    }

    let mut remove = None;
    let mut pin = None;
    for index in 0..state.sets().len() {
        let key = set_key(&state.sets()[index]);
        let pinned = state.pinned() == Some(index);
        ui.horizontal(|ui| {
            ui.label(format!("{index}: {key}"));
            if ui.small_button(if pinned { "unpin" } else { "pin" }).clicked() {
                pin = Some(!pinned);
            }
            if ui.small_button("i").clicked() {
                *info = Some(index);
            }
            if ui.small_button("×").clicked() {
                remove = Some(index);
            }
        });
        let distance = state
            .duo_results()
            .get(index)
            .and_then(|duo| duo.as_ref())
            .map(|duo| duo.result.distance);
        if let Some(distance) = distance {
            ui.horizontal(|ui| {
                for (axis, label) in AXES {
                    let mut active = state.axis(index).is_active(axis);
                    if ui.checkbox(&mut active, label).changed() {
                        changed |= state.toggle_axis(index, axis);
                    }
                }
            });
            ui.weak(format!("{distance:.3} m"));
        }
        match pin.take() {
            Some(true) => {
                state.pin(index);
                changed = true;
            }
            Some(false) => {
                state.unpin();
                changed = true;
            }
            None => {}
        }
    }

    if let Some(index) = remove {
        state.remove_set(index);
        if *info == Some(index) {
            *info = None;
        }
        changed = true;
    }
    if !state.sets().is_empty() && ui.button("Clear all").clicked() {
        state.clear();
        *info = None;
        changed = true;
    }
    changed
}

/// Details of one measurement
pub fn info_window(ctx: &egui::Context, state: &MeasureState, info: &mut Option<usize>) {
    let Some(index) = *info else {
        return;
    };
    let Some(set) = state.sets().get(index) else {
        *info = None;
        return;
    };
    let mut open = true;
    egui::Window::new(format!("Measurement {index}"))
        .open(&mut open)
        .resizable(false)
        .show(ctx, |ui| {
            for entity in set {
                ui.label(format!("{:?} {}", entity.draw_kind, entity.key()));
            }
            if let Some(Some(duo)) = state.duo_results().get(index) {
                let r = &duo.result;
                ui.separator();
                egui::Grid::new("duo_grid").num_columns(2).show(ui, |ui| {
                    for (name, value) in [
                        ("distance", Some(r.distance)),
                        ("x", Some(r.distance_x)),
                        ("y", Some(r.distance_y)),
                        ("z", Some(r.distance_z)),
                        ("planar", Some(r.planar_distance)),
                        ("normal", r.normal_distance),
                        ("angle", r.angle),
                    ] {
                        if let Some(value) = value {
                            ui.label(name);
                            ui.label(format!("{value:.3}"));
                            ui.end_row();
                        }
                    }
                });
            }
        });
    if !open {
        *info = None;
    }
}

/// Overlay settings editor; returns true when a setting changed
pub fn settings_window(ctx: &egui::Context, open: &mut bool, settings: &mut OverlaySettings) -> bool {
    let mut changed = false;
    egui::Window::new("Overlay settings")
        .open(open)
        .resizable(false)
        .show(ctx, |ui| {
            egui::Grid::new("settings_grid").num_columns(2).show(ui, |ui| {
                ui.label("Line width");
                changed |= ui.add(egui::Slider::new(&mut settings.pixel_width, 1.0..=8.0)).changed();
                ui.end_row();

                ui.label("Label size");
                changed |= ui
                    .add(egui::Slider::new(&mut settings.labels.font_size, 8.0..=24.0))
                    .changed();
                ui.end_row();

                ui.label("Label decimals");
                changed |= ui.add(egui::Slider::new(&mut settings.labels.decimals, 0..=6)).changed();
                ui.end_row();

                ui.label("Pick tolerance");
                changed |= ui
                    .add(egui::Slider::new(&mut settings.pick_tolerance, 2.0..=20.0).suffix(" px"))
                    .changed();
                ui.end_row();

                ui.label("Snap tolerance");
                changed |= ui
                    .add(egui::Slider::new(&mut settings.snap_tolerance, 2.0..=30.0).suffix(" px"))
                    .changed();
                ui.end_row();
            });
            changed |= ui.checkbox(&mut settings.cylinder.shaded, "Shaded cylinders").changed();
            changed |= ui.checkbox(&mut settings.points.display_all, "Show all points").changed();
            changed |= ui.checkbox(&mut settings.slope_arrows, "Slope arrows").changed();
            changed |= ui.checkbox(&mut settings.tracer, "Tracer").changed();

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    settings.save();
                }
                if ui.button("Defaults").clicked() {
                    *settings = OverlaySettings::default();
                    changed = true;
                }
            });
        });
    changed
}
