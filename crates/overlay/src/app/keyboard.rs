//! Keyboard shortcut handling

use eframe::egui;
use measure_overlay_lib::state::MeasureState;
use shared::AxisName;

use super::actions::{self, Tool};
use crate::viewport::ViewportPanel;

/// What the shortcuts of this frame changed
#[derive(Default)]
pub struct KeyboardOutcome {
    pub state_changed: bool,
    pub camera_changed: bool,
}

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(
    ctx: &egui::Context,
    state: &mut MeasureState,
    tool: &mut Tool,
    viewport: &mut ViewportPanel,
) -> KeyboardOutcome {
    let mut outcome = KeyboardOutcome::default();

    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return outcome;
    }

    ctx.input(|i| {
        // Ctrl+Z: undo last tool point
        if i.modifiers.command && i.key_pressed(egui::Key::Z) {
            outcome.state_changed |= actions::undo(state, *tool);
        }
        // Escape: drop tool points, then leave the tool, then clear measurements
        if i.key_pressed(egui::Key::Escape) {
            handle_escape(state, tool);
            outcome.state_changed = true;
        }
        // Delete: remove the newest measurement
        if i.key_pressed(egui::Key::Delete) && !state.sets().is_empty() {
            state.remove_set(state.sets().len() - 1);
            outcome.state_changed = true;
        }
        if i.modifiers.command {
            return;
        }
        // P: pin the newest measurement, or unpin
        if i.key_pressed(egui::Key::P) {
            if state.pinned().is_some() {
                state.unpin();
            } else if !state.sets().is_empty() {
                state.pin(state.sets().len() - 1);
            }
            outcome.state_changed = true;
        }
        // M / A / L: tools
        for (key, next) in [
            (egui::Key::M, Tool::Measure),
            (egui::Key::A, Tool::Area),
            (egui::Key::L, Tool::PointLine),
        ] {
            if i.key_pressed(key) && *tool != next {
                *tool = next;
                outcome.state_changed = true;
            }
        }
        // 1..5: axis toggles on the newest measurement
        if let Some(last) = state.sets().len().checked_sub(1) {
            for (key, axis) in [
                (egui::Key::Num1, AxisName::Result),
                (egui::Key::Num2, AxisName::XAxis),
                (egui::Key::Num3, AxisName::YAxis),
                (egui::Key::Num4, AxisName::ZAxis),
                (egui::Key::Num5, AxisName::XyPlane),
            ] {
                if i.key_pressed(key) {
                    outcome.state_changed |= state.toggle_axis(last, axis);
                }
            }
        }
        // O: perspective / orthographic, Home: reset camera
        if i.key_pressed(egui::Key::O) {
            viewport.toggle_projection();
            outcome.camera_changed = true;
        }
        if i.key_pressed(egui::Key::Home) {
            viewport.reset_camera();
            outcome.camera_changed = true;
        }
    });

    outcome
}

fn handle_escape(state: &mut MeasureState, tool: &mut Tool) {
    match tool {
        Tool::Area if !state.area().is_empty() => state.clear_area(),
        Tool::PointLine if !state.point_line().is_empty() => state.clear_point_line(),
        Tool::Area | Tool::PointLine => *tool = Tool::Measure,
        Tool::Measure => state.clear(),
    }
}
