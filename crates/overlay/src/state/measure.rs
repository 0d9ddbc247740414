//! Measurement selection state: measure sets, pinned set, axis toggles, tool points

use glam::Vec3;
use shared::{ActiveAxis, AxisName, MeasureEntity};

use crate::measure::{DuoMeasurement, MeasureSet, OverlayInput};
use crate::sdk::DrawSettings;

/// Current measurements and in-progress tools
#[derive(Debug, Clone, Default)]
pub struct MeasureState {
    sets: Vec<MeasureSet>,
    /// Set that receives the next pick as its second member
    pinned: Option<usize>,
    /// Axis flags per set
    active_axis: Vec<ActiveAxis>,
    /// Duo results per set, refreshed when the sets change
    duo: Vec<Option<DuoMeasurement>>,
    /// Entity under the pointer
    pub hover: Option<MeasureEntity>,
    area: Vec<Vec3>,
    point_line: Vec<Vec3>,
    /// Bumped on every change of sets or pinning (for duo recomputation)
    version: u64,
}

impl MeasureState {
    pub fn sets(&self) -> &[MeasureSet] {
        &self.sets
    }

    pub fn pinned(&self) -> Option<usize> {
        self.pinned
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn axis(&self, index: usize) -> ActiveAxis {
        self.active_axis.get(index).copied().unwrap_or_default()
    }

    pub fn duo_results(&self) -> &[Option<DuoMeasurement>] {
        &self.duo
    }

    pub fn area(&self) -> &[Vec3] {
        &self.area
    }

    pub fn point_line(&self) -> &[Vec3] {
        &self.point_line
    }

    // ── Selection ───────────────────────────────────────────

    /// Add a picked entity.
    ///
    /// With a pinned set the entity becomes (or replaces) its second member;
    /// otherwise it starts a new set. Returns the index of the set it went to,
    /// or `None` if it is already measured on its own.
    pub fn select_entity(&mut self, entity: MeasureEntity) -> Option<usize> {
        if let Some(index) = self.pinned.filter(|i| *i < self.sets.len()) {
            let set = &mut self.sets[index];
            if set.first().is_some_and(|first| first.key() == entity.key()) {
                return None;
            }
            set.truncate(1);
            set.push(entity);
            self.duo[index] = None;
            self.version += 1;
            return Some(index);
        }

        let key = entity.key();
        if self
            .sets
            .iter()
            .any(|s| matches!(s.as_slice(), [only] if only.key() == key))
        {
            return None;
        }
        self.sets.push(vec![entity]);
        self.active_axis.push(ActiveAxis::default());
        self.duo.push(None);
        self.version += 1;
        Some(self.sets.len() - 1)
    }

    /// Pin a set so the next pick pairs with it
    pub fn pin(&mut self, index: usize) -> bool {
        if index >= self.sets.len() {
            return false;
        }
        self.pinned = Some(index);
        self.version += 1;
        true
    }

    pub fn unpin(&mut self) {
        if self.pinned.take().is_some() {
            self.version += 1;
        }
    }

    pub fn remove_set(&mut self, index: usize) -> Option<MeasureSet> {
        if index >= self.sets.len() {
            return None;
        }
        self.active_axis.remove(index);
        self.duo.remove(index);
        self.pinned = match self.pinned {
            Some(p) if p == index => None,
            Some(p) if p > index => Some(p - 1),
            other => other,
        };
        self.version += 1;
        Some(self.sets.remove(index))
    }

    pub fn toggle_axis(&mut self, index: usize, axis: AxisName) -> bool {
        match self.active_axis.get_mut(index) {
            Some(flags) => {
                flags.toggle(axis);
                true
            }
            None => false,
        }
    }

    /// Store duo results computed for the current sets
    pub fn set_duo_results(&mut self, results: Vec<Option<DuoMeasurement>>) {
        self.duo = results;
        self.duo.resize(self.sets.len(), None);
    }

    // ── Area / point-line tools ─────────────────────────────

    pub fn add_area_point(&mut self, point: Vec3) {
        self.area.push(point);
    }

    pub fn undo_area_point(&mut self) -> Option<Vec3> {
        self.area.pop()
    }

    pub fn clear_area(&mut self) {
        self.area.clear();
    }

    pub fn add_point_line_point(&mut self, point: Vec3) {
        self.point_line.push(point);
    }

    pub fn undo_point_line_point(&mut self) -> Option<Vec3> {
        self.point_line.pop()
    }

    pub fn clear_point_line(&mut self) {
        self.point_line.clear();
    }

    pub fn clear(&mut self) {
        let version = self.version + 1;
        *self = Self {
            version,
            ..Self::default()
        };
    }

    /// Snapshot handed to the overlay refresh
    pub fn overlay_input(&self, draw_settings: DrawSettings) -> OverlayInput {
        let results = self
            .duo
            .iter()
            .enumerate()
            .map(|(i, duo)| {
                duo.as_ref().map(|d| DuoMeasurement {
                    result: d.result.clone(),
                    active_axis: self.axis(i),
                })
            })
            .collect();
        OverlayInput {
            sets: self.sets.clone(),
            results,
            hover: self.hover.clone(),
            area: self.area.clone(),
            point_line: self.point_line.clone(),
            draw_settings,
        }
    }
}
