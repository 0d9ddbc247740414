use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifier the SDK assigns to a duo measurement
pub type MeasurementId = u64;

/// Result of measuring two entities against each other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuoResult {
    pub id: MeasurementId,
    /// Closest point on the first entity
    pub from: Vec3,
    /// Closest point on the second entity
    pub to: Vec3,
    pub distance: f64,
    pub distance_x: f64,
    pub distance_y: f64,
    pub distance_z: f64,
    pub planar_distance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
}

/// Named parts of a duo-measurement draw product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisName {
    Result,
    XyPlane,
    XAxis,
    YAxis,
    ZAxis,
    Normal,
}

impl AxisName {
    pub const ALL: [AxisName; 6] = [
        AxisName::Result,
        AxisName::XyPlane,
        AxisName::XAxis,
        AxisName::YAxis,
        AxisName::ZAxis,
        AxisName::Normal,
    ];

    /// Part name used in draw products
    pub fn part_name(&self) -> &'static str {
        match self {
            AxisName::Result => "result",
            AxisName::XyPlane => "xy-plane",
            AxisName::XAxis => "x-axis",
            AxisName::YAxis => "y-axis",
            AxisName::ZAxis => "z-axis",
            AxisName::Normal => "normal",
        }
    }

    pub fn from_part_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.part_name() == name)
    }
}

/// Which components of a duo measurement are displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAxis {
    pub x: bool,
    pub y: bool,
    pub z: bool,
    pub planar: bool,
    pub result: bool,
}

impl Default for ActiveAxis {
    fn default() -> Self {
        Self {
            x: true,
            y: true,
            z: true,
            planar: true,
            result: true,
        }
    }
}

impl ActiveAxis {
    /// Whether the named part is currently shown
    pub fn is_active(&self, axis: AxisName) -> bool {
        match axis {
            AxisName::Result | AxisName::Normal => self.result,
            AxisName::XyPlane => self.planar,
            AxisName::XAxis => self.x,
            AxisName::YAxis => self.y,
            AxisName::ZAxis => self.z,
        }
    }

    pub fn toggle(&mut self, axis: AxisName) {
        let flag = match axis {
            AxisName::Result | AxisName::Normal => &mut self.result,
            AxisName::XyPlane => &mut self.planar,
            AxisName::XAxis => &mut self.x,
            AxisName::YAxis => &mut self.y,
            AxisName::ZAxis => &mut self.z,
        };
        *flag = !*flag;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_name_mapping() {
        for axis in AxisName::ALL {
            assert_eq!(AxisName::from_part_name(axis.part_name()), Some(axis));
        }
        assert_eq!(AxisName::from_part_name("cylinderLine"), None);
    }

    #[test]
    fn test_normal_follows_result_flag() {
        let mut active = ActiveAxis::default();
        active.toggle(AxisName::Result);
        assert!(!active.is_active(AxisName::Normal));
        assert!(active.is_active(AxisName::XAxis));
        active.toggle(AxisName::XyPlane);
        assert!(!active.planar);
    }
}
