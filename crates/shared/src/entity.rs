use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Scene object identifier assigned by the model
pub type ObjectId = u32;

/// Geometric kind of the picked sub-part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrawKind {
    Vertex,
    Edge,
    Curve,
    Face,
}

/// Which reference line of a cylinder is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CylinderMeasure {
    Center,
    Top,
    Bottom,
}

impl CylinderMeasure {
    pub fn as_str(&self) -> &'static str {
        match self {
            CylinderMeasure::Center => "center",
            CylinderMeasure::Top => "top",
            CylinderMeasure::Bottom => "bottom",
        }
    }
}

/// Per-entity measurement options
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cylinder_measure: Option<CylinderMeasure>,
}

/// A measurable sub-part of a scene object.
///
/// Opaque to the overlay apart from its identity; geometry is resolved by the SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureEntity {
    #[serde(rename = "ObjectId")]
    pub object_id: ObjectId,
    pub instance_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_index: Option<u32>,
    pub draw_kind: DrawKind,
    /// Picked position, used by the SDK for vertices and as a hint otherwise
    pub position: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<MeasureSettings>,
}

impl MeasureEntity {
    /// Composite identity `objectId_instanceIndex_pathIndex[_measureMode]`.
    ///
    /// Entities with equal keys are the same logical measurement across frames,
    /// wherever they sit in the selection.
    pub fn key(&self) -> String {
        let path = match self.path_index {
            Some(p) => p.to_string(),
            None => "-".to_string(),
        };
        let mut key = format!("{}_{}_{}", self.object_id, self.instance_index, path);
        if let Some(mode) = self.settings.as_ref().and_then(|s| s.cylinder_measure) {
            key.push('_');
            key.push_str(mode.as_str());
        }
        key
    }

    pub fn is_vertex(&self) -> bool {
        self.draw_kind == DrawKind::Vertex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(object_id: ObjectId, path_index: Option<u32>) -> MeasureEntity {
        MeasureEntity {
            object_id,
            instance_index: 0,
            path_index,
            draw_kind: DrawKind::Edge,
            position: Vec3::ZERO,
            settings: None,
        }
    }

    #[test]
    fn test_key_format() {
        assert_eq!(entity(12, Some(3)).key(), "12_0_3");
        assert_eq!(entity(12, None).key(), "12_0_-");
    }

    #[test]
    fn test_key_includes_cylinder_mode() {
        let mut e = entity(7, Some(1));
        e.settings = Some(MeasureSettings {
            cylinder_measure: Some(CylinderMeasure::Top),
        });
        assert_eq!(e.key(), "7_0_1_top");

        e.settings = Some(MeasureSettings::default());
        assert_eq!(e.key(), "7_0_1");
    }

    #[test]
    fn test_key_ignores_position_and_kind() {
        let a = entity(5, Some(2));
        let mut b = entity(5, Some(2));
        b.position = Vec3::new(1.0, 2.0, 3.0);
        b.draw_kind = DrawKind::Face;
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_wire_names() {
        let json = r#"{"ObjectId":4,"instanceIndex":1,"pathIndex":9,"drawKind":"face","position":[0.0,0.0,0.0]}"#;
        let e: MeasureEntity = serde_json::from_str(json).unwrap();
        assert_eq!(e.object_id, 4);
        assert_eq!(e.path_index, Some(9));
        assert_eq!(e.draw_kind, DrawKind::Face);
        assert!(e.settings.is_none());
    }
}
