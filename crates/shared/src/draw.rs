use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// RGBA colour as delivered by the SDK
pub type Rgba = [u8; 4];

/// What produced a draw product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrawProductKind {
    Basic,
    MeasureResult,
    Vertex,
}

/// Primary geometry of a draw object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrawObjectKind {
    Plane,
    Cylinder,
    CurveSegment,
    Edge,
    Vertex,
    Complex,
    Text,
}

/// How a part is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrawType {
    Angle,
    Text,
    Lines,
    Filled,
    Vertex,
}

/// Elevation metadata of a cylinder or sloped line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevationInfo {
    pub from: f64,
    pub to: f64,
    #[serde(default)]
    pub horizontal_display: bool,
}

impl ElevationInfo {
    /// True when the part runs from its higher end to its lower end
    pub fn is_descending(&self) -> bool {
        self.from > self.to
    }
}

/// Label attached to a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartText {
    /// One label for the whole part
    Label(String),
    /// One label per segment, empty strings are skipped
    Segments(Vec<String>),
}

/// Hole inside a filled part
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawVoid {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertices2d: Option<Vec<Vec2>>,
    #[serde(default)]
    pub vertices3d: Vec<Vec3>,
}

/// Smallest drawable unit: a polyline, polygon, point set, angle or text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub draw_type: DrawType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<ElevationInfo>,
    /// Screen projection, absent when the part is behind the camera
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertices2d: Option<Vec<Vec2>>,
    #[serde(default)]
    pub vertices3d: Vec<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<PartText>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub voids: Vec<DrawVoid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_colors: Option<Vec<Rgba>>,
}

impl DrawPart {
    /// A part with only geometry set
    pub fn new(draw_type: DrawType, vertices3d: Vec<Vec3>, vertices2d: Option<Vec<Vec2>>) -> Self {
        Self {
            name: None,
            draw_type,
            elevation: None,
            vertices2d,
            vertices3d,
            text: None,
            voids: Vec::new(),
            vertex_colors: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_text(mut self, text: PartText) -> Self {
        self.text = Some(text);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// First and last projected vertex
    pub fn screen_endpoints(&self) -> Option<(Vec2, Vec2)> {
        let pts = self.vertices2d.as_ref()?;
        match (pts.first(), pts.last()) {
            (Some(a), Some(b)) if pts.len() >= 2 => Some((*a, *b)),
            _ => None,
        }
    }
}

/// Group of parts sharing one geometric kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawObject {
    pub kind: DrawObjectKind,
    pub parts: Vec<DrawPart>,
}

/// Projected geometry for one measured entity or result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawProduct {
    pub kind: DrawProductKind,
    pub objects: Vec<DrawObject>,
}

impl DrawProduct {
    pub fn is_empty(&self) -> bool {
        self.objects.iter().all(|o| o.parts.is_empty())
    }

    /// Kind of the first object, which decides marker placement
    pub fn primary_kind(&self) -> Option<DrawObjectKind> {
        self.objects.first().map(|o| o.kind)
    }

    /// Iterate every part of every object
    pub fn parts(&self) -> impl Iterator<Item = &DrawPart> {
        self.objects.iter().flat_map(|o| o.parts.iter())
    }

    pub fn parts_mut(&mut self) -> impl Iterator<Item = &mut DrawPart> {
        self.objects.iter_mut().flat_map(|o| o.parts.iter_mut())
    }
}
