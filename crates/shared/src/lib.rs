//! Data model shared between the measurement overlay and the rendering SDK boundary.
//!
//! Everything here is plain data: entities picked from the scene, the projected
//! draw products the SDK returns for them, duo-measurement results and the
//! camera snapshot. Wire names follow the SDK's camelCase JSON.

mod draw;
mod entity;
mod error;
mod render;
mod result;

pub use draw::{
    DrawObject, DrawObjectKind, DrawPart, DrawProduct, DrawProductKind, DrawType, DrawVoid,
    ElevationInfo, PartText, Rgba,
};
pub use entity::{CylinderMeasure, DrawKind, MeasureEntity, MeasureSettings, ObjectId};
pub use error::SdkError;
pub use render::{CameraKind, CameraParams, RenderState};
pub use result::{ActiveAxis, AxisName, DuoResult, MeasurementId};
