//! 2D drawing engine: camera snapshot, drawing surfaces and draw primitives

pub mod camera;
pub mod canvas;
pub mod draw;
pub mod surface;

pub use camera::CameraState;
pub use canvas::ShapeCanvas;
pub use draw::{draw_part, draw_product, ColorSettings, PointColors, TextSettings};
pub use surface::{DrawSurface, LineCap, TextStyle};
