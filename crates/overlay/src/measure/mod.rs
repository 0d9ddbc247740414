//! Measurement overlay pipeline: caches, marker positions, orchestration

pub mod cache;
pub mod duo;
pub mod frame;
pub mod markers;
pub mod overlay;
pub mod positions;

pub use cache::{Generation, ProductCache, ResultCache, ResultEntry};
pub use duo::{compute_duo_results, DuoMeasurement};
pub use frame::{set_key, MeasureSet, OverlayFrame};
pub use markers::{move_interaction_markers, MarkerHost, MarkerTransforms};
pub use overlay::{MeasureOverlay, OverlayInput, OverlayStyle};
pub use positions::{compute_positions, InteractionPositions};
