//! UI state read by the overlay. The overlay never owns or mutates it.

pub mod measure;
pub mod settings;

pub use measure::MeasureState;
pub use settings::OverlaySettings;
