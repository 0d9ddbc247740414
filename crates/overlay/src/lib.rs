// Library crate: exposes the overlay pipeline for integration tests and the viewer binary.
// Viewer-specific modules (app, viewport camera) remain in the binary crate.

pub mod engine2d;
pub mod error;
pub mod fixtures;
pub mod harness;
pub mod helpers;
pub mod measure;
pub mod sdk;
pub mod state;
