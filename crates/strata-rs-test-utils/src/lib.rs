//! Test helpers shared across Strata crates.

pub mod fixtures;
pub mod hooks;
pub mod resources;

pub use fixtures::sample_resources;
pub use hooks::{DeriveKeyHook, RecordingHook};
pub use resources::RecordingResources;
