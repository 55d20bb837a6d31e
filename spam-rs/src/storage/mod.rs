//! Artifact persistence

pub mod artifacts;

pub use artifacts::{ArtifactStore, FORMAT_VERSION};
