//! Setup-time errors.
//!
//! Nothing on the per-ray path returns an error: misses, degenerate samples
//! and scenes without lights all resolve to zero radiance. These errors cover
//! invalid input handed to the renderer before any ray is traced.

use thiserror::Error;

/// Errors that can occur while configuring a render or building geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Samples per pixel must be at least 1")]
    NoSamples,

    #[error("Bucket size must be at least 1 pixel")]
    ZeroBucketSize,

    #[error("Image resolution must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Mesh face {face} references vertex {index}, but only {vertex_count} vertices exist")]
    MeshIndexOutOfRange {
        face: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("Mesh has no faces")]
    EmptyMesh,
}

/// Result type for renderer setup operations.
pub type RenderResult<T> = Result<T, RenderError>;
