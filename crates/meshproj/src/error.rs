//! Error types for mesh projection.

use meshproj_raytrace::MeshError;
use thiserror::Error;

/// Errors that abort a projection before anything is written.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// No target object was given.
    #[error("no projection target; select a mesh to project onto")]
    NoTarget,

    /// The target has no usable triangles.
    #[error("target {0} is not a mesh with faces")]
    TargetNotMesh(String),

    /// Nothing left to project once the target is excluded.
    #[error("no source meshes to project")]
    NoSources,

    /// Invalid projection settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Mesh connectivity refers to missing vertices.
    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
