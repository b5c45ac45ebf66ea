//! Errors raised while assembling a triangle mesh.

use thiserror::Error;

/// Errors that can occur when building a [`crate::TriangleMesh`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A face refers to a vertex that does not exist.
    #[error("face {face} references vertex {index}, but the mesh has {count} vertices")]
    IndexOutOfRange {
        /// Offending face.
        face: usize,
        /// Offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        count: usize,
    },

    /// A polygon with fewer than three corners.
    #[error("face {0} has fewer than 3 vertices")]
    DegenerateFace(usize),
}
