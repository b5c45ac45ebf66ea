#![warn(missing_docs)]

//! Project meshes onto a target surface along the view direction.
//!
//! Every source vertex casts one ray from its own position, along the
//! camera's forward axis (orthographic) or away from the eye (perspective).
//! Hits land on the target, pulled back along the ray by the vertex's depth
//! relative to the nearest source vertex so the projected mesh keeps its
//! relief. Vertices whose ray misses are placed on the plane of a
//! neighboring hit when possible.
//!
//! # Example
//!
//! ```
//! use meshproj::{project, ProjectionSettings, SourceMesh};
//! use meshproj_align::Camera;
//! use meshproj_math::{Mat3, Point3, Transform};
//!
//! let square = |name: &str, z: f64, size: f64| {
//!     SourceMesh::new(
//!         name,
//!         Transform::identity(),
//!         vec![
//!             Point3::new(0.0, 0.0, z),
//!             Point3::new(size, 0.0, z),
//!             Point3::new(size, size, z),
//!             Point3::new(0.0, size, z),
//!         ],
//!         vec![vec![0, 1, 2, 3]],
//!     )
//! };
//! let mut objects = vec![square("floor", 0.0, 4.0)?, square("decal", 1.0, 1.0)?];
//! let camera = Camera::new(Mat3::identity(), Point3::new(0.0, 0.0, 10.0), true);
//!
//! let outcome = project(&mut objects, Some(0), camera, ProjectionSettings::default())?;
//! assert_eq!(outcome.objects[0].hit_count(), 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod depth;
mod error;
mod fallback;
mod report;
mod session;
pub mod settings;
mod source;
mod target;
mod vertex;

pub use depth::resolve_depth_axis;
pub use error::{ProjectionError, Result};
pub use fallback::resolve_fallbacks;
pub use report::{Report, ReportLevel};
pub use session::{
    project, ExecutePath, ObjectOutcome, ProjectionOutcome, ProjectionSession, RunContext,
};
pub use settings::{DepthAxis, ProjectionAlignment, ProjectionSettings};
pub use source::{MeshHandle, SourceMesh};
pub use target::build_target;
pub use vertex::{VertexRecord, VertexStatus, MAX_RAY_DISTANCE};
