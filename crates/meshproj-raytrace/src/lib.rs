#![warn(missing_docs)]

//! Ray casting against triangle meshes for the projection pipeline.
//!
//! The target of a projection is an immutable triangle surface. This crate
//! indexes it with a bounding volume hierarchy and answers nearest-hit ray
//! queries against it.
//!
//! # Architecture
//!
//! - [`Ray`] - Ray representation with origin and direction
//! - [`RayHit`] - Closest intersection with hit point and face normal
//! - [`TriangleMesh`] - Indexed triangle soup the BVH is built from
//! - [`bvh`] - Bounding volume hierarchy for acceleration
//! - [`SurfaceQuery`] - The capability the projection engine depends on
//!
//! # Example
//!
//! ```
//! use meshproj_math::{Point3, Vec3};
//! use meshproj_raytrace::{Bvh, Ray, SurfaceQuery, TriangleMesh};
//!
//! let mesh = TriangleMesh::new(
//!     vec![
//!         Point3::new(-1.0, -1.0, 0.0),
//!         Point3::new(1.0, -1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! )
//! .unwrap();
//! let bvh = Bvh::build(&mesh, 1e-4);
//!
//! let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
//! let hit = bvh.ray_cast(&ray, 100.0).unwrap();
//! assert!((hit.t - 5.0).abs() < 1e-9);
//! ```

mod aabb;
mod error;
mod ray;
pub mod bvh;
pub mod triangle;

pub use aabb::Aabb3;
pub use bvh::Bvh;
pub use error::MeshError;
pub use ray::{Ray, RayHit};
pub use triangle::{Triangle, TriangleMesh};

/// Nearest-hit ray queries against a fixed triangle set.
pub trait SurfaceQuery {
    /// Closest hit with `0 <= t <= max_distance`, if any.
    fn ray_cast(&self, ray: &Ray, max_distance: f64) -> Option<RayHit>;
}
