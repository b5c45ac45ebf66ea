//! Per-vertex projection state.

use meshproj_math::{Point3, Vec3};
use meshproj_raytrace::{Ray, SurfaceQuery};
use serde::{Deserialize, Serialize};

/// Limit on ray length, in scene units.
pub const MAX_RAY_DISTANCE: f64 = 100_000.0;

/// How a vertex was placed on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexStatus {
    /// Its own ray hit the target.
    Hit,
    /// Placed on the plane of a neighbor's hit.
    Fallback,
    /// Left where it was.
    Missed,
}

/// Projection data of one source vertex for a run.
#[derive(Debug, Clone)]
pub struct VertexRecord {
    /// World position before any projection alignment; kept by misses.
    pub original: Point3,
    /// Position the ray starts from (world space, after alignment).
    pub world: Point3,
    /// Unit ray direction.
    pub direction: Vec3,
    /// `depth_axis · world`, before normalization.
    pub offset: f64,
    /// Surface point, either hit directly or found through a neighbor.
    pub surface: Option<Point3>,
    /// Normal of the hit face (the neighbor's face for fallbacks).
    pub normal: Option<Vec3>,
    /// Outcome for this vertex.
    pub status: VertexStatus,
}

impl VertexRecord {
    /// Cast the vertex ray against `target` and record the hit.
    ///
    /// The cast position doubles as the original one; see
    /// [`VertexRecord::with_original`].
    pub fn cast<Q: SurfaceQuery + ?Sized>(
        world: Point3,
        direction: Vec3,
        offset: f64,
        target: &Q,
    ) -> Self {
        let hit = target.ray_cast(&Ray::new(world, direction), MAX_RAY_DISTANCE);
        Self {
            original: world,
            world,
            direction,
            offset,
            surface: hit.map(|h| h.point),
            normal: hit.map(|h| h.normal.into_inner()),
            status: if hit.is_some() {
                VertexStatus::Hit
            } else {
                VertexStatus::Missed
            },
        }
    }

    /// Set the position a missed vertex falls back to when casting started
    /// from an aligned copy of it.
    pub fn with_original(mut self, original: Point3) -> Self {
        self.original = original;
        self
    }

    /// True for hits and fallbacks.
    pub fn is_projected(&self) -> bool {
        self.status != VertexStatus::Missed
    }

    /// Position before the depth offset: the surface point pulled back
    /// along the ray by the normalized offset, or [`VertexRecord::original`]
    /// for a missed vertex.
    pub fn base_position(&self, min_offset: f64) -> Point3 {
        match self.surface {
            Some(surface) if self.is_projected() => {
                surface + self.direction * (self.offset - min_offset)
            }
            _ => self.original,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshproj_raytrace::TriangleMesh;

    fn floor() -> TriangleMesh {
        TriangleMesh::from_polygons(
            vec![
                Point3::new(-1.0, -1.0, 0.0),
                Point3::new(1.0, -1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(-1.0, 1.0, 0.0),
            ],
            &[vec![0, 1, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_cast_hit_and_base_position() {
        let down = Vec3::new(0.0, 0.0, -1.0);
        let record = VertexRecord::cast(Point3::new(0.5, 0.5, 2.0), down, -2.0, &floor());
        assert_eq!(record.status, VertexStatus::Hit);
        let base = record.base_position(-3.0);
        assert!((base - Point3::new(0.5, 0.5, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_cast_miss_keeps_position() {
        let down = Vec3::new(0.0, 0.0, -1.0);
        let world = Point3::new(5.0, 5.0, 2.0);
        let record = VertexRecord::cast(world, down, 0.0, &floor());
        assert_eq!(record.status, VertexStatus::Missed);
        assert_eq!(record.base_position(-10.0), world);
    }

    #[test]
    fn test_miss_returns_unaligned_position() {
        let down = Vec3::new(0.0, 0.0, -1.0);
        let aligned = Point3::new(5.0, 5.0, 2.0);
        let before = Point3::new(5.0, 3.0, 4.0);
        let record = VertexRecord::cast(aligned, down, 0.0, &floor()).with_original(before);
        assert_eq!(record.status, VertexStatus::Missed);
        assert_eq!(record.base_position(0.0), before);

        // Hits ignore the original position
        let hit = VertexRecord::cast(Point3::new(0.5, 0.5, 1.0), down, 0.0, &floor())
            .with_original(before);
        assert!(hit.base_position(0.0).z.abs() < 1e-12);
    }
}
