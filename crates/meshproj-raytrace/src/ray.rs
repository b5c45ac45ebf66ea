//! Rays cast from source vertices toward the target.

use meshproj_math::{Dir3, Point3, Vec3};

use crate::Aabb3;

/// Half-line from `origin` along a unit `direction`.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Start of the ray; hits behind it are ignored.
    pub origin: Point3,
    /// Unit direction.
    pub direction: Dir3,
    /// Componentwise reciprocal of `direction`, infinite on zero components.
    inv_direction: Vec3,
}

impl Ray {
    /// Ray from `origin` along `direction` (normalized here).
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        let direction = Dir3::new_normalize(direction);
        Self {
            origin,
            direction,
            inv_direction: direction.map(f64::recip),
        }
    }

    /// Point at distance `t` along the ray.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction.into_inner() * t
    }

    /// Entry and exit distances through `aabb`, clamped to start at 0.
    ///
    /// `None` when the box is missed or lies entirely behind the origin.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb3) -> Option<(f64, f64)> {
        let mut near = f64::NEG_INFINITY;
        let mut far = f64::INFINITY;
        for axis in 0..3 {
            let inv = self.inv_direction[axis];
            let a = (aabb.min[axis] - self.origin[axis]) * inv;
            let b = (aabb.max[axis] - self.origin[axis]) * inv;
            let (lo, hi) = if inv < 0.0 { (b, a) } else { (a, b) };
            // max/min skip a NaN operand (0 * inf on a slab boundary)
            near = near.max(lo);
            far = far.min(hi);
        }

        (far >= near && far >= 0.0).then(|| (near.max(0.0), far))
    }
}

/// Closest intersection of a ray with a triangle surface.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Distance along the ray.
    pub t: f64,
    /// Hit location.
    pub point: Point3,
    /// Face normal of the hit triangle (winding order).
    pub normal: Dir3,
    /// Index of the hit triangle.
    pub triangle: usize,
}
