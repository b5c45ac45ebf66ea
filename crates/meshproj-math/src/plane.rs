//! Infinite plane in Hessian normal form.

use nalgebra::Matrix4;

use crate::{Point3, Transform, Vec3};

/// Plane `normal · p + d = 0` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal; the positive side is the one it points toward.
    pub normal: Vec3,
    /// Offset, `-normal · point` for any point on the plane.
    pub d: f64,
}

impl Plane {
    /// Plane through `point` with the given unit `normal`.
    pub fn new(normal: Vec3, point: &Point3) -> Self {
        Self {
            normal,
            d: -normal.dot(&point.coords),
        }
    }

    /// Signed distance from `point`, positive on the normal's side.
    pub fn distance(&self, point: &Point3) -> f64 {
        self.normal.dot(&point.coords) + self.d
    }

    /// The point of the plane closest to the origin.
    pub fn origin(&self) -> Point3 {
        Point3::from(-self.d * self.normal)
    }

    /// Orthogonal projection of `point` onto the plane.
    pub fn project(&self, point: &Point3) -> Point3 {
        *point - self.distance(point) * self.normal
    }

    /// Plane mapped through `matrix`.
    ///
    /// Rebuilt from the transformed origin point and the transformed normal
    /// (as a direction, then re-normalized). `d` is never transformed
    /// directly since that is wrong under non-uniform scale.
    pub fn transformed(&self, matrix: &Transform) -> Self {
        let point = matrix.apply_point(&self.origin());
        let normal = matrix.apply_vec(&self.normal).normalize();
        Self::new(normal, &point)
    }

    /// Parameter `t` where the line `origin + t * direction` meets the plane.
    ///
    /// Returns `None` when the line is parallel within `bias`, i.e.
    /// `|normal · direction| < bias`.
    pub fn intersect_line(&self, origin: &Point3, direction: &Vec3, bias: f64) -> Option<f64> {
        let denom = self.normal.dot(direction);
        if denom.abs() < bias {
            return None;
        }
        Some(-self.distance(origin) / denom)
    }

    /// Affine reflection across this plane: `p' = p - 2 (n·p + d) n`.
    pub fn reflection(&self) -> Transform {
        let n = self.normal;
        let mut m = Matrix4::identity();
        for r in 0..3 {
            for c in 0..3 {
                m[(r, c)] -= 2.0 * n[r] * n[c];
            }
            m[(r, 3)] = -2.0 * self.d * n[r];
        }
        Transform::from_matrix(m)
    }
}
