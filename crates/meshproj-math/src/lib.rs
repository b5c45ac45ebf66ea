#![warn(missing_docs)]

//! Math types for mesh projection.
//!
//! Thin wrappers around nalgebra providing the points, vectors, rotations and
//! affine transforms the projection pipeline works with, plus the small set
//! of vector helpers in [`funcs`] and the [`Plane`] primitive.

use nalgebra::{Matrix3, Matrix4, Rotation3, Unit, Vector2, Vector3, Vector4};

mod funcs;
pub mod plane;

pub use funcs::{
    lerp, max_vec, max_vec3, min_max, min_vec, min_vec3, orthonormalize2, orthonormalize3,
    rotate_vec2, scale_matrix, sign,
};
pub use plane::Plane;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// A 3x3 matrix; used for rotations whose columns are the basis axes.
pub type Mat3 = Matrix3<f64>;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Wrap a raw 4x4 matrix.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        Self::axis_angle(&Vector3::x_axis(), angle)
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        Self::axis_angle(&Vector3::y_axis(), angle)
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        Self::axis_angle(&Vector3::z_axis(), angle)
    }

    fn axis_angle(axis: &Dir3, angle: f64) -> Self {
        Self::from_linear(Rotation3::from_axis_angle(axis, angle).matrix())
    }

    /// Embed a 3x3 linear part (rotation and/or scale) with no translation.
    pub fn from_linear(linear: &Mat3) -> Self {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(linear);
        Self { matrix: m }
    }

    /// Assemble `T(translation) * R(rotation) * S(scale)`.
    pub fn from_parts(translation: &Vec3, rotation: &Mat3, scale: &Vec3) -> Self {
        let mut t = Self::from_linear(&(rotation * scale_matrix(scale)));
        t.matrix[(0, 3)] = translation.x;
        t.matrix[(1, 3)] = translation.y;
        t.matrix[(2, 3)] = translation.z;
        t
    }

    /// Split into `(translation, rotation, scale)` so that
    /// `from_parts(t, r, s)` reproduces this transform.
    ///
    /// A mirrored basis is folded into a negative X scale so the rotation
    /// stays right-handed. Columns with zero scale are rebuilt from the
    /// others so the rotation stays orthonormal.
    pub fn decompose(&self) -> (Vec3, Mat3, Vec3) {
        let linear = self.linear();
        let mut scale = Vec3::new(
            linear.column(0).norm(),
            linear.column(1).norm(),
            linear.column(2).norm(),
        );
        if linear.determinant() < 0.0 {
            scale.x = -scale.x;
        }

        let mut rotation = Mat3::identity();
        let mut flat = [false; 3];
        for i in 0..3 {
            if Tolerance::DEFAULT.is_zero(scale[i]) {
                flat[i] = true;
            } else {
                rotation.set_column(i, &(linear.column(i) / scale[i]));
            }
        }
        complete_basis(&mut rotation, flat);

        (self.translation_part(), rotation, scale)
    }

    /// Upper-left 3x3 (rotation and scale).
    pub fn linear(&self) -> Mat3 {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Translation column.
    pub fn translation_part(&self) -> Vec3 {
        Vec3::new(
            self.matrix[(0, 3)],
            self.matrix[(1, 3)],
            self.matrix[(2, 3)],
        )
    }

    /// True when the linear part mirrors space (negative determinant).
    pub fn flips_handedness(&self) -> bool {
        self.linear().determinant() < 0.0
    }

    /// Compose: `self` then `other` (self * other).
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation, applies rotation/scale).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

/// Fill the `flat` columns of `rotation` so it becomes a right-handed
/// orthonormal basis around the remaining ones.
fn complete_basis(rotation: &mut Mat3, flat: [bool; 3]) {
    let kept: Vec<usize> = (0..3).filter(|&i| !flat[i]).collect();
    match kept[..] {
        // x = y × z, y = z × x, z = x × y
        [a, b] => {
            let k = 3 - a - b;
            let (next, prev) = ((k + 1) % 3, (k + 2) % 3);
            let c = rotation.column(next).cross(&rotation.column(prev));
            if let Some(c) = c.try_normalize(Tolerance::DEFAULT.linear) {
                rotation.set_column(k, &c);
            }
        }
        [a] => {
            let axis = rotation.column(a).into_owned();
            let seed = Vec3::ith(axis.iamin(), 1.0);
            if let Some((axis, next)) = orthonormalize2(&axis, &seed) {
                rotation.set_column((a + 1) % 3, &next);
                rotation.set_column((a + 2) % 3, &axis.cross(&next));
            }
        }
        _ => {}
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Tolerance for degenerate scale and basis checks.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in scene units.
    pub linear: f64,
}

impl Tolerance {
    /// 1e-9 scene units.
    pub const DEFAULT: Self = Self { linear: 1e-9 };

    /// True when `d` is within tolerance of zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
