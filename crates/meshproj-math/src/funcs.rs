//! Small vector helpers: interpolation, componentwise bounds, 2D rotation,
//! Gram-Schmidt and sign.

use std::ops::{Add, Mul};

use crate::{Mat3, Point3, Tolerance, Vec2, Vec3};

/// Linear interpolation `(1 - factor) * a + factor * b`.
pub fn lerp<T>(a: T, b: T, factor: f64) -> T
where
    T: Mul<f64, Output = T> + Add<Output = T>,
{
    a * (1.0 - factor) + b * factor
}

/// Componentwise minimum.
pub fn min_vec(a: &Vec3, b: &Vec3) -> Vec3 {
    a.inf(b)
}

/// Componentwise maximum.
pub fn max_vec(a: &Vec3, b: &Vec3) -> Vec3 {
    a.sup(b)
}

/// Componentwise minimum of three vectors.
pub fn min_vec3(a: &Vec3, b: &Vec3, c: &Vec3) -> Vec3 {
    min_vec(&min_vec(a, b), c)
}

/// Componentwise maximum of three vectors.
pub fn max_vec3(a: &Vec3, b: &Vec3, c: &Vec3) -> Vec3 {
    max_vec(&max_vec(a, b), c)
}

/// Componentwise `(min, max)` of a point set, `None` when empty.
pub fn min_max<'a, I>(points: I) -> Option<(Point3, Point3)>
where
    I: IntoIterator<Item = &'a Point3>,
{
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let (lo, hi) = iter.fold((first.coords, first.coords), |(lo, hi), p| {
        (min_vec(&lo, &p.coords), max_vec(&hi, &p.coords))
    });
    Some((Point3::from(lo), Point3::from(hi)))
}

/// Rotate a 2D vector counter-clockwise by `degrees`.
pub fn rotate_vec2(v: &Vec2, degrees: f64) -> Vec2 {
    nalgebra::Rotation2::new(degrees.to_radians()) * v
}

/// Gram-Schmidt on two vectors, `a` first. `None` if either degenerates.
pub fn orthonormalize2(a: &Vec3, b: &Vec3) -> Option<(Vec3, Vec3)> {
    let eps = Tolerance::DEFAULT.linear;
    let a = a.try_normalize(eps)?;
    let b = (b - b.dot(&a) * a).try_normalize(eps)?;
    Some((a, b))
}

/// Gram-Schmidt on three vectors. `a` is the master axis, `b` is made
/// orthogonal to `a`, `c` to both. Returned in input order.
///
/// Returns `None` when the inputs are (nearly) linearly dependent.
pub fn orthonormalize3(a: &Vec3, b: &Vec3, c: &Vec3) -> Option<(Vec3, Vec3, Vec3)> {
    let (a, b) = orthonormalize2(a, b)?;
    let c = (c - c.dot(&b) * b - c.dot(&a) * a).try_normalize(Tolerance::DEFAULT.linear)?;
    Some((a, b, c))
}

/// Sign of `value` as `-1.0`, `0.0` or `1.0`. Zero maps to zero.
pub fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Diagonal scaling matrix.
pub fn scale_matrix(scale: &Vec3) -> Mat3 {
    Mat3::from_diagonal(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_sign() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(3.5), 1.0);
        assert_eq!(sign(1e-300), 1.0);
        assert_eq!(sign(-2.0), -1.0);
    }

    #[test]
    fn test_lerp_scalar_and_vector() {
        assert!((lerp(2.0, 4.0, 0.25) - 2.5).abs() < 1e-12);
        let mid = lerp(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, -2.0), 0.5);
        assert_relative_eq!(mid, Vec3::new(1.0, 2.0, -1.0));
        assert_relative_eq!(lerp(Vec3::x(), Vec3::y(), 1.0), Vec3::y());
    }

    #[test]
    fn test_componentwise_bounds() {
        let a = Vec3::new(1.0, 5.0, -1.0);
        let b = Vec3::new(2.0, 0.0, 3.0);
        let c = Vec3::new(-4.0, 1.0, 0.5);
        assert_relative_eq!(min_vec(&a, &b), Vec3::new(1.0, 0.0, -1.0));
        assert_relative_eq!(max_vec(&a, &b), Vec3::new(2.0, 5.0, 3.0));
        assert_relative_eq!(min_vec3(&a, &b, &c), Vec3::new(-4.0, 0.0, -1.0));
        assert_relative_eq!(max_vec3(&a, &b, &c), Vec3::new(2.0, 5.0, 3.0));
    }

    #[test]
    fn test_rotate_vec2_degrees() {
        let quarter = rotate_vec2(&Vec2::new(1.0, 0.0), 90.0);
        assert_relative_eq!(quarter, Vec2::new(0.0, 1.0), epsilon = 1e-12);
        let back = rotate_vec2(&Vec2::new(0.0, 2.0), -90.0);
        assert_relative_eq!(back, Vec2::new(2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_min_max_points() {
        let pts = [
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(-1.0, 4.0, 0.0),
            Point3::new(0.0, 0.0, 5.0),
        ];
        let (lo, hi) = min_max(&pts).unwrap();
        assert_relative_eq!(lo, Point3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(hi, Point3::new(1.0, 4.0, 5.0));
        let empty: [Point3; 0] = [];
        assert!(min_max(&empty).is_none());
    }

    #[test]
    fn test_orthonormalize_keeps_master_axis() {
        let (a, b, c) = orthonormalize3(
            &Vec3::new(0.0, 0.0, 2.0),
            &Vec3::new(1.0, 0.0, 1.0),
            &Vec3::new(1.0, 1.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(a, Vec3::z(), epsilon = 1e-12);
        assert_relative_eq!(b, Vec3::x(), epsilon = 1e-12);
        assert_relative_eq!(c, Vec3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_orthonormalize_degenerate() {
        assert!(orthonormalize2(&Vec3::x(), &Vec3::new(3.0, 0.0, 0.0)).is_none());
        assert!(orthonormalize3(&Vec3::x(), &Vec3::y(), &Vec3::new(1.0, 1.0, 0.0)).is_none());
        assert!(orthonormalize3(&Vec3::zeros(), &Vec3::y(), &Vec3::z()).is_none());
    }

    fn arb_rotation() -> impl Strategy<Value = Mat3> {
        (-3.2f64..3.2, -3.2f64..3.2, -3.2f64..3.2).prop_map(|(r, p, y)| {
            *nalgebra::Rotation3::from_euler_angles(r, p, y).matrix()
        })
    }

    proptest! {
        /// Orthonormalizing an orthonormal triple is a no-op.
        #[test]
        fn orthonormalize_is_idempotent(rot in arb_rotation()) {
            let (a, b, c) = orthonormalize3(
                &rot.column(0).into_owned(),
                &rot.column(1).into_owned(),
                &rot.column(2).into_owned(),
            ).unwrap();
            prop_assert!((a - rot.column(0)).norm() < 1e-9);
            prop_assert!((b - rot.column(1)).norm() < 1e-9);
            prop_assert!((c - rot.column(2)).norm() < 1e-9);
        }

        #[test]
        fn orthonormalize_output_is_orthonormal(
            a in prop::array::uniform3(-10.0f64..10.0),
            b in prop::array::uniform3(-10.0f64..10.0),
            c in prop::array::uniform3(-10.0f64..10.0),
        ) {
            let (a, b, c) = (Vec3::from(a), Vec3::from(b), Vec3::from(c));
            prop_assume!(a.cross(&b).dot(&c).abs() > 1e-1);
            let (x, y, z) = orthonormalize3(&a, &b, &c).unwrap();
            prop_assert!((x.norm() - 1.0).abs() < 1e-9);
            prop_assert!((y.norm() - 1.0).abs() < 1e-9);
            prop_assert!((z.norm() - 1.0).abs() < 1e-9);
            prop_assert!(x.dot(&y).abs() < 1e-9);
            prop_assert!(x.dot(&z).abs() < 1e-9);
            prop_assert!(y.dot(&z).abs() < 1e-9);
        }
    }
}
