//! Reflecting transforms and geometry across a plane.

use meshproj_math::{Plane, Point3, Transform};

/// World transform of an object mirrored across `plane`.
pub fn mirror_transform(plane: &Plane, world: &Transform) -> Transform {
    plane.reflection().then(world)
}

/// Reflect points across `plane` in place.
pub fn mirror_points(plane: &Plane, points: &mut [Point3]) {
    let reflection = plane.reflection();
    for p in points.iter_mut() {
        *p = reflection.apply_point(p);
    }
}

/// Reverse the corner order of every polygon, keeping the first corner.
///
/// Applied after a reflection so face normals keep pointing outward.
pub fn reverse_winding(faces: &mut [Vec<u32>]) {
    for face in faces.iter_mut() {
        if face.len() > 2 {
            face[1..].reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meshproj_math::Vec3;

    #[test]
    fn test_mirror_transform() {
        let plane = Plane::new(Vec3::x(), &Point3::origin());
        let world = Transform::translation(2.0, 1.0, 0.0);
        let mirrored = mirror_transform(&plane, &world);
        assert_relative_eq!(
            mirrored.apply_point(&Point3::origin()),
            Point3::new(-2.0, 1.0, 0.0),
            epsilon = 1e-12
        );
        assert!(mirrored.flips_handedness());
    }

    #[test]
    fn test_mirror_points() {
        let plane = Plane::new(Vec3::z(), &Point3::new(0.0, 0.0, 1.0));
        let mut points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 4.0, 3.0)];
        mirror_points(&plane, &mut points);
        assert_relative_eq!(points[0], Point3::new(0.0, 0.0, 2.0), epsilon = 1e-12);
        assert_relative_eq!(points[1], Point3::new(3.0, 4.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_reverse_winding() {
        let mut faces = vec![vec![0, 1, 2, 3], vec![4, 5, 6]];
        reverse_winding(&mut faces);
        assert_eq!(faces, vec![vec![0, 3, 2, 1], vec![4, 6, 5]]);
    }
}
