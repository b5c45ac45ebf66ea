//! Snapping rotation matrices to canonical axes.
//!
//! Matrices here are 3x3 rotations whose columns are an object's local X, Y
//! and Z axes. The solvers expect the rotation to already be expressed in
//! camera space, so "Z" means the axis pointing at the viewer.

use meshproj_math::{orthonormalize3, sign, Mat3, Plane, Point3, Vec3};

/// Snap priority when the column is the X axis.
const PRIORITY_X: [usize; 3] = [0, 1, 2];
/// Snap priority when the column is the Y axis.
const PRIORITY_Y: [usize; 3] = [1, 2, 0];
/// Snap priority when the column is the Z axis.
const PRIORITY_Z: [usize; 3] = [2, 0, 1];

/// `|c0 · c1|` at or above this means both columns snapped to the same axis.
const DUPLICATE_AXIS_DOT: f64 = 0.9999;

/// Snap `v` to the canonical axis holding its largest absolute component.
///
/// Ties go to the axis listed first in `priority`. The axis `exclude`, if
/// any, is never chosen. Returns the chosen axis index and the signed unit
/// vector. A zero component snaps to the positive axis so the result is
/// always unit length.
pub fn snap_to_axis(v: &Vec3, priority: [usize; 3], exclude: Option<usize>) -> (usize, Vec3) {
    let mut best: Option<usize> = None;
    for &axis in &priority {
        if Some(axis) == exclude {
            continue;
        }
        match best {
            Some(b) if v[axis].abs() <= v[b].abs() => {}
            _ => best = Some(axis),
        }
    }
    // At most one axis is excluded, so at least two candidates remain
    let axis = best.unwrap_or(priority[0]);

    let mut snapped = Vec3::zeros();
    snapped[axis] = if v[axis] < 0.0 { -1.0 } else { 1.0 };
    (axis, snapped)
}

/// Align every column of `rot` to its closest canonical axis.
///
/// X snaps first (priority X, Y, Z), then Y (priority Y, Z, X), and Z is
/// their cross product. When X and Y land on the same axis the original Z
/// column is snapped instead (priority Z, X, Y, never onto X's axis) and Y
/// is rebuilt as `Z x X`. The result is always orthonormal and
/// right-handed.
pub fn axis_align_rotation_matrix(rot: &Mat3) -> Mat3 {
    let (x_axis, c0) = snap_to_axis(&rot.column(0).into_owned(), PRIORITY_X, None);
    let (_, mut c1) = snap_to_axis(&rot.column(1).into_owned(), PRIORITY_Y, None);

    let c2 = if c0.dot(&c1).abs() < DUPLICATE_AXIS_DOT {
        c0.cross(&c1)
    } else {
        let (_, c2) = snap_to_axis(&rot.column(2).into_owned(), PRIORITY_Z, Some(x_axis));
        c1 = c2.cross(&c0);
        c2
    };

    Mat3::from_columns(&[c0, c1, c2])
}

/// Align the column most parallel to the depth axis with `(0, 0, ±1)`.
///
/// The column with the largest `|z|` (Z beats Y beats X only on a strict
/// inequality, so ties favor X) is replaced by the signed depth axis and the
/// remaining columns are Gram-Schmidt orthonormalized against it, keeping
/// their slots. If orthonormalization degenerates the full
/// [`axis_align_rotation_matrix`] is used instead.
pub fn align_rotation_matrix(rot: &Mat3) -> Mat3 {
    let col = |i: usize| rot.column(i).into_owned();
    let (c0, c1, c2) = (col(0), col(1), col(2));
    let depth = |c: &Vec3| Vec3::new(0.0, 0.0, sign(c.z));

    let aligned = if c2.z.abs() > c1.z.abs().max(c0.z.abs()) {
        orthonormalize3(&depth(&c2), &c0, &c1).map(|(z, x, y)| [x, y, z])
    } else if c1.z.abs() > c0.z.abs() {
        orthonormalize3(&depth(&c1), &c0, &c2).map(|(y, x, z)| [x, y, z])
    } else {
        orthonormalize3(&depth(&c0), &c1, &c2).map(|(x, y, z)| [x, y, z])
    };

    match aligned {
        Some(columns) => Mat3::from_columns(&columns),
        None => {
            tracing::debug!("depth alignment degenerate, snapping all axes");
            axis_align_rotation_matrix(rot)
        }
    }
}

/// Angle of `axis` projected onto the camera XY plane, measured from the
/// camera right axis. `None` if `axis` is parallel to the camera depth axis.
fn view_plane_angle(axis: &Vec3, cam_rot: &Mat3) -> Option<f64> {
    let view_plane = Plane::new(cam_rot.column(2).into_owned(), &Point3::origin());
    let projected = view_plane
        .project(&Point3::from(*axis))
        .coords
        .try_normalize(f64::EPSILON)?;
    let x = projected.dot(&cam_rot.column(0));
    let y = projected.dot(&cam_rot.column(1));
    Some(y.atan2(x))
}

/// Camera-space rotation about Z that turns camera X onto the mesh X axis
/// as seen from the view.
pub fn rot_xy_plane_base_x(mesh_rot: &Mat3, cam_rot: &Mat3) -> Mat3 {
    let angle = view_plane_angle(&mesh_rot.column(0).into_owned(), cam_rot).unwrap_or(0.0);
    z_rotation(angle)
}

/// Camera-space rotation about Z that turns camera Y onto the mesh Y axis
/// as seen from the view.
pub fn rot_xy_plane_base_y(mesh_rot: &Mat3, cam_rot: &Mat3) -> Mat3 {
    let angle = view_plane_angle(&mesh_rot.column(1).into_owned(), cam_rot)
        .map_or(0.0, |a| a - std::f64::consts::FRAC_PI_2);
    z_rotation(angle)
}

fn z_rotation(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}
