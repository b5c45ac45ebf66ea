//! Depth axis resolution.

use meshproj_align::Camera;
use meshproj_math::{Mat3, Vec3};

use crate::DepthAxis;

/// World-space depth axis for `axis`, given the parent object's rotation.
///
/// The result always points away from the camera, so larger values of
/// `axis · p` lie further behind the surface.
pub fn resolve_depth_axis(axis: DepthAxis, parent_rotation: &Mat3, camera: &Camera) -> Vec3 {
    let column = |i: usize| parent_rotation.column(i).into_owned();
    let forward = camera.forward();
    let chosen = match axis {
        DepthAxis::LocalX => column(0),
        DepthAxis::LocalY => column(1),
        DepthAxis::LocalZ => column(2),
        DepthAxis::CameraForward => forward,
        DepthAxis::ClosestToCamera => column(closest_axis(parent_rotation, &camera.backward())),
    };
    if chosen.dot(&forward) < 0.0 {
        -chosen
    } else {
        chosen
    }
}

/// Column of `rotation` with the largest `|dot|` against `direction`.
/// Ties resolve to the lower axis.
fn closest_axis(rotation: &Mat3, direction: &Vec3) -> usize {
    (0..3).fold(0, |best, i| {
        let d = rotation.column(i).dot(direction).abs();
        if d > rotation.column(best).dot(direction).abs() {
            i
        } else {
            best
        }
    })
}
