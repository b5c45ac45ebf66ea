//! Viewing camera state.

use meshproj_math::{Mat3, Point3, Vec3};

/// Camera orientation, eye position and projection mode.
///
/// The rotation columns are the camera's right, up and backward axes; the
/// view looks down local -Z.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Right-handed view rotation, columns = right / up / backward.
    pub rotation: Mat3,
    /// Eye position in world space.
    pub position: Point3,
    /// Parallel (orthographic) rays instead of perspective ones.
    pub orthographic: bool,
}

impl Camera {
    /// Camera from explicit orientation and eye position.
    pub fn new(rotation: Mat3, position: Point3, orthographic: bool) -> Self {
        Self {
            rotation,
            position,
            orthographic,
        }
    }

    /// Camera orbiting `view_location` at `view_distance`, as a 3D viewport
    /// describes it. The eye sits `view_distance` behind the pivot along the
    /// backward axis.
    pub fn from_view(
        rotation: Mat3,
        view_location: Point3,
        view_distance: f64,
        orthographic: bool,
    ) -> Self {
        let position = view_location + rotation.column(2) * view_distance;
        Self::new(rotation, position, orthographic)
    }

    /// Camera right axis (world space).
    pub fn right(&self) -> Vec3 {
        self.rotation.column(0).into_owned()
    }

    /// Camera up axis (world space).
    pub fn up(&self) -> Vec3 {
        self.rotation.column(1).into_owned()
    }

    /// Axis pointing from the view toward the viewer.
    pub fn backward(&self) -> Vec3 {
        self.rotation.column(2).into_owned()
    }

    /// Viewing direction.
    pub fn forward(&self) -> Vec3 {
        -self.backward()
    }

    /// World-to-camera rotation (transpose of the orthonormal view rotation).
    pub fn inverse_rotation(&self) -> Mat3 {
        self.rotation.transpose()
    }

    /// Direction of the projection ray through `target`.
    ///
    /// Orthographic cameras cast every ray along [`Camera::forward`];
    /// perspective rays leave the eye toward the target. A target at the
    /// eye itself falls back to the forward axis.
    pub fn ray_direction(&self, target: &Point3) -> Vec3 {
        if self.orthographic {
            return self.forward();
        }
        (target - self.position)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(|| self.forward())
    }
}

impl Default for Camera {
    /// Orthographic top view looking down -Z from the origin.
    fn default() -> Self {
        Self::new(Mat3::identity(), Point3::origin(), true)
    }
}
