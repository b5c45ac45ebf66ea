//! Align a selection of objects to the view.
//!
//! One object of the selection (the parent) is re-oriented relative to the
//! camera; every other object keeps its pose relative to the parent.

use meshproj_math::{Mat3, Transform};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::axis::{
    align_rotation_matrix, axis_align_rotation_matrix, rot_xy_plane_base_x, rot_xy_plane_base_y,
};
use crate::{largest_object, AlignError, Camera, LargestBy, ParentRule, Result, SceneObject};

/// Which parent axis ends up facing the camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignMode {
    /// Z faces the camera; X keeps its on-screen angle.
    Z,
    /// Y faces the camera; X keeps its on-screen angle.
    Y,
    /// X faces the camera; Y keeps its on-screen angle.
    X,
    /// Every axis snaps to the closest camera axis.
    AxisAligned,
    /// Only the axis closest to the view direction snaps to it.
    #[default]
    Closest,
}

/// Align-to-view options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignSettings {
    /// Rotation rule for the parent.
    pub mode: AlignMode,
    /// How the parent is chosen.
    pub parent: ParentRule,
    /// Drop the active object from the selection (it is usually the
    /// projection target).
    pub exclude_active: bool,
}

/// World-space rotation of an object with rotation `mesh_rot` after
/// aligning it to `camera` with `mode`.
pub fn view_rotation(mode: AlignMode, mesh_rot: &Mat3, camera: &Camera) -> Mat3 {
    let cam = &camera.rotation;
    match mode {
        AlignMode::Z => cam * rot_xy_plane_base_x(mesh_rot, cam),
        AlignMode::Y => {
            let up = Transform::rotation_x(std::f64::consts::FRAC_PI_2).linear();
            cam * rot_xy_plane_base_x(mesh_rot, cam) * up
        }
        AlignMode::X => {
            let up = Transform::rotation_y(-std::f64::consts::FRAC_PI_2).linear();
            cam * rot_xy_plane_base_y(mesh_rot, cam) * up
        }
        AlignMode::AxisAligned => {
            cam * axis_align_rotation_matrix(&(camera.inverse_rotation() * mesh_rot))
        }
        AlignMode::Closest => cam * align_rotation_matrix(&(camera.inverse_rotation() * mesh_rot)),
    }
}

/// New world transforms for an aligned selection.
#[derive(Debug, Clone)]
pub struct AlignPlan {
    /// Index of the parent object in the input slice.
    pub parent: usize,
    /// `(object index, new world transform)`, parent included.
    pub transforms: Vec<(usize, Transform)>,
}

impl AlignPlan {
    /// New world transform of the object at `index`, if it was aligned.
    pub fn transform_for(&self, index: usize) -> Option<&Transform> {
        self.transforms
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, t)| t)
    }
}

/// Align-to-view operation.
#[derive(Debug, Clone, Default)]
pub struct AlignSelection {
    /// Options for this run.
    pub settings: AlignSettings,
}

impl AlignSelection {
    /// Create the operation with `settings`.
    pub fn new(settings: AlignSettings) -> Self {
        Self { settings }
    }

    /// Compute aligned world transforms for `objects`.
    ///
    /// `active` indexes the host's active object within `objects`, if any.
    pub fn apply<O: SceneObject>(
        &self,
        objects: &[O],
        active: Option<usize>,
        camera: &Camera,
    ) -> Result<AlignPlan> {
        let excluded = active.filter(|_| self.settings.exclude_active);
        let candidates: Vec<usize> = (0..objects.len())
            .filter(|&i| Some(i) != excluded)
            .collect();
        if candidates.is_empty() {
            return Err(AlignError::EmptySelection);
        }

        let parent = self
            .find_parent(objects, &candidates, active)
            .ok_or(AlignError::EmptySelection)?;
        let parent_object = &objects[parent];
        let old_parent = parent_object.world_transform();
        let parent_inv = old_parent
            .inverse()
            .ok_or_else(|| AlignError::SingularTransform(parent_object.name().to_string()))?;
        let new_parent = self.parent_orientation(&old_parent, camera);

        info!(
            parent = parent_object.name(),
            mode = ?self.settings.mode,
            objects = candidates.len(),
            "aligning selection to view"
        );

        let relative = new_parent.then(&parent_inv);
        let transforms = candidates
            .iter()
            .map(|&i| {
                let transform = if i == parent {
                    new_parent.clone()
                } else {
                    debug!(object = objects[i].name(), "following parent");
                    relative.then(&objects[i].world_transform())
                };
                (i, transform)
            })
            .collect();

        Ok(AlignPlan { parent, transforms })
    }

    /// Aligned world transform `T(loc) * (R' * S)` of a parent transform.
    pub fn parent_orientation(&self, world: &Transform, camera: &Camera) -> Transform {
        let (location, rotation, scale) = world.decompose();
        let rotation = view_rotation(self.settings.mode, &rotation, camera);
        Transform::from_parts(&location, &rotation, &scale)
    }

    fn find_parent<O: SceneObject>(
        &self,
        objects: &[O],
        candidates: &[usize],
        active: Option<usize>,
    ) -> Option<usize> {
        let largest = |by| {
            let subset: Vec<&O> = candidates.iter().map(|&i| &objects[i]).collect();
            largest_object(&subset, by).map(|k| candidates[k])
        };
        match self.settings.parent {
            ParentRule::VertexCount => largest(LargestBy::VertexCount),
            ParentRule::Volume => largest(LargestBy::Volume),
            ParentRule::Active => match active {
                Some(i) if candidates.contains(&i) => Some(i),
                _ => largest(LargestBy::Volume),
            },
        }
    }
}

impl<O: SceneObject> SceneObject for &O {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn world_transform(&self) -> Transform {
        (**self).world_transform()
    }
    fn vertex_count(&self) -> usize {
        (**self).vertex_count()
    }
    fn bound_box_volume(&self) -> f64 {
        (**self).bound_box_volume()
    }
}
