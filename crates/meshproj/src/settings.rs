//! Projection settings.

use meshproj_align::LargestBy;
use serde::{Deserialize, Serialize};

use crate::{ProjectionError, Result};

/// Smallest accepted intersection bias.
pub const MIN_BIAS: f64 = 0.0001;
/// Largest accepted intersection bias.
pub const MAX_BIAS: f64 = 1.0;

/// Axis measuring how far behind the surface each vertex lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthAxis {
    /// Parent object's local X.
    LocalX,
    /// Parent object's local Y.
    LocalY,
    /// Parent object's local Z.
    LocalZ,
    /// The camera's viewing direction.
    #[default]
    CameraForward,
    /// Parent axis most parallel to the view.
    ClosestToCamera,
}

/// Re-orientation applied to each source before projecting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionAlignment {
    /// The axis closest to the view is turned to face the camera.
    #[default]
    AxisAligned,
    /// Project with the world transform unchanged.
    AsIs,
    /// Z is turned to face the camera.
    ZIsUp,
}

/// Settings for one projection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    /// Source re-orientation before casting.
    pub alignment: ProjectionAlignment,
    /// Axis used for relative depth.
    pub depth_axis: DepthAxis,
    /// How the parent object defining local depth axes is chosen.
    pub largest_by: LargestBy,
    /// Move the result toward (positive) or away from the camera.
    pub depth_offset: f64,
    /// Tolerance for intersection and parallel tests, in `[0.0001, 1]`.
    pub bias: f64,
    /// Emit info reports with stage timings.
    pub report_timing: bool,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            alignment: ProjectionAlignment::default(),
            depth_axis: DepthAxis::default(),
            largest_by: LargestBy::Volume,
            depth_offset: 0.0,
            bias: MIN_BIAS,
            report_timing: false,
        }
    }
}

impl ProjectionSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.depth_offset.is_finite() {
            return Err(ProjectionError::InvalidSettings(
                "depth_offset must be finite".into(),
            ));
        }
        if !(MIN_BIAS..=MAX_BIAS).contains(&self.bias) {
            return Err(ProjectionError::InvalidSettings(format!(
                "bias must be between {MIN_BIAS} and {MAX_BIAS}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let settings = ProjectionSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.bias, 0.0001);
    }

    #[test]
    fn test_validate_rejects_bias_and_offset() {
        let mut settings = ProjectionSettings {
            bias: 0.00001,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ProjectionError::InvalidSettings(_))
        ));
        settings.bias = 1.5;
        assert!(settings.validate().is_err());
        settings.bias = 1.0;
        settings.depth_offset = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let settings: ProjectionSettings = toml::from_str(
            r#"
            depth_axis = "closest_to_camera"
            alignment = "as_is"
            depth_offset = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(settings.depth_axis, DepthAxis::ClosestToCamera);
        assert_eq!(settings.alignment, ProjectionAlignment::AsIs);
        assert_eq!(settings.largest_by, LargestBy::Volume);
        assert_eq!(settings.bias, MIN_BIAS);
    }
}
