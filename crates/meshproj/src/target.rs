//! Target surface construction.

use meshproj_raytrace::Bvh;
use tracing::debug;

use crate::{MeshHandle, ProjectionError, Result};

/// Build the ray-query structure over `target` in world space.
///
/// Fails when the target has no non-degenerate triangle. `bias` pads the
/// hierarchy and widens every triangle slightly so rays grazing shared
/// edges are not lost.
pub fn build_target<M: MeshHandle + ?Sized>(target: &M, bias: f64) -> Result<Bvh> {
    let mesh = target.world_triangles()?;
    let bvh = Bvh::build(&mesh, bias);
    if bvh.triangle_count() == 0 {
        return Err(ProjectionError::TargetNotMesh(target.name().to_string()));
    }
    debug!(
        target = target.name(),
        triangles = bvh.triangle_count(),
        "built target hierarchy"
    );
    Ok(bvh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceMesh;
    use meshproj_math::{Point3, Transform};

    #[test]
    fn test_target_without_faces() {
        let edge = SourceMesh::new(
            "edge",
            Transform::identity(),
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            vec![],
        )
        .unwrap();
        assert_eq!(
            build_target(&edge, 1e-4).unwrap_err(),
            ProjectionError::TargetNotMesh("edge".into())
        );
    }

    #[test]
    fn test_target_in_world_space() {
        let tri = SourceMesh::new(
            "tri",
            Transform::translation(0.0, 0.0, 5.0),
            vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2]],
        )
        .unwrap();
        let bvh = build_target(&tri, 1e-4).unwrap();
        assert_eq!(bvh.triangle_count(), 1);
        let bounds = bvh.bounds().unwrap();
        assert!(bounds.min.z > 4.9 && bounds.max.z < 5.1);
    }
}
