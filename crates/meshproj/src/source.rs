//! Source meshes and the host mesh capability.

use meshproj_align::mirror::{mirror_points, mirror_transform, reverse_winding};
use meshproj_align::SceneObject;
use meshproj_math::{min_max, Plane, Point3, Transform};
use meshproj_raytrace::{MeshError, TriangleMesh};

/// Host mesh access used by the projection engine.
///
/// Positions are local to the object; [`SceneObject::world_transform`] maps
/// them into world space.
pub trait MeshHandle: SceneObject {
    /// Local vertex positions.
    fn positions(&self) -> &[Point3];

    /// Polygons as vertex index loops.
    fn faces(&self) -> &[Vec<u32>];

    /// Vertices sharing an edge with `vertex`, in edge order.
    fn neighbors(&self, vertex: usize) -> &[usize];

    /// Replace vertex positions with world-space positions.
    fn set_world_positions(&mut self, positions: &[Point3]);

    /// Mark vertices as selected (diagnostic output).
    fn select_vertices(&mut self, vertices: &[usize]);

    /// Vertex positions in world space.
    fn world_positions(&self) -> Vec<Point3> {
        let world = self.world_transform();
        self.positions()
            .iter()
            .map(|p| world.apply_point(p))
            .collect()
    }

    /// Fan-triangulated surface in world space. A mirroring world
    /// transform rewinds the triangles so normals keep facing outward.
    fn world_triangles(&self) -> Result<TriangleMesh, MeshError> {
        let local = TriangleMesh::from_polygons(self.positions().to_vec(), self.faces())?;
        Ok(local.transformed(&self.world_transform()))
    }
}

/// A mesh object owned by the caller: the in-memory [`MeshHandle`].
#[derive(Debug, Clone)]
pub struct SourceMesh {
    name: String,
    transform: Transform,
    positions: Vec<Point3>,
    faces: Vec<Vec<u32>>,
    adjacency: Vec<Vec<usize>>,
    selected: Vec<bool>,
}

impl SourceMesh {
    /// Create a mesh object. Faces must only reference existing vertices.
    pub fn new(
        name: impl Into<String>,
        transform: Transform,
        positions: Vec<Point3>,
        faces: Vec<Vec<u32>>,
    ) -> Result<Self, MeshError> {
        let count = positions.len();
        for (face, poly) in faces.iter().enumerate() {
            if let Some(&index) = poly.iter().find(|&&i| i as usize >= count) {
                return Err(MeshError::IndexOutOfRange { face, index, count });
            }
        }
        let adjacency = build_adjacency(count, &faces);
        Ok(Self {
            name: name.into(),
            transform,
            selected: vec![false; count],
            positions,
            faces,
            adjacency,
        })
    }

    /// Set the local-to-world transform.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Per-vertex selection flags.
    pub fn selected(&self) -> &[bool] {
        &self.selected
    }

    /// Local bounding box corners, `None` for a mesh without vertices.
    pub fn local_bounds(&self) -> Option<(Point3, Point3)> {
        min_max(&self.positions)
    }

    /// Reflect the geometry across a world-space `plane`.
    ///
    /// Winding is reversed so faces keep pointing outward.
    pub fn mirror(&mut self, plane: &Plane) {
        let mut world = self.world_positions();
        mirror_points(plane, &mut world);
        self.set_world_positions(&world);
        reverse_winding(&mut self.faces);
        self.adjacency = build_adjacency(self.positions.len(), &self.faces);
    }

    /// Reflect the object across a world-space `plane` by changing only its
    /// transform. Local geometry and winding are left alone.
    pub fn mirror_transform(&mut self, plane: &Plane) {
        self.transform = mirror_transform(plane, &self.transform);
    }
}

/// Vertex neighbors in the order their edges are first met.
fn build_adjacency(vertex_count: usize, faces: &[Vec<u32>]) -> Vec<Vec<usize>> {
    let mut adjacency = vec![Vec::new(); vertex_count];
    let mut link = |a: usize, b: usize| {
        if a != b && !adjacency[a].contains(&b) {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
    };
    for face in faces {
        for (k, &a) in face.iter().enumerate() {
            let b = face[(k + 1) % face.len()];
            link(a as usize, b as usize);
        }
    }
    adjacency
}

impl SceneObject for SourceMesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn world_transform(&self) -> Transform {
        self.transform.clone()
    }

    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Local box extents times the absolute world scale per axis.
    fn bound_box_volume(&self) -> f64 {
        let Some((lo, hi)) = self.local_bounds() else {
            return 0.0;
        };
        let (_, _, scale) = self.transform.decompose();
        (hi - lo).component_mul(&scale).abs().product()
    }
}

impl MeshHandle for SourceMesh {
    fn positions(&self) -> &[Point3] {
        &self.positions
    }

    fn faces(&self) -> &[Vec<u32>] {
        &self.faces
    }

    fn neighbors(&self, vertex: usize) -> &[usize] {
        self.adjacency.get(vertex).map_or(&[][..], Vec::as_slice)
    }

    /// Stored back through the inverse world transform. A singular
    /// transform is reset to identity and the positions kept as given.
    fn set_world_positions(&mut self, positions: &[Point3]) {
        match self.transform.inverse() {
            Some(inv) => {
                self.positions = positions.iter().map(|p| inv.apply_point(p)).collect();
            }
            None => {
                self.transform = Transform::identity();
                self.positions = positions.to_vec();
            }
        }
    }

    fn select_vertices(&mut self, vertices: &[usize]) {
        for &v in vertices {
            if let Some(flag) = self.selected.get_mut(v) {
                *flag = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meshproj_math::Vec3;

    fn quad(transform: Transform) -> SourceMesh {
        SourceMesh::new(
            "quad",
            transform,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 1.0, 0.5),
                Point3::new(0.0, 1.0, 0.5),
            ],
            vec![vec![0, 1, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_adjacency_edge_order() {
        let mesh = quad(Transform::identity());
        assert_eq!(mesh.neighbors(0), &[1, 3]);
        assert_eq!(mesh.neighbors(2), &[1, 3]);
        assert!(mesh.neighbors(9).is_empty());
    }

    #[test]
    fn test_invalid_face() {
        let err = SourceMesh::new("bad", Transform::identity(), vec![], vec![vec![0, 1, 2]])
            .unwrap_err();
        assert!(matches!(err, MeshError::IndexOutOfRange { face: 0, .. }));
    }

    #[test]
    fn test_bound_box_volume_uses_world_scale() {
        let mesh = quad(Transform::scale(-2.0, 3.0, 1.0));
        assert!((mesh.bound_box_volume() - 2.0 * 1.0 * 0.5 * 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_set_world_positions_roundtrip() {
        let mut mesh = quad(Transform::translation(1.0, 0.0, 0.0));
        let mut world = mesh.world_positions();
        world[0].z = 4.0;
        mesh.set_world_positions(&world);
        assert_relative_eq!(mesh.positions()[0], Point3::new(0.0, 0.0, 4.0), epsilon = 1e-12);
        assert_relative_eq!(mesh.world_positions()[0], Point3::new(1.0, 0.0, 4.0), epsilon = 1e-12);
    }

    #[test]
    fn test_mirror_reverses_winding() {
        let mut mesh = quad(Transform::identity());
        let before = mesh.world_triangles().unwrap().triangle(0).unwrap().normal;
        mesh.mirror(&Plane::new(Vec3::x(), &Point3::new(-1.0, 0.0, 0.0)));
        assert_relative_eq!(mesh.positions()[1], Point3::new(-4.0, 0.0, 0.0), epsilon = 1e-12);
        assert_eq!(mesh.faces()[0], vec![0, 3, 2, 1]);

        // Outward normal mirrored, not inverted
        let after = mesh.world_triangles().unwrap().triangle(0).unwrap().normal;
        assert_relative_eq!(after.x, -before.x, epsilon = 1e-12);
        assert_relative_eq!(after.z, before.z, epsilon = 1e-12);
    }

    #[test]
    fn test_mirror_transform_matches_baked_mirror() {
        let plane = Plane::new(Vec3::x(), &Point3::new(-1.0, 0.0, 0.0));
        let mut baked = quad(Transform::translation(0.0, 2.0, 0.0));
        let mut moved = baked.clone();
        baked.mirror(&plane);
        moved.mirror_transform(&plane);

        assert!(moved.world_transform().flips_handedness());
        assert_eq!(moved.faces()[0], vec![0, 1, 2, 3]);
        for (a, b) in moved.world_positions().iter().zip(baked.world_positions()) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }

        // Same outward normal whether the reflection is baked or not
        let a = moved.world_triangles().unwrap();
        let b = baked.world_triangles().unwrap();
        let (na, nb) = (a.triangle(0).unwrap().normal, b.triangle(0).unwrap().normal);
        assert_relative_eq!(na.into_inner(), nb.into_inner(), epsilon = 1e-12);
    }

    #[test]
    fn test_select_vertices() {
        let mut mesh = quad(Transform::identity());
        mesh.select_vertices(&[1, 3, 42]);
        assert_eq!(mesh.selected(), &[false, true, false, true]);
    }
}
