//! JSON scene files.

use anyhow::{bail, Context, Result};
use meshproj::{MeshHandle, SourceMesh};
use meshproj_align::{Camera, SceneObject};
use meshproj_math::{Mat3, Point3, Transform};
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

/// A scene: objects, the active object and the viewing camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Viewport the operation runs from.
    pub camera: CameraData,
    /// Name of the active object (the projection target).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
    /// Mesh objects.
    pub objects: Vec<ObjectData>,
}

/// 3D view state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraData {
    /// View rotation, row-major; columns are right, up and backward.
    pub rotation: [[f64; 3]; 3],
    /// Orbit pivot.
    pub location: [f64; 3],
    /// Eye distance from the pivot along the backward axis.
    #[serde(default)]
    pub distance: f64,
    /// Parallel projection.
    #[serde(default)]
    pub orthographic: bool,
}

/// One mesh object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectData {
    /// Unique name.
    pub name: String,
    /// Local-to-world matrix, row-major. Identity when absent.
    #[serde(default = "identity_rows")]
    pub transform: [[f64; 4]; 4],
    /// Local vertex positions.
    pub vertices: Vec<[f64; 3]>,
    /// Polygons as vertex index loops.
    #[serde(default)]
    pub faces: Vec<Vec<u32>>,
    /// Selected vertex indices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected: Vec<usize>,
}

fn identity_rows() -> [[f64; 4]; 4] {
    let mut rows = [[0.0; 4]; 4];
    for (i, row) in rows.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    rows
}

impl Scene {
    /// Parse a scene from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid scene JSON")
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Camera described by the scene.
    pub fn camera(&self) -> Camera {
        let c = &self.camera;
        let rotation = Mat3::from_row_slice(&c.rotation.concat());
        Camera::from_view(rotation, Point3::from(c.location), c.distance, c.orthographic)
    }

    /// Index of the active object, if it names one.
    pub fn active_index(&self) -> Result<Option<usize>> {
        let Some(name) = &self.active else {
            return Ok(None);
        };
        match self.objects.iter().position(|o| &o.name == name) {
            Some(index) => Ok(Some(index)),
            None => bail!("active object {name} not found"),
        }
    }

    /// Build in-memory meshes for every object.
    pub fn meshes(&self) -> Result<Vec<SourceMesh>> {
        self.objects.iter().map(ObjectData::to_mesh).collect()
    }

    /// Write meshes back into the scene objects, matched by position.
    pub fn update_from(&mut self, meshes: &[SourceMesh]) {
        for (object, mesh) in self.objects.iter_mut().zip(meshes) {
            *object = ObjectData::from_mesh(mesh);
        }
    }
}

impl ObjectData {
    /// Convert into a [`SourceMesh`].
    pub fn to_mesh(&self) -> Result<SourceMesh> {
        let transform = Transform::from_matrix(Matrix4::from_row_slice(&self.transform.concat()));
        let positions = self.vertices.iter().map(|&v| Point3::from(v)).collect();
        let mut mesh = SourceMesh::new(self.name.clone(), transform, positions, self.faces.clone())
            .with_context(|| format!("object {}", self.name))?;
        mesh.select_vertices(&self.selected);
        Ok(mesh)
    }

    /// Snapshot of a [`SourceMesh`].
    pub fn from_mesh(mesh: &SourceMesh) -> Self {
        let m = mesh.world_transform().matrix;
        let mut transform = [[0.0; 4]; 4];
        for (r, row) in transform.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = m[(r, c)];
            }
        }
        Self {
            name: mesh.name().to_string(),
            transform,
            vertices: mesh.positions().iter().map(|p| [p.x, p.y, p.z]).collect(),
            faces: mesh.faces().to_vec(),
            selected: mesh
                .selected()
                .iter()
                .enumerate()
                .filter(|(_, s)| **s)
                .map(|(i, _)| i)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SCENE: &str = r#"{
        "camera": {
            "rotation": [[1, 0, 0], [0, 1, 0], [0, 0, 1]],
            "location": [0, 0, 0],
            "distance": 10,
            "orthographic": true
        },
        "active": "floor",
        "objects": [
            {
                "name": "floor",
                "vertices": [[-2, -2, 0], [2, -2, 0], [2, 2, 0], [-2, 2, 0]],
                "faces": [[0, 1, 2, 3]]
            },
            {
                "name": "decal",
                "transform": [[1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 1, 3], [0, 0, 0, 1]],
                "vertices": [[0, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 0]],
                "faces": [[0, 1, 2, 3]]
            }
        ]
    }"#;

    #[test]
    fn test_parse_scene() {
        let scene = Scene::from_json(SCENE).unwrap();
        assert_eq!(scene.active_index().unwrap(), Some(0));
        let camera = scene.camera();
        assert_relative_eq!(camera.position, Point3::new(0.0, 0.0, 10.0));

        let meshes = scene.meshes().unwrap();
        let world = meshes[1].world_positions();
        assert_relative_eq!(world[2], Point3::new(1.0, 1.0, 3.0));
    }

    #[test]
    fn test_roundtrip_keeps_transform_and_selection() {
        let mut scene = Scene::from_json(SCENE).unwrap();
        let mut meshes = scene.meshes().unwrap();
        meshes[1].select_vertices(&[3]);
        scene.update_from(&meshes);
        assert_eq!(scene.objects[1].transform[2][3], 3.0);
        assert_eq!(scene.objects[1].selected, vec![3]);
        assert!(scene.objects[0].selected.is_empty());
    }

    #[test]
    fn test_local_plane_mirrors_transform() {
        let mut scene = Scene::from_json(SCENE).unwrap();
        let mut meshes = scene.meshes().unwrap();
        // x = 0 in the decal's own space is the world plane x = 0 here
        let local = meshproj_math::Plane::new(meshproj_math::Vec3::x(), &Point3::origin());
        let plane = local.transformed(&meshes[1].world_transform());
        meshes[1].mirror_transform(&plane);
        scene.update_from(&meshes);

        assert_eq!(scene.objects[1].transform[0][0], -1.0);
        assert_eq!(scene.objects[1].transform[2][3], 3.0);
        assert_eq!(scene.objects[1].vertices[1], [1.0, 0.0, 0.0]);
        let world = scene.meshes().unwrap()[1].world_positions();
        assert_relative_eq!(world[1], Point3::new(-1.0, 0.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_active() {
        let mut scene = Scene::from_json(SCENE).unwrap();
        scene.active = Some("missing".into());
        assert!(scene.active_index().is_err());
    }
}
