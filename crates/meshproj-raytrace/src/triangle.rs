//! Triangles and the indexed triangle mesh a target surface is made of.

use meshproj_math::{Dir3, Point3, Transform, Vec3};

use crate::{Aabb3, MeshError, Ray, RayHit, SurfaceQuery};

/// A triangle with its precomputed face normal.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    /// Vertex positions in winding order.
    pub v: [Point3; 3],
    /// Face normal, `(v1 - v0) x (v2 - v0)` normalized.
    pub normal: Dir3,
}

impl Triangle {
    /// Build a triangle, `None` if it has (near) zero area.
    pub fn new(v0: Point3, v1: Point3, v2: Point3) -> Option<Self> {
        let n = (v1 - v0).cross(&(v2 - v0));
        let normal = Dir3::try_new(n, 1e-12)?;
        Some(Self {
            v: [v0, v1, v2],
            normal,
        })
    }

    /// Bounding box of the three corners.
    pub fn aabb(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for p in &self.v {
            aabb.include_point(p);
        }
        aabb
    }

    /// Moller-Trumbore intersection.
    ///
    /// `epsilon` is a distance: hits up to `epsilon` outside an edge still
    /// count, so rays grazing a shared edge register on one side. Each
    /// barycentric weight may undershoot zero by `epsilon` over the height
    /// of its corner. Hits behind the origin are rejected.
    pub fn intersect(&self, ray: &Ray, epsilon: f64) -> Option<f64> {
        let e1 = self.v[1] - self.v[0];
        let e2 = self.v[2] - self.v[0];
        let dir = ray.direction.as_ref();

        let p = dir.cross(&e2);
        let det = e1.dot(&p);
        // Ray parallel to the triangle plane
        if det.abs() < 1e-14 {
            return None;
        }
        let inv_det = 1.0 / det;

        // Corner height is twice the area over the opposite edge
        let twice_area = e1.cross(&e2).norm();
        let slack = |opposite: Vec3| epsilon * opposite.norm() / twice_area;

        let s = ray.origin - self.v[0];
        let u = s.dot(&p) * inv_det;
        if u < -slack(e2) {
            return None;
        }

        let q = s.cross(&e1);
        let v = dir.dot(&q) * inv_det;
        if v < -slack(e1) || 1.0 - u - v < -slack(e2 - e1) {
            return None;
        }

        let t = e2.dot(&q) * inv_det;
        (t >= 0.0).then_some(t)
    }
}

/// Indexed triangle mesh in world space.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub positions: Vec<Point3>,
    /// Triangle corner indices into `positions`.
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Create a mesh from positions and triangle indices.
    pub fn new(positions: Vec<Point3>, indices: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        let count = positions.len();
        for (face, tri) in indices.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= count) {
                return Err(MeshError::IndexOutOfRange { face, index, count });
            }
        }
        Ok(Self { positions, indices })
    }

    /// Create a mesh from arbitrary polygons by fan triangulation.
    pub fn from_polygons(positions: Vec<Point3>, faces: &[Vec<u32>]) -> Result<Self, MeshError> {
        let mut indices = Vec::with_capacity(faces.len());
        for (face, poly) in faces.iter().enumerate() {
            if poly.len() < 3 {
                return Err(MeshError::DegenerateFace(face));
            }
            for k in 1..poly.len() - 1 {
                indices.push([poly[0], poly[k], poly[k + 1]]);
            }
        }
        Self::new(positions, indices)
    }

    /// Copy of this mesh with every position mapped through `transform`.
    ///
    /// Winding is reversed when the transform mirrors space so face normals
    /// keep pointing outward.
    pub fn transformed(&self, transform: &Transform) -> Self {
        let positions = self
            .positions
            .iter()
            .map(|p| transform.apply_point(p))
            .collect();
        let indices = if transform.flips_handedness() {
            self.indices.iter().map(|&[a, b, c]| [a, c, b]).collect()
        } else {
            self.indices.clone()
        };
        Self { positions, indices }
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The triangle at `index`, `None` if degenerate.
    pub fn triangle(&self, index: usize) -> Option<Triangle> {
        let [a, b, c] = self.indices[index];
        Triangle::new(
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        )
    }

    /// Iterate over non-degenerate triangles with their indices.
    pub fn triangles(&self) -> impl Iterator<Item = (usize, Triangle)> + '_ {
        (0..self.len()).filter_map(|i| self.triangle(i).map(|tri| (i, tri)))
    }
}

/// Brute-force closest hit over every triangle. Reference for [`crate::Bvh`].
impl SurfaceQuery for TriangleMesh {
    fn ray_cast(&self, ray: &Ray, max_distance: f64) -> Option<RayHit> {
        let mut closest: Option<RayHit> = None;
        for (index, tri) in self.triangles() {
            let Some(t) = tri.intersect(ray, 0.0) else {
                continue;
            };
            if t <= max_distance && closest.map_or(true, |c| t < c.t) {
                closest = Some(RayHit {
                    t,
                    point: ray.at(t),
                    normal: tri.normal,
                    triangle: index,
                });
            }
        }
        closest
    }
}
