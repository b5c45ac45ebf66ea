//! Bounding Volume Hierarchy for accelerated ray casting.
//!
//! Uses Surface Area Heuristic (SAH) for construction.

use meshproj_math::Point3;

use crate::{Aabb3, Ray, RayHit, SurfaceQuery, Triangle, TriangleMesh};

/// Maximum number of triangles stored in a leaf.
const LEAF_SIZE: usize = 4;

/// A BVH node - either a leaf containing triangles or an internal node with children.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Leaf node containing triangle slots.
    Leaf {
        /// Axis-aligned bounding box of this node.
        aabb: Aabb3,
        /// Indices into the BVH's triangle list.
        triangles: Vec<usize>,
    },
    /// Internal node with two children.
    Internal {
        /// Axis-aligned bounding box of this node.
        aabb: Aabb3,
        /// Left child node.
        left: Box<BvhNode>,
        /// Right child node.
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    /// Bounding box of this node.
    pub fn aabb(&self) -> &Aabb3 {
        match self {
            BvhNode::Leaf { aabb, .. } | BvhNode::Internal { aabb, .. } => aabb,
        }
    }
}

/// Per-triangle build record: slot, padded bounds, centroid.
type BuildItem = (usize, Aabb3, Point3);

/// Bounding Volume Hierarchy over a triangle mesh.
///
/// Owns a copy of the triangles it was built from, so the source mesh can be
/// dropped or mutated afterwards.
#[derive(Debug, Clone)]
pub struct Bvh {
    root: Option<BvhNode>,
    /// Non-degenerate triangles paired with their index in the source mesh.
    triangles: Vec<(usize, Triangle)>,
    epsilon: f64,
}

impl Bvh {
    /// Build a BVH from a triangle mesh using SAH construction.
    ///
    /// `epsilon` pads every node box and widens the triangle test, which
    /// keeps rays grazing shared edges from slipping between triangles.
    /// Degenerate triangles are skipped.
    pub fn build(mesh: &TriangleMesh, epsilon: f64) -> Self {
        let triangles: Vec<(usize, Triangle)> = mesh.triangles().collect();

        let mut items: Vec<BuildItem> = triangles
            .iter()
            .enumerate()
            .map(|(slot, (_, tri))| {
                let mut aabb = tri.aabb();
                aabb.expand(epsilon);
                (slot, aabb, aabb.centroid())
            })
            .collect();

        let root = if items.is_empty() {
            None
        } else {
            Some(build_node(&mut items))
        };

        Self {
            root,
            triangles,
            epsilon,
        }
    }

    /// Trace a ray and return only the closest hit within `max_distance`.
    pub fn trace_closest(&self, ray: &Ray, max_distance: f64) -> Option<RayHit> {
        let mut closest: Option<RayHit> = None;
        let mut closest_t = max_distance;

        if let Some(ref root) = self.root {
            self.trace_node_closest(ray, root, &mut closest, &mut closest_t);
        }

        closest
    }

    /// Trace a ray, keeping only the closest hit.
    fn trace_node_closest(
        &self,
        ray: &Ray,
        node: &BvhNode,
        closest: &mut Option<RayHit>,
        closest_t: &mut f64,
    ) {
        let Some((t_min, _)) = ray.intersect_aabb(node.aabb()) else {
            return;
        };
        // Early out if AABB entry is beyond current closest
        if t_min > *closest_t {
            return;
        }

        match node {
            BvhNode::Leaf { triangles, .. } => {
                for &slot in triangles {
                    let (index, tri) = &self.triangles[slot];
                    if let Some(t) = tri.intersect(ray, self.epsilon) {
                        let better = match closest {
                            Some(hit) => t < hit.t,
                            None => true,
                        };
                        if t <= *closest_t && better {
                            *closest_t = t;
                            *closest = Some(RayHit {
                                t,
                                point: ray.at(t),
                                normal: tri.normal,
                                triangle: *index,
                            });
                        }
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                // Test children in order of AABB distance
                let left_t = ray.intersect_aabb(left.aabb()).map(|(t, _)| t);
                let right_t = ray.intersect_aabb(right.aabb()).map(|(t, _)| t);

                match (left_t, right_t) {
                    (Some(lt), Some(rt)) => {
                        if lt < rt {
                            self.trace_node_closest(ray, left, closest, closest_t);
                            self.trace_node_closest(ray, right, closest, closest_t);
                        } else {
                            self.trace_node_closest(ray, right, closest, closest_t);
                            self.trace_node_closest(ray, left, closest, closest_t);
                        }
                    }
                    (Some(_), None) => {
                        self.trace_node_closest(ray, left, closest, closest_t);
                    }
                    (None, Some(_)) => {
                        self.trace_node_closest(ray, right, closest, closest_t);
                    }
                    (None, None) => {}
                }
            }
        }
    }

    /// Get a reference to the root node, if any.
    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    /// Number of indexed (non-degenerate) triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Bounding box of the whole tree.
    pub fn bounds(&self) -> Option<Aabb3> {
        self.root.as_ref().map(|r| *r.aabb())
    }
}

impl SurfaceQuery for Bvh {
    fn ray_cast(&self, ray: &Ray, max_distance: f64) -> Option<RayHit> {
        self.trace_closest(ray, max_distance)
    }
}

/// Build a BVH node recursively using SAH.
fn build_node(items: &mut [BuildItem]) -> BvhNode {
    let mut bounds = Aabb3::empty();
    for (_, aabb, _) in items.iter() {
        bounds.include(aabb);
    }

    // Base case: small number of triangles -> leaf
    if items.len() <= LEAF_SIZE {
        return BvhNode::Leaf {
            aabb: bounds,
            triangles: items.iter().map(|(slot, _, _)| *slot).collect(),
        };
    }

    let (best_axis, best_pos) = find_best_split(items, &bounds);
    let mut mid = partition(items, best_axis, best_pos);

    // Fallback if partition fails: just split in the middle
    if mid == 0 || mid == items.len() {
        mid = items.len() / 2;
    }

    let (left_items, right_items) = items.split_at_mut(mid);
    BvhNode::Internal {
        aabb: bounds,
        left: Box::new(build_node(left_items)),
        right: Box::new(build_node(right_items)),
    }
}

/// Find the best split axis and position using SAH.
fn find_best_split(items: &[BuildItem], bounds: &Aabb3) -> (usize, f64) {
    const NUM_BUCKETS: usize = 12;

    let extent = bounds.extent();
    let total_area = bounds.surface_area();

    let mut best_cost = f64::INFINITY;
    let mut best_axis = 0;
    let mut best_pos = 0.0;

    for axis in 0..3 {
        let axis_extent = extent[axis];
        if axis_extent < 1e-10 {
            continue;
        }
        let axis_min = bounds.min[axis];

        let mut bucket_counts = [0usize; NUM_BUCKETS];
        let mut bucket_bounds = [Aabb3::empty(); NUM_BUCKETS];

        for (_, aabb, centroid) in items {
            let b = ((centroid[axis] - axis_min) / axis_extent * NUM_BUCKETS as f64) as usize;
            let b = b.min(NUM_BUCKETS - 1);
            bucket_counts[b] += 1;
            bucket_bounds[b].include(aabb);
        }

        // Sweep to find best split
        for split in 1..NUM_BUCKETS {
            let mut left_count = 0;
            let mut left_bounds = Aabb3::empty();
            for i in 0..split {
                if bucket_counts[i] > 0 {
                    left_count += bucket_counts[i];
                    left_bounds.include(&bucket_bounds[i]);
                }
            }

            let mut right_count = 0;
            let mut right_bounds = Aabb3::empty();
            for i in split..NUM_BUCKETS {
                if bucket_counts[i] > 0 {
                    right_count += bucket_counts[i];
                    right_bounds.include(&bucket_bounds[i]);
                }
            }

            if left_count == 0 || right_count == 0 {
                continue;
            }

            // SAH cost: traversal + P(left) * N_left + P(right) * N_right
            let cost = 0.125
                + left_bounds.surface_area() / total_area * left_count as f64
                + right_bounds.surface_area() / total_area * right_count as f64;

            if cost < best_cost {
                best_cost = cost;
                best_axis = axis;
                best_pos = axis_min + (split as f64 / NUM_BUCKETS as f64) * axis_extent;
            }
        }
    }

    (best_axis, best_pos)
}

/// Partition items by centroid along an axis.
fn partition(items: &mut [BuildItem], axis: usize, pos: f64) -> usize {
    let mut left = 0;
    let mut right = items.len();

    while left < right {
        if items[left].2[axis] < pos {
            left += 1;
        } else {
            right -= 1;
            items.swap(left, right);
        }
    }

    left
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshproj_math::Vec3;
    use proptest::prelude::*;

    /// An `n` x `n` grid of unit quads in the XY plane at height `z`.
    fn grid(n: u32, z: f64) -> TriangleMesh {
        let mut positions = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                positions.push(Point3::new(i as f64, j as f64, z));
            }
        }
        let mut faces = Vec::new();
        let row = n + 1;
        for j in 0..n {
            for i in 0..n {
                let a = j * row + i;
                faces.push(vec![a, a + 1, a + row + 1, a + row]);
            }
        }
        TriangleMesh::from_polygons(positions, &faces).unwrap()
    }

    /// Closed axis-aligned box `[0, s]^3`.
    fn cube(s: f64) -> TriangleMesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(s, 0.0, 0.0),
            Point3::new(s, s, 0.0),
            Point3::new(0.0, s, 0.0),
            Point3::new(0.0, 0.0, s),
            Point3::new(s, 0.0, s),
            Point3::new(s, s, s),
            Point3::new(0.0, s, s),
        ];
        let faces = vec![
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
        ];
        TriangleMesh::from_polygons(positions, &faces).unwrap()
    }

    #[test]
    fn test_bvh_build() {
        let bvh = Bvh::build(&grid(8, 0.0), 1e-4);
        assert!(bvh.root().is_some());
        assert_eq!(bvh.triangle_count(), 128);
        let bounds = bvh.bounds().unwrap();
        assert!((bounds.max.x - 8.0 - 1e-4).abs() < 1e-12);
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = Bvh::build(&TriangleMesh::default(), 1e-4);
        assert!(bvh.root().is_none());
        let ray = Ray::new(Point3::origin(), Vec3::z());
        assert!(bvh.ray_cast(&ray, 1e5).is_none());
    }

    #[test]
    fn test_bvh_trace_closest_cube() {
        let bvh = Bvh::build(&cube(10.0), 1e-4);

        let ray = Ray::new(Point3::new(5.0, 5.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = bvh.trace_closest(&ray, 1e5).unwrap();
        assert!(hit.point.z.abs() < 1e-8);
        // Bottom face winds outward
        assert!((hit.normal.z + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bvh_trace_miss() {
        let bvh = Bvh::build(&cube(10.0), 1e-4);
        let ray = Ray::new(Point3::new(50.0, 50.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(bvh.trace_closest(&ray, 1e5).is_none());
    }

    #[test]
    fn test_bvh_respects_max_distance() {
        let bvh = Bvh::build(&grid(4, 0.0), 1e-4);
        let ray = Ray::new(Point3::new(1.5, 1.5, 10.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(bvh.trace_closest(&ray, 5.0).is_none());
        assert!(bvh.trace_closest(&ray, 10.5).is_some());
    }

    #[test]
    fn test_bvh_rejects_hits_beyond_diagonal_edge() {
        let mesh = TriangleMesh::new(
            vec![
                Point3::new(-1000.0, 1000.0, 0.0),
                Point3::new(1000.0, -1000.0, 0.0),
                Point3::new(1000.0, 1000.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let bvh = Bvh::build(&mesh, 1e-4);
        let down = Vec3::new(0.0, 0.0, -1.0);
        assert!(bvh.ray_cast(&Ray::new(Point3::new(-0.0707, -0.0707, 1.0), down), 1e5).is_none());
        assert!(bvh.ray_cast(&Ray::new(Point3::new(0.0707, 0.0707, 1.0), down), 1e5).is_some());
    }

    #[test]
    fn test_bvh_reports_source_triangle_index() {
        let mesh = grid(4, 0.0);
        let bvh = Bvh::build(&mesh, 1e-4);
        let ray = Ray::new(Point3::new(2.2, 3.7, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = bvh.trace_closest(&ray, 1e5).unwrap();
        let tri = mesh.triangle(hit.triangle).unwrap();
        assert!(tri.intersect(&ray, 1e-9).is_some());
    }

    proptest! {
        /// The BVH agrees with brute force on the closest hit distance.
        #[test]
        fn bvh_matches_brute_force(
            ox in -2.0f64..10.0, oy in -2.0f64..10.0,
            dx in -0.5f64..0.5, dy in -0.5f64..0.5,
        ) {
            let mut mesh = grid(8, 0.0);
            // Add a second, higher layer over part of the grid
            let upper = grid(3, 2.0);
            let base = mesh.positions.len() as u32;
            mesh.positions.extend(upper.positions);
            mesh.indices.extend(upper.indices.iter().map(|t| t.map(|i| i + base)));

            let bvh = Bvh::build(&mesh, 0.0);
            let ray = Ray::new(Point3::new(ox, oy, 5.0), Vec3::new(dx, dy, -1.0));

            let fast = bvh.ray_cast(&ray, 1e5).map(|h| h.t);
            let slow = mesh.ray_cast(&ray, 1e5).map(|h| h.t);
            match (fast, slow) {
                (Some(a), Some(b)) => prop_assert!((a - b).abs() < 1e-9),
                (None, None) => {}
                (a, b) => prop_assert!(false, "bvh {:?} vs brute force {:?}", a, b),
            }
        }
    }
}
