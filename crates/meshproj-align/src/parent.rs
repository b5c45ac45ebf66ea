//! Choosing the parent object of a selection.

use meshproj_math::Transform;
use serde::{Deserialize, Serialize};

/// What the host exposes about an object for parent selection and alignment.
pub trait SceneObject {
    /// Display name, used in logs and errors.
    fn name(&self) -> &str;

    /// Local-to-world transform.
    fn world_transform(&self) -> Transform;

    /// Number of mesh vertices.
    fn vertex_count(&self) -> usize;

    /// Volume of the local bounding box scaled into world units.
    fn bound_box_volume(&self) -> f64;
}

/// Measure used to pick the largest object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LargestBy {
    /// Largest world-scaled bounding box.
    #[default]
    Volume,
    /// Most vertices.
    VertexCount,
}

/// How align-to-view picks the object the rest of the selection follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentRule {
    /// Object with the most vertices.
    VertexCount,
    /// Object with the largest bounding box.
    Volume,
    /// The active object; falls back to [`ParentRule::Volume`] when there is
    /// none or it was excluded.
    #[default]
    Active,
}

/// Index of the largest object by `by`. The first one wins ties.
pub fn largest_object<O: SceneObject>(objects: &[O], by: LargestBy) -> Option<usize> {
    let measure = |o: &O| match by {
        LargestBy::Volume => o.bound_box_volume(),
        LargestBy::VertexCount => o.vertex_count() as f64,
    };

    let mut best: Option<(usize, f64)> = None;
    for (i, object) in objects.iter().enumerate() {
        let value = measure(object);
        match best {
            Some((_, b)) if value <= b => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal object for selection tests.
    #[derive(Debug, Clone)]
    pub(crate) struct Dummy {
        pub name: String,
        pub transform: Transform,
        pub vertices: usize,
        pub volume: f64,
    }

    impl Dummy {
        pub fn new(name: &str, vertices: usize, volume: f64) -> Self {
            Self {
                name: name.to_string(),
                transform: Transform::identity(),
                vertices,
                volume,
            }
        }
    }

    impl SceneObject for Dummy {
        fn name(&self) -> &str {
            &self.name
        }
        fn world_transform(&self) -> Transform {
            self.transform.clone()
        }
        fn vertex_count(&self) -> usize {
            self.vertices
        }
        fn bound_box_volume(&self) -> f64 {
            self.volume
        }
    }

    #[test]
    fn test_largest_by_volume_and_count() {
        let objects = vec![
            Dummy::new("a", 10, 1.0),
            Dummy::new("b", 50, 0.5),
            Dummy::new("c", 3, 8.0),
        ];
        assert_eq!(largest_object(&objects, LargestBy::Volume), Some(2));
        assert_eq!(largest_object(&objects, LargestBy::VertexCount), Some(1));
    }

    #[test]
    fn test_largest_first_wins_ties() {
        let objects = vec![Dummy::new("a", 4, 2.0), Dummy::new("b", 4, 2.0)];
        assert_eq!(largest_object(&objects, LargestBy::Volume), Some(0));
        assert_eq!(largest_object(&objects, LargestBy::VertexCount), Some(0));
    }

    #[test]
    fn test_largest_empty() {
        let objects: Vec<Dummy> = Vec::new();
        assert_eq!(largest_object(&objects, LargestBy::Volume), None);
    }
}
