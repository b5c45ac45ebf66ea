//! Recover missed vertices from their neighbors' hits.

use meshproj_math::Plane;

use crate::{MeshHandle, VertexRecord, VertexStatus};

/// Place every missed vertex on the surface plane of a neighboring hit.
///
/// Neighbors are tried in edge order. The first one with a direct hit whose
/// plane the vertex ray is not parallel to (`|n · dir| >= bias`) provides
/// the surface point. Only direct hits are used, never other fallbacks.
/// Returns the number of recovered vertices.
pub fn resolve_fallbacks<M: MeshHandle + ?Sized>(
    mesh: &M,
    records: &mut [VertexRecord],
    bias: f64,
) -> usize {
    let mut recovered = Vec::new();
    for (index, record) in records.iter().enumerate() {
        if record.status != VertexStatus::Missed {
            continue;
        }
        let found = mesh.neighbors(index).iter().find_map(|&n| {
            let neighbor = records.get(n)?;
            if neighbor.status != VertexStatus::Hit {
                return None;
            }
            let (surface, normal) = (neighbor.surface?, neighbor.normal?);
            let plane = Plane::new(normal, &surface);
            let t = plane.intersect_line(&record.world, &record.direction, bias)?;
            Some((record.world + record.direction * t, normal))
        });
        if let Some(hit) = found {
            recovered.push((index, hit));
        }
    }

    for &(index, (surface, normal)) in &recovered {
        let record = &mut records[index];
        record.surface = Some(surface);
        record.normal = Some(normal);
        record.status = VertexStatus::Fallback;
    }
    recovered.len()
}
