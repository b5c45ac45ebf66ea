//! Benchmarks for BVH construction and closest-hit casting.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meshproj_math::{Point3, Vec3};
use meshproj_raytrace::{Bvh, Ray, SurfaceQuery, TriangleMesh};

/// Wavy height field with `n` x `n` quads.
fn terrain(n: u32) -> TriangleMesh {
    let mut positions = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            let (x, y) = (i as f64, j as f64);
            positions.push(Point3::new(x, y, (x * 0.3).sin() + (y * 0.2).cos()));
        }
    }
    let row = n + 1;
    let mut faces = Vec::new();
    for j in 0..n {
        for i in 0..n {
            let a = j * row + i;
            faces.push(vec![a, a + 1, a + row + 1, a + row]);
        }
    }
    TriangleMesh::from_polygons(positions, &faces).expect("valid grid")
}

fn bench_build(c: &mut Criterion) {
    let mesh = terrain(128);
    c.bench_function("bvh_build_32k_tris", |b| {
        b.iter(|| Bvh::build(black_box(&mesh), 1e-4))
    });
}

fn bench_cast(c: &mut Criterion) {
    let mesh = terrain(128);
    let bvh = Bvh::build(&mesh, 1e-4);
    let down = Vec3::new(0.0, 0.0, -1.0);

    c.bench_function("bvh_cast_grid_4k_rays", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for j in 0..64 {
                for i in 0..64 {
                    let origin = Point3::new(i as f64 * 2.0 + 0.5, j as f64 * 2.0 + 0.5, 10.0);
                    if bvh.ray_cast(&Ray::new(origin, down), 1e5).is_some() {
                        hits += 1;
                    }
                }
            }
            black_box(hits)
        })
    });
}

criterion_group!(benches, bench_build, bench_cast);
criterion_main!(benches);
