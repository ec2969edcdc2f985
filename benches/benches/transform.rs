// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Size};
use projmap_geometry::{
    BaseMesh, CanvasState, MeshConfig, RadialTransform, apply_transform, default_corners,
    normalize_point,
};

const VIEWPORT: Size = Size::new(1920.0, 1080.0);

fn bench_apply_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_transform");
    let bounds = CanvasState::mounted(VIEWPORT);
    for corner_count in [3_i64, 4, 8] {
        for subdivisions in [20_u32, 64] {
            let config = MeshConfig::new(corner_count).with_subdivisions(subdivisions);
            let mut mesh = BaseMesh::new(config);
            let corners = default_corners(corner_count, VIEWPORT);
            let id = BenchmarkId::new(format!("{corner_count}_corners"), subdivisions);
            group.bench_function(id, |b| {
                b.iter(|| {
                    black_box(apply_transform(&mut mesh, black_box(&corners), &bounds));
                });
            });
        }
    }
    group.finish();
}

fn bench_radial_map(c: &mut Criterion) {
    let bounds = CanvasState::mounted(VIEWPORT);
    let corners = default_corners(6, VIEWPORT);
    let Some(transform) = RadialTransform::new(&corners, &bounds) else {
        return;
    };
    let points: Vec<Point> = (0..1024)
        .map(|i| {
            let angle = f64::from(i) * 0.37;
            let radius = f64::from(i % 17) / 16.0;
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();

    c.bench_function("radial_map_1024", |b| {
        b.iter(|| {
            for p in &points {
                black_box(transform.map(*p));
            }
        });
    });
    c.bench_function("normalize_point_1024", |b| {
        b.iter(|| {
            for p in &points {
                black_box(normalize_point(&bounds, Point::new(p.x * 960.0, p.y * 540.0)));
            }
        });
    });
}

criterion_group!(benches, bench_apply_transform, bench_radial_map);
criterion_main!(benches);
