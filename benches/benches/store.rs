// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Size};
use projmap_geometry::CornerKey;
use projmap_surface::{
    BroadcastHub, MemoryStorage, StoreConfig, SurfaceConfig, SurfaceStore, decode_surfaces,
    encode_surfaces,
};

fn populated_store(surfaces: usize, hub: Option<&BroadcastHub>) -> SurfaceStore {
    let config = StoreConfig::default();
    let storage = MemoryStorage::new().shared();
    let mut store = match hub {
        Some(hub) => SurfaceStore::connect(config, storage, Some(hub)),
        None => SurfaceStore::new(config, storage),
    };
    for i in 0..surfaces {
        store.add_surface(SurfaceConfig {
            corner_count: Some(3 + (i % 6) as i64),
            ..SurfaceConfig::default()
        });
    }
    store
}

fn bench_corner_drag(c: &mut Criterion) {
    let hub = BroadcastHub::new();
    let mut store = populated_store(16, Some(&hub));
    let mut peer = SurfaceStore::connect(
        StoreConfig::default(),
        MemoryStorage::new().shared(),
        Some(&hub),
    );
    let Some(id) = store.selected().cloned() else {
        return;
    };
    let mut x = 0.0;
    c.bench_function("drag_corner_16_surfaces", |b| {
        b.iter(|| {
            x = (x + 1.0) % 1920.0;
            let Some(surface) = store.surface(&id) else {
                return;
            };
            let corners = surface.corners.with_corner(CornerKey::new(0), Point::new(x, 200.0));
            black_box(store.update_corners(&id, corners).is_ok());
            black_box(peer.poll_sync());
        });
    });
}

fn bench_resize(c: &mut Criterion) {
    c.bench_function("resize_64_surfaces", |b| {
        b.iter_batched(
            || populated_store(64, None),
            |mut store| black_box(store.handle_resize(Size::new(1280.0, 720.0))),
            BatchSize::SmallInput,
        );
    });
}

fn bench_persistence(c: &mut Criterion) {
    let store = populated_store(64, None);
    let Ok(raw) = encode_surfaces(store.surfaces()) else {
        return;
    };
    c.bench_function("encode_64_surfaces", |b| {
        b.iter(|| black_box(encode_surfaces(black_box(store.surfaces())).is_ok()));
    });
    c.bench_function("decode_64_surfaces", |b| {
        b.iter(|| black_box(decode_surfaces(black_box(&raw), Size::new(1920.0, 1080.0), 0.25)));
    });
}

criterion_group!(benches, bench_corner_drag, bench_resize, bench_persistence);
criterion_main!(benches);
