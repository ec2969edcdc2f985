// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end calibration scenarios.

use std::f64::consts::FRAC_PI_2;

use kurbo::{Point, Rect, Size, Vec2};
use projmap_event_state::gesture::TransformMode;
use projmap_event_state::pointer::{CanvasFrame, PointerPhase, PointerSource};
use projmap_geometry::{
    BaseMesh, CanvasState, CornerKey, Corners, centroid, corner_keys, rotate, translate,
    validate_corners,
};
use projmap_surface::{
    BroadcastHub, CalibrationSession, HitTarget, MemoryStorage, StoreConfig, StoreError,
    SurfaceConfig, SurfaceId, SurfaceStore,
};

const VIEWPORT: Size = Size::new(1920.0, 1080.0);

fn store() -> SurfaceStore {
    SurfaceStore::new(StoreConfig::default(), MemoryStorage::new().shared())
}

fn assert_close(a: Point, b: Point, tolerance: f64) {
    assert!((a - b).hypot() <= tolerance, "{a:?} != {b:?}");
}

#[test]
fn default_square_sits_on_a_270px_circle_starting_at_the_top() {
    let mut store = store();
    let id = store.add_surface(SurfaceConfig {
        corner_count: Some(4),
        ..SurfaceConfig::default()
    });
    let corners = &store.surface(&id).unwrap().corners;
    let center = Point::new(960.0, 540.0);

    let angles: Vec<f64> = corners
        .points()
        .map(|p| {
            assert!(((p - center).hypot() - 270.0).abs() <= 0.01);
            (p - center).atan2()
        })
        .collect();
    assert!((angles[0] + FRAC_PI_2).abs() < 1e-9, "point0 is at the top");
    for pair in angles.windows(2) {
        let step = (pair[1] - pair[0]).rem_euclid(std::f64::consts::TAU);
        assert!((step - FRAC_PI_2).abs() < 1e-9);
    }
}

#[test]
fn dragging_point0_changes_only_point0() {
    let mut store = store();
    let id = store.add_surface(SurfaceConfig::default());
    let before = store.surface(&id).unwrap().corners.clone();
    let mut session = CalibrationSession::new(id.clone(), &before, TransformMode::Corners);
    let frame = CanvasFrame::Mounted(Rect::from_origin_size(Point::ZERO, VIEWPORT));
    let key = CornerKey::new(0);
    let grab = before.get(key).unwrap();

    for (phase, pointer) in [
        (PointerPhase::Down, grab),
        (PointerPhase::Move, Point::new(400.0, 180.0)),
        (PointerPhase::Move, Point::new(100.0, 100.0)),
        (PointerPhase::Up, Point::new(100.0, 100.0)),
    ] {
        session
            .pointer_event(
                &mut store,
                HitTarget::Handle(key),
                phase,
                PointerSource::Mouse(pointer),
                &frame,
            )
            .unwrap();
    }

    let after = &store.surface(&id).unwrap().corners;
    assert_eq!(after.get(key), Some(Point::new(100.0, 100.0)));
    for other in corner_keys(4).skip(1) {
        assert_eq!(after.get(other), before.get(other));
    }
}

#[test]
fn halving_the_viewport_halves_every_corner() {
    let mut store = store();
    let ids = [
        store.add_surface(SurfaceConfig::default()),
        store.add_surface(SurfaceConfig {
            corner_count: Some(7),
            ..SurfaceConfig::default()
        }),
    ];
    let before: Vec<Corners> = ids
        .iter()
        .map(|id| store.surface(id).unwrap().corners.clone())
        .collect();

    assert!(store.handle_resize(Size::new(960.0, 540.0)));
    for (id, before) in ids.iter().zip(&before) {
        let after = &store.surface(id).unwrap().corners;
        for (key, p) in before.iter() {
            assert_eq!(after.get(key), Some(Point::new(p.x / 2.0, p.y / 2.0)));
        }
    }
}

#[test]
fn consecutive_resizes_compose_like_one() {
    let mut store = store();
    let id = store.add_surface(SurfaceConfig {
        corner_count: Some(5),
        ..SurfaceConfig::default()
    });
    let original = store.surface(&id).unwrap().corners.clone();

    store.handle_resize(Size::new(1280.0, 720.0));
    store.handle_resize(Size::new(0.0, 0.0));
    store.handle_resize(Size::new(2560.0, 1600.0));
    store.handle_resize(Size::new(1000.0, 900.0));

    let (sx, sy) = (1000.0 / 1920.0, 900.0 / 1080.0);
    let after = &store.surface(&id).unwrap().corners;
    for (key, p) in original.iter() {
        assert_close(after.get(key).unwrap(), Point::new(p.x * sx, p.y * sy), 1e-9);
    }
}

#[test]
fn move_up_from_the_bottom_passes_one_neighbour() {
    let mut store = store();
    let bottom = store.add_surface(SurfaceConfig::default());
    let middle = store.add_surface(SurfaceConfig::default());
    let top = store.add_surface(SurfaceConfig::default());
    assert_eq!(store.stacking_order(), [bottom.clone(), middle.clone(), top.clone()]);

    assert!(store.move_up(&bottom).unwrap());
    let order = |id: &SurfaceId| store.surface(id).unwrap().render_order;
    assert!(order(&middle) < order(&bottom));
    assert!(order(&bottom) < order(&top));
    assert_eq!(store.stacking_order(), [middle, bottom, top]);
}

#[test]
fn incomplete_corners_never_reach_the_store_or_mesh() {
    let mut store = store();
    let id = store.add_surface(SurfaceConfig::default());
    let full = store.surface(&id).unwrap().corners.clone();
    let missing: Corners = full.iter().filter(|(k, _)| k.index() != 2).collect();

    let expected: Vec<CornerKey> = corner_keys(4).collect();
    assert!(!validate_corners(&missing, &expected));
    assert!(matches!(
        store.update_corners(&id, missing),
        Err(StoreError::IncompleteCorners { .. })
    ));
    assert_eq!(store.surface(&id).unwrap().corners, full);

    let mut mesh = BaseMesh::new(store.mesh_config(&id).unwrap());
    assert!(store.apply_to_mesh(&id, &mut mesh, &CanvasState::mounted(VIEWPORT)).unwrap());
    assert_eq!(mesh.revision(), 1);
}

#[test]
fn remote_tab_receives_corner_updates_without_echo() {
    let storage = MemoryStorage::new().shared();
    let hub = BroadcastHub::new();
    let mut tab_a = SurfaceStore::connect(StoreConfig::default(), storage.clone(), Some(&hub));
    let mut tab_b = SurfaceStore::connect(StoreConfig::default(), storage, Some(&hub));

    let id = tab_a.add_surface(SurfaceConfig::default());
    assert!(tab_b.poll_sync() > 0);
    assert_eq!(tab_b.surface(&id), tab_a.surface(&id));

    let moved = tab_a
        .surface(&id)
        .unwrap()
        .corners
        .with_corner(CornerKey::new(0), Point::new(100.0, 100.0));
    tab_a.update_corners(&id, moved).unwrap();
    assert_eq!(tab_b.poll_sync(), 1);
    assert_eq!(tab_b.surface(&id), tab_a.surface(&id));

    // Tab B did not rebroadcast what it applied.
    assert_eq!(tab_a.poll_sync(), 0);
}

#[test]
fn whole_surface_rotation_keeps_the_centroid() {
    let mut store = store();
    let id = store.add_surface(SurfaceConfig {
        corner_count: Some(3),
        ..SurfaceConfig::default()
    });
    let corners = store.surface(&id).unwrap().corners.clone();
    let pivot = centroid(&corners);
    let mut session = CalibrationSession::new(id.clone(), &corners, TransformMode::Rotate);
    let frame = CanvasFrame::Detached { window: VIEWPORT };

    let start = pivot + Vec2::new(50.0, 0.0);
    let end = pivot + Vec2::new(0.0, 50.0);
    session
        .pointer_event(
            &mut store,
            HitTarget::Canvas,
            PointerPhase::Down,
            PointerSource::Mouse(start),
            &frame,
        )
        .unwrap();
    session
        .pointer_event(
            &mut store,
            HitTarget::Canvas,
            PointerPhase::Move,
            PointerSource::Mouse(end),
            &frame,
        )
        .unwrap();

    let rotated = &store.surface(&id).unwrap().corners;
    assert_close(centroid(rotated), pivot, 1e-9);
    let expected = rotate(&corners, FRAC_PI_2);
    for (key, p) in expected.iter() {
        assert_close(rotated.get(key).unwrap(), p, 1e-9);
    }
    assert_close(
        centroid(&translate(rotated, Vec2::new(3.0, 4.0))),
        centroid(rotated) + Vec2::new(3.0, 4.0),
        1e-9,
    );
}
