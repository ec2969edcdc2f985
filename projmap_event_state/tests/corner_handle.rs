// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Corner handles and gestures driven by realistic pointer sequences.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Rect, Size, Vec2};
use projmap_event_state::corner::{CornerHandle, HandleState};
use projmap_event_state::gesture::{SurfaceGesture, TransformMode};
use projmap_event_state::pointer::{CanvasFrame, PointerPhase, PointerSource};
use projmap_geometry::{CornerKey, Corners, centroid, default_corners};

#[test]
fn callback_fires_once_per_move_in_order() {
    let frame = CanvasFrame::Mounted(Rect::new(0.0, 0.0, 1920.0, 1080.0));
    let seen: Rc<RefCell<Vec<(CornerKey, Point)>>> = Rc::default();
    let mut handle = CornerHandle::new(CornerKey::new(0), Point::new(960.0, 270.0));
    {
        let seen = Rc::clone(&seen);
        handle.on_change(move |key, pos| seen.borrow_mut().push((key, pos)));
    }

    handle.handle_event(PointerPhase::Down, PointerSource::Mouse(Point::new(960.0, 270.0)), &frame);
    for step in 1..=10 {
        let p = Point::new(960.0 - 86.0 * f64::from(step), 270.0 - 17.0 * f64::from(step));
        handle.handle_event(PointerPhase::Move, PointerSource::Mouse(p), &frame);
    }
    handle.handle_event(PointerPhase::Up, PointerSource::Mouse(Point::new(100.0, 100.0)), &frame);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 10);
    assert!(seen.iter().all(|(key, _)| *key == CornerKey::new(0)));
    assert_eq!(seen.last().map(|(_, p)| *p), Some(Point::new(100.0, 100.0)));
    assert_eq!(handle.state(), HandleState::Idle);

    // Moves after release do nothing.
    handle.handle_event(PointerPhase::Move, PointerSource::Mouse(Point::new(5.0, 5.0)), &frame);
    assert_eq!(seen.len(), 10);
}

#[test]
fn touch_and_mouse_produce_identical_positions() {
    let frame = CanvasFrame::Mounted(Rect::new(40.0, 30.0, 840.0, 630.0));
    let path = [Point::new(100.0, 100.0), Point::new(300.0, 250.0), Point::new(900.0, 10.0)];

    let mut mouse = CornerHandle::new(CornerKey::new(1), Point::new(60.0, 70.0));
    let mut touch = CornerHandle::new(CornerKey::new(1), Point::new(60.0, 70.0));

    mouse.handle_event(PointerPhase::Down, PointerSource::Mouse(path[0]), &frame);
    touch.handle_event(PointerPhase::Down, PointerSource::Touch(&path[..1]), &frame);
    for p in &path[1..] {
        let a = mouse.handle_event(PointerPhase::Move, PointerSource::Mouse(*p), &frame);
        let second_finger = [*p, Point::new(1.0, 1.0)];
        let b = touch.handle_event(
            PointerPhase::Move,
            PointerSource::Touch(&second_finger),
            &frame,
        );
        assert_eq!(a, b);
    }
    // The last point lies outside the canvas and is clamped.
    assert_eq!(mouse.position(), Point::new(800.0, 0.0));
}

#[test]
fn missing_canvas_falls_back_to_window_coordinates() {
    let frame = CanvasFrame::Detached {
        window: Size::new(1024.0, 768.0),
    };
    let mut handle = CornerHandle::new(CornerKey::new(2), Point::new(500.0, 500.0));
    handle.handle_event(PointerPhase::Down, PointerSource::Mouse(Point::new(500.0, 500.0)), &frame);
    let change = handle
        .handle_event(PointerPhase::Move, PointerSource::Mouse(Point::new(1500.0, 200.0)), &frame)
        .unwrap();
    assert_eq!(change.position, Point::new(1024.0, 200.0));
}

#[test]
fn gesture_results_preserve_corner_keys() {
    let corners: Corners = default_corners(6, Size::new(1920.0, 1080.0));
    let keys: Vec<_> = corners.keys().collect();
    let mut gesture = SurfaceGesture::default();

    for mode in [TransformMode::Move, TransformMode::Rotate, TransformMode::Scale] {
        let start = centroid(&corners) + Vec2::new(100.0, 0.0);
        gesture.begin(mode, start, &corners);
        let out = gesture.update(start + Vec2::new(-30.0, 60.0)).unwrap();
        assert_eq!(out.keys().collect::<Vec<_>>(), keys, "{mode:?}");
        gesture.end();
    }
}
