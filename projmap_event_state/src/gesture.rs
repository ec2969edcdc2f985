// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whole-surface move, rotate and scale gestures.
//!
//! A gesture snapshots the surface's corners when it begins and computes every
//! update from that snapshot plus the cumulative pointer motion. Updates are
//! never composed onto the live corners, so a long drag does not drift.

use kurbo::{Point, Vec2};
use projmap_geometry::{Corners, centroid, rotate_about, scale_about, translate};

use crate::drag::DragState;

/// Distance from the pivot below which rotate/scale input is ignored.
const PIVOT_EPSILON: f64 = 1e-6;

/// What a drag on the calibration canvas does.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransformMode {
    /// Drag individual corner handles.
    #[default]
    Corners,
    /// Translate the whole surface.
    Move,
    /// Rotate the whole surface about its centroid.
    Rotate,
    /// Scale the whole surface uniformly about its centroid.
    Scale,
}

/// An in-progress whole-surface gesture.
///
/// ```
/// use kurbo::Point;
/// use projmap_event_state::gesture::{SurfaceGesture, TransformMode};
/// use projmap_geometry::{CornerKey, Corners};
///
/// let corners = Corners::from_points([
///     Point::new(0.0, 0.0),
///     Point::new(10.0, 0.0),
///     Point::new(10.0, 10.0),
///     Point::new(0.0, 10.0),
/// ]);
/// let mut gesture = SurfaceGesture::default();
/// gesture.begin(TransformMode::Move, Point::new(5.0, 5.0), &corners);
///
/// let moved = gesture.update(Point::new(8.0, 9.0)).unwrap();
/// assert_eq!(moved.get(CornerKey::new(0)), Some(Point::new(3.0, 4.0)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct SurfaceGesture {
    mode: Option<TransformMode>,
    drag: DragState,
    initial: Corners,
    pivot: Point,
}

impl SurfaceGesture {
    /// Starts a gesture at `pointer`, snapshotting `corners`.
    ///
    /// [`TransformMode::Corners`] is not a whole-surface mode; beginning with
    /// it leaves the gesture inactive.
    pub fn begin(&mut self, mode: TransformMode, pointer: Point, corners: &Corners) {
        if mode == TransformMode::Corners {
            self.end();
            return;
        }
        self.mode = Some(mode);
        self.initial = corners.clone();
        self.pivot = centroid(corners);
        self.drag.start(pointer, self.pivot);
    }

    /// The mode of the active gesture.
    #[must_use]
    pub fn mode(&self) -> Option<TransformMode> {
        self.mode
    }

    /// Returns `true` between [`SurfaceGesture::begin`] and [`SurfaceGesture::end`].
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.mode.is_some()
    }

    /// The corners captured when the gesture began.
    #[must_use]
    pub fn initial_corners(&self) -> &Corners {
        &self.initial
    }

    /// The rotate/scale pivot (the initial centroid).
    #[must_use]
    pub fn pivot(&self) -> Point {
        self.pivot
    }

    /// Computes the corners for pointer position `pointer`.
    ///
    /// Returns `None` when no gesture is active, or for rotate/scale when
    /// the start or current pointer sits on the pivot.
    pub fn update(&mut self, pointer: Point) -> Option<Corners> {
        let mode = self.mode?;
        self.drag.update(pointer);
        let offset = self.drag.total_offset(pointer)?;
        let start = self.drag.start_pos?;
        match mode {
            TransformMode::Corners => None,
            TransformMode::Move => Some(translate(&self.initial, offset)),
            TransformMode::Rotate => {
                let (from, to) = self.pivot_arms(start, pointer)?;
                Some(rotate_about(&self.initial, to.atan2() - from.atan2(), self.pivot))
            }
            TransformMode::Scale => {
                let (from, to) = self.pivot_arms(start, pointer)?;
                let factor = to.hypot() / from.hypot();
                Some(scale_about(&self.initial, factor, factor, self.pivot))
            }
        }
    }

    /// Ends the gesture. Safe to call when idle.
    pub fn end(&mut self) {
        *self = Self::default();
    }

    fn pivot_arms(&self, start: Point, pointer: Point) -> Option<(Vec2, Vec2)> {
        let from = start - self.pivot;
        let to = pointer - self.pivot;
        (from.hypot() > PIVOT_EPSILON && to.hypot() > PIVOT_EPSILON).then_some((from, to))
    }
}
