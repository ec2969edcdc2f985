// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag offset tracking anchored to the dragged object.
//!
//! ## Usage
//!
//! 1) Call [`DragState::start`] with the pointer position and the position of
//!    the object being dragged (a corner, a surface centroid, ...).
//! 2) On each move, [`DragState::update`] returns the delta since the previous
//!    move, and [`DragState::anchored_position`] returns where the object
//!    should be now: its start position plus the total pointer offset.
//! 3) [`DragState::end`] resets the tracker.
//!
//! Positions are always derived from the start snapshot and the total offset,
//! never by summing per-move deltas, so long drags do not accumulate error.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use projmap_event_state::drag::DragState;
//!
//! let mut drag = DragState::default();
//!
//! // Grab a corner at (100, 100) with the pointer slightly off-centre.
//! drag.start(Point::new(104.0, 98.0), Point::new(100.0, 100.0));
//!
//! let delta = drag.update(Point::new(114.0, 108.0)).unwrap();
//! assert_eq!((delta.x, delta.y), (10.0, 10.0));
//!
//! // The corner follows the pointer, keeping the grab offset.
//! let corner = drag.anchored_position(Point::new(114.0, 108.0)).unwrap();
//! assert_eq!(corner, Point::new(110.0, 110.0));
//! ```

use kurbo::{Point, Vec2};

/// Tracks a pointer drag together with the position of the dragged object.
#[derive(Debug, Clone, Default, Copy, PartialEq)]
pub struct DragState {
    /// Pointer position when the drag started.
    pub start_pos: Option<Point>,
    /// Pointer position at the last update.
    pub last_pos: Option<Point>,
    /// Position of the dragged object when the drag started.
    pub anchor: Option<Point>,
}

impl DragState {
    /// Starts a drag at pointer position `pointer`, grabbing an object at `anchor`.
    pub fn start(&mut self, pointer: Point, anchor: Point) {
        self.start_pos = Some(pointer);
        self.last_pos = Some(pointer);
        self.anchor = Some(anchor);
    }

    /// Records a new pointer position and returns the delta since the last one.
    pub fn update(&mut self, pointer: Point) -> Option<Vec2> {
        self.start_pos?;
        let delta = self.last_pos.map(|last| pointer - last);
        self.last_pos = Some(pointer);
        delta
    }

    /// Offset of `pointer` from the drag start.
    #[must_use]
    pub fn total_offset(&self, pointer: Point) -> Option<Vec2> {
        self.start_pos.map(|start| pointer - start)
    }

    /// Position of the dragged object for pointer position `pointer`.
    #[must_use]
    pub fn anchored_position(&self, pointer: Point) -> Option<Point> {
        let offset = self.total_offset(pointer)?;
        self.anchor.map(|anchor| anchor + offset)
    }

    /// Ends the drag and clears all state.
    pub fn end(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` while a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.start_pos.is_some()
    }
}
