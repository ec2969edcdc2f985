// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer input shared by the handle and gesture state machines.

use kurbo::{Point, Rect, Size};

/// Phase of a pointer event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    /// Button pressed or touch started.
    Down,
    /// Pointer moved.
    Move,
    /// Button released, touch ended or cancelled.
    Up,
}

/// Where a pointer position comes from.
///
/// Mouse and touch input are handled uniformly: the first active touch point
/// stands in for the mouse position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PointerSource<'a> {
    /// Mouse position in client (window) coordinates.
    Mouse(Point),
    /// Active touch points in client coordinates.
    Touch(&'a [Point]),
}

impl PointerSource<'_> {
    /// The effective client position, if the event carries one.
    ///
    /// A touch-end event with no remaining touches has no position.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Mouse(p) => Some(*p),
            Self::Touch(points) => points.first().copied(),
        }
    }
}

/// The drawing canvas as seen from client coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CanvasFrame {
    /// A mounted canvas occupying `rect` in client coordinates.
    Mounted(Rect),
    /// No canvas element could be found; positions are window-relative.
    Detached {
        /// The window size, used for clamping.
        window: Size,
    },
}

impl CanvasFrame {
    /// Size of the area positions are clamped to.
    #[must_use]
    pub fn size(&self) -> Size {
        match self {
            Self::Mounted(rect) => rect.size(),
            Self::Detached { window } => *window,
        }
    }

    /// Converts a client position to canvas coordinates without clamping.
    #[must_use]
    pub fn to_local(&self, client: Point) -> Point {
        match self {
            Self::Mounted(rect) => client - rect.origin().to_vec2(),
            Self::Detached { .. } => client,
        }
    }

    /// Clamps a canvas-space position into `[0, width] × [0, height]`.
    #[must_use]
    pub fn clamp(&self, local: Point) -> Point {
        let size = self.size();
        let max_x = size.width.max(0.0);
        let max_y = size.height.max(0.0);
        Point::new(local.x.clamp(0.0, max_x), local.y.clamp(0.0, max_y))
    }

    /// Converts a client position to clamped canvas coordinates.
    #[must_use]
    pub fn to_canvas(&self, client: Point) -> Point {
        self.clamp(self.to_local(client))
    }
}
