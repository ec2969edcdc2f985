// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draggable corner handles.
//!
//! One [`CornerHandle`] exists per visible corner while calibration is
//! active. It is an explicit two-state machine:
//!
//! | state      | event | next state | action                          |
//! |------------|-------|------------|---------------------------------|
//! | `Idle`     | down  | `Dragging` | capture pointer and corner      |
//! | `Idle`     | move  | `Idle`     | none                            |
//! | `Idle`     | up    | `Idle`     | none                            |
//! | `Dragging` | down  | `Dragging` | re-capture (second pointer)     |
//! | `Dragging` | move  | `Dragging` | emit the new corner position    |
//! | `Dragging` | up    | `Idle`     | release                         |
//!
//! Every move while dragging invokes the change callback synchronously; there
//! is no batching or throttling here.
//!
//! ```
//! use kurbo::{Point, Rect};
//! use projmap_event_state::corner::CornerHandle;
//! use projmap_event_state::pointer::{CanvasFrame, PointerPhase, PointerSource};
//! use projmap_geometry::CornerKey;
//!
//! let frame = CanvasFrame::Mounted(Rect::new(0.0, 0.0, 800.0, 600.0));
//! let mut handle = CornerHandle::new(CornerKey::new(0), Point::new(400.0, 150.0));
//!
//! handle.handle_event(PointerPhase::Down, PointerSource::Mouse(Point::new(400.0, 150.0)), &frame);
//! let change = handle
//!     .handle_event(PointerPhase::Move, PointerSource::Mouse(Point::new(100.0, 100.0)), &frame)
//!     .unwrap();
//! assert_eq!(change.position, Point::new(100.0, 100.0));
//! handle.handle_event(PointerPhase::Up, PointerSource::Mouse(Point::new(100.0, 100.0)), &frame);
//! assert!(!handle.is_dragging());
//! ```

use alloc::boxed::Box;
use core::fmt;

use kurbo::Point;
use projmap_geometry::CornerKey;

use crate::drag::DragState;
use crate::pointer::{CanvasFrame, PointerPhase, PointerSource};

/// State of a corner handle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum HandleState {
    /// Not being dragged.
    #[default]
    Idle,
    /// Following the pointer.
    Dragging,
}

/// What a transition asks the handle to do.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HandleAction {
    /// Nothing.
    None,
    /// Record the pointer and corner positions as the drag start.
    Capture,
    /// Compute and report a new corner position.
    Emit,
    /// Finish the drag.
    Release,
}

/// The handle transition table.
#[must_use]
pub const fn transition(state: HandleState, phase: PointerPhase) -> (HandleState, HandleAction) {
    match (state, phase) {
        (_, PointerPhase::Down) => (HandleState::Dragging, HandleAction::Capture),
        (HandleState::Idle, PointerPhase::Move | PointerPhase::Up) => {
            (HandleState::Idle, HandleAction::None)
        }
        (HandleState::Dragging, PointerPhase::Move) => (HandleState::Dragging, HandleAction::Emit),
        (HandleState::Dragging, PointerPhase::Up) => (HandleState::Idle, HandleAction::Release),
    }
}

/// How pointer positions become corner positions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DragMapping {
    /// The corner jumps to the pointer position.
    #[default]
    Absolute,
    /// The corner keeps its initial offset from the pointer.
    Relative,
}

/// A corner moved to a new canvas-space position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CornerChange {
    /// Which corner moved.
    pub key: CornerKey,
    /// Its new position in canvas pixels.
    pub position: Point,
}

type ChangeCallback = Box<dyn FnMut(CornerKey, Point)>;

/// Draggable handle for one corner.
pub struct CornerHandle {
    key: CornerKey,
    position: Point,
    state: HandleState,
    mapping: DragMapping,
    drag: DragState,
    on_change: Option<ChangeCallback>,
    disposed: bool,
}

impl fmt::Debug for CornerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CornerHandle")
            .field("key", &self.key)
            .field("position", &self.position)
            .field("state", &self.state)
            .field("mapping", &self.mapping)
            .field("drag", &self.drag)
            .field("has_callback", &self.on_change.is_some())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl CornerHandle {
    /// Creates an idle handle for `key` at canvas position `position`.
    #[must_use]
    pub fn new(key: CornerKey, position: Point) -> Self {
        Self {
            key,
            position,
            state: HandleState::Idle,
            mapping: DragMapping::default(),
            drag: DragState::default(),
            on_change: None,
            disposed: false,
        }
    }

    /// Sets how pointer positions map to corner positions.
    #[must_use]
    pub fn with_mapping(mut self, mapping: DragMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// The corner this handle controls.
    #[must_use]
    pub fn key(&self) -> CornerKey {
        self.key
    }

    /// The handle's current canvas-space position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Moves the handle without emitting a change, e.g. after a resize or a
    /// remote update. Ignored while dragging.
    pub fn set_position(&mut self, position: Point) {
        if self.state == HandleState::Idle {
            self.position = position;
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> HandleState {
        self.state
    }

    /// Returns `true` while the handle follows the pointer.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state == HandleState::Dragging
    }

    /// Returns `true` once [`CornerHandle::dispose`] has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Registers the change callback, replacing any previous one.
    ///
    /// Ignored on a disposed handle.
    pub fn on_change(&mut self, callback: impl FnMut(CornerKey, Point) + 'static) {
        if !self.disposed {
            self.on_change = Some(Box::new(callback));
        }
    }

    /// Feeds one pointer event through the state machine.
    ///
    /// Returns the emitted change, if any, after invoking the callback with
    /// it. Positions are converted through `frame` and clamped to the canvas.
    pub fn handle_event(
        &mut self,
        phase: PointerPhase,
        source: PointerSource<'_>,
        frame: &CanvasFrame,
    ) -> Option<CornerChange> {
        if self.disposed {
            return None;
        }
        let pointer = source.position().map(|client| frame.to_local(client));
        if pointer.is_none() && phase != PointerPhase::Up {
            return None;
        }
        let (next, action) = transition(self.state, phase);
        self.state = next;
        match action {
            HandleAction::None => None,
            HandleAction::Capture => {
                let pointer = pointer?;
                self.drag.start(pointer, self.position);
                None
            }
            HandleAction::Emit => {
                let pointer = pointer?;
                self.drag.update(pointer);
                let target = match self.mapping {
                    DragMapping::Absolute => pointer,
                    DragMapping::Relative => self.drag.anchored_position(pointer)?,
                };
                self.position = frame.clamp(target);
                let change = CornerChange {
                    key: self.key,
                    position: self.position,
                };
                if let Some(callback) = self.on_change.as_mut() {
                    callback(change.key, change.position);
                }
                Some(change)
            }
            HandleAction::Release => {
                self.drag.end();
                None
            }
        }
    }

    /// Detaches the callback and stops reacting to events.
    ///
    /// Safe to call more than once.
    pub fn dispose(&mut self) {
        self.on_change = None;
        self.drag.end();
        self.state = HandleState::Idle;
        self.disposed = true;
    }
}
