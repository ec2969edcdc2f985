// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Projmap Event State: pointer state machines for calibrating surfaces.
//!
//! This crate turns raw pointer input into corner positions. It knows nothing
//! about rendering or storage; callers feed it client-space pointer positions
//! plus the current [`pointer::CanvasFrame`], and receive canvas-space corner
//! positions back.
//!
//! - [`pointer`]: pointer phases, mouse/touch unification and the canvas frame
//!   used to convert and clamp positions.
//! - [`drag`]: a drag tracker anchored to the dragged object.
//! - [`corner`]: the per-corner handle state machine (`Idle` / `Dragging`).
//! - [`gesture`]: whole-surface move, rotate and scale gestures.
//!
//! ## Corner drags
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use projmap_event_state::corner::CornerHandle;
//! use projmap_event_state::pointer::{CanvasFrame, PointerPhase, PointerSource};
//! use projmap_geometry::CornerKey;
//!
//! // The canvas sits 20px from the left edge of the window.
//! let frame = CanvasFrame::Mounted(Rect::new(20.0, 0.0, 820.0, 600.0));
//! let mut handle = CornerHandle::new(CornerKey::new(3), Point::new(100.0, 100.0));
//!
//! handle.handle_event(PointerPhase::Down, PointerSource::Mouse(Point::new(120.0, 100.0)), &frame);
//! let change = handle
//!     .handle_event(PointerPhase::Move, PointerSource::Mouse(Point::new(220.0, 50.0)), &frame)
//!     .unwrap();
//! assert_eq!(change.key, CornerKey::new(3));
//! assert_eq!(change.position, Point::new(200.0, 50.0));
//! ```
//!
//! ## Whole-surface gestures
//!
//! ```rust
//! use kurbo::Point;
//! use projmap_event_state::gesture::{SurfaceGesture, TransformMode};
//! use projmap_geometry::{Corners, centroid};
//!
//! let corners = Corners::from_points([
//!     Point::new(0.0, 0.0),
//!     Point::new(20.0, 0.0),
//!     Point::new(20.0, 20.0),
//!     Point::new(0.0, 20.0),
//! ]);
//! let mut gesture = SurfaceGesture::default();
//! gesture.begin(TransformMode::Scale, Point::new(20.0, 10.0), &corners);
//!
//! // Dragging twice as far from the centroid doubles the surface.
//! let scaled = gesture.update(Point::new(30.0, 10.0)).unwrap();
//! assert_eq!(centroid(&scaled), Point::new(10.0, 10.0));
//! ```
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

pub mod corner;
pub mod drag;
pub mod gesture;
pub mod pointer;
