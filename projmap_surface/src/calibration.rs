// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Calibration session: routes pointer input for one surface into the store.
//!
//! A session owns one [`CornerHandle`] per corner of the active surface and a
//! [`SurfaceGesture`] for whole-surface edits. It never writes corners itself;
//! every result goes through [`SurfaceStore::update_corners`].

use kurbo::{Point, Size};
use log::trace;
use projmap_event_state::corner::CornerHandle;
use projmap_event_state::gesture::{SurfaceGesture, TransformMode};
use projmap_event_state::pointer::{CanvasFrame, PointerPhase, PointerSource};
use projmap_geometry::{CornerKey, Corners, point_in_polygon};

use crate::error::StoreError;
use crate::store::SurfaceStore;
use crate::surface::SurfaceId;

/// What the pointer went down on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HitTarget {
    /// A corner handle.
    Handle(CornerKey),
    /// The canvas itself (possibly inside the surface polygon).
    Canvas,
}

/// Calibration state for the surface being edited.
#[derive(Debug)]
pub struct CalibrationSession {
    surface_id: SurfaceId,
    handles: Vec<CornerHandle>,
    active_handle: Option<CornerKey>,
    mode: TransformMode,
    gesture: SurfaceGesture,
    disposed: bool,
}

impl CalibrationSession {
    /// Starts calibrating `surface_id`, whose corners are `corners`.
    #[must_use]
    pub fn new(surface_id: SurfaceId, corners: &Corners, mode: TransformMode) -> Self {
        Self {
            surface_id,
            handles: build_handles(corners),
            active_handle: None,
            mode,
            gesture: SurfaceGesture::default(),
            disposed: false,
        }
    }

    /// The surface being calibrated.
    #[must_use]
    pub fn surface_id(&self) -> &SurfaceId {
        &self.surface_id
    }

    /// The current transform mode.
    #[must_use]
    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    /// The corner handles, in corner order.
    #[must_use]
    pub fn handles(&self) -> &[CornerHandle] {
        &self.handles
    }

    /// The handle for `key`.
    #[must_use]
    pub fn handle(&self, key: CornerKey) -> Option<&CornerHandle> {
        self.handles.iter().find(|h| h.key() == key)
    }

    /// Returns `true` while a handle drag or a gesture is in progress.
    #[must_use]
    pub fn is_interacting(&self) -> bool {
        self.active_handle.is_some() || self.gesture.is_active()
    }

    /// Returns `true` once [`CalibrationSession::dispose`] has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Changes the transform mode, cancelling any interaction in progress.
    pub fn set_mode(&mut self, mode: TransformMode) {
        self.cancel();
        self.mode = mode;
    }

    /// Tears down the handles and rebuilds them for another surface.
    pub fn switch_surface(&mut self, surface_id: SurfaceId, corners: &Corners) {
        self.cancel();
        for handle in &mut self.handles {
            handle.dispose();
        }
        self.surface_id = surface_id;
        self.handles = build_handles(corners);
        self.disposed = false;
    }

    /// Moves idle handles to `corners`, e.g. after a resize or a remote
    /// update. Rebuilds the handles if the key set changed.
    pub fn sync_handles(&mut self, corners: &Corners) {
        if !self.handles.iter().map(CornerHandle::key).eq(corners.keys()) {
            self.cancel();
            for handle in &mut self.handles {
                handle.dispose();
            }
            self.handles = build_handles(corners);
            return;
        }
        for handle in &mut self.handles {
            if let Some(position) = corners.get(handle.key()) {
                handle.set_position(position);
            }
        }
    }

    /// Feeds one pointer event.
    ///
    /// Returns the corners written to the store, if any.
    pub fn pointer_event(
        &mut self,
        store: &mut SurfaceStore,
        target: HitTarget,
        phase: PointerPhase,
        source: PointerSource<'_>,
        frame: &CanvasFrame,
    ) -> Result<Option<Corners>, StoreError> {
        if self.disposed {
            return Ok(None);
        }
        let current = store
            .surface(&self.surface_id)
            .ok_or_else(|| StoreError::UnknownSurface(self.surface_id.clone()))?
            .corners
            .clone();
        let pointer = source.position().map(|client| frame.to_local(client));

        match phase {
            PointerPhase::Down => {
                let Some(pointer) = pointer else {
                    return Ok(None);
                };
                self.cancel();
                self.begin(target, pointer, phase, source, frame, &current);
                Ok(None)
            }
            PointerPhase::Move => {
                if let Some(key) = self.active_handle {
                    let Some(change) = self
                        .handles
                        .iter_mut()
                        .find(|h| h.key() == key)
                        .and_then(|h| h.handle_event(phase, source, frame))
                    else {
                        return Ok(None);
                    };
                    let corners = current.with_corner(change.key, change.position);
                    store.update_corners(&self.surface_id, corners.clone())?;
                    return Ok(Some(corners));
                }
                let Some(pointer) = pointer else {
                    return Ok(None);
                };
                let Some(corners) = self.gesture.update(pointer) else {
                    return Ok(None);
                };
                store.update_corners(&self.surface_id, corners.clone())?;
                self.sync_handles(&corners);
                Ok(Some(corners))
            }
            PointerPhase::Up => {
                if let Some(key) = self.active_handle.take() {
                    if let Some(handle) = self.handles.iter_mut().find(|h| h.key() == key) {
                        handle.handle_event(phase, source, frame);
                    }
                }
                self.gesture.end();
                Ok(None)
            }
        }
    }

    fn begin(
        &mut self,
        target: HitTarget,
        pointer: Point,
        phase: PointerPhase,
        source: PointerSource<'_>,
        frame: &CanvasFrame,
        current: &Corners,
    ) {
        let on_handle = match target {
            HitTarget::Handle(key) => Some(key),
            HitTarget::Canvas => None,
        };
        match (self.mode, on_handle) {
            (TransformMode::Corners, Some(key)) => {
                if let Some(handle) = self.handles.iter_mut().find(|h| h.key() == key) {
                    handle.handle_event(phase, source, frame);
                    self.active_handle = Some(key);
                    trace!("dragging {key} of `{}`", self.surface_id);
                }
            }
            (TransformMode::Corners, None) => {
                if point_in_polygon(pointer, current) {
                    self.gesture.begin(TransformMode::Move, pointer, current);
                }
            }
            (mode, Some(_)) => self.gesture.begin(mode, pointer, current),
            (mode, None) => {
                if point_in_polygon(pointer, current) {
                    self.gesture.begin(mode, pointer, current);
                }
            }
        }
    }

    fn cancel(&mut self) {
        if let Some(key) = self.active_handle.take() {
            if let Some(handle) = self.handles.iter_mut().find(|h| h.key() == key) {
                let frame = CanvasFrame::Detached { window: Size::ZERO };
                handle.handle_event(PointerPhase::Up, PointerSource::Touch(&[]), &frame);
            }
        }
        self.gesture.end();
    }

    /// Disposes every handle and ends any gesture. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel();
        for handle in &mut self.handles {
            handle.dispose();
        }
        self.disposed = true;
    }
}

fn build_handles(corners: &Corners) -> Vec<CornerHandle> {
    corners
        .iter()
        .map(|(key, position)| CornerHandle::new(key, position))
        .collect()
}
