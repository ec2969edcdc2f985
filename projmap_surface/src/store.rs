// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The authoritative surface store.

use std::fmt;

use kurbo::{Point, Size};
use log::{debug, trace, warn};
use projmap_geometry::{
    BaseMesh, CanvasBounds, Corners, DEFAULT_RADIUS_FRACTION, DEFAULT_SUBDIVISIONS, MeshConfig,
    apply_transform, clamp_corner_count, default_corners_with_radius, scale_about,
};
use serde_json::Value;

use crate::error::StoreError;
use crate::persist::{decode_surfaces, encode_surfaces, renormalize_render_orders};
use crate::storage::SharedStorage;
use crate::surface::{
    AppMode, ContentType, GeometryType, IdAllocator, Surface, SurfaceConfig, SurfaceId,
    SurfaceUpdate,
};
use crate::sync::{BroadcastHub, SyncLink, SyncMessage};

/// Added to the selected surface's render order by
/// [`SurfaceStore::effective_render_order`].
pub const SELECTION_HIGHLIGHT_BOOST: i64 = 1000;

/// Store settings.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreConfig {
    /// Storage key of the persisted surface list.
    pub storage_key: String,
    /// Name of the cross-tab channel (and of the storage-ping fallback key).
    pub channel_name: String,
    /// Angular subdivisions per corner for surface meshes.
    pub subdivisions: u32,
    /// Default corner circle radius as a fraction of the smaller viewport side.
    pub default_radius_fraction: f64,
    /// Viewport size at startup, used for default corners and the first resize.
    pub initial_viewport: Size,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: "projection_mapping_surfaces".to_owned(),
            channel_name: "projection-mapping-sync".to_owned(),
            subdivisions: DEFAULT_SUBDIVISIONS,
            default_radius_fraction: DEFAULT_RADIUS_FRACTION,
            initial_viewport: Size::new(1920.0, 1080.0),
        }
    }
}

/// Where a change came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChangeOrigin {
    /// A call on this store.
    Local,
    /// A message from another tab.
    Remote,
}

/// What changed.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreChange {
    /// A surface was created.
    SurfaceAdded(SurfaceId),
    /// A surface's fields changed.
    SurfaceUpdated(SurfaceId),
    /// A surface was removed.
    SurfaceRemoved(SurfaceId),
    /// The selection changed.
    SelectionChanged(Option<SurfaceId>),
    /// The application mode changed.
    ModeChanged(AppMode),
    /// Every surface was rescaled for a new viewport size.
    Resized(Size),
}

/// Notification delivered to subscribers after a change is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreEvent {
    /// What changed.
    pub change: StoreChange,
    /// Where the change came from.
    pub origin: ChangeOrigin,
}

/// Handle returned by [`SurfaceStore::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StoreEvent)>;

/// Owner of every surface record.
///
/// All corner writes go through [`SurfaceStore::update_corners`] (or the
/// other update methods). Local mutations are persisted and broadcast;
/// remote ones, applied by [`SurfaceStore::poll_sync`], are neither.
///
/// Concurrent edits from two tabs are not reconciled: the last write to
/// arrive overwrites the record, and the other edit is lost.
pub struct SurfaceStore {
    config: StoreConfig,
    storage: SharedStorage,
    link: Option<SyncLink>,
    surfaces: Vec<Surface>,
    ids: IdAllocator,
    selected: Option<SurfaceId>,
    mode: AppMode,
    viewport: Size,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl fmt::Debug for SurfaceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceStore")
            .field("config", &self.config)
            .field("storage", &"..")
            .field("link", &self.link)
            .field("surfaces", &self.surfaces)
            .field("ids", &self.ids)
            .field("selected", &self.selected)
            .field("mode", &self.mode)
            .field("viewport", &self.viewport)
            .field("subscribers", &self.subscribers.len())
            .field("next_subscription", &self.next_subscription)
            .finish()
    }
}

impl SurfaceStore {
    /// Creates a store without cross-tab sync, loading persisted surfaces.
    #[must_use]
    pub fn new(config: StoreConfig, storage: SharedStorage) -> Self {
        Self::build(config, storage, None)
    }

    /// Creates a store synced over `hub`, or over the storage-ping fallback
    /// when `hub` is `None`.
    #[must_use]
    pub fn connect(
        config: StoreConfig,
        storage: SharedStorage,
        hub: Option<&BroadcastHub>,
    ) -> Self {
        let link = SyncLink::connect(hub, SharedStorage::clone(&storage), &config.channel_name);
        Self::build(config, storage, Some(link))
    }

    /// Creates a store over an existing link.
    #[must_use]
    pub fn with_link(config: StoreConfig, storage: SharedStorage, link: SyncLink) -> Self {
        Self::build(config, storage, Some(link))
    }

    fn build(config: StoreConfig, storage: SharedStorage, link: Option<SyncLink>) -> Self {
        let viewport = config.initial_viewport;
        let surfaces = storage
            .get(&config.storage_key)
            .map(|raw| decode_surfaces(&raw, viewport, config.default_radius_fraction))
            .unwrap_or_default();
        let ids = IdAllocator::after(surfaces.iter().map(|s| &s.id));
        debug!("loaded {} surfaces", surfaces.len());
        Self {
            config,
            storage,
            link,
            surfaces,
            ids,
            selected: None,
            mode: AppMode::default(),
            viewport,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The store settings.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns `true` when the store is connected to other tabs.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.link.is_some()
    }

    /// All surfaces in creation order.
    #[must_use]
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// The surface with id `id`.
    #[must_use]
    pub fn surface(&self, id: &SurfaceId) -> Option<&Surface> {
        self.surfaces.iter().find(|s| &s.id == id)
    }

    /// Number of surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Returns `true` if there are no surfaces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// The last valid viewport size.
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Default corners for `corner_count` in the current viewport.
    #[must_use]
    pub fn default_corners(&self, corner_count: i64) -> Corners {
        default_corners_with_radius(
            corner_count,
            self.viewport,
            self.config.default_radius_fraction,
        )
    }

    /// Creates a surface from `config` merged over defaults and selects it.
    pub fn add_surface(&mut self, config: SurfaceConfig) -> SurfaceId {
        let id = self.ids.allocate();
        let corner_count = clamp_corner_count(config.corner_count.unwrap_or(4));
        let corners = match config.corners {
            Some(corners) if corners.is_complete(corner_count) => corners,
            Some(_) => {
                warn!("surface `{id}`: supplied corners are incomplete, using defaults");
                self.default_corners(corner_count.into())
            }
            None => self.default_corners(corner_count.into()),
        };
        let render_order = config.render_order.unwrap_or_else(|| {
            self.surfaces
                .iter()
                .map(|s| s.render_order.saturating_add(1))
                .max()
                .unwrap_or(0)
        });
        let surface = Surface {
            id: id.clone(),
            name: config.name.unwrap_or_else(|| match id.sequence() {
                Some(sequence) => format!("Surface {sequence}"),
                None => format!("Surface {}", self.surfaces.len() + 1),
            }),
            content_type: config.content_type.unwrap_or_default(),
            content_data: config.content_data.unwrap_or(Value::Null),
            geometry_type: GeometryType::Polygon,
            corner_count,
            corners,
            visible: config.visible.unwrap_or(true),
            render_order,
            audio_reactive: config.audio_reactive.unwrap_or(false),
        };
        self.surfaces.push(surface.clone());
        self.persist();
        self.broadcast(SyncMessage::SurfaceAdded(surface));
        self.notify(StoreChange::SurfaceAdded(id.clone()), ChangeOrigin::Local);
        self.set_selection(Some(id.clone()), ChangeOrigin::Local);
        id
    }

    /// Removes a surface. Clears the selection if it was selected.
    pub fn remove_surface(&mut self, id: &SurfaceId) -> Result<Surface, StoreError> {
        let index = self.index_of(id)?;
        let removed = self.surfaces.remove(index);
        self.persist();
        self.broadcast(SyncMessage::SurfaceDeleted { id: id.clone() });
        self.notify(StoreChange::SurfaceRemoved(id.clone()), ChangeOrigin::Local);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            self.notify(StoreChange::SelectionChanged(None), ChangeOrigin::Local);
        }
        Ok(removed)
    }

    /// Merges `update` into a surface.
    ///
    /// Changing the corner count without supplying corners regenerates
    /// default corners. Supplied corners must be complete for the resulting
    /// count; otherwise nothing is changed.
    pub fn update_surface(
        &mut self,
        id: &SurfaceId,
        update: SurfaceUpdate,
    ) -> Result<(), StoreError> {
        let index = self.index_of(id)?;
        let current = &self.surfaces[index];
        let corner_count = update
            .corner_count
            .map_or(current.corner_count, clamp_corner_count);
        let corners = match update.corners {
            Some(corners) if corners.is_complete(corner_count) => Some(corners),
            Some(_) => {
                warn!("surface `{id}`: rejected incomplete corner update");
                return Err(StoreError::IncompleteCorners {
                    id: id.clone(),
                    expected: corner_count,
                });
            }
            None if corner_count != current.corner_count => {
                Some(self.default_corners(corner_count.into()))
            }
            None => None,
        };

        let surface = &mut self.surfaces[index];
        if let Some(name) = update.name {
            surface.name = name;
        }
        if let Some(content_type) = update.content_type {
            surface.content_type = content_type;
        }
        if let Some(content_data) = update.content_data {
            surface.content_data = content_data;
        }
        surface.corner_count = corner_count;
        if let Some(corners) = corners {
            surface.corners = corners;
        }
        if let Some(visible) = update.visible {
            surface.visible = visible;
        }
        if let Some(render_order) = update.render_order {
            surface.render_order = render_order;
        }
        if let Some(audio_reactive) = update.audio_reactive {
            surface.audio_reactive = audio_reactive;
        }
        let snapshot = surface.clone();
        trace!("surface `{id}` updated");

        self.persist();
        self.broadcast(SyncMessage::SurfaceUpdated(snapshot));
        self.notify(StoreChange::SurfaceUpdated(id.clone()), ChangeOrigin::Local);
        Ok(())
    }

    /// Replaces a surface's corners. The set must be complete.
    pub fn update_corners(&mut self, id: &SurfaceId, corners: Corners) -> Result<(), StoreError> {
        self.update_surface(
            id,
            SurfaceUpdate {
                corners: Some(corners),
                ..SurfaceUpdate::default()
            },
        )
    }

    /// Replaces a surface's content type and data.
    pub fn update_content(
        &mut self,
        id: &SurfaceId,
        content_type: ContentType,
        content_data: Value,
    ) -> Result<(), StoreError> {
        self.update_surface(
            id,
            SurfaceUpdate {
                content_type: Some(content_type),
                content_data: Some(content_data),
                ..SurfaceUpdate::default()
            },
        )
    }

    /// Flips visibility and returns the new value.
    pub fn toggle_visibility(&mut self, id: &SurfaceId) -> Result<bool, StoreError> {
        let visible = !self
            .surface(id)
            .ok_or_else(|| StoreError::UnknownSurface(id.clone()))?
            .visible;
        self.update_surface(
            id,
            SurfaceUpdate {
                visible: Some(visible),
                ..SurfaceUpdate::default()
            },
        )?;
        Ok(visible)
    }

    /// Sets a surface's render order.
    pub fn set_render_order(
        &mut self,
        id: &SurfaceId,
        render_order: i64,
    ) -> Result<(), StoreError> {
        self.update_surface(
            id,
            SurfaceUpdate {
                render_order: Some(render_order),
                ..SurfaceUpdate::default()
            },
        )
    }

    /// Changes the corner count (clamped), regenerating default corners when
    /// it differs from the current one.
    pub fn set_corner_count(
        &mut self,
        id: &SurfaceId,
        corner_count: i64,
    ) -> Result<(), StoreError> {
        self.update_surface(
            id,
            SurfaceUpdate {
                corner_count: Some(corner_count),
                ..SurfaceUpdate::default()
            },
        )
    }

    /// Renames a surface.
    pub fn rename(&mut self, id: &SurfaceId, name: impl Into<String>) -> Result<(), StoreError> {
        self.update_surface(
            id,
            SurfaceUpdate {
                name: Some(name.into()),
                ..SurfaceUpdate::default()
            },
        )
    }

    /// Restores a surface's default corners for the current viewport.
    pub fn reset_corners(&mut self, id: &SurfaceId) -> Result<(), StoreError> {
        let count = self
            .surface(id)
            .ok_or_else(|| StoreError::UnknownSurface(id.clone()))?
            .corner_count;
        let corners = self.default_corners(count.into());
        self.update_corners(id, corners)
    }

    /// Surface ids from bottom to top, hidden surfaces included.
    ///
    /// Ties in render order keep creation order.
    #[must_use]
    pub fn stacking_order(&self) -> Vec<SurfaceId> {
        let mut ordered: Vec<&Surface> = self.surfaces.iter().collect();
        ordered.sort_by_key(|s| s.render_order);
        ordered.into_iter().map(|s| s.id.clone()).collect()
    }

    /// Visible surfaces in draw order (ascending render order).
    #[must_use]
    pub fn render_list(&self) -> Vec<&Surface> {
        let mut list: Vec<&Surface> = self.surfaces.iter().filter(|s| s.visible).collect();
        list.sort_by_key(|s| s.render_order);
        list
    }

    /// Render order for presentation: the stored order, plus
    /// [`SELECTION_HIGHLIGHT_BOOST`] for the selected surface.
    #[must_use]
    pub fn effective_render_order(&self, id: &SurfaceId) -> Option<i64> {
        let surface = self.surface(id)?;
        let boost = if self.selected.as_ref() == Some(id) {
            SELECTION_HIGHLIGHT_BOOST
        } else {
            0
        };
        Some(surface.render_order.saturating_add(boost))
    }

    /// Moves a surface one step toward the top. Returns `false` if it is
    /// already on top.
    pub fn move_up(&mut self, id: &SurfaceId) -> Result<bool, StoreError> {
        self.shift(id, true)
    }

    /// Moves a surface one step toward the bottom. Returns `false` if it is
    /// already at the bottom.
    pub fn move_down(&mut self, id: &SurfaceId) -> Result<bool, StoreError> {
        self.shift(id, false)
    }

    fn shift(&mut self, id: &SurfaceId, up: bool) -> Result<bool, StoreError> {
        self.index_of(id)?;
        let mut order = self.stacking_order();
        let Some(position) = order.iter().position(|o| o == id) else {
            return Ok(false);
        };
        let neighbour = if up {
            position + 1
        } else if let Some(below) = position.checked_sub(1) {
            below
        } else {
            return Ok(false);
        };
        if neighbour >= order.len() {
            return Ok(false);
        }
        order.swap(position, neighbour);

        let mut changed = Vec::new();
        for (rank, surface_id) in order.iter().enumerate() {
            let rank = i64::try_from(rank).unwrap_or(i64::MAX);
            if let Some(surface) = self.surfaces.iter_mut().find(|s| &s.id == surface_id) {
                if surface.render_order != rank {
                    surface.render_order = rank;
                    changed.push(surface.clone());
                }
            }
        }
        self.persist();
        for surface in changed {
            let changed_id = surface.id.clone();
            self.broadcast(SyncMessage::SurfaceUpdated(surface));
            self.notify(StoreChange::SurfaceUpdated(changed_id), ChangeOrigin::Local);
        }
        Ok(true)
    }

    /// The selected surface id.
    #[must_use]
    pub fn selected(&self) -> Option<&SurfaceId> {
        self.selected.as_ref()
    }

    /// The selected surface.
    #[must_use]
    pub fn selected_surface(&self) -> Option<&Surface> {
        self.surface(self.selected.as_ref()?)
    }

    /// Selects a surface, or clears the selection with `None`.
    pub fn select(&mut self, id: Option<SurfaceId>) -> Result<(), StoreError> {
        if let Some(id) = &id {
            self.index_of(id)?;
        }
        self.set_selection(id, ChangeOrigin::Local);
        Ok(())
    }

    fn set_selection(&mut self, id: Option<SurfaceId>, origin: ChangeOrigin) {
        if self.selected == id {
            return;
        }
        self.selected = id.clone();
        if origin == ChangeOrigin::Local {
            self.broadcast(SyncMessage::SurfaceSelected { id: id.clone() });
        }
        self.notify(StoreChange::SelectionChanged(id), origin);
    }

    /// The application mode.
    #[must_use]
    pub fn mode(&self) -> AppMode {
        self.mode
    }

    /// Sets the application mode.
    pub fn set_mode(&mut self, mode: AppMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.broadcast(SyncMessage::ModeChanged { mode });
        self.notify(StoreChange::ModeChanged(mode), ChangeOrigin::Local);
    }

    /// Rescales every surface's corners from the previous viewport size to
    /// `size`.
    ///
    /// Sizes with a zero, negative or non-finite side are ignored and the
    /// previous size is kept. Returns `true` if corners were rescaled.
    /// Resizes are persisted but not broadcast; each tab rescales for its
    /// own viewport.
    pub fn handle_resize(&mut self, size: Size) -> bool {
        let valid = size.is_finite() && size.width > 0.0 && size.height > 0.0;
        if !valid {
            debug!("ignoring degenerate viewport size {size:?}");
            return false;
        }
        if size == self.viewport {
            return false;
        }
        let sx = size.width / self.viewport.width;
        let sy = size.height / self.viewport.height;
        for surface in &mut self.surfaces {
            surface.corners = scale_about(&surface.corners, sx, sy, Point::ZERO);
        }
        self.viewport = size;
        self.persist();
        self.notify(StoreChange::Resized(size), ChangeOrigin::Local);
        true
    }

    /// Mesh settings for a surface.
    #[must_use]
    pub fn mesh_config(&self, id: &SurfaceId) -> Option<MeshConfig> {
        let surface = self.surface(id)?;
        Some(
            MeshConfig::new(surface.corner_count.into())
                .with_subdivisions(self.config.subdivisions),
        )
    }

    /// Warps `mesh` onto a surface's corners.
    ///
    /// Returns `Ok(false)` when the mesh's corner count does not match the
    /// surface; the mesh is then left unchanged.
    pub fn apply_to_mesh(
        &self,
        id: &SurfaceId,
        mesh: &mut BaseMesh,
        bounds: &impl CanvasBounds,
    ) -> Result<bool, StoreError> {
        let surface = self.surface(id).ok_or_else(|| StoreError::UnknownSurface(id.clone()))?;
        if mesh.corner_count() != surface.corner_count {
            return Ok(false);
        }
        Ok(apply_transform(mesh, &surface.corners, bounds))
    }

    /// Registers `callback` for every change, local or remote.
    pub fn subscribe(&mut self, callback: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Writes the surface list to storage.
    pub fn save(&self) -> Result<(), StoreError> {
        let raw = encode_surfaces(&self.surfaces)?;
        self.storage.set(&self.config.storage_key, &raw)?;
        Ok(())
    }

    /// Applies every message received from other tabs.
    ///
    /// Remote changes are neither persisted nor re-broadcast. Returns the
    /// number of messages applied.
    pub fn poll_sync(&mut self) -> usize {
        let Some(link) = self.link.as_mut() else {
            return 0;
        };
        let envelopes = link.receive();
        let count = envelopes.len();
        for envelope in envelopes {
            trace!("applying remote {}", envelope.message.kind());
            self.apply_remote(envelope.message);
        }
        count
    }

    fn apply_remote(&mut self, message: SyncMessage) {
        match message {
            SyncMessage::SurfaceUpdated(surface) | SyncMessage::SurfaceAdded(surface) => {
                self.upsert_remote(surface);
            }
            SyncMessage::SurfaceDeleted { id } => {
                let Ok(index) = self.index_of(&id) else {
                    debug!("remote delete of unknown surface `{id}`");
                    return;
                };
                self.surfaces.remove(index);
                self.notify(StoreChange::SurfaceRemoved(id.clone()), ChangeOrigin::Remote);
                if self.selected.as_ref() == Some(&id) {
                    self.set_selection(None, ChangeOrigin::Remote);
                }
            }
            SyncMessage::SurfaceSelected { id } => {
                if id.as_ref().is_some_and(|id| self.index_of(id).is_err()) {
                    debug!("remote selection of unknown surface ignored");
                    return;
                }
                self.set_selection(id, ChangeOrigin::Remote);
            }
            SyncMessage::ModeChanged { mode } => {
                if self.mode != mode {
                    self.mode = mode;
                    self.notify(StoreChange::ModeChanged(mode), ChangeOrigin::Remote);
                }
            }
        }
    }

    fn upsert_remote(&mut self, mut surface: Surface) {
        surface.corner_count = clamp_corner_count(surface.corner_count.into());
        self.ids.observe(&surface.id);
        let existing = self.index_of(&surface.id).ok();
        if !surface.corners.is_complete(surface.corner_count) {
            match existing.map(|i| &self.surfaces[i]) {
                Some(previous) if previous.corner_count == surface.corner_count => {
                    warn!(
                        "remote update of `{}` had incomplete corners, keeping previous",
                        surface.id
                    );
                    surface.corners = previous.corners.clone();
                }
                _ => {
                    warn!("remote surface `{}` had incomplete corners, using defaults", surface.id);
                    surface.corners = self.default_corners(surface.corner_count.into());
                }
            }
        }
        let id = surface.id.clone();
        match existing {
            Some(index) => {
                self.surfaces[index] = surface;
                self.notify(StoreChange::SurfaceUpdated(id), ChangeOrigin::Remote);
            }
            None => {
                self.surfaces.push(surface);
                self.notify(StoreChange::SurfaceAdded(id), ChangeOrigin::Remote);
            }
        }
    }

    /// Renumbers render orders to `0..len`, keeping their relative order.
    pub fn normalize_render_orders(&mut self) {
        let before: Vec<i64> = self.surfaces.iter().map(|s| s.render_order).collect();
        renormalize_render_orders(&mut self.surfaces);
        let changed: Vec<Surface> = self
            .surfaces
            .iter()
            .zip(before)
            .filter(|(s, old)| s.render_order != *old)
            .map(|(s, _)| s.clone())
            .collect();
        if changed.is_empty() {
            return;
        }
        self.persist();
        for surface in changed {
            let id = surface.id.clone();
            self.broadcast(SyncMessage::SurfaceUpdated(surface));
            self.notify(StoreChange::SurfaceUpdated(id), ChangeOrigin::Local);
        }
    }

    fn index_of(&self, id: &SurfaceId) -> Result<usize, StoreError> {
        self.surfaces
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| StoreError::UnknownSurface(id.clone()))
    }

    fn persist(&self) {
        if let Err(err) = self.save() {
            warn!("{err}");
        }
    }

    fn broadcast(&mut self, message: SyncMessage) {
        if let Some(link) = self.link.as_mut() {
            link.send(message);
        }
    }

    fn notify(&mut self, change: StoreChange, origin: ChangeOrigin) {
        let event = StoreEvent { change, origin };
        for (_, callback) in &mut self.subscribers {
            callback(&event);
        }
    }
}
