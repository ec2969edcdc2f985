// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Projmap Surface: the state side of projection-mapping calibration.
//!
//! - [`SurfaceStore`]: the single owner of every [`Surface`]. Creation,
//!   removal, partial updates, reordering, selection, application mode and
//!   viewport resize all go through it, and subscribers are notified after
//!   each change.
//! - Persistence: the surface list is written through to a
//!   [`KeyValueStorage`] as JSON and reloaded tolerantly, repairing partial or
//!   legacy records ([`decode_surfaces`]).
//! - Cross-tab sync: every local mutation is broadcast as a [`SyncMessage`]
//!   over a [`SyncLink`]; [`SurfaceStore::poll_sync`] applies messages from
//!   other tabs without echoing them. The last write to arrive wins.
//! - [`CalibrationSession`]: turns pointer input on corner handles or inside
//!   the surface polygon into corner updates.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use projmap_geometry::CornerKey;
//! use projmap_surface::{MemoryStorage, StoreConfig, SurfaceConfig, SurfaceStore};
//!
//! let storage = MemoryStorage::new().shared();
//! let mut store = SurfaceStore::new(StoreConfig::default(), storage.clone());
//!
//! let id = store.add_surface(SurfaceConfig::default());
//! let corners = store
//!     .surface(&id)
//!     .unwrap()
//!     .corners
//!     .with_corner(CornerKey::new(0), Point::new(100.0, 100.0));
//! store.update_corners(&id, corners).unwrap();
//!
//! // Halving the viewport halves every corner.
//! store.handle_resize(Size::new(960.0, 540.0));
//! let point0 = store.surface(&id).unwrap().corners.get(CornerKey::new(0));
//! assert_eq!(point0, Some(Point::new(50.0, 50.0)));
//!
//! // A fresh store over the same storage sees the persisted surface.
//! let reloaded = SurfaceStore::new(StoreConfig::default(), storage);
//! assert_eq!(reloaded.len(), 1);
//! ```
//!
//! This crate logs through the [`log`] facade and installs no logger.

mod calibration;
mod error;
mod persist;
mod storage;
mod store;
mod surface;
mod sync;

pub use calibration::{CalibrationSession, HitTarget};
pub use error::StoreError;
pub use persist::{decode_surfaces, encode_surfaces};
pub use storage::{KeyValueStorage, MemoryStorage, SharedStorage, StorageError};
pub use store::{
    ChangeOrigin, SELECTION_HIGHLIGHT_BOOST, StoreChange, StoreConfig, StoreEvent, SubscriptionId,
    SurfaceStore,
};
pub use surface::{
    AppMode, ContentType, GeometryType, Surface, SurfaceConfig, SurfaceId, SurfaceUpdate,
};
pub use sync::{
    BroadcastHub, ChannelEndpoint, STORAGE_PING_CAPACITY, StoragePingTransport, SyncEnvelope,
    SyncLink, SyncMessage, SyncTransport,
};
