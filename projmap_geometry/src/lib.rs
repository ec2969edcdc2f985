// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Projmap Geometry: the calibration math behind projection-mapped surfaces.
//!
//! A surface is a polygon of 3–8 corners placed in pixel space over a canvas.
//! Its content is drawn on a unit disc mesh that is warped so the disc's rim
//! follows the corner polygon. This crate holds every piece of that pipeline
//! that does not depend on UI or storage:
//!
//! - [`CornerKey`] / [`Corners`]: stable corner identifiers and the ordered
//!   corner map (`point0`, `point1`, ...).
//! - [`CanvasBounds`] and the `normalize_*` / `denormalize_*` functions: the
//!   single place where pixels are converted to aspect-corrected clip space.
//! - [`BaseMesh`]: a radially subdivided disc with a write-once copy of its
//!   original positions.
//! - [`RadialTransform`], [`apply_transform`]: the per-vertex corner warp.
//! - [`centroid`], [`translate`], [`rotate`], [`scale`], [`point_in_polygon`]:
//!   whole-surface operations used by move/rotate/scale gestures.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Size;
//! use projmap_geometry::{BaseMesh, MeshConfig, apply_transform, default_corners};
//!
//! let viewport = Size::new(1920.0, 1080.0);
//! let corners = default_corners(4, viewport);
//!
//! let mut mesh = BaseMesh::new(MeshConfig::new(4));
//! assert!(apply_transform(&mut mesh, &corners, &viewport));
//!
//! // Re-applying the same corners is idempotent: positions are always
//! // recomputed from the mesh's original buffer.
//! let first = mesh.positions().to_vec();
//! apply_transform(&mut mesh, &corners, &viewport);
//! assert_eq!(mesh.positions(), &first[..]);
//! ```
//!
//! ## Clip space
//!
//! The rendering camera is orthographic with a vertical extent of `[-1, 1]`
//! and a horizontal extent of `[-aspect, aspect]`. Pixel Y grows downward,
//! clip Y grows upward.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod corners;
mod mesh;
mod normalize;
mod ops;
mod transform;

pub use corners::{
    CornerKey, Corners, DEFAULT_SUBDIVISIONS, MAX_CORNERS, MIN_CORNERS, ParseCornerKeyError,
    clamp_corner_count, corner_keys,
};
pub use mesh::{BaseMesh, MeshConfig};
pub use normalize::{
    CanvasBounds, CanvasState, canvas_dimensions, denormalize_point, denormalize_x, denormalize_y,
    normalize_point, normalize_x, normalize_y,
};
pub use ops::{centroid, point_in_polygon, rotate, rotate_about, scale, scale_about, translate};
pub use transform::{
    DEFAULT_RADIUS_FRACTION, RadialTransform, apply_transform, compute_transform,
    corners_on_circle, default_corners, default_corners_with_radius, validate_corners,
};
