// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The radial corner transform.
//!
//! A surface's base mesh is a unit disc. Calibration warps that disc so its
//! rim follows the polygon spanned by the surface's corners:
//!
//! 1. Every corner is converted from pixels to clip space.
//! 2. For a mesh vertex, its angle around the origin picks the two corners
//!    bounding it (angle `-π` maps to the start of corner 0's segment) and a
//!    blend factor between them.
//! 3. The blended corner position is scaled by the vertex's original radius,
//!    so interior vertices move proportionally less than rim vertices and the
//!    mesh keeps its subdivision density.
//!
//! The same algorithm is used for every corner count. It is not a projective
//! correction; for four corners it approximates a quad warp.

use core::f64::consts::{PI, TAU};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Size, Vec2};
use smallvec::SmallVec;

use crate::corners::{CornerKey, Corners, MAX_CORNERS, clamp_corner_count, corner_keys};
use crate::mesh::BaseMesh;
use crate::normalize::{CanvasBounds, normalize_point};

/// Share of the smaller viewport dimension used as the default corner radius.
pub const DEFAULT_RADIUS_FRACTION: f64 = 0.25;

/// Per-vertex mapping from the unit base mesh to calibrated clip space.
///
/// Built once per corner set; [`RadialTransform::map`] is then cheap enough to
/// run for every vertex on every pointer move.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialTransform {
    corners: SmallVec<[Point; MAX_CORNERS as usize]>,
}

impl RadialTransform {
    /// Normalizes `corners` against `bounds` in canonical key order.
    ///
    /// Returns `None` unless the keys are exactly `point0..point{n-1}` with
    /// finite positions and `n >= 3`.
    #[must_use]
    pub fn new(corners: &Corners, bounds: &impl CanvasBounds) -> Option<Self> {
        let count = u8::try_from(corners.len()).ok()?;
        if clamp_corner_count(count.into()) != count || !corners.is_complete(count) {
            return None;
        }
        Some(Self {
            corners: corners.points().map(|p| normalize_point(bounds, p)).collect(),
        })
    }

    /// Builds a transform from corners that are already in clip space.
    #[must_use]
    pub fn from_clip_corners(corners: impl IntoIterator<Item = Point>) -> Self {
        Self {
            corners: corners.into_iter().collect(),
        }
    }

    /// The clip-space corners, in canonical order.
    #[must_use]
    pub fn clip_corners(&self) -> &[Point] {
        &self.corners
    }

    /// Maps a base-mesh point to its calibrated clip-space position.
    ///
    /// If the bounding corners cannot be found the input is returned
    /// unchanged.
    #[must_use]
    pub fn map(&self, point: Point) -> Point {
        let count = self.corners.len();
        if count == 0 {
            return point;
        }
        let v = point.to_vec2();
        let radius = v.hypot();
        let normalized_angle = (v.atan2() + PI) / TAU;
        let scaled = normalized_angle * count as f64;
        let segment = segment_index(scaled, count);
        let next = (segment + 1) % count;
        let t = scaled - segment as f64;
        let (Some(a), Some(b)) = (self.corners.get(segment), self.corners.get(next)) else {
            return point;
        };
        let target = a.lerp(*b, t);
        Point::new(target.x * radius, target.y * radius)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "floored value is clamped into 0..count"
)]
fn segment_index(scaled: f64, count: usize) -> usize {
    let floored = scaled.floor();
    if floored.is_nan() || floored <= 0.0 {
        0
    } else {
        (floored as usize).min(count - 1)
    }
}

/// Returns the calibration mapping for `corners` as a closure.
///
/// Incomplete corner sets yield the identity mapping.
pub fn compute_transform<B: CanvasBounds>(
    corners: &Corners,
    bounds: &B,
) -> impl Fn(Point) -> Point + use<B> {
    let transform = RadialTransform::new(corners, bounds);
    move |p| transform.as_ref().map_or(p, |t| t.map(p))
}

/// Rewrites the live positions of `mesh` for `corners`.
///
/// Positions are always recomputed from the mesh's original buffer, so
/// calling this twice with the same corners gives the same result. The live
/// buffer is reused, its bounds recomputed and its revision bumped.
///
/// Returns `false`, leaving the mesh untouched, if `corners` is not a
/// complete set for the mesh's corner count.
pub fn apply_transform(mesh: &mut BaseMesh, corners: &Corners, bounds: &impl CanvasBounds) -> bool {
    let expected: SmallVec<[CornerKey; MAX_CORNERS as usize]> =
        corner_keys(mesh.corner_count().into()).collect();
    if !validate_corners(corners, &expected) {
        return false;
    }
    let Some(transform) = RadialTransform::new(corners, bounds) else {
        return false;
    };
    mesh.remap(|p| transform.map(p));
    true
}

/// Default corners for a new surface in a viewport of `viewport` pixels.
///
/// Corners sit evenly on a circle of radius
/// [`DEFAULT_RADIUS_FRACTION`] × the smaller viewport dimension, centred in
/// the viewport, starting at the top and proceeding clockwise on screen.
#[must_use]
pub fn default_corners(corner_count: i64, viewport: Size) -> Corners {
    default_corners_with_radius(corner_count, viewport, DEFAULT_RADIUS_FRACTION)
}

/// Like [`default_corners`] with a custom radius fraction.
#[must_use]
pub fn default_corners_with_radius(
    corner_count: i64,
    viewport: Size,
    radius_fraction: f64,
) -> Corners {
    let center = Point::new(viewport.width * 0.5, viewport.height * 0.5);
    let radius = viewport.width.min(viewport.height) * radius_fraction;
    corners_on_circle(corner_count, center, radius)
}

/// Corners evenly spaced on a circle, starting at angle `-π/2`.
#[must_use]
pub fn corners_on_circle(corner_count: i64, center: Point, radius: f64) -> Corners {
    let count = clamp_corner_count(corner_count);
    let step = TAU / f64::from(count);
    corner_keys(count.into())
        .map(|key| {
            let angle = -PI / 2.0 + step * f64::from(key.index());
            (key, center + Vec2::from_angle(angle) * radius)
        })
        .collect()
}

/// Returns `true` if every key in `expected` is present with a finite position.
#[must_use]
pub fn validate_corners(corners: &Corners, expected: &[CornerKey]) -> bool {
    expected
        .iter()
        .all(|key| corners.get(*key).is_some_and(|p| p.is_finite()))
}
