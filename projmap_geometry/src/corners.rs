// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Corner identifiers and the ordered corner map.

use alloc::collections::BTreeMap;
use alloc::collections::btree_map;
use core::fmt;
use core::str::FromStr;

use kurbo::Point;

/// Smallest corner count a surface may have.
pub const MIN_CORNERS: u8 = 3;

/// Largest corner count a surface may have.
pub const MAX_CORNERS: u8 = 8;

/// Angular subdivisions per corner used for base meshes.
pub const DEFAULT_SUBDIVISIONS: u32 = 20;

/// Clamps an arbitrary corner count into `[MIN_CORNERS, MAX_CORNERS]`.
///
/// Corner count is a slider value in the editor, so out-of-range input is
/// clamped rather than rejected.
///
/// ```
/// use projmap_geometry::clamp_corner_count;
///
/// assert_eq!(clamp_corner_count(2), 3);
/// assert_eq!(clamp_corner_count(5), 5);
/// assert_eq!(clamp_corner_count(9), 8);
/// ```
#[must_use]
pub fn clamp_corner_count(count: i64) -> u8 {
    let clamped = count.clamp(i64::from(MIN_CORNERS), i64::from(MAX_CORNERS));
    u8::try_from(clamped).unwrap_or(MAX_CORNERS)
}

/// Stable identifier of one calibration corner.
///
/// Keys are displayed and persisted as `point0`, `point1`, ... and order
/// numerically, so `point10` sorts after `point9`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CornerKey(u8);

impl CornerKey {
    /// Creates the key for the corner at `index`.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Returns the zero-based corner index.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for CornerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "point{}", self.0)
    }
}

/// Error returned when a string is not a recognised corner key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseCornerKeyError;

impl fmt::Display for ParseCornerKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected `point<N>` or a legacy quad corner name")
    }
}

impl core::error::Error for ParseCornerKeyError {}

impl FromStr for CornerKey {
    type Err = ParseCornerKeyError;

    /// Parses `point<N>` keys and the legacy quad names.
    ///
    /// Legacy names follow the clockwise order of the default layout:
    /// `topLeft` → 0, `topRight` → 1, `bottomRight` → 2, `bottomLeft` → 3.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topLeft" => return Ok(Self(0)),
            "topRight" => return Ok(Self(1)),
            "bottomRight" => return Ok(Self(2)),
            "bottomLeft" => return Ok(Self(3)),
            _ => {}
        }
        let digits = s.strip_prefix("point").ok_or(ParseCornerKeyError)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseCornerKeyError);
        }
        digits.parse::<u8>().map(Self).map_err(|_| ParseCornerKeyError)
    }
}

/// Canonical corner keys for a surface with `corner_count` corners.
///
/// The count is clamped like [`clamp_corner_count`]. This is the order used
/// everywhere corners are iterated.
pub fn corner_keys(
    corner_count: i64,
) -> impl DoubleEndedIterator<Item = CornerKey> + ExactSizeIterator {
    (0..clamp_corner_count(corner_count)).map(CornerKey)
}

/// Ordered map from [`CornerKey`] to a pixel-space position.
///
/// A surface at rest always holds a complete set, but a `Corners` value built
/// from untrusted input may be incomplete; see
/// [`validate_corners`](crate::validate_corners).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Corners {
    points: BTreeMap<CornerKey, Point>,
}

impl Corners {
    /// Creates an empty corner map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: BTreeMap::new(),
        }
    }

    /// Builds a complete map from positions listed in canonical order.
    ///
    /// Positions beyond index 255 are ignored.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        (0..=u8::MAX)
            .map(CornerKey)
            .zip(points)
            .collect()
    }

    /// Number of corners present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if no corner is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the position of `key`, if present.
    #[must_use]
    pub fn get(&self, key: CornerKey) -> Option<Point> {
        self.points.get(&key).copied()
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: CornerKey) -> bool {
        self.points.contains_key(&key)
    }

    /// Sets the position of `key`, returning the previous one.
    pub fn insert(&mut self, key: CornerKey, position: Point) -> Option<Point> {
        self.points.insert(key, position)
    }

    /// Returns a copy with `key` moved to `position`.
    ///
    /// Unknown keys are not added: a corner update never changes the key set.
    #[must_use]
    pub fn with_corner(&self, key: CornerKey, position: Point) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.points.get_mut(&key) {
            *slot = position;
        }
        next
    }

    /// Iterates `(key, position)` pairs in canonical order.
    pub fn iter(
        &self,
    ) -> impl DoubleEndedIterator<Item = (CornerKey, Point)> + ExactSizeIterator + '_ {
        self.points.iter().map(|(k, p)| (*k, *p))
    }

    /// Iterates keys in canonical order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = CornerKey> + ExactSizeIterator + '_ {
        self.points.keys().copied()
    }

    /// Iterates positions in canonical order.
    pub fn points(&self) -> impl DoubleEndedIterator<Item = Point> + ExactSizeIterator + '_ {
        self.points.values().copied()
    }

    /// Returns a new map with `f` applied to every position.
    #[must_use]
    pub fn map_points(&self, mut f: impl FnMut(Point) -> Point) -> Self {
        self.iter().map(|(k, p)| (k, f(p))).collect()
    }

    /// Returns `true` if the keys are exactly `point0..point{n-1}` for the
    /// given corner count and every position is finite.
    #[must_use]
    pub fn is_complete(&self, corner_count: u8) -> bool {
        self.len() == usize::from(corner_count)
            && (0..corner_count).all(|i| self.get(CornerKey(i)).is_some_and(|p| p.is_finite()))
    }
}

impl FromIterator<(CornerKey, Point)> for Corners {
    fn from_iter<I: IntoIterator<Item = (CornerKey, Point)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl Extend<(CornerKey, Point)> for Corners {
    fn extend<I: IntoIterator<Item = (CornerKey, Point)>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Corners {
    type Item = (&'a CornerKey, &'a Point);
    type IntoIter = btree_map::Iter<'a, CornerKey, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
