// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The surface record and its partial forms.

use std::fmt;

use kurbo::Point;
use log::warn;
use projmap_geometry::{CornerKey, Corners};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Stable identifier of a surface, `surface_{n}` for surfaces created here.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(String);

impl SurfaceId {
    const PREFIX: &'static str = "surface_";

    /// Wraps an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier for sequence number `n`.
    #[must_use]
    pub fn from_sequence(n: u64) -> Self {
        Self(format!("{}{n}", Self::PREFIX))
    }

    /// The sequence number of a `surface_{n}` identifier.
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(Self::PREFIX)?.parse().ok()
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SurfaceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Hands out `surface_{n}` ids above every sequence it has observed.
///
/// Once the sequence is exhausted, ids fall back to `surface_{uuid}` names,
/// which carry no sequence and cannot collide.
#[derive(Clone, Debug)]
pub(crate) struct IdAllocator {
    next: Option<u64>,
}

impl IdAllocator {
    /// An allocator numbering after every id in `ids`.
    pub(crate) fn after<'a>(ids: impl IntoIterator<Item = &'a SurfaceId>) -> Self {
        let mut allocator = Self { next: Some(1) };
        for id in ids {
            allocator.observe(id);
        }
        allocator
    }

    /// Moves the sequence past `id`.
    pub(crate) fn observe(&mut self, id: &SurfaceId) {
        let Some(sequence) = id.sequence() else {
            return;
        };
        self.next = match (self.next, sequence.checked_add(1)) {
            (Some(next), Some(after)) => Some(next.max(after)),
            _ => None,
        };
    }

    /// The next unused id.
    pub(crate) fn allocate(&mut self) -> SurfaceId {
        match self.next {
            Some(n) => {
                self.next = n.checked_add(1);
                SurfaceId::from_sequence(n)
            }
            None => {
                let id = SurfaceId(format!("{}{}", SurfaceId::PREFIX, Uuid::new_v4().simple()));
                warn!("surface id sequence exhausted, using `{id}`");
                id
            }
        }
    }
}

/// Name of the visual material drawn on a surface.
///
/// Opaque here; the content layer interprets it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentType(String);

impl ContentType {
    /// Content type of new surfaces.
    pub const COLOR: &'static str = "color";

    /// Wraps a content type name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::new(Self::COLOR)
    }
}

/// Mesh family of a surface. Only polygons exist.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryType {
    /// A radially subdivided disc warped onto the corner polygon.
    #[default]
    Polygon,
}

/// Top-level application mode, shared across tabs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    /// Arrange surfaces and edit their content.
    #[default]
    Edit,
    /// Drag corners to match physical targets.
    Calibrate,
    /// Full-screen output without handles.
    Present,
}

/// A projection surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surface {
    /// Unique, stable identifier.
    pub id: SurfaceId,
    /// Display name.
    pub name: String,
    /// Material selector for the content layer.
    pub content_type: ContentType,
    /// Material parameters, owned by the content layer.
    #[serde(default)]
    pub content_data: Value,
    /// Always [`GeometryType::Polygon`].
    pub geometry_type: GeometryType,
    /// Number of corners, in `3..=8`.
    pub corner_count: u8,
    /// Pixel-space corners; always complete for `corner_count`.
    #[serde(with = "corners_serde")]
    pub corners: Corners,
    /// Whether the surface is drawn.
    pub visible: bool,
    /// Draw order; higher draws later.
    pub render_order: i64,
    /// Whether content reacts to audio.
    pub audio_reactive: bool,
}

/// Options for a new surface. Unset fields take defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceConfig {
    /// Display name; defaults to `Surface {n}`.
    pub name: Option<String>,
    /// Defaults to [`ContentType::COLOR`].
    pub content_type: Option<ContentType>,
    /// Defaults to `null`.
    pub content_data: Option<Value>,
    /// Clamped into `3..=8`; defaults to 4.
    pub corner_count: Option<i64>,
    /// Initial corners; defaults are generated when unset or incomplete.
    pub corners: Option<Corners>,
    /// Defaults to `true`.
    pub visible: Option<bool>,
    /// Defaults to one above the current top surface.
    pub render_order: Option<i64>,
    /// Defaults to `false`.
    pub audio_reactive: Option<bool>,
}

/// A partial update merged over an existing surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New material selector.
    pub content_type: Option<ContentType>,
    /// New material parameters.
    pub content_data: Option<Value>,
    /// New corner count; clamped into `3..=8`.
    pub corner_count: Option<i64>,
    /// New corners; must be complete for the resulting corner count.
    pub corners: Option<Corners>,
    /// New visibility.
    pub visible: Option<bool>,
    /// New draw order.
    pub render_order: Option<i64>,
    /// New audio reactivity.
    pub audio_reactive: Option<bool>,
}

impl SurfaceUpdate {
    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `{ "x": .., "y": .. }`
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub(crate) struct PointRecord {
    pub(crate) x: f64,
    pub(crate) y: f64,
}

impl From<Point> for PointRecord {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<PointRecord> for Point {
    fn from(p: PointRecord) -> Self {
        Self::new(p.x, p.y)
    }
}

/// Corners as `{ "point0": {"x":..,"y":..}, ... }`.
pub(crate) mod corners_serde {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::ser::SerializeMap as _;
    use serde::{Deserializer, Serializer};

    use super::*;

    pub(crate) fn serialize<S: Serializer>(
        corners: &Corners,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(corners.len()))?;
        for (key, point) in corners.iter() {
            map.serialize_entry(&key.to_string(), &PointRecord::from(point))?;
        }
        map.end()
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Corners, D::Error> {
        let raw = BTreeMap::<String, PointRecord>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(name, point)| {
                let key = name
                    .parse::<CornerKey>()
                    .map_err(|_| D::Error::custom(format!("unknown corner key `{name}`")))?;
                Ok((key, Point::from(point)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Surface {
        Surface {
            id: SurfaceId::from_sequence(3),
            name: "Wall".into(),
            content_type: ContentType::default(),
            content_data: Value::Null,
            geometry_type: GeometryType::Polygon,
            corner_count: 3,
            corners: Corners::from_points([
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(5.0, 8.0),
            ]),
            visible: true,
            render_order: 2,
            audio_reactive: false,
        }
    }

    #[test]
    fn ids_carry_their_sequence() {
        assert_eq!(SurfaceId::from_sequence(12).as_str(), "surface_12");
        assert_eq!(SurfaceId::from_sequence(12).sequence(), Some(12));
        assert_eq!(SurfaceId::new("imported").sequence(), None);
        assert_eq!(SurfaceId::new("surface_x").sequence(), None);
    }

    #[test]
    fn allocator_numbers_after_observed_ids() {
        let existing = [SurfaceId::new("surface_4"), SurfaceId::new("legacy")];
        let mut ids = IdAllocator::after(&existing);
        assert_eq!(ids.allocate().as_str(), "surface_5");
        ids.observe(&SurfaceId::from_sequence(2));
        assert_eq!(ids.allocate().as_str(), "surface_6");
    }

    #[test]
    fn exhausted_allocator_falls_back_to_unique_ids() {
        let last = SurfaceId::from_sequence(u64::MAX - 1);
        let mut ids = IdAllocator::after([&last]);
        assert_eq!(ids.allocate(), SurfaceId::from_sequence(u64::MAX));
        let a = ids.allocate();
        let b = ids.allocate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("surface_"));
        assert_eq!(a.sequence(), None);

        let mut ids = IdAllocator::after([&SurfaceId::from_sequence(u64::MAX)]);
        assert_eq!(ids.allocate().sequence(), None);
    }

    #[test]
    fn surface_uses_camel_case_and_point_keys() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["contentType"], json!("color"));
        assert_eq!(value["geometryType"], json!("polygon"));
        assert_eq!(value["cornerCount"], json!(3));
        assert_eq!(value["renderOrder"], json!(2));
        assert_eq!(value["audioReactive"], json!(false));
        assert_eq!(value["corners"]["point2"], json!({"x": 5.0, "y": 8.0}));
    }

    #[test]
    fn legacy_corner_names_deserialize() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["corners"] = json!({
            "topLeft": {"x": 0.0, "y": 0.0},
            "topRight": {"x": 1.0, "y": 0.0},
            "bottomRight": {"x": 1.0, "y": 1.0},
            "bottomLeft": {"x": 0.0, "y": 1.0},
        });
        let surface: Surface = serde_json::from_value(value).unwrap();
        assert_eq!(surface.corners.get(CornerKey::new(2)), Some(Point::new(1.0, 1.0)));
    }

    #[test]
    fn unknown_corner_names_are_rejected() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["corners"]["middle"] = json!({"x": 0.0, "y": 0.0});
        assert!(serde_json::from_value::<Surface>(value).is_err());
    }
}
