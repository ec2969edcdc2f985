// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Encoding and tolerant decoding of the persisted surface list.
//!
//! Persisted data may be partial or come from older versions. Decoding never
//! fails: unreadable input yields an empty list, and defective records are
//! repaired with defaults. Every repair is logged at warn level.

use std::collections::HashSet;

use kurbo::Size;
use log::warn;
use projmap_geometry::{CornerKey, Corners, clamp_corner_count, default_corners_with_radius};
use serde::Deserialize as _;
use serde_json::{Map, Value};

use crate::surface::{ContentType, GeometryType, IdAllocator, PointRecord, Surface, SurfaceId};

/// Encodes surfaces as a JSON array.
pub fn encode_surfaces(surfaces: &[Surface]) -> Result<String, serde_json::Error> {
    serde_json::to_string(surfaces)
}

/// Decodes a persisted surface list, repairing what it can.
///
/// Missing corners are regenerated for `viewport` using `radius_fraction`.
/// Records without a usable id receive `surface_{n}` ids numbered after the
/// highest existing one. Render orders are renormalized to `0..len`,
/// preserving their relative order.
#[must_use]
pub fn decode_surfaces(raw: &str, viewport: Size, radius_fraction: f64) -> Vec<Surface> {
    let records = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            warn!("persisted surfaces are not a JSON array, starting empty");
            return Vec::new();
        }
        Err(err) => {
            warn!("persisted surfaces are not valid JSON ({err}), starting empty");
            return Vec::new();
        }
    };

    let mut surfaces = Vec::with_capacity(records.len());
    let mut needs_id = Vec::new();
    let mut seen = HashSet::new();
    for (index, record) in records.iter().enumerate() {
        let Some(fields) = record.as_object() else {
            warn!("skipping persisted surface #{index}: not an object");
            continue;
        };
        let id = match fields.get("id").and_then(Value::as_str) {
            Some(id) if seen.insert(id.to_owned()) => Some(SurfaceId::new(id)),
            Some(id) => {
                warn!("persisted surface #{index} reuses id `{id}`, assigning a new one");
                None
            }
            None => {
                warn!("persisted surface #{index} has no id, assigning one");
                None
            }
        };
        if id.is_none() {
            needs_id.push(surfaces.len());
        }
        let id = id.unwrap_or_else(|| SurfaceId::new(""));
        surfaces.push(repair(index, id, fields, viewport, radius_fraction));
    }

    let mut ids = IdAllocator::after(surfaces.iter().map(|s| &s.id));
    for slot in needs_id {
        surfaces[slot].id = ids.allocate();
    }

    renormalize_render_orders(&mut surfaces);
    surfaces
}

/// Reassigns render orders to `0..len` in current relative order.
///
/// Ties keep list order.
pub(crate) fn renormalize_render_orders(surfaces: &mut [Surface]) {
    let mut ranked: Vec<usize> = (0..surfaces.len()).collect();
    ranked.sort_by_key(|&i| surfaces[i].render_order);
    for (rank, i) in ranked.into_iter().enumerate() {
        surfaces[i].render_order = i64::try_from(rank).unwrap_or(i64::MAX);
    }
}

fn repair(
    index: usize,
    id: SurfaceId,
    fields: &Map<String, Value>,
    viewport: Size,
    radius_fraction: f64,
) -> Surface {
    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .map_or_else(|| format!("Surface {}", index + 1), str::to_owned);
    let content_type = fields
        .get("contentType")
        .and_then(Value::as_str)
        .map(ContentType::new)
        .unwrap_or_default();
    let content_data = fields.get("contentData").cloned().unwrap_or(Value::Null);

    match fields.get("geometryType").and_then(Value::as_str) {
        Some("polygon") => {}
        Some(other) => warn!("surface `{id}`: geometry type `{other}` replaced with polygon"),
        None => warn!("surface `{id}`: missing geometry type, using polygon"),
    }

    let parsed = parse_corners(&id, fields.get("corners"));
    let corner_count = match fields.get("cornerCount").and_then(Value::as_i64) {
        Some(count) => clamp_corner_count(count),
        None => {
            let inferred = parsed
                .as_ref()
                .map_or(4, |c| i64::try_from(c.len()).unwrap_or(4));
            let count = clamp_corner_count(inferred);
            warn!("surface `{id}`: missing corner count, using {count}");
            count
        }
    };

    let corners = match parsed {
        Some(parsed) => {
            let trimmed: Corners = parsed
                .iter()
                .filter(|(key, _)| key.index() < corner_count)
                .collect();
            if trimmed.is_complete(corner_count) {
                if trimmed.len() != parsed.len() {
                    warn!("surface `{id}`: dropped corners beyond point{}", corner_count - 1);
                }
                trimmed
            } else {
                warn!("surface `{id}`: incomplete corners, using defaults");
                default_corners_with_radius(corner_count.into(), viewport, radius_fraction)
            }
        }
        None => {
            warn!("surface `{id}`: missing corners, using defaults");
            default_corners_with_radius(corner_count.into(), viewport, radius_fraction)
        }
    };

    Surface {
        id,
        name,
        content_type,
        content_data,
        geometry_type: GeometryType::Polygon,
        corner_count,
        corners,
        visible: fields.get("visible").and_then(Value::as_bool).unwrap_or(true),
        render_order: fields
            .get("renderOrder")
            .and_then(Value::as_i64)
            .unwrap_or_else(|| i64::try_from(index).unwrap_or(i64::MAX)),
        audio_reactive: fields
            .get("audioReactive")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn parse_corners(id: &SurfaceId, value: Option<&Value>) -> Option<Corners> {
    let map = value?.as_object()?;
    let mut corners = Corners::new();
    for (name, point) in map {
        let Ok(key) = name.parse::<CornerKey>() else {
            warn!("surface `{id}`: ignoring unknown corner key `{name}`");
            continue;
        };
        match PointRecord::deserialize(point) {
            Ok(p) if p.x.is_finite() && p.y.is_finite() => {
                corners.insert(key, p.into());
            }
            _ => warn!("surface `{id}`: ignoring malformed corner `{name}`"),
        }
    }
    Some(corners)
}
