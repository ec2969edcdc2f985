// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::f64::consts::TAU;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect};

use crate::corners::{DEFAULT_SUBDIVISIONS, clamp_corner_count};

/// Parameters of a base mesh.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MeshConfig {
    /// Corner count of the surface, in `[3, 8]`.
    pub corner_count: u8,
    /// Angular segments per corner.
    pub subdivisions: u32,
    /// Concentric vertex rings between the centre and the rim.
    pub rings: u32,
}

impl MeshConfig {
    /// Config for `corner_count` corners with default subdivision and a single ring.
    ///
    /// The corner count is clamped into `[3, 8]`.
    #[must_use]
    pub fn new(corner_count: i64) -> Self {
        Self {
            corner_count: clamp_corner_count(corner_count),
            subdivisions: DEFAULT_SUBDIVISIONS,
            rings: 1,
        }
    }

    /// Sets the number of concentric rings (at least one).
    #[must_use]
    pub fn with_rings(mut self, rings: u32) -> Self {
        self.rings = rings.max(1);
        self
    }

    /// Sets the subdivisions per corner (at least one).
    #[must_use]
    pub fn with_subdivisions(mut self, subdivisions: u32) -> Self {
        self.subdivisions = subdivisions.max(1);
        self
    }

    /// Angular segments around the disc: `corner_count * subdivisions`.
    #[must_use]
    pub fn segments(&self) -> u32 {
        u32::from(clamp_corner_count(self.corner_count.into())) * self.subdivisions.max(1)
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self::new(4)
    }
}

/// A radially subdivided unit disc, the untransformed geometry of a surface.
///
/// The mesh keeps two position buffers. `original_positions` is written once
/// at construction and never modified; `positions` is the live buffer that
/// [`apply_transform`](crate::apply_transform) rewrites in place from the
/// originals, so repeated transforms never compound.
///
/// Layout: vertex 0 is the centre; each ring holds `segments + 1` vertices
/// (the seam vertex is duplicated so UVs stay continuous), innermost ring
/// first. Positions are `[x, y, z]` in `f32`, like GPU vertex attributes.
#[derive(Clone, Debug)]
pub struct BaseMesh {
    config: MeshConfig,
    original_positions: Vec<[f32; 3]>,
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
    bounds: Rect,
    revision: u64,
}

impl BaseMesh {
    /// Builds the base mesh for `config`.
    #[must_use]
    pub fn new(config: MeshConfig) -> Self {
        let config = MeshConfig {
            corner_count: clamp_corner_count(config.corner_count.into()),
            subdivisions: config.subdivisions.max(1),
            rings: config.rings.max(1),
        };
        let segments = config.segments();
        let rings = config.rings;
        let ring_len = segments + 1;
        let vertex_count = 1 + rings as usize * ring_len as usize;

        let mut positions = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);
        positions.push([0.0, 0.0, 0.0]);
        uvs.push([0.5, 0.5]);
        for ring in 1..=rings {
            let radius = f64::from(ring) / f64::from(rings);
            for s in 0..=segments {
                let theta = f64::from(s) / f64::from(segments) * TAU;
                let x = radius * theta.cos();
                let y = radius * theta.sin();
                positions.push(to_vertex(Point::new(x, y), 0.0));
                uvs.push(to_uv(Point::new((x + 1.0) * 0.5, (y + 1.0) * 0.5)));
            }
        }

        let vertex = |ring: u32, s: u32| 1 + (ring - 1) * ring_len + s;
        let mut indices = Vec::with_capacity(segments as usize * (6 * rings as usize - 3));
        for s in 0..segments {
            indices.extend_from_slice(&[0, vertex(1, s), vertex(1, s + 1)]);
        }
        for ring in 2..=rings {
            for s in 0..segments {
                let a = vertex(ring - 1, s);
                let b = vertex(ring, s);
                let c = vertex(ring, s + 1);
                let d = vertex(ring - 1, s + 1);
                indices.extend_from_slice(&[a, b, c, a, c, d]);
            }
        }

        let bounds = bounds_of(&positions);
        Self {
            config,
            original_positions: positions.clone(),
            positions,
            uvs,
            indices,
            bounds,
            revision: 0,
        }
    }

    /// The (clamped) config this mesh was built from.
    #[must_use]
    pub fn config(&self) -> MeshConfig {
        self.config
    }

    /// Corner count the mesh was built for.
    #[must_use]
    pub fn corner_count(&self) -> u8 {
        self.config.corner_count
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// The untransformed positions captured at construction.
    #[must_use]
    pub fn original_positions(&self) -> &[[f32; 3]] {
        &self.original_positions
    }

    /// The live positions, as last written by a transform.
    #[must_use]
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Texture coordinates, one per vertex.
    #[must_use]
    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    /// Triangle list indices.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Axis-aligned bounds of the live positions in the XY plane.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Counter bumped whenever the live positions change.
    ///
    /// Renderers compare it against the value they last uploaded.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Restores the live positions to the originals.
    pub fn reset(&mut self) {
        self.positions.copy_from_slice(&self.original_positions);
        self.finish_update();
    }

    /// Rewrites every live position from its original through `f`.
    ///
    /// Z is left unchanged. The live buffer is reused in place.
    pub(crate) fn remap(&mut self, f: impl Fn(Point) -> Point) {
        for (live, original) in self.positions.iter_mut().zip(&self.original_positions) {
            let source = Point::new(f64::from(original[0]), f64::from(original[1]));
            let target = f(source);
            *live = to_vertex(target, original[2]);
        }
        self.finish_update();
    }

    fn finish_update(&mut self) {
        self.bounds = bounds_of(&self.positions);
        self.revision = self.revision.wrapping_add(1);
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "vertex buffers are f32 by convention"
)]
fn to_vertex(p: Point, z: f32) -> [f32; 3] {
    [p.x as f32, p.y as f32, z]
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "vertex buffers are f32 by convention"
)]
fn to_uv(p: Point) -> [f32; 2] {
    [p.x as f32, p.y as f32]
}

fn bounds_of(positions: &[[f32; 3]]) -> Rect {
    let mut iter = positions
        .iter()
        .map(|v| Point::new(f64::from(v[0]), f64::from(v[1])));
    let Some(first) = iter.next() else {
        return Rect::ZERO;
    };
    iter.fold(Rect::from_points(first, first), |r, p| r.union_pt(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mesh_is_a_single_ring_disc() {
        let mesh = BaseMesh::new(MeshConfig::new(4));
        let segments = 4 * DEFAULT_SUBDIVISIONS as usize;
        assert_eq!(mesh.vertex_count(), 1 + segments + 1);
        assert_eq!(mesh.indices().len(), segments * 3);
        assert_eq!(mesh.uvs().len(), mesh.vertex_count());
        assert_eq!(mesh.positions(), mesh.original_positions());
    }

    #[test]
    fn corner_count_is_clamped() {
        assert_eq!(BaseMesh::new(MeshConfig::new(1)).corner_count(), 3);
        assert_eq!(BaseMesh::new(MeshConfig::new(12)).corner_count(), 8);
        let raw = MeshConfig {
            corner_count: 0,
            subdivisions: 0,
            rings: 0,
        };
        let mesh = BaseMesh::new(raw);
        assert_eq!(mesh.config().corner_count, 3);
        assert_eq!(mesh.config().subdivisions, 1);
        assert_eq!(mesh.config().rings, 1);
    }

    #[test]
    fn rim_vertices_lie_on_the_unit_circle() {
        let mesh = BaseMesh::new(MeshConfig::new(6).with_rings(3));
        let ring_len = mesh.config().segments() as usize + 1;
        let rim_start = 1 + 2 * ring_len;
        for v in &mesh.original_positions()[rim_start..] {
            let r = (f64::from(v[0]).powi(2) + f64::from(v[1]).powi(2)).sqrt();
            assert!((r - 1.0).abs() < 1e-6, "rim vertex off the unit circle: {v:?}");
        }
        let bounds = mesh.bounds();
        assert!((bounds.width() - 2.0).abs() < 1e-6);
        assert!((bounds.height() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn indices_stay_in_range() {
        let mesh = BaseMesh::new(MeshConfig::new(8).with_rings(4));
        let count = u32::try_from(mesh.vertex_count()).unwrap();
        assert!(mesh.indices().iter().all(|&i| i < count));
        let segments = mesh.config().segments() as usize;
        assert_eq!(mesh.indices().len(), segments * 3 + 3 * segments * 6);
    }

    #[test]
    fn reset_restores_originals_and_bumps_revision() {
        let mut mesh = BaseMesh::new(MeshConfig::new(3));
        mesh.remap(|p| Point::new(p.x * 2.0, p.y * 3.0));
        assert_ne!(mesh.positions(), mesh.original_positions());
        assert_eq!(mesh.revision(), 1);
        mesh.reset();
        assert_eq!(mesh.positions(), mesh.original_positions());
        assert_eq!(mesh.revision(), 2);
    }
}
