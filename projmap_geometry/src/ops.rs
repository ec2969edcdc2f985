// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whole-surface operations on a corner map: move, rotate, scale, hit test.
//!
//! All functions are pure and return a new [`Corners`] value.

use kurbo::{Affine, Point, Vec2};

use crate::corners::Corners;

/// Arithmetic mean of all corner positions; the origin for an empty map.
#[must_use]
pub fn centroid(corners: &Corners) -> Point {
    if corners.is_empty() {
        return Point::ZERO;
    }
    let sum = corners
        .points()
        .fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    (sum / corners.len() as f64).to_point()
}

/// Offsets every corner by `offset`.
#[must_use]
pub fn translate(corners: &Corners, offset: Vec2) -> Corners {
    corners.map_points(|p| p + offset)
}

/// Rotates every corner by `angle` radians about the centroid.
#[must_use]
pub fn rotate(corners: &Corners, angle: f64) -> Corners {
    rotate_about(corners, angle, centroid(corners))
}

/// Rotates every corner by `angle` radians about `pivot`.
#[must_use]
pub fn rotate_about(corners: &Corners, angle: f64, pivot: Point) -> Corners {
    let affine = Affine::rotate_about(angle, pivot);
    corners.map_points(|p| affine * p)
}

/// Scales every corner by `(sx, sy)` about the centroid.
///
/// Pass the same factor twice for a uniform scale.
#[must_use]
pub fn scale(corners: &Corners, sx: f64, sy: f64) -> Corners {
    scale_about(corners, sx, sy, centroid(corners))
}

/// Scales every corner by `(sx, sy)` about `pivot`.
#[must_use]
pub fn scale_about(corners: &Corners, sx: f64, sy: f64, pivot: Point) -> Corners {
    corners.map_points(|p| {
        let d = p - pivot;
        Point::new(pivot.x + d.x * sx, pivot.y + d.y * sy)
    })
}

/// Even-odd ray-casting test against the polygon spanned by the corners in
/// canonical key order.
///
/// Returns `false` when fewer than three corners are present.
#[must_use]
pub fn point_in_polygon(point: Point, corners: &Corners) -> bool {
    if corners.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut prev = match corners.points().next_back() {
        Some(p) => p,
        None => return false,
    };
    for current in corners.points() {
        let crosses = (current.y > point.y) != (prev.y > point.y);
        if crosses {
            let x_at =
                (prev.x - current.x) * (point.y - current.y) / (prev.y - current.y) + current.x;
            if point.x < x_at {
                inside = !inside;
            }
        }
        prev = current;
    }
    inside
}

#[cfg(test)]
mod tests {
    use core::f64::consts::FRAC_PI_2;

    use kurbo::{Point, Size, Vec2};

    use super::*;
    use crate::corners::CornerKey;
    use crate::transform::default_corners;

    fn square() -> Corners {
        Corners::from_points([
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ])
    }

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn centroid_of_square_is_its_middle() {
        assert!(close(centroid(&square()), Point::new(5.0, 5.0)));
        assert_eq!(centroid(&Corners::new()), Point::ZERO);
    }

    #[test]
    fn translation_moves_the_centroid_by_the_offset() {
        let corners = default_corners(5, Size::new(1024.0, 768.0));
        let offset = Vec2::new(-12.5, 40.0);
        let moved = translate(&corners, offset);
        assert!(close(centroid(&moved), centroid(&corners) + offset));
    }

    #[test]
    fn rotation_about_the_centroid_keeps_it_fixed() {
        let corners = Corners::from_points([
            Point::new(3.0, 1.0),
            Point::new(20.0, 4.0),
            Point::new(9.0, 17.0),
        ]);
        let before = centroid(&corners);
        let rotated = rotate(&corners, 0.7);
        assert!(close(centroid(&rotated), before));
    }

    #[test]
    fn quarter_turn_about_pivot() {
        let rotated = rotate_about(&square(), FRAC_PI_2, Point::ZERO);
        assert!(close(rotated.get(CornerKey::new(1)).unwrap(), Point::new(0.0, 10.0)));
    }

    #[test]
    fn scaling_about_the_centroid_keeps_it_fixed() {
        let corners = square();
        let scaled = scale(&corners, 2.0, 0.5);
        assert!(close(centroid(&scaled), centroid(&corners)));
        assert!(close(scaled.get(CornerKey::new(0)).unwrap(), Point::new(-5.0, 2.5)));
    }

    #[test]
    fn scale_about_origin_multiplies_coordinates() {
        let scaled = scale_about(&square(), 3.0, 3.0, Point::ZERO);
        assert!(close(scaled.get(CornerKey::new(2)).unwrap(), Point::new(30.0, 30.0)));
    }

    #[test]
    fn point_in_polygon_basics() {
        let corners = square();
        assert!(point_in_polygon(Point::new(5.0, 5.0), &corners));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &corners));
        assert!(!point_in_polygon(Point::new(5.0, -1.0), &corners));
    }

    #[test]
    fn point_in_polygon_handles_concave_shapes() {
        let arrow = Corners::from_points([
            Point::new(0.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(0.0, 10.0),
            Point::new(4.0, 5.0),
        ]);
        assert!(point_in_polygon(Point::new(6.0, 5.0), &arrow));
        assert!(!point_in_polygon(Point::new(2.0, 5.0), &arrow));
    }

    #[test]
    fn degenerate_polygons_contain_nothing() {
        let line = Corners::from_points([Point::ZERO, Point::new(10.0, 10.0)]);
        assert!(!point_in_polygon(Point::new(5.0, 5.0), &line));
    }
}
