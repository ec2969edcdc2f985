// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel to clip-space conversion.
//!
//! Clip space spans `[-1, 1]` vertically and `[-aspect, aspect]`
//! horizontally, with Y pointing up.

use kurbo::{Point, Size};

/// Source of the pixel dimensions used for clip-space conversion.
///
/// Implementations report the size of the mounted rendering canvas, if any,
/// and the size of the surrounding viewport. Both are queried on every
/// conversion; nothing is cached, because the canvas may be resized between
/// two calls.
pub trait CanvasBounds {
    /// Size of the mounted canvas in pixels, or `None` if no canvas is mounted.
    fn canvas_size(&self) -> Option<Size>;

    /// Size of the viewport (window) in pixels.
    fn viewport_size(&self) -> Size;
}

/// A plain canvas/viewport size pair.
///
/// Hosts that track layout themselves can update this value on resize and
/// hand it to the conversion functions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CanvasState {
    /// Measured canvas size, `None` while the canvas is not mounted.
    pub canvas: Option<Size>,
    /// Window/viewport size.
    pub viewport: Size,
}

impl CanvasState {
    /// A mounted canvas filling a viewport of the same size.
    #[must_use]
    pub fn mounted(size: Size) -> Self {
        Self {
            canvas: Some(size),
            viewport: size,
        }
    }

    /// No canvas yet; conversions fall back to `viewport`.
    #[must_use]
    pub fn detached(viewport: Size) -> Self {
        Self {
            canvas: None,
            viewport,
        }
    }
}

impl CanvasBounds for CanvasState {
    fn canvas_size(&self) -> Option<Size> {
        self.canvas
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }
}

impl CanvasBounds for Size {
    fn canvas_size(&self) -> Option<Size> {
        Some(*self)
    }

    fn viewport_size(&self) -> Size {
        *self
    }
}

impl<B: CanvasBounds + ?Sized> CanvasBounds for &B {
    fn canvas_size(&self) -> Option<Size> {
        (**self).canvas_size()
    }

    fn viewport_size(&self) -> Size {
        (**self).viewport_size()
    }
}

fn is_laid_out(size: Size) -> bool {
    size.is_finite() && size.width > 0.0 && size.height > 0.0
}

/// Pixel dimensions used for conversion.
///
/// Falls back from the canvas to the viewport when the canvas is missing or
/// has a zero extent, and to `1×1` when neither is usable, so callers never
/// divide by zero.
#[must_use]
pub fn canvas_dimensions(bounds: &impl CanvasBounds) -> Size {
    if let Some(canvas) = bounds.canvas_size().filter(|s| is_laid_out(*s)) {
        return canvas;
    }
    let viewport = bounds.viewport_size();
    if is_laid_out(viewport) {
        viewport
    } else {
        Size::new(1.0, 1.0)
    }
}

/// Converts a pixel X coordinate into aspect-corrected clip space.
///
/// The camera is orthographic with a fixed vertical extent of `[-1, 1]`, so
/// the horizontal extent is `[-aspect, aspect]` with `aspect = width / height`.
#[must_use]
pub fn normalize_x(bounds: &impl CanvasBounds, pixel_x: f64) -> f64 {
    let size = canvas_dimensions(bounds);
    let aspect = size.width / size.height;
    (pixel_x / size.width * 2.0 - 1.0) * aspect
}

/// Converts a pixel Y coordinate into clip space (Y up).
#[must_use]
pub fn normalize_y(bounds: &impl CanvasBounds, pixel_y: f64) -> f64 {
    let size = canvas_dimensions(bounds);
    -((pixel_y / size.height) * 2.0 - 1.0)
}

/// Converts a pixel-space point into clip space.
#[must_use]
pub fn normalize_point(bounds: &impl CanvasBounds, pixel: Point) -> Point {
    Point::new(normalize_x(bounds, pixel.x), normalize_y(bounds, pixel.y))
}

/// Inverse of [`normalize_x`].
#[must_use]
pub fn denormalize_x(bounds: &impl CanvasBounds, clip_x: f64) -> f64 {
    let size = canvas_dimensions(bounds);
    let aspect = size.width / size.height;
    (clip_x / aspect + 1.0) * 0.5 * size.width
}

/// Inverse of [`normalize_y`].
#[must_use]
pub fn denormalize_y(bounds: &impl CanvasBounds, clip_y: f64) -> f64 {
    let size = canvas_dimensions(bounds);
    (1.0 - clip_y) * 0.5 * size.height
}

/// Converts a clip-space point back into pixel space.
#[must_use]
pub fn denormalize_point(bounds: &impl CanvasBounds, clip: Point) -> Point {
    Point::new(denormalize_x(bounds, clip.x), denormalize_y(bounds, clip.y))
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use kurbo::{Point, Size};

    use super::*;

    #[test]
    fn corners_of_the_canvas_map_to_clip_extents() {
        let size = Size::new(1920.0, 1080.0);
        let aspect = 1920.0 / 1080.0;

        let top_left = normalize_point(&size, Point::ZERO);
        assert!((top_left.x + aspect).abs() < 1e-12);
        assert!((top_left.y - 1.0).abs() < 1e-12);

        let bottom_right = normalize_point(&size, Point::new(1920.0, 1080.0));
        assert!((bottom_right.x - aspect).abs() < 1e-12);
        assert!((bottom_right.y + 1.0).abs() < 1e-12);

        let center = normalize_point(&size, Point::new(960.0, 540.0));
        assert!(center.x.abs() < 1e-12);
        assert!(center.y.abs() < 1e-12);
    }

    #[test]
    fn round_trip_within_canvas() {
        let bounds = CanvasState::mounted(Size::new(1280.0, 720.0));
        for &(x, y) in &[(0.0, 0.0), (13.5, 700.25), (640.0, 360.0), (1280.0, 720.0)] {
            let p = Point::new(x, y);
            let back = denormalize_point(&bounds, normalize_point(&bounds, p));
            assert!((back.x - p.x).abs() < 1e-9, "x drifted for {p:?}");
            assert!((back.y - p.y).abs() < 1e-9, "y drifted for {p:?}");
        }
    }

    #[test]
    fn detached_canvas_falls_back_to_viewport() {
        let bounds = CanvasState::detached(Size::new(800.0, 600.0));
        assert_eq!(canvas_dimensions(&bounds), Size::new(800.0, 600.0));

        let collapsed = CanvasState {
            canvas: Some(Size::new(0.0, 600.0)),
            viewport: Size::new(400.0, 300.0),
        };
        assert_eq!(canvas_dimensions(&collapsed), Size::new(400.0, 300.0));
    }

    #[test]
    fn nothing_laid_out_uses_unit_size() {
        let bounds = CanvasState {
            canvas: Some(Size::ZERO),
            viewport: Size::ZERO,
        };
        assert_eq!(canvas_dimensions(&bounds), Size::new(1.0, 1.0));
        let x = normalize_x(&bounds, 0.5);
        assert!(x.is_finite());
    }

    #[test]
    fn dimensions_are_read_on_every_call() {
        struct Resizing {
            width: Cell<f64>,
        }
        impl CanvasBounds for Resizing {
            fn canvas_size(&self) -> Option<Size> {
                Some(Size::new(self.width.get(), 100.0))
            }
            fn viewport_size(&self) -> Size {
                Size::new(self.width.get(), 100.0)
            }
        }

        let bounds = Resizing {
            width: Cell::new(100.0),
        };
        assert!(normalize_x(&bounds, 100.0) > 0.99);
        bounds.width.set(200.0);
        assert!(normalize_x(&bounds, 100.0).abs() < 1e-12);
    }
}
