// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Coordinate transformations between screen space (canvas pixels) and
//! image space (independent of zoom and pan), plus the zoom and pan
//! operations on a [`ViewState`]. Everything here is a pure function.

use crate::models::annotation::Point;
use crate::models::session::{clamp_zoom, ViewState};

/// Convert a screen point to image space: `(screen - pan) / zoom`.
pub fn screen_to_image(screen: Point, view: &ViewState) -> Point {
    let pan = view.pan();
    Point {
        x: (screen.x - pan.x) / view.zoom(),
        y: (screen.y - pan.y) / view.zoom(),
    }
}

/// Convert an image-space point to screen space: `image * zoom + pan`.
pub fn image_to_screen(image: Point, view: &ViewState) -> Point {
    let pan = view.pan();
    Point {
        x: image.x * view.zoom() + pan.x,
        y: image.y * view.zoom() + pan.y,
    }
}

/// Change zoom by `delta`, keeping the image point under `focus` fixed on screen.
///
/// `new_pan = focus - (new_zoom / old_zoom) * (focus - old_pan)`
pub fn zoom_at(view: &ViewState, delta: f64, focus: Point) -> ViewState {
    let old_zoom = view.zoom();
    let new_zoom = clamp_zoom(old_zoom + delta);
    if new_zoom == old_zoom {
        return *view;
    }
    let factor = new_zoom / old_zoom;
    let pan = view.pan();
    ViewState::new(
        new_zoom,
        Point {
            x: focus.x - factor * (focus.x - pan.x),
            y: focus.y - factor * (focus.y - pan.y),
        },
    )
}

/// Translate the view by `delta` screen pixels. Not bounded by the image.
pub fn pan_by(view: &ViewState, delta: Point) -> ViewState {
    ViewState::new(view.zoom(), view.pan() + delta)
}

/// Size and offset of an image scaled to fit a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Scale an image to fit the canvas, preserving aspect ratio, and center it.
pub fn fit_image(image_width: f64, image_height: f64, canvas_width: f64, canvas_height: f64) -> Fit {
    if image_width <= 0.0 || image_height <= 0.0 || canvas_width <= 0.0 || canvas_height <= 0.0 {
        return Fit {
            width: image_width.max(0.0),
            height: image_height.max(0.0),
            offset_x: 0.0,
            offset_y: 0.0,
        };
    }

    let image_aspect = image_width / image_height;
    let canvas_aspect = canvas_width / canvas_height;

    let (width, height) = if image_aspect > canvas_aspect {
        // Image is wider - fit to width
        (canvas_width, canvas_width / image_aspect)
    } else {
        // Image is taller - fit to height
        (canvas_height * image_aspect, canvas_height)
    };

    Fit {
        width,
        height,
        offset_x: (canvas_width - width) / 2.0,
        offset_y: (canvas_height - height) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::{ZOOM_MAX, ZOOM_MIN};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_screen_image_roundtrip() {
        let view = ViewState::new(2.5, Point::new(-40.0, 17.0));
        let screen = Point::new(123.0, 456.0);
        let back = image_to_screen(screen_to_image(screen, &view), &view);

        assert!(approx(back.x, screen.x));
        assert!(approx(back.y, screen.y));
    }

    #[test]
    fn test_zoom_at_reference_example() {
        let view = ViewState::default();
        let focus = Point::new(400.0, 300.0);
        let zoomed = zoom_at(&view, 0.1, focus);

        assert!(approx(zoomed.zoom(), 1.1));
        let image_point = screen_to_image(focus, &view);
        assert_eq!(image_point, Point::new(400.0, 300.0));
        let screen = image_to_screen(image_point, &zoomed);
        assert!(approx(screen.x, 400.0));
        assert!(approx(screen.y, 300.0));
    }

    #[test]
    fn test_zoom_at_preserves_anchor() {
        let views = [
            ViewState::new(1.0, Point::ZERO),
            ViewState::new(0.75, Point::new(120.0, -33.0)),
            ViewState::new(3.2, Point::new(-500.0, 250.0)),
        ];
        let focuses = [Point::new(0.0, 0.0), Point::new(640.0, 12.5), Point::new(-20.0, 900.0)];
        let deltas = [0.1, -0.2, 0.9, -0.05];

        for view in &views {
            for focus in &focuses {
                for delta in &deltas {
                    let anchor = screen_to_image(*focus, view);
                    let zoomed = zoom_at(view, *delta, *focus);
                    let screen = image_to_screen(anchor, &zoomed);
                    assert!(approx(screen.x, focus.x), "{view:?} {focus:?} {delta}");
                    assert!(approx(screen.y, focus.y), "{view:?} {focus:?} {delta}");
                }
            }
        }
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = ViewState::default();
        for _ in 0..200 {
            view = zoom_at(&view, 0.7, Point::new(10.0, 10.0));
        }
        assert_eq!(view.zoom(), ZOOM_MAX);

        for _ in 0..200 {
            view = zoom_at(&view, -1.3, Point::new(10.0, 10.0));
        }
        assert_eq!(view.zoom(), ZOOM_MIN);

        // At the bound a further step leaves the view untouched
        let stuck = zoom_at(&view, -0.1, Point::new(99.0, 99.0));
        assert_eq!(stuck, view);
    }

    #[test]
    fn test_pan_by_is_unbounded() {
        let view = ViewState::new(2.0, Point::new(5.0, 5.0));
        let panned = pan_by(&view, Point::new(-10_000.0, 3.0));

        assert_eq!(panned.pan(), Point::new(-9_995.0, 8.0));
        assert_eq!(panned.zoom(), 2.0);
    }

    #[test]
    fn test_fit_tall_image() {
        let fit = fit_image(500.0, 1000.0, 800.0, 600.0);
        assert_eq!(fit.width, 300.0);
        assert_eq!(fit.height, 600.0);
        assert_eq!(fit.offset_x, 250.0);
        assert_eq!(fit.offset_y, 0.0);
    }
}
