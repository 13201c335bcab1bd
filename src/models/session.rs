// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editing session state.
//!
//! A session is the image reference, the current view transform and the
//! annotation collection for one visit. It is replaced wholesale on "New"
//! and "Import".

use super::annotation::Point;
use crate::editor::store::AnnotationStore;
use crate::util::geometry;

/// Smallest allowed zoom factor.
pub const ZOOM_MIN: f64 = 0.5;
/// Largest allowed zoom factor.
pub const ZOOM_MAX: f64 = 5.0;

/// Pan/zoom transform applied when mapping image space to screen space.
///
/// `pan` is in screen pixels and only meaningful together with the `zoom`
/// it was computed for, so both are read and replaced as one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    zoom: f64,
    pan: Point,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::ZERO,
        }
    }
}

impl ViewState {
    /// Create a view, clamping `zoom` to `[ZOOM_MIN, ZOOM_MAX]`.
    pub fn new(zoom: f64, pan: Point) -> Self {
        Self {
            zoom: clamp_zoom(zoom),
            pan,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }
}

/// Clamp a zoom factor into the allowed range. NaN maps to 1.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        1.0
    } else {
        zoom.clamp(ZOOM_MIN, ZOOM_MAX)
    }
}

/// Where and how large the loaded image is drawn in image space.
///
/// Computed once per image load from the canvas size at that moment.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFrame {
    pub source_url: String,
    pub natural_width: u32,
    pub natural_height: u32,
    pub display_width: f64,
    pub display_height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ImageFrame {
    /// Fit an image of the given natural size into the canvas.
    pub fn fit(
        source_url: impl Into<String>,
        natural_width: u32,
        natural_height: u32,
        canvas_width: f64,
        canvas_height: f64,
    ) -> Self {
        let fit = geometry::fit_image(
            natural_width as f64,
            natural_height as f64,
            canvas_width,
            canvas_height,
        );
        Self {
            source_url: source_url.into(),
            natural_width,
            natural_height,
            display_width: fit.width,
            display_height: fit.height,
            offset_x: fit.offset_x,
            offset_y: fit.offset_y,
        }
    }
}

/// The complete in-memory editing state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Image reference, set as soon as a load is requested.
    pub image_url: Option<String>,
    /// Display geometry, set once the image has decoded.
    pub frame: Option<ImageFrame>,
    pub view: ViewState,
    pub annotations: AnnotationStore,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_image(&self) -> bool {
        self.frame.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_state_clamps_zoom() {
        assert_eq!(ViewState::new(0.1, Point::ZERO).zoom(), ZOOM_MIN);
        assert_eq!(ViewState::new(42.0, Point::ZERO).zoom(), ZOOM_MAX);
        assert_eq!(ViewState::new(f64::NAN, Point::ZERO).zoom(), 1.0);
        assert_eq!(ViewState::new(2.5, Point::new(3.0, 4.0)).pan(), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_image_frame_fit_centers_wide_image() {
        let frame = ImageFrame::fit("file:///a.png", 2000, 1000, 800.0, 600.0);
        assert_eq!(frame.display_width, 800.0);
        assert_eq!(frame.display_height, 400.0);
        assert_eq!(frame.offset_x, 0.0);
        assert_eq!(frame.offset_y, 100.0);
    }
}
