// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Canvas painting.
//!
//! [`render`] paints one frame through the [`Canvas`] trait, so the same
//! paint order runs against egui and against test recorders. Paint order is
//! image, committed annotations in collection order, then the drag preview
//! on top. Shapes are only stroked, never filled.

use crate::models::annotation::{Annotation, Point, Shape};
use crate::models::color::{ColorCache, Rgba};
use crate::models::session::{ImageFrame, ViewState};

/// Screen width of an unselected outline.
pub const LINE_WIDTH: f64 = 2.0;
/// Screen width of the selected outline.
pub const SELECTED_LINE_WIDTH: f64 = 8.0;

/// Stroke style. `width` is in the current (transformed) units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
}

/// A 2D drawing surface with a single pan/zoom transform.
pub trait Canvas {
    /// Clear the whole surface.
    fn clear(&mut self);

    /// Translate by `pan`, then scale by `zoom`, for subsequent drawing.
    fn set_transform(&mut self, pan: Point, zoom: f64);

    fn reset_transform(&mut self);

    /// Draw the loaded image at its frame position.
    fn draw_image(&mut self, frame: &ImageFrame);

    /// Stroke a rectangle. Extents may be negative.
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, stroke: Stroke);

    fn stroke_circle(&mut self, center: Point, radius: f64, stroke: Stroke);
}

/// Paint the image, the annotations and the optional drag preview.
///
/// With no image frame the canvas is only cleared. Annotation colours that
/// do not parse are stroked white.
pub fn render<C: Canvas + ?Sized>(
    canvas: &mut C,
    frame: Option<&ImageFrame>,
    view: &ViewState,
    annotations: &[Annotation],
    preview: Option<&Shape>,
    preview_color: Rgba,
    colors: &mut ColorCache,
) {
    canvas.clear();

    let Some(frame) = frame else {
        return;
    };

    let zoom = view.zoom();
    canvas.set_transform(view.pan(), zoom);
    canvas.draw_image(frame);

    for annotation in annotations {
        let width = if annotation.selected {
            SELECTED_LINE_WIDTH
        } else {
            LINE_WIDTH
        };
        let stroke = Stroke {
            color: colors.resolve(&annotation.color, Rgba::WHITE),
            width: width / zoom,
        };
        stroke_shape(canvas, &annotation.shape, stroke);
    }

    if let Some(shape) = preview {
        let stroke = Stroke {
            color: preview_color,
            width: LINE_WIDTH / zoom,
        };
        stroke_shape(canvas, shape, stroke);
    }

    canvas.reset_transform();
}

fn stroke_shape<C: Canvas + ?Sized>(canvas: &mut C, shape: &Shape, stroke: Stroke) {
    match *shape {
        Shape::Rectangle {
            x,
            y,
            width,
            height,
        } => canvas.stroke_rect(x, y, width, height, stroke),
        Shape::Circle { x, y, radius } => canvas.stroke_circle(Point::new(x, y), radius, stroke),
    }
}
