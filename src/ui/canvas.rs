// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and annotation.
//!
//! This module provides the main canvas area: it forwards pointer and wheel
//! input to the [`ViewportController`] in canvas-local screen coordinates
//! and paints the session through an egui-backed [`Canvas`].

use egui::{Color32, Pos2, Rect, Sense, TextureHandle};

use crate::editor::controller::{EditMode, KeyCommand, ViewportController};
use crate::models::annotation::Point;
use crate::models::color::Rgba;
use crate::models::session::ImageFrame;
use crate::ui::renderer::{Canvas, Stroke};

const BACKGROUND: Color32 = Color32::from_gray(40);

/// Pointer press state carried between frames.
#[derive(Debug, Default)]
pub struct PointerTracker {
    active: bool,
    /// Last canvas-local position seen while pressed.
    last: Option<Point>,
}

impl PointerTracker {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn press(&mut self, controller: &mut ViewportController, at: Point) {
        self.active = true;
        self.last = Some(at);
        controller.pointer_down(at);
    }

    pub fn moved(&mut self, controller: &mut ViewportController, at: Point) {
        if self.active {
            self.last = Some(at);
            controller.pointer_move(at);
        }
    }

    /// End the press. Without a current position (pointer left the window)
    /// the last known one is used.
    pub fn release(&mut self, controller: &mut ViewportController, at: Option<Point>) {
        if !std::mem::take(&mut self.active) {
            return;
        }
        match at.or(self.last.take()) {
            Some(at) => controller.pointer_up(at),
            None => controller.key(KeyCommand::Cancel),
        }
        self.last = None;
    }
}

/// [`Canvas`] over an egui painter. Keeps its own pan/zoom transform since
/// egui paints in screen points.
struct EguiCanvas<'a> {
    painter: &'a egui::Painter,
    origin: Pos2,
    pan: Point,
    zoom: f64,
    texture: Option<(&'a str, &'a TextureHandle)>,
}

impl EguiCanvas<'_> {
    fn to_screen(&self, x: f64, y: f64) -> Pos2 {
        Pos2::new(
            self.origin.x + (x * self.zoom + self.pan.x) as f32,
            self.origin.y + (y * self.zoom + self.pan.y) as f32,
        )
    }

    fn stroke(&self, stroke: Stroke) -> egui::Stroke {
        let Rgba { r, g, b, a } = stroke.color;
        egui::Stroke::new(
            (stroke.width * self.zoom) as f32,
            Color32::from_rgba_unmultiplied(r, g, b, a),
        )
    }
}

impl Canvas for EguiCanvas<'_> {
    fn clear(&mut self) {
        self.painter.rect_filled(self.painter.clip_rect(), 0.0, BACKGROUND);
    }

    fn set_transform(&mut self, pan: Point, zoom: f64) {
        self.pan = pan;
        self.zoom = zoom;
    }

    fn reset_transform(&mut self) {
        self.pan = Point::ZERO;
        self.zoom = 1.0;
    }

    fn draw_image(&mut self, frame: &ImageFrame) {
        let Some((url, texture)) = self.texture else {
            return;
        };
        if url != frame.source_url {
            return;
        }
        let rect = Rect::from_min_max(
            self.to_screen(frame.offset_x, frame.offset_y),
            self.to_screen(
                frame.offset_x + frame.display_width,
                frame.offset_y + frame.display_height,
            ),
        );
        self.painter.image(
            texture.id(),
            rect,
            Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, stroke: Stroke) {
        let rect = Rect::from_two_pos(self.to_screen(x, y), self.to_screen(x + width, y + height));
        self.painter.rect_stroke(rect, 0.0, self.stroke(stroke));
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, stroke: Stroke) {
        self.painter.circle_stroke(
            self.to_screen(center.x, center.y),
            (radius * self.zoom) as f32,
            self.stroke(stroke),
        );
    }
}

/// Display the main canvas area and handle mouse interactions.
pub fn show(
    ui: &mut egui::Ui,
    controller: &mut ViewportController,
    pointer: &mut PointerTracker,
    texture: Option<(&str, &TextureHandle)>,
    loading_message: Option<&str>,
) {
    let mut available = ui.available_size();
    available.y = (available.y - 28.0).max(0.0);
    let (rect, response) = ui.allocate_exact_size(available, Sense::click_and_drag());
    controller.set_canvas_size(rect.width() as f64, rect.height() as f64);

    let to_local = |pos: Pos2| Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);

    // Pointer input
    let (pressed, released, moved, pos, scroll) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.delta() != egui::Vec2::ZERO,
            i.pointer.latest_pos(),
            i.raw_scroll_delta.y,
        )
    });

    if let Some(pos) = pos {
        if pressed && response.hovered() {
            pointer.press(controller, to_local(pos));
        } else if moved {
            pointer.moved(controller, to_local(pos));
        }
        if response.hovered() && scroll != 0.0 {
            // egui reports scrolling up as positive
            controller.wheel(-(scroll as f64), to_local(pos));
        }
    }
    if released {
        pointer.release(controller, pos.map(to_local));
    }

    if response.hovered() && controller.has_image() {
        let icon = match controller.mode() {
            EditMode::PanZoom if pointer.is_active() => egui::CursorIcon::Grabbing,
            EditMode::PanZoom => egui::CursorIcon::Grab,
            EditMode::Draw(_) => egui::CursorIcon::Crosshair,
        };
        ui.ctx().set_cursor_icon(icon);
    }

    // Paint
    let painter = ui.painter_at(rect);
    let mut canvas = EguiCanvas {
        painter: &painter,
        origin: rect.min,
        pan: Point::ZERO,
        zoom: 1.0,
        texture,
    };
    controller.render(&mut canvas);

    if !controller.has_image() {
        let message = loading_message.unwrap_or("Drop an image here, or use File → Open Image...");
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            message,
            egui::FontId::proportional(18.0),
            Color32::from_gray(180),
        );
    }

    // Status line
    ui.separator();
    ui.horizontal(|ui| {
        let mode = match controller.mode() {
            EditMode::PanZoom => "Pan/Zoom".to_string(),
            EditMode::Draw(kind) => format!("Draw {}", kind),
        };
        ui.label(format!("Mode: {}", mode));
        ui.separator();
        ui.label(format!("Zoom: {:.0}%", controller.view().zoom() * 100.0));
        ui.separator();
        ui.label(egui::RichText::new(controller.hint()).italics().weak());
    });
}
