// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session controller.
//!
//! Owns the editing session and routes pointer, wheel and keyboard input to
//! the view transform, the shape editor and the annotation store. The host
//! UI calls in with screen coordinates relative to the canvas origin and
//! repaints whenever [`ViewportController::take_repaint`] reports a change.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::shape_editor::ShapeEditor;
use super::store::AnnotationStore;
use crate::config::EditorConfig;
use crate::error::SessionError;
use crate::io::serialization::{self, SessionDocument};
use crate::models::annotation::{OrganismClass, Point, Shape, ShapeKind};
use crate::models::color::{ColorCache, Rgba};
use crate::models::session::{ImageFrame, Session, ViewState};
use crate::ui::renderer::{self, Canvas};
use crate::util::geometry;

/// Fallback preview colour when the configured one does not parse.
const DEFAULT_PREVIEW_COLOR: Rgba = Rgba::rgb(0, 191, 255);

/// What pointer drags do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    PanZoom,
    Draw(ShapeKind),
}

/// Keyboard actions understood by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    ZoomIn,
    ZoomOut,
    /// Abort the shape being drawn.
    Cancel,
    DeleteSelected,
}

pub struct ViewportController {
    session: Session,
    mode: EditMode,
    editor: ShapeEditor,
    preview: Option<Shape>,
    /// Last pointer position while a pan drag is active.
    pan_cursor: Option<Point>,
    /// Where the current pan-mode press started, for click detection.
    press_origin: Option<Point>,
    /// URL whose load result is still awaited.
    pending_image: Option<String>,
    canvas_size: (f64, f64),
    config: EditorConfig,
    preview_color: Rgba,
    colors: ColorCache,
    /// Bumped whenever the session is replaced wholesale.
    generation: u64,
    rng: StdRng,
    dirty: bool,
}

impl ViewportController {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create with an explicit random source for class assignment.
    pub fn with_rng(config: EditorConfig, rng: StdRng) -> Self {
        let preview_color = Rgba::parse_or(&config.preview_color, DEFAULT_PREVIEW_COLOR);
        Self {
            session: Session::new(),
            mode: EditMode::default(),
            editor: ShapeEditor::new(),
            preview: None,
            pan_cursor: None,
            press_origin: None,
            pending_image: None,
            canvas_size: (800.0, 600.0),
            config,
            preview_color,
            colors: ColorCache::new(),
            generation: 0,
            rng,
            dirty: true,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn view(&self) -> ViewState {
        self.session.view
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.session.annotations
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn preview(&self) -> Option<&Shape> {
        self.preview.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn pending_image(&self) -> Option<&str> {
        self.pending_image.as_deref()
    }

    /// Identifies the current session. Work started under an older
    /// generation belongs to a session that has since been replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_image(&self) -> bool {
        self.session.has_image()
    }

    /// Return and clear the repaint request.
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn set_view(&mut self, view: ViewState) {
        if view != self.session.view {
            self.session.view = view;
            self.dirty = true;
        }
    }

    fn set_annotations(&mut self, annotations: AnnotationStore) {
        self.session.annotations = annotations;
        self.dirty = true;
    }

    fn cancel_drag(&mut self) {
        if self.editor.cancel() {
            log::debug!("Cancelled in-progress shape");
            self.preview = None;
            self.dirty = true;
        }
    }

    /// Switch mode. Any change, including shape kind, cancels a drag in progress.
    pub fn set_mode(&mut self, mode: EditMode) {
        if mode == self.mode {
            return;
        }
        self.cancel_drag();
        self.pan_cursor = None;
        self.press_origin = None;
        self.mode = mode;
        log::debug!("Mode changed to {:?}", mode);
    }

    /// Canvas size used to fit images loaded from now on.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_size = (width, height);
    }

    /// Short usage hint for the current mode.
    pub fn hint(&self) -> &'static str {
        if self.session.image_url.is_none() {
            return "Kindly add the image first.";
        }
        match self.mode {
            EditMode::PanZoom => "Drag to pan, scroll the wheel to zoom.",
            EditMode::Draw(ShapeKind::Rectangle) => {
                "Press at one corner of the area and drag to the desired size."
            }
            EditMode::Draw(ShapeKind::Circle) => {
                "Press at the center of the area and drag to the desired size."
            }
        }
    }

    // Pointer, wheel and keyboard input

    pub fn pointer_down(&mut self, screen: Point) {
        match self.mode {
            EditMode::PanZoom => {
                self.pan_cursor = Some(screen);
                self.press_origin = Some(screen);
            }
            EditMode::Draw(kind) => {
                if !self.has_image() {
                    log::debug!("Ignoring draw without an image");
                    return;
                }
                let point = geometry::screen_to_image(screen, &self.session.view);
                self.editor.begin(kind, point);
                self.preview = self.editor.update(point);
                self.dirty = true;
            }
        }
    }

    pub fn pointer_move(&mut self, screen: Point) {
        match self.mode {
            EditMode::PanZoom => {
                if let Some(last) = self.pan_cursor {
                    let view = geometry::pan_by(&self.session.view, screen - last);
                    self.set_view(view);
                    self.pan_cursor = Some(screen);
                }
            }
            EditMode::Draw(_) => {
                let point = geometry::screen_to_image(screen, &self.session.view);
                if let Some(shape) = self.editor.update(point) {
                    log::trace!("Preview {:?}", shape);
                    self.preview = Some(shape);
                    self.dirty = true;
                }
            }
        }
    }

    pub fn pointer_up(&mut self, screen: Point) {
        match self.mode {
            EditMode::PanZoom => {
                self.pan_cursor = None;
                if let Some(origin) = self.press_origin.take() {
                    if origin.distance(&screen) <= self.config.click_tolerance {
                        self.select_at(screen);
                    }
                }
            }
            EditMode::Draw(_) => {
                let point = geometry::screen_to_image(screen, &self.session.view);
                if let Some(shape) = self.editor.commit(point) {
                    let annotations = self.session.annotations.add(shape, &mut self.rng);
                    self.set_annotations(annotations);
                    self.preview = None;
                    log::info!(
                        "Added {} annotation, total: {}",
                        shape.kind(),
                        self.session.annotations.len()
                    );
                }
            }
        }
    }

    /// Select the topmost annotation under a screen point, if any.
    fn select_at(&mut self, screen: Point) {
        let point = geometry::screen_to_image(screen, &self.session.view);
        let tolerance = self.config.hit_tolerance / self.session.view.zoom();
        if let Some(index) = self.session.annotations.hit_test(point, tolerance) {
            self.select_annotation(index);
        }
    }

    /// Wheel input; `scroll_y` is positive when scrolling down (zoom out).
    pub fn wheel(&mut self, scroll_y: f64, focus: Point) {
        if self.mode != EditMode::PanZoom {
            return;
        }
        let delta = -scroll_y * self.config.wheel_zoom_sensitivity;
        let view = geometry::zoom_at(&self.session.view, delta, focus);
        self.set_view(view);
    }

    pub fn key(&mut self, command: KeyCommand) {
        let step = self.config.key_pan_step;
        let pan = |dx: f64, dy: f64| Point::new(dx * step, dy * step);
        match command {
            KeyCommand::PanUp | KeyCommand::PanDown | KeyCommand::PanLeft | KeyCommand::PanRight
                if self.mode != EditMode::PanZoom => {}
            KeyCommand::PanUp => self.pan_view(pan(0.0, -1.0)),
            KeyCommand::PanDown => self.pan_view(pan(0.0, 1.0)),
            KeyCommand::PanLeft => self.pan_view(pan(-1.0, 0.0)),
            KeyCommand::PanRight => self.pan_view(pan(1.0, 0.0)),
            KeyCommand::ZoomIn => self.zoom_keyboard(self.config.keyboard_zoom_step),
            KeyCommand::ZoomOut => self.zoom_keyboard(-self.config.keyboard_zoom_step),
            KeyCommand::Cancel => self.cancel_drag(),
            KeyCommand::DeleteSelected => self.delete_selected(),
        }
    }

    fn pan_view(&mut self, delta: Point) {
        let view = geometry::pan_by(&self.session.view, delta);
        self.set_view(view);
    }

    fn zoom_keyboard(&mut self, delta: f64) {
        let view = geometry::zoom_at(&self.session.view, delta, self.config.keyboard_zoom_anchor);
        self.set_view(view);
    }

    /// Restore zoom 1 with no pan.
    pub fn reset_view(&mut self) {
        self.set_view(ViewState::default());
    }

    // Annotation list operations

    pub fn select_annotation(&mut self, index: usize) {
        let annotations = self.session.annotations.select(index);
        self.set_annotations(annotations);
    }

    pub fn delete_annotation(&mut self, index: usize) {
        if index >= self.session.annotations.len() {
            return;
        }
        let annotations = self.session.annotations.delete(index);
        self.set_annotations(annotations);
        log::info!("Deleted annotation, total: {}", self.session.annotations.len());
    }

    pub fn delete_selected(&mut self) {
        if let Some(index) = self.session.annotations.selected() {
            self.delete_annotation(index);
        }
    }

    pub fn set_annotation_class(&mut self, index: usize, class: &OrganismClass) {
        let annotations = self.session.annotations.set_class(index, class.name, class.color);
        self.set_annotations(annotations);
    }

    pub fn set_annotation_description(&mut self, index: usize, text: &str) {
        let annotations = self.session.annotations.set_description(index, text);
        self.set_annotations(annotations);
    }

    // Session lifecycle

    /// Discard everything and start over with no image.
    pub fn new_session(&mut self) {
        self.cancel_drag();
        self.session = Session::new();
        self.pending_image = None;
        self.pan_cursor = None;
        self.press_origin = None;
        self.generation += 1;
        self.dirty = true;
        log::info!("Started new session");
    }

    /// Replace the session with an imported document.
    ///
    /// Returns the image URL the host must load and report back through
    /// [`Self::image_loaded`] or [`Self::image_failed`].
    pub fn import_session(&mut self, document: SessionDocument) -> String {
        self.cancel_drag();
        self.session = serialization::import(document);
        let url = self.session.image_url.clone().unwrap_or_default();
        self.pending_image = Some(url.clone());
        self.pan_cursor = None;
        self.press_origin = None;
        self.generation += 1;
        self.dirty = true;
        log::info!(
            "Imported session with {} annotations, image {}",
            self.session.annotations.len(),
            url
        );
        url
    }

    /// Parse and import a JSON document. On error the session is unchanged.
    pub fn import_json(&mut self, text: &str) -> Result<String, SessionError> {
        let document = serialization::from_json(text)?;
        Ok(self.import_session(document))
    }

    pub fn export_session(&self) -> Result<SessionDocument, SessionError> {
        let document = serialization::export(&self.session)?;
        log::info!("Exported {} annotations", document.annotations.len());
        Ok(document)
    }

    pub fn export_json(&self) -> Result<String, SessionError> {
        serialization::to_json(&self.export_session()?)
    }

    /// Start using a new image. Annotations are kept.
    pub fn begin_image_load(&mut self, url: &str) {
        self.session.image_url = Some(url.to_string());
        self.session.frame = None;
        self.pending_image = Some(url.to_string());
        self.dirty = true;
    }

    /// Use an uploaded image if the session it was uploaded for is still
    /// current. Returns false, changing nothing, when it is not.
    pub fn accept_upload(&mut self, generation: u64, url: &str) -> bool {
        if generation != self.generation {
            log::info!("Discarding upload {} for a replaced session", url);
            return false;
        }
        self.begin_image_load(url);
        true
    }

    /// Record a finished load. Results for URLs no longer awaited are ignored.
    pub fn image_loaded(&mut self, url: &str, natural_width: u32, natural_height: u32) -> bool {
        if self.pending_image.as_deref() != Some(url) {
            log::debug!("Ignoring stale image load for {}", url);
            return false;
        }
        let (canvas_width, canvas_height) = self.canvas_size;
        self.session.frame = Some(ImageFrame::fit(
            url,
            natural_width,
            natural_height,
            canvas_width,
            canvas_height,
        ));
        self.pending_image = None;
        self.dirty = true;
        true
    }

    /// Record a failed load and return the error to report.
    pub fn image_failed(&mut self, url: &str, reason: impl Into<String>) -> SessionError {
        let error = SessionError::ImageLoad {
            source_url: url.to_string(),
            reason: reason.into(),
        };
        if self.pending_image.as_deref() == Some(url) {
            self.pending_image = None;
            self.session.image_url = None;
            self.session.frame = None;
            self.dirty = true;
        }
        log::error!("{}", error);
        error
    }

    /// Paint the current state.
    pub fn render<C: Canvas + ?Sized>(&mut self, canvas: &mut C) {
        let annotations = self.session.annotations.clone();
        renderer::render(
            canvas,
            self.session.frame.as_ref(),
            &self.session.view,
            annotations.as_slice(),
            self.preview.as_ref(),
            self.preview_color,
            &mut self.colors,
        );
        self.dirty = false;
    }
}
