// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the [`ViewportController`], runs image
//! loading and collaborator calls on worker threads, and maps menus,
//! keys and panel actions onto controller operations.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use crate::config::EditorConfig;
use crate::editor::controller::{KeyCommand, ViewportController};
use crate::error::{CollaboratorError, SessionError};
use crate::io::collaborators::{CommandVision, ImageUploader, LocalUploader, VisionQuery};
use crate::io::media::{self, LoadedImage};
use crate::io::serialization;
use crate::ui::assistant::{self, AssistantAction, AssistantState};
use crate::ui::canvas::{self, PointerTracker};
use crate::ui::properties::{self, ListState, PropertiesAction};
use crate::ui::toolbar::{self, ToolbarAction};

/// How long a notification stays on screen, in seconds.
const NOTIFICATION_SECONDS: f64 = 6.0;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "tif", "webp"];

/// Result of work done off the UI thread.
enum Task {
    ImageLoaded {
        url: String,
        result: Result<LoadedImage, SessionError>,
    },
    Uploaded {
        /// Session generation the upload was started for
        generation: u64,
        result: Result<String, CollaboratorError>,
    },
    Vision(Result<String, CollaboratorError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Info,
    Error,
}

/// Transient message shown in the corner of the window.
struct Notification {
    text: String,
    severity: Severity,
    expires_at: f64,
}

/// Main application state.
pub struct CellmarkApp {
    controller: ViewportController,

    /// Texture for the loaded image, tagged with its source URL
    texture: Option<(String, egui::TextureHandle)>,

    tasks_tx: Sender<Task>,
    tasks_rx: Receiver<Task>,

    /// Shown on the empty canvas while an upload or load is running
    loading_message: Option<String>,

    notifications: Vec<Notification>,
    /// Queued until the next frame supplies the clock
    pending_notifications: Vec<(Severity, String)>,

    uploader: Arc<dyn ImageUploader>,
    vision: Option<Arc<dyn VisionQuery>>,

    list_state: ListState,
    assistant: AssistantState,
    pointer: PointerTracker,
}

impl CellmarkApp {
    /// Create a new application instance.
    pub fn new(config: EditorConfig) -> Self {
        let uploader: Arc<dyn ImageUploader> = Arc::new(LocalUploader::from_config(&config));
        let vision = config
            .vision_command
            .as_deref()
            .and_then(CommandVision::from_argv)
            .map(|v| Arc::new(v) as Arc<dyn VisionQuery>);
        if vision.is_none() {
            log::info!("No vision helper configured, AI assistant disabled");
        }

        let (tasks_tx, tasks_rx) = channel();
        Self {
            controller: ViewportController::new(config),
            texture: None,
            tasks_tx,
            tasks_rx,
            loading_message: None,
            notifications: Vec::new(),
            pending_notifications: Vec::new(),
            uploader,
            vision,
            list_state: ListState::default(),
            assistant: AssistantState::default(),
            pointer: PointerTracker::default(),
        }
    }

    fn notify(&mut self, severity: Severity, text: impl Into<String>) {
        self.pending_notifications.push((severity, text.into()));
    }

    fn notify_error(&mut self, error: &dyn std::fmt::Display) {
        self.notify(Severity::Error, error.to_string());
    }

    /// Run `job` on a worker thread and wake the UI when it is done.
    fn spawn<F>(&self, ctx: &egui::Context, job: F)
    where
        F: FnOnce() -> Task + Send + 'static,
    {
        let sender = self.tasks_tx.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let _ = sender.send(job());
            ctx.request_repaint();
        });
    }

    /// Fetch and decode `url` in the background.
    fn spawn_image_load(&mut self, ctx: &egui::Context, url: String) {
        self.loading_message = Some("Loading image...".to_string());
        self.spawn(ctx, move || {
            let result = media::load_image(&url);
            Task::ImageLoaded { url, result }
        });
    }

    /// Upload a local image file, then load the uploaded copy.
    fn upload_file(&mut self, ctx: &egui::Context, path: PathBuf) {
        log::info!("Uploading {}", path.display());
        let uploader = Arc::clone(&self.uploader);
        let folder = self.controller.config().upload_folder.clone();
        let generation = self.controller.generation();
        self.loading_message = Some("Uploading image...".to_string());
        self.spawn(ctx, move || {
            let result = std::fs::read(&path)
                .map_err(CollaboratorError::from)
                .and_then(|bytes| uploader.upload(&bytes, &folder));
            Task::Uploaded { generation, result }
        });
    }

    fn upload_bytes(&mut self, ctx: &egui::Context, bytes: Arc<[u8]>) {
        let uploader = Arc::clone(&self.uploader);
        let folder = self.controller.config().upload_folder.clone();
        let generation = self.controller.generation();
        self.loading_message = Some("Uploading image...".to_string());
        self.spawn(ctx, move || Task::Uploaded {
            generation,
            result: uploader.upload(&bytes, &folder),
        });
    }

    fn open_image_dialog(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        {
            self.upload_file(ctx, path);
        }
    }

    fn import_dialog(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Session", &["json", "yaml", "yml"])
            .pick_file()
        else {
            return;
        };
        self.import_path(ctx, &path);
    }

    fn import_path(&mut self, ctx: &egui::Context, path: &Path) {
        match serialization::import_file(path) {
            Ok(document) => {
                let url = self.controller.import_session(document);
                self.texture = None;
                self.list_state = ListState::default();
                self.spawn_image_load(ctx, url);
            }
            Err(e) => {
                log::error!("Failed to import {}: {}", path.display(), e);
                self.notify_error(&e);
            }
        }
    }

    fn export_dialog(&mut self, extension: &str) {
        let document = match self.controller.export_session() {
            Ok(document) => document,
            Err(SessionError::NoImage) => {
                self.notify(Severity::Error, "Kindly add the image first.");
                return;
            }
            Err(e) => {
                self.notify_error(&e);
                return;
            }
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter(extension.to_uppercase(), &[extension])
            .set_file_name(format!("annotations.{}", extension))
            .save_file()
        else {
            return;
        };

        match serialization::export_file(&document, &path) {
            Ok(()) => {
                log::info!("Exported annotations to {}", path.display());
                self.notify(Severity::Info, format!("Saved {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to export annotations: {}", e);
                self.notify_error(&e);
            }
        }
    }

    fn new_session(&mut self) {
        self.controller.new_session();
        self.texture = None;
        self.loading_message = None;
        self.list_state = ListState::default();
        self.assistant.finish(None);
    }

    fn ask_assistant(&mut self, ctx: &egui::Context) {
        let (Some(vision), Some(url)) = (&self.vision, &self.controller.session().image_url) else {
            return;
        };
        let vision = Arc::clone(vision);
        let url = url.clone();
        let prompt = self.assistant.prompt.clone();
        self.assistant.start();
        self.spawn(ctx, move || Task::Vision(vision.query(&prompt, &url)));
    }

    /// Apply finished background work.
    fn drain_tasks(&mut self, ctx: &egui::Context) {
        while let Ok(task) = self.tasks_rx.try_recv() {
            match task {
                Task::ImageLoaded { url, result } => self.finish_image_load(ctx, url, result),
                Task::Uploaded {
                    generation,
                    result: Ok(url),
                } => {
                    if self.controller.accept_upload(generation, &url) {
                        self.spawn_image_load(ctx, url);
                    }
                }
                Task::Uploaded {
                    result: Err(e), ..
                } => {
                    log::error!("{}", e);
                    if self.controller.pending_image().is_none() {
                        self.loading_message = None;
                    }
                    self.notify_error(&e);
                }
                Task::Vision(Ok(text)) => self.assistant.finish(Some(text)),
                Task::Vision(Err(e)) => {
                    log::error!("{}", e);
                    self.assistant.finish(None);
                    self.notify_error(&e);
                }
            }
        }
    }

    fn finish_image_load(
        &mut self,
        ctx: &egui::Context,
        url: String,
        result: Result<LoadedImage, SessionError>,
    ) {
        match result {
            Ok(image) => {
                if self.controller.image_loaded(&url, image.width, image.height) {
                    let size = [image.width as usize, image.height as usize];
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
                    let texture = ctx.load_texture("session_image", color_image, egui::TextureOptions::LINEAR);
                    self.texture = Some((url, texture));
                }
            }
            Err(e) => {
                let reason = match e {
                    SessionError::ImageLoad { reason, .. } => reason,
                    other => other.to_string(),
                };
                let error = self.controller.image_failed(&url, reason);
                self.notify_error(&error);
            }
        }
        if self.controller.pending_image().is_none() {
            self.loading_message = None;
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };
        if let Some(path) = file.path {
            let is_session = matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("json") | Some("yaml") | Some("yml")
            );
            if is_session {
                self.import_path(ctx, &path);
            } else {
                self.upload_file(ctx, path);
            }
        } else if let Some(bytes) = file.bytes {
            self.upload_bytes(ctx, bytes);
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        use egui::Key;
        let bindings = [
            (Key::ArrowUp, KeyCommand::PanUp),
            (Key::ArrowDown, KeyCommand::PanDown),
            (Key::ArrowLeft, KeyCommand::PanLeft),
            (Key::ArrowRight, KeyCommand::PanRight),
            (Key::Plus, KeyCommand::ZoomIn),
            (Key::Equals, KeyCommand::ZoomIn),
            (Key::Minus, KeyCommand::ZoomOut),
            (Key::Escape, KeyCommand::Cancel),
            (Key::Delete, KeyCommand::DeleteSelected),
            (Key::Backspace, KeyCommand::DeleteSelected),
        ];
        let pressed: Vec<KeyCommand> = ctx.input(|i| {
            bindings
                .iter()
                .filter(|(key, _)| i.key_pressed(*key))
                .map(|(_, command)| *command)
                .collect()
        });
        for command in pressed {
            self.controller.key(command);
        }
    }

    fn show_notifications(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        for (severity, text) in self.pending_notifications.drain(..) {
            self.notifications.push(Notification {
                text,
                severity,
                expires_at: now + NOTIFICATION_SECONDS,
            });
        }
        self.notifications.retain(|n| n.expires_at > now);
        if self.notifications.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("notifications"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -40.0))
            .show(ctx, |ui| {
                for notification in &self.notifications {
                    let color = match notification.severity {
                        Severity::Info => egui::Color32::from_rgb(120, 200, 120),
                        Severity::Error => egui::Color32::from_rgb(230, 90, 90),
                    };
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(egui::RichText::new(&notification.text).color(color));
                    });
                }
            });

        if let Some(next) = self.notifications.iter().map(|n| n.expires_at).reduce(f64::min) {
            ctx.request_repaint_after(Duration::from_secs_f64((next - now).max(0.0)));
        }
    }
}

impl eframe::App for CellmarkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_tasks(ctx);
        self.handle_dropped_files(ctx);

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New Session").clicked() {
                        self.new_session();
                        ui.close_menu();
                    }
                    if ui.button("Open Image...").clicked() {
                        ui.close_menu();
                        self.open_image_dialog(ctx);
                    }
                    ui.separator();
                    if ui.button("Import Annotations...").clicked() {
                        ui.close_menu();
                        self.import_dialog(ctx);
                    }
                    ui.menu_button("Export Annotations", |ui| {
                        if ui.button("JSON...").clicked() {
                            ui.close_menu();
                            self.export_dialog("json");
                        }
                        if ui.button("YAML...").clicked() {
                            ui.close_menu();
                            self.export_dialog("yaml");
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let has_selection = self.controller.annotations().selected().is_some();
                    if ui
                        .add_enabled(has_selection, egui::Button::new("Delete Selected (Del)"))
                        .clicked()
                    {
                        self.controller.delete_selected();
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Zoom In (+)").clicked() {
                        self.controller.key(KeyCommand::ZoomIn);
                        ui.close_menu();
                    }
                    if ui.button("Zoom Out (-)").clicked() {
                        self.controller.key(KeyCommand::ZoomOut);
                        ui.close_menu();
                    }
                    if ui.button("Reset View").clicked() {
                        self.controller.reset_view();
                        ui.close_menu();
                    }
                });

                if ui.button("AI Assistant").clicked() {
                    self.assistant.open = !self.assistant.open;
                }
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, self.controller.mode()))
            .inner;

        match toolbar_action {
            ToolbarAction::New => self.new_session(),
            ToolbarAction::Import => self.import_dialog(ctx),
            ToolbarAction::Export => self.export_dialog("json"),
            ToolbarAction::SetMode(mode) => self.controller.set_mode(mode),
            ToolbarAction::None => {}
        }

        // Annotation list (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(260.0)
            .show(ctx, |ui| properties::show(ui, self.controller.annotations(), &mut self.list_state))
            .inner;

        match properties_action {
            PropertiesAction::Select(index) => self.controller.select_annotation(index),
            PropertiesAction::Delete(index) => self.controller.delete_annotation(index),
            PropertiesAction::SetClass(index, class) => self.controller.set_annotation_class(index, &class),
            PropertiesAction::SetDescription(index, text) => {
                self.controller.set_annotation_description(index, &text)
            }
            PropertiesAction::None => {}
        }

        // Assistant window
        let assistant_enabled = self.vision.is_some() && self.controller.has_image();
        if assistant::show(ctx, &mut self.assistant, assistant_enabled) == AssistantAction::Submit {
            self.ask_assistant(ctx);
        }

        self.handle_keys(ctx);

        // Canvas
        egui::CentralPanel::default().show(ctx, |ui| {
            let texture = self.texture.as_ref().map(|(url, texture)| (url.as_str(), texture));
            canvas::show(
                ui,
                &mut self.controller,
                &mut self.pointer,
                texture,
                self.loading_message.as_deref(),
            );
        });

        self.show_notifications(ctx);

        if self.controller.take_repaint() {
            ctx.request_repaint();
        }
    }
}
