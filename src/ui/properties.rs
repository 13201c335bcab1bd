// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation list panel.
//!
//! Lists the annotations in paint order with their class and description.
//! Rows can be selected, deleted, reclassified and described.

use egui::{Color32, RichText};

use crate::editor::store::AnnotationStore;
use crate::models::annotation::{OrganismClass, ORGANISM_CLASSES};
use crate::models::color::{ColorCache, Rgba};

/// Result of panel interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertiesAction {
    None,
    Select(usize),
    Delete(usize),
    SetClass(usize, OrganismClass),
    SetDescription(usize, String),
}

/// Description editor state carried between frames.
#[derive(Debug, Default)]
pub struct ListState {
    editing: Option<usize>,
    draft: String,
    focus_pending: bool,
    colors: ColorCache,
}

fn swatch(colors: &mut ColorCache, color: &str) -> Color32 {
    let Rgba { r, g, b, a } = colors.resolve(color, Rgba::WHITE);
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Display the annotation list.
pub fn show(ui: &mut egui::Ui, annotations: &AnnotationStore, state: &mut ListState) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Annotations");
    ui.separator();

    if annotations.is_empty() {
        ui.label(RichText::new("No annotations yet").weak());
        return action;
    }

    // Editing row may have been deleted elsewhere
    if state.editing.is_some_and(|i| i >= annotations.len()) {
        state.editing = None;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (index, annotation) in annotations.iter().enumerate() {
            let color = swatch(&mut state.colors, &annotation.color);
            let stroke_width = if annotation.selected { 3.0 } else { 1.0 };

            egui::Frame::group(ui.style())
                .stroke(egui::Stroke::new(stroke_width, color))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());

                    ui.horizontal(|ui| {
                        if ui
                            .selectable_label(annotation.selected, format!("#{}", index + 1))
                            .clicked()
                        {
                            action = PropertiesAction::Select(index);
                        }

                        let class_label = RichText::new(&annotation.organism_class)
                            .color(Color32::BLACK)
                            .background_color(color);
                        ui.menu_button(class_label, |ui| {
                            for class in ORGANISM_CLASSES {
                                let label = RichText::new(class.name).color(swatch(&mut state.colors, class.color));
                                if ui.button(label).clicked() {
                                    action = PropertiesAction::SetClass(index, *class);
                                    ui.close_menu();
                                }
                            }
                        });

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                                action = PropertiesAction::Delete(index);
                            }
                            if ui.small_button("✏").on_hover_text("Edit description").clicked() {
                                state.editing = Some(index);
                                state.draft = annotation.description.clone();
                                state.focus_pending = true;
                            }
                        });
                    });

                    if state.editing == Some(index) {
                        let response = ui.add(
                            egui::TextEdit::multiline(&mut state.draft)
                                .desired_rows(3)
                                .hint_text("Description"),
                        );
                        if std::mem::take(&mut state.focus_pending) {
                            response.request_focus();
                        }
                        if response.lost_focus() {
                            action = PropertiesAction::SetDescription(index, std::mem::take(&mut state.draft));
                            state.editing = None;
                        }
                    } else if !annotation.description.is_empty() {
                        ui.label(&annotation.description);
                    }
                });
        }
    });

    action
}
