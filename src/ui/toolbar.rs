// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and mode selection UI.
//!
//! This module provides the toolbar for session actions (new, import,
//! export) and for choosing between panning and drawing shapes.

use crate::editor::controller::EditMode;
use crate::models::annotation::ShapeKind;

/// Result of toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    New,
    Import,
    Export,
    SetMode(EditMode),
}

/// Display the toolbar with session and mode buttons.
pub fn show(ui: &mut egui::Ui, current_mode: EditMode) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("New").clicked() {
            action = ToolbarAction::New;
        }
        if ui.button("Import").clicked() {
            action = ToolbarAction::Import;
        }
        if ui.button("Export").clicked() {
            action = ToolbarAction::Export;
        }

        ui.separator();

        let modes = [
            (EditMode::PanZoom, "✋ Pan/Zoom"),
            (EditMode::Draw(ShapeKind::Rectangle), "▭ Rectangle"),
            (EditMode::Draw(ShapeKind::Circle), "◯ Circle"),
        ];
        for (mode, label) in modes {
            if ui.selectable_label(current_mode == mode, label).clicked() && current_mode != mode {
                action = ToolbarAction::SetMode(mode);
            }
        }
    });

    action
}
