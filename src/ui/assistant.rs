// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! AI assistant window.
//!
//! Asks the vision collaborator a question about the current image and shows
//! the answer. The query itself runs on a worker thread owned by the app.

use egui::RichText;

use crate::io::collaborators::DEFAULT_VISION_PROMPT;

/// Result of assistant window interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantAction {
    None,
    Submit,
}

/// Assistant window state carried between frames.
#[derive(Debug)]
pub struct AssistantState {
    pub open: bool,
    pub prompt: String,
    pub response: Option<String>,
    pub busy: bool,
}

impl Default for AssistantState {
    fn default() -> Self {
        Self {
            open: false,
            prompt: DEFAULT_VISION_PROMPT.to_string(),
            response: None,
            busy: false,
        }
    }
}

impl AssistantState {
    /// Mark a query as in flight and clear the previous answer.
    pub fn start(&mut self) {
        self.busy = true;
        self.response = None;
    }

    pub fn finish(&mut self, response: Option<String>) {
        self.busy = false;
        self.response = response;
    }
}

/// Display the assistant window. `enabled` is false when there is no image
/// or no vision helper is configured.
pub fn show(ctx: &egui::Context, state: &mut AssistantState, enabled: bool) -> AssistantAction {
    let mut action = AssistantAction::None;
    let mut open = state.open;

    egui::Window::new("AI Assistant")
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .default_width(360.0)
        .show(ctx, |ui| {
            ui.add(
                egui::TextEdit::multiline(&mut state.prompt)
                    .desired_rows(2)
                    .desired_width(f32::INFINITY),
            );

            ui.horizontal(|ui| {
                let can_submit = enabled && !state.busy && !state.prompt.trim().is_empty();
                if ui.add_enabled(can_submit, egui::Button::new("Ask")).clicked() {
                    action = AssistantAction::Submit;
                }
                if state.busy {
                    ui.spinner();
                }
            });

            if !enabled {
                ui.label(RichText::new("Load an image and configure a vision helper first.").weak());
            }

            if let Some(response) = &state.response {
                ui.separator();
                egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
                    ui.label(response);
                });
            }
        });

    state.open = open;
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompt() {
        let state = AssistantState::default();
        assert_eq!(state.prompt, DEFAULT_VISION_PROMPT);
        assert!(!state.open);
        assert!(!state.busy);
    }

    #[test]
    fn test_start_and_finish() {
        let mut state = AssistantState {
            response: Some("old".to_string()),
            ..Default::default()
        };
        state.start();
        assert!(state.busy);
        assert!(state.response.is_none());

        state.finish(Some("A diatom".to_string()));
        assert!(!state.busy);
        assert_eq!(state.response.as_deref(), Some("A diatom"));
    }
}
