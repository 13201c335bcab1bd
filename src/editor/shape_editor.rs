// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drag-to-draw state machine for new shapes.

use crate::models::annotation::{Point, Shape, ShapeKind};

/// Editor state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EditorState {
    #[default]
    Idle,
    Dragging { kind: ShapeKind, anchor: Point },
}

/// Builds a shape from pointer-down, move and up events.
///
/// Nothing here touches the annotation store: a finished shape is only
/// returned from [`ShapeEditor::commit`] and the caller inserts it.
#[derive(Debug, Clone, Default)]
pub struct ShapeEditor {
    state: EditorState,
}

impl ShapeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, EditorState::Dragging { .. })
    }

    /// Start a drag anchored at `point`. A drag already in progress is replaced.
    pub fn begin(&mut self, kind: ShapeKind, point: Point) {
        if self.is_dragging() {
            log::debug!("Restarting drag, previous shape discarded");
        }
        self.state = EditorState::Dragging {
            kind,
            anchor: point,
        };
    }

    /// Preview of the shape spanned so far, or `None` when idle.
    pub fn update(&self, point: Point) -> Option<Shape> {
        match self.state {
            EditorState::Dragging { kind, anchor } => Some(Shape::from_drag(kind, anchor, point)),
            EditorState::Idle => None,
        }
    }

    /// Finish the drag at `point` and return to idle.
    ///
    /// Zero-size results are returned as-is.
    pub fn commit(&mut self, point: Point) -> Option<Shape> {
        let shape = self.update(point);
        self.state = EditorState::Idle;
        shape
    }

    /// Drop the in-progress shape. Returns whether a drag was cancelled.
    pub fn cancel(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = EditorState::Idle;
        was_dragging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_drag_commits_signed_shape() {
        let mut editor = ShapeEditor::new();
        editor.begin(ShapeKind::Rectangle, Point::new(10.0, 10.0));

        let preview = editor.update(Point::new(30.0, 5.0));
        assert_eq!(
            preview,
            Some(Shape::Rectangle {
                x: 10.0,
                y: 10.0,
                width: 20.0,
                height: -5.0
            })
        );
        assert!(editor.is_dragging());

        let shape = editor.commit(Point::new(50.0, 30.0));
        assert_eq!(
            shape,
            Some(Shape::Rectangle {
                x: 10.0,
                y: 10.0,
                width: 40.0,
                height: 20.0
            })
        );
        assert_eq!(editor.state(), EditorState::Idle);
    }

    #[test]
    fn test_zero_movement_circle() {
        let mut editor = ShapeEditor::new();
        editor.begin(ShapeKind::Circle, Point::new(100.0, 100.0));

        let shape = editor.commit(Point::new(100.0, 100.0));
        assert_eq!(
            shape,
            Some(Shape::Circle {
                x: 100.0,
                y: 100.0,
                radius: 0.0
            })
        );
    }

    #[test]
    fn test_idle_editor_produces_nothing() {
        let mut editor = ShapeEditor::new();
        assert_eq!(editor.update(Point::new(1.0, 1.0)), None);
        assert_eq!(editor.commit(Point::new(1.0, 1.0)), None);
        assert!(!editor.cancel());
    }

    #[test]
    fn test_cancel_discards_drag() {
        let mut editor = ShapeEditor::new();
        editor.begin(ShapeKind::Rectangle, Point::new(0.0, 0.0));

        assert!(editor.cancel());
        assert_eq!(editor.commit(Point::new(5.0, 5.0)), None);
    }
}
