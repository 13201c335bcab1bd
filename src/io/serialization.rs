// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session document serialization and deserialization.
//!
//! The JSON document is the interchange format:
//!
//! ```json
//! { "imageURL": "...", "zoom": 1.0, "panOffset": {"x": 0, "y": 0},
//!   "annotations": [ { "shape": {"type": "rectangle", ...},
//!                      "organismClass": "...", "color": "#...",
//!                      "description": "..." } ] }
//! ```
//!
//! YAML files use the same schema. Shapes are stored in image space and
//! selection is never written.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::editor::store::AnnotationStore;
use crate::error::SessionError;
use crate::models::annotation::{Annotation, Point};
use crate::models::session::{Session, ViewState};

/// Persisted form of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub zoom: f64,
    pub pan_offset: Point,
    pub annotations: Vec<Annotation>,
}

/// File formats chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, SessionError> {
        let extension = path.extension().and_then(|s| s.to_str());
        match extension.map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(SessionError::UnsupportedFormat(format!("{:?}", extension))),
        }
    }
}

impl SessionDocument {
    /// Reject documents whose fields cannot form a usable session.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.image_url.trim().is_empty() {
            return Err(SessionError::MalformedDocument("imageURL is empty".to_string()));
        }
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(SessionError::MalformedDocument(format!(
                "zoom {} is not a positive number",
                self.zoom
            )));
        }
        if !self.pan_offset.is_finite() {
            return Err(SessionError::MalformedDocument(
                "panOffset is not finite".to_string(),
            ));
        }
        for (index, annotation) in self.annotations.iter().enumerate() {
            annotation
                .shape
                .validate()
                .map_err(|reason| SessionError::InvalidAnnotation { index, reason })?;
        }
        Ok(())
    }
}

/// Build the document for a session. Requires an image reference.
pub fn export(session: &Session) -> Result<SessionDocument, SessionError> {
    let image_url = session.image_url.clone().ok_or(SessionError::NoImage)?;
    let annotations = session
        .annotations
        .iter()
        .map(|a| Annotation {
            selected: false,
            ..a.clone()
        })
        .collect();

    Ok(SessionDocument {
        image_url,
        zoom: session.view.zoom(),
        pan_offset: session.view.pan(),
        annotations,
    })
}

/// Rebuild a session from a validated document.
///
/// The image frame is left unset: the caller reloads `image_url` and fits it
/// to the current canvas. Nothing is selected afterwards.
pub fn import(document: SessionDocument) -> Session {
    let annotations = document
        .annotations
        .into_iter()
        .map(|a| Annotation {
            selected: false,
            ..a
        })
        .collect();

    Session {
        image_url: Some(document.image_url),
        frame: None,
        view: ViewState::new(document.zoom, document.pan_offset),
        annotations: AnnotationStore::new().replace_all(annotations),
    }
}

/// Serialize to pretty-printed JSON.
pub fn to_json(document: &SessionDocument) -> Result<String, SessionError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Parse and validate a JSON document.
pub fn from_json(text: &str) -> Result<SessionDocument, SessionError> {
    let document: SessionDocument =
        serde_json::from_str(text).map_err(|e| SessionError::MalformedDocument(e.to_string()))?;
    document.validate()?;
    Ok(document)
}

pub fn to_yaml(document: &SessionDocument) -> Result<String, SessionError> {
    Ok(serde_yaml::to_string(document)?)
}

pub fn from_yaml(text: &str) -> Result<SessionDocument, SessionError> {
    let document: SessionDocument =
        serde_yaml::from_str(text).map_err(|e| SessionError::MalformedDocument(e.to_string()))?;
    document.validate()?;
    Ok(document)
}

/// Write a document, picking the format from the file extension.
pub fn export_file(document: &SessionDocument, path: &Path) -> Result<(), SessionError> {
    let text = match DocumentFormat::from_path(path)? {
        DocumentFormat::Json => to_json(document)?,
        DocumentFormat::Yaml => to_yaml(document)?,
    };
    std::fs::write(path, text)?;
    Ok(())
}

/// Read a document, picking the format from the file extension.
pub fn import_file(path: &Path) -> Result<SessionDocument, SessionError> {
    let format = DocumentFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    match format {
        DocumentFormat::Json => from_json(&text),
        DocumentFormat::Yaml => from_yaml(&text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{Shape, ORGANISM_CLASSES};

    fn sample_session() -> Session {
        let store = Session::new()
            .annotations
            .add_with_class(
                Shape::Rectangle {
                    x: 10.0,
                    y: 10.0,
                    width: 40.0,
                    height: -20.5,
                },
                &ORGANISM_CLASSES[0],
            )
            .add_with_class(
                Shape::Circle {
                    x: 100.0,
                    y: 100.0,
                    radius: 0.0,
                },
                &ORGANISM_CLASSES[3],
            )
            .set_description(0, "dividing cell");

        Session {
            image_url: Some("https://example.org/slide-7.jpg".to_string()),
            frame: None,
            view: ViewState::new(1.7, Point::new(-35.5, 12.0)),
            annotations: store,
        }
    }

    #[test]
    fn test_roundtrip_json() {
        let session = sample_session();
        let json = to_json(&export(&session).unwrap()).unwrap();
        let restored = import(from_json(&json).unwrap());

        assert_eq!(restored.image_url, session.image_url);
        assert_eq!(restored.view, session.view);
        assert_eq!(restored.annotations.len(), 2);
        for (restored, original) in restored.annotations.iter().zip(session.annotations.iter()) {
            assert_eq!(restored.shape, original.shape);
            assert_eq!(restored.organism_class, original.organism_class);
            assert_eq!(restored.color, original.color);
            assert_eq!(restored.description, original.description);
            assert!(!restored.selected);
        }
    }

    #[test]
    fn test_export_field_names() {
        let json = to_json(&export(&sample_session()).unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["imageURL"], "https://example.org/slide-7.jpg");
        assert_eq!(value["zoom"], 1.7);
        assert_eq!(value["panOffset"]["x"], -35.5);
        assert_eq!(value["annotations"][0]["shape"]["type"], "rectangle");
        assert_eq!(value["annotations"][0]["organismClass"], "Bacteria");
        assert_eq!(value["annotations"][0]["description"], "dividing cell");
        assert_eq!(value["annotations"][1]["shape"]["radius"], 0.0);
        assert!(value["annotations"][1].get("selected").is_none());
    }

    #[test]
    fn test_export_without_image_fails() {
        assert!(matches!(export(&Session::new()), Err(SessionError::NoImage)));
    }

    #[test]
    fn test_import_legacy_document() {
        let text = r##"{
            "imageURL": "https://bucket.example/cmmi/abc.jpg",
            "zoom": 1.2,
            "panOffset": {"x": 4, "y": -8},
            "annotations": [
                {"shape": {"type": "rectangle", "x": 5, "y": 6, "width": 30},
                 "organismClass": "Fungus", "color": "#ffe119", "description": ""},
                {"shape": {"type": "circle", "x": 1, "y": 2, "radius": 3},
                 "organismClass": "Virus", "color": "#3cb44b"}
            ]
        }"##;

        let session = import(from_json(text).unwrap());
        assert_eq!(session.view.zoom(), 1.2);
        assert_eq!(
            session.annotations.get(0).unwrap().shape,
            Shape::Rectangle {
                x: 5.0,
                y: 6.0,
                width: 30.0,
                height: 0.0
            }
        );
        assert_eq!(session.annotations.get(1).unwrap().description, "");
        assert_eq!(session.annotations.selected(), None);
    }

    #[test]
    fn test_import_legacy_yaml_document() {
        let text = "\
imageURL: file:///slides/a.png
zoom: 2
panOffset: {x: 1, y: 2}
annotations:
  - shape: {type: rectangle, x: 3, y: 4, height: 12}
    organismClass: Bacteria
    color: '#e6194b'
  - shape: {type: circle, x: 5, y: 6}
    organismClass: Virus
    color: red
";

        let session = import(from_yaml(text).unwrap());
        assert_eq!(session.image_url.as_deref(), Some("file:///slides/a.png"));
        assert_eq!(session.view.pan(), Point::new(1.0, 2.0));
        assert_eq!(
            session.annotations.get(0).unwrap().shape,
            Shape::Rectangle {
                x: 3.0,
                y: 4.0,
                width: 0.0,
                height: 12.0
            }
        );
        assert_eq!(
            session.annotations.get(1).unwrap().shape,
            Shape::Circle {
                x: 5.0,
                y: 6.0,
                radius: 0.0
            }
        );
        assert_eq!(session.annotations.get(1).unwrap().color, "red");
        assert_eq!(session.annotations.get(1).unwrap().description, "");
    }

    #[test]
    fn test_malformed_documents_rejected() {
        let missing_zoom = r#"{"imageURL": "a.png", "panOffset": {"x": 0, "y": 0}, "annotations": []}"#;
        assert!(matches!(
            from_json(missing_zoom),
            Err(SessionError::MalformedDocument(_))
        ));

        let bad_radius = r##"{"imageURL": "a.png", "zoom": 1, "panOffset": {"x": 0, "y": 0},
            "annotations": [{"shape": {"type": "circle", "x": 0, "y": 0, "radius": -4},
                             "organismClass": "Alga", "color": "#f58231"}]}"##;
        assert!(matches!(
            from_json(bad_radius),
            Err(SessionError::InvalidAnnotation { index: 0, .. })
        ));

        let unknown_shape = r##"{"imageURL": "a.png", "zoom": 1, "panOffset": {"x": 0, "y": 0},
            "annotations": [{"shape": {"type": "polygon", "x": 0, "y": 0},
                             "organismClass": "Alga", "color": "#f58231"}]}"##;
        assert!(from_json(unknown_shape).is_err());

        assert!(from_json("not json").is_err());
    }

    #[test]
    fn test_file_roundtrip_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let document = export(&sample_session()).unwrap();

        for name in ["session.json", "session.yaml"] {
            let path = dir.path().join(name);
            export_file(&document, &path).unwrap();
            assert_eq!(import_file(&path).unwrap(), document);
        }

        let bad = dir.path().join("session.txt");
        assert!(matches!(
            export_file(&document, &bad),
            Err(SessionError::UnsupportedFormat(_))
        ));
    }
}
