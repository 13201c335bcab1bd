// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types.
//!
//! Nothing in here is fatal: every variant is reported to the user and the
//! session carries on in a consistent state.

use std::io;
use thiserror::Error;

/// Errors from session lifecycle operations (import, export, image load).
#[derive(Error, Debug)]
pub enum SessionError {
    /// The document could not be parsed or is missing required fields.
    #[error("Malformed session document: {0}")]
    MalformedDocument(String),

    /// An annotation in the document has unusable geometry.
    #[error("Invalid annotation #{index}: {reason}")]
    InvalidAnnotation { index: usize, reason: String },

    /// Export was requested before any image was added.
    #[error("No image loaded, add an image first")]
    NoImage,

    /// The image could not be fetched or decoded.
    #[error("Failed to load image '{source_url}': {reason}")]
    ImageLoad { source_url: String, reason: String },

    /// The file extension does not name a supported format.
    #[error("Unsupported file extension: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors from the external upload and vision collaborators.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Vision request failed: {0}")]
    Vision(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors reading the editor configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
