// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! External collaborators: image upload and vision queries.
//!
//! Both are blocking calls made from worker threads. Their failures are
//! reported to the user and never touch session state.

use std::io::Cursor;
use std::path::PathBuf;
use std::process::Command;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::config::EditorConfig;
use crate::error::CollaboratorError;
use crate::io::media;

/// Prompt pre-filled in the assistant window.
pub const DEFAULT_VISION_PROMPT: &str = "What's in this image?";

/// Stores an image somewhere and returns the URL it can be loaded from.
pub trait ImageUploader: Send + Sync {
    fn upload(&self, bytes: &[u8], folder: &str) -> Result<String, CollaboratorError>;
}

/// Answers a free-text question about an image.
pub trait VisionQuery: Send + Sync {
    fn query(&self, prompt: &str, image_url: &str) -> Result<String, CollaboratorError>;
}

/// Uploader writing downscaled JPEG copies into a local library directory.
#[derive(Debug, Clone)]
pub struct LocalUploader {
    pub root: PathBuf,
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

impl LocalUploader {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            root: config.library_dir.clone(),
            max_dimension: config.max_upload_dimension,
            jpeg_quality: config.upload_jpeg_quality,
        }
    }
}

impl ImageUploader for LocalUploader {
    fn upload(&self, bytes: &[u8], folder: &str) -> Result<String, CollaboratorError> {
        if folder.contains("..") {
            return Err(CollaboratorError::Upload(format!("invalid folder '{}'", folder)));
        }

        let mut image = image::load_from_memory(bytes)?;
        if image.width().max(image.height()) > self.max_dimension {
            // resize() keeps the aspect ratio
            image = image.resize(self.max_dimension, self.max_dimension, FilterType::Triangle);
        }

        let mut encoded = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut encoded, self.jpeg_quality.clamp(1, 100));
        image.to_rgb8().write_with_encoder(encoder)?;

        let dir = self.root.join(folder);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.jpg", uuid::Uuid::new_v4()));
        std::fs::write(&path, encoded.into_inner())?;

        log::info!("Uploaded image to {}", path.display());
        Ok(media::file_url(&path))
    }
}

/// Vision client that delegates to an external helper program.
///
/// The helper is run as `<program> <args...> <prompt> <image_url>` and its
/// standard output is the answer.
#[derive(Debug, Clone)]
pub struct CommandVision {
    program: String,
    args: Vec<String>,
}

impl CommandVision {
    /// Build from an argv list; `None` when it is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl VisionQuery for CommandVision {
    fn query(&self, prompt: &str, image_url: &str) -> Result<String, CollaboratorError> {
        if prompt.trim().is_empty() {
            return Err(CollaboratorError::Vision("no text provided".to_string()));
        }

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(prompt)
            .arg(image_url)
            .output()
            .map_err(|e| CollaboratorError::Vision(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(CollaboratorError::Vision(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image::RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]))
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_local_upload_downscales() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = LocalUploader {
            root: dir.path().to_path_buf(),
            max_dimension: 64,
            jpeg_quality: 60,
        };

        let url = uploader.upload(&png_bytes(256, 128), "slides").unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with(".jpg"));

        let loaded = media::load_image(&url).unwrap();
        assert_eq!((loaded.width, loaded.height), (64, 32));
    }

    #[test]
    fn test_upload_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = LocalUploader {
            root: dir.path().to_path_buf(),
            max_dimension: 64,
            jpeg_quality: 60,
        };

        assert!(uploader.upload(b"plain text", "slides").is_err());
        assert!(uploader.upload(&png_bytes(4, 4), "../escape").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_vision_returns_stdout() {
        let argv = vec!["echo".to_string(), "answer:".to_string()];
        let vision = CommandVision::from_argv(&argv).unwrap();

        let reply = vision.query("What's in this image?", "file:///tmp/a.jpg").unwrap();
        assert_eq!(reply, "answer: What's in this image? file:///tmp/a.jpg");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_vision_failure() {
        let vision = CommandVision::from_argv(&["false".to_string()]).unwrap();
        assert!(matches!(
            vision.query("prompt", "url"),
            Err(CollaboratorError::Vision(_))
        ));
        assert!(CommandVision::from_argv(&[]).is_none());
    }
}
