// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image loading.
//!
//! Images are referenced by URL: a plain filesystem path, a `file://` URL
//! or an `http(s)://` URL. Decoded pixels are RGBA8, ready to be turned
//! into an egui texture. Loading blocks and is meant for a worker thread.

use std::path::PathBuf;

use crate::error::SessionError;

/// A decoded image.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major.
    pub pixels: Vec<u8>,
}

/// Fetch and decode the image behind `source_url`.
pub fn load_image(source_url: &str) -> Result<LoadedImage, SessionError> {
    let load_error = |reason: String| SessionError::ImageLoad {
        source_url: source_url.to_string(),
        reason,
    };

    let bytes = read_source(source_url).map_err(load_error)?;
    let image = decode_image(&bytes).map_err(|e| load_error(e.to_string()))?;
    log::info!("Loaded image: {} ({}x{})", source_url, image.width, image.height);
    Ok(image)
}

/// Decode encoded image bytes (format sniffed from content).
pub fn decode_image(bytes: &[u8]) -> Result<LoadedImage, image::ImageError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    Ok(LoadedImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

/// Local path for a path-like or `file://` source, `None` for remote URLs.
pub fn local_path(source_url: &str) -> Option<PathBuf> {
    if source_url.starts_with("http://") || source_url.starts_with("https://") {
        return None;
    }
    let path = source_url.strip_prefix("file://").unwrap_or(source_url);
    Some(PathBuf::from(path))
}

/// Build a `file://` URL for a local path.
pub fn file_url(path: &std::path::Path) -> String {
    format!("file://{}", path.display())
}

fn read_source(source_url: &str) -> Result<Vec<u8>, String> {
    match local_path(source_url) {
        Some(path) => std::fs::read(&path).map_err(|e| format!("{}: {}", path.display(), e)),
        None => fetch_remote(source_url),
    }
}

fn fetch_remote(url: &str) -> Result<Vec<u8>, String> {
    log::debug!("Fetching {}", url);
    let output = std::process::Command::new("curl")
        .args(["-sSfL", "--max-time", "60"])
        .arg(url)
        .output()
        .map_err(|e| format!("Failed to run curl: {}", e))?;

    if !output.status.success() {
        return Err(format!(
            "curl failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &std::path::Path, width: u32, height: u32) {
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_load_from_path_and_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slide.png");
        write_png(&path, 6, 4);

        let by_path = load_image(path.to_str().unwrap()).unwrap();
        assert_eq!((by_path.width, by_path.height), (6, 4));
        assert_eq!(by_path.pixels.len(), 6 * 4 * 4);

        let by_url = load_image(&file_url(&path)).unwrap();
        assert_eq!((by_url.width, by_url.height), (6, 4));
    }

    #[test]
    fn test_missing_or_corrupt_image_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.png");
        assert!(matches!(
            load_image(missing.to_str().unwrap()),
            Err(SessionError::ImageLoad { .. })
        ));

        let corrupt = dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"definitely not a png").unwrap();
        assert!(matches!(
            load_image(corrupt.to_str().unwrap()),
            Err(SessionError::ImageLoad { .. })
        ));
    }

    #[test]
    fn test_local_path_classification() {
        assert_eq!(local_path("https://example.org/a.jpg"), None);
        assert_eq!(local_path("file:///tmp/a.jpg"), Some(PathBuf::from("/tmp/a.jpg")));
        assert_eq!(local_path("relative/a.jpg"), Some(PathBuf::from("relative/a.jpg")));
    }
}
