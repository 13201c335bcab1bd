// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor configuration.
//!
//! Read from the YAML file named by `CELLMARK_CONFIG`, or from
//! `<config dir>/cellmark/config.yaml`. Missing keys take their defaults and
//! a missing file means all defaults. Zoom bounds are not configurable.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::annotation::Point;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "CELLMARK_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Screen pixels moved per arrow key press.
    pub key_pan_step: f64,
    /// Zoom change per `+`/`-` key press.
    pub keyboard_zoom_step: f64,
    /// Screen point kept fixed by keyboard zoom.
    pub keyboard_zoom_anchor: Point,
    /// Zoom change per wheel unit.
    pub wheel_zoom_sensitivity: f64,
    /// Max pointer travel (screen px) for a press/release to count as a click.
    pub click_tolerance: f64,
    /// Max distance (screen px) from an outline for click selection.
    pub hit_tolerance: f64,
    /// Stroke colour of the shape being drawn.
    pub preview_color: String,
    pub upload_folder: String,
    /// Root of the local image library used by the uploader.
    pub library_dir: PathBuf,
    /// Longest side of an uploaded image after downscaling.
    pub max_upload_dimension: u32,
    pub upload_jpeg_quality: u8,
    /// Program and leading arguments for vision queries. The prompt and the
    /// image URL are appended.
    pub vision_command: Option<Vec<String>>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            key_pan_step: 10.0,
            keyboard_zoom_step: 0.1,
            keyboard_zoom_anchor: Point::new(400.0, 300.0),
            wheel_zoom_sensitivity: 0.001,
            click_tolerance: 3.0,
            hit_tolerance: 6.0,
            preview_color: "#00bfff".to_string(),
            upload_folder: "uploads".to_string(),
            library_dir: default_library_dir(),
            max_upload_dimension: 2048,
            upload_jpeg_quality: 60,
            vision_command: None,
        }
    }
}

fn default_library_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("cellmark")
}

impl EditorConfig {
    /// Default config file location, honouring `CELLMARK_CONFIG`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("cellmark").join("config.yaml"))
    }

    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A file that does not exist yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = EditorConfig::from_yaml("key_pan_step: 25\nvision_command: [\"describe-image\"]\n").unwrap();

        assert_eq!(config.key_pan_step, 25.0);
        assert_eq!(config.vision_command, Some(vec!["describe-image".to_string()]));
        assert_eq!(config.keyboard_zoom_step, 0.1);
        assert_eq!(config.keyboard_zoom_anchor, Point::new(400.0, 300.0));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load_from(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_unparsable_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "key_pan_step: [not, a, number]").unwrap();

        assert!(matches!(
            EditorConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
