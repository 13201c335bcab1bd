// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! cellmark - microscopy image annotation
//!
//! A desktop application for drawing and classifying regions of interest
//! on microscopy images.

use anyhow::Result;
use cellmark::app::CellmarkApp;
use cellmark::config::EditorConfig;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = EditorConfig::load().unwrap_or_else(|e| {
        log::error!("{}, using defaults", e);
        EditorConfig::default()
    });

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("cellmark")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "cellmark",
        options,
        Box::new(|_cc| Ok(Box::new(CellmarkApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
