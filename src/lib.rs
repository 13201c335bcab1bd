// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! cellmark - microscopy image annotation
//!
//! Load an image, pan and zoom it, and draw rectangles and circles over it.
//! Each annotation carries an organism class, a colour and a description,
//! and the whole session exports to and imports from JSON or YAML.
//!
//! The editing core lives in [`editor`] and [`util::geometry`] and has no
//! GUI dependency; [`app`] and [`ui`] host it in an egui window.

pub mod app;
pub mod config;
pub mod editor;
pub mod error;
pub mod io;
pub mod models;
pub mod ui;
pub mod util;
