// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the cellmark application.

pub mod assistant;
pub mod canvas;
pub mod properties;
pub mod renderer;
pub mod toolbar;
