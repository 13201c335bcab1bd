// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: shapes, annotations, view state and the editing session.

pub mod annotation;
pub mod color;
pub mod session;
